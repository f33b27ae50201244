/*!
 * Cyclic Spin Barrier
 * Reusable rendezvous; a reader/writer gate makes the reset race-free
 */

use crate::backoff::{SpinPolicy, Spinner};
use crate::cache::CachePadded;
use crate::mutex::SpinRwMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Barrier reusable for an unlimited number of rounds.
///
/// Arrivals hold the internal gate as readers while they decrement and
/// spin; the thread that drives the counter to zero (the resetter)
/// trades its reader hold for a writer hold. That writer acquisition
/// only succeeds once every other participant of the round has dropped
/// its reader hold, so the counter is restored to its initial value
/// strictly after the whole round has drained. A thread arriving for
/// the next round while the reset is still pending blocks at the gate.
///
/// # Example
///
/// ```
/// use spinsync::CyclicSpinBarrier;
/// use std::sync::Arc;
/// use std::thread;
///
/// let barrier = Arc::new(CyclicSpinBarrier::new(2));
/// let other = Arc::clone(&barrier);
/// let handle = thread::spawn(move || {
///     for _ in 0..3 {
///         other.wait();
///     }
/// });
/// for _ in 0..3 {
///     barrier.wait();
/// }
/// handle.join().unwrap();
/// ```
#[derive(Debug)]
pub struct CyclicSpinBarrier {
    /// Arrivals still outstanding in the current round
    count: CachePadded<AtomicUsize>,
    initial: usize,
    /// Phase gate between counting and resetting
    gate: SpinRwMutex,
    policy: SpinPolicy,
}

impl CyclicSpinBarrier {
    /// Barrier for `threads` participants per round, pure-spin waiting
    #[inline]
    pub const fn new(threads: usize) -> Self {
        Self::with_policy(threads, SpinPolicy::spin())
    }

    /// Barrier for `threads` participants with the given wait backoff
    #[inline]
    pub const fn with_policy(threads: usize, policy: SpinPolicy) -> Self {
        Self {
            count: CachePadded::new(AtomicUsize::new(threads)),
            initial: threads,
            gate: SpinRwMutex::with_policy(policy),
            policy,
        }
    }

    /// Number of participants per round
    #[inline]
    pub const fn thread_count(&self) -> usize {
        self.initial
    }

    /// Arrive and spin until every participant of this round has
    /// arrived. Returns only after the round is fully released; the
    /// barrier is immediately reusable.
    pub fn wait(&self) {
        // Arrivals while the previous round is still resetting block here
        let gate = self.gate.read();

        let arrived = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        debug_assert!(arrived.is_ok(), "barrier round overfilled");
        let remaining = arrived.map_or(0, |count| count - 1);

        if remaining == 0 {
            // Resetter: trade the reader hold for a writer hold. The
            // writer acquisition blocks until all other participants of
            // this round have dropped their reader holds, so the store
            // below cannot race their spins.
            drop(gate);
            let _writer = self.gate.write();
            self.count.store(self.initial, Ordering::Release);
        } else {
            let mut spinner = Spinner::new(self.policy);
            while self.count.load(Ordering::Acquire) > 0 {
                spinner.snooze();
            }
            // Reader hold drops here, letting the resetter proceed
        }
    }
}
