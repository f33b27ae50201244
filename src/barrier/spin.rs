/*!
 * Spin Barrier
 * One-shot rendezvous for a fixed number of threads
 */

use crate::backoff::{SpinPolicy, Spinner};
use crate::cache::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One-shot barrier: `wait` returns on every participating thread only
/// after all `threads` of them have arrived.
///
/// The barrier is spent after the final arrival; calling `wait` more
/// than `threads` times is a contract violation (asserted in debug
/// builds, a no-op arrival in release builds).
#[derive(Debug)]
pub struct SpinBarrier {
    /// Arrivals still outstanding
    count: CachePadded<AtomicUsize>,
    policy: SpinPolicy,
}

impl SpinBarrier {
    /// Barrier for `threads` participants, pure-spin waiting
    #[inline]
    pub const fn new(threads: usize) -> Self {
        Self::with_policy(threads, SpinPolicy::spin())
    }

    /// Barrier for `threads` participants with the given wait backoff
    #[inline]
    pub const fn with_policy(threads: usize, policy: SpinPolicy) -> Self {
        Self {
            count: CachePadded::new(AtomicUsize::new(threads)),
            policy,
        }
    }

    /// Arrive and spin until every participant has arrived.
    ///
    /// The checked decrement pins the counter at zero, so an excess
    /// arrival cannot underflow it and wedge the release.
    pub fn wait(&self) {
        let arrived = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        debug_assert!(arrived.is_ok(), "barrier waited on more than its thread count");

        let mut spinner = Spinner::new(self.policy);
        while self.count.load(Ordering::Acquire) > 0 {
            spinner.snooze();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_thread_barrier_releases() {
        let barrier = SpinBarrier::new(1);
        barrier.wait();
    }
}
