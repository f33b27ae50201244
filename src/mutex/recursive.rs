/*!
 * Recursive Spin Mutex
 * Reentrant busy-spin lock keyed on a per-thread identity token
 */

use crate::cache::CachePadded;
use crate::mutex::SpinMutex;
use std::hint;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Stable nonzero identity for the calling thread.
///
/// The address of a thread-local is unique among live threads, which is
/// all the ownership test needs; zero is reserved for "unowned".
#[inline]
fn current_thread_token() -> usize {
    thread_local! {
        static TOKEN: u8 = const { 0 };
    }
    TOKEN.with(|token| token as *const u8 as usize)
}

/// Ownership record; only meaningful while the flag is held
#[derive(Debug)]
struct Ownership {
    /// Token of the holding thread, 0 = unowned
    owner: AtomicUsize,
    /// Nested hold count of the owning thread
    count: AtomicUsize,
}

/// Spin mutex the owning thread may re-lock without deadlocking.
///
/// Each `lock`/`try_lock` success produces a guard; the lock is released
/// when the hold count returns to zero, that is, when the last live
/// guard drops. Guards are tied to the locking thread and cannot be
/// sent elsewhere.
///
/// # Example
///
/// ```
/// use spinsync::SpinRecursiveMutex;
///
/// let mutex = SpinRecursiveMutex::new();
/// let outer = mutex.lock();
/// let inner = mutex.lock(); // same thread: no deadlock
/// drop(inner);
/// drop(outer); // fully released here
/// ```
#[derive(Debug)]
pub struct SpinRecursiveMutex {
    flag: CachePadded<AtomicBool>,
    /// Serializes the ownership handoff so lock and try_lock observe
    /// owner/count as a unit
    claim: SpinMutex,
    state: CachePadded<Ownership>,
}

impl SpinRecursiveMutex {
    /// Create an unlocked mutex
    #[inline]
    pub const fn new() -> Self {
        Self {
            flag: CachePadded::new(AtomicBool::new(false)),
            claim: SpinMutex::new(),
            state: CachePadded::new(Ownership {
                owner: AtomicUsize::new(0),
                count: AtomicUsize::new(0),
            }),
        }
    }

    /// Acquire. Succeeds immediately for the thread that already holds
    /// the lock (bumping the hold count); otherwise spins until the lock
    /// is free and claims ownership with a count of one.
    #[inline]
    pub fn lock(&self) -> SpinRecursiveMutexGuard<'_> {
        let token = current_thread_token();
        // Only this thread ever stores its own token, so observing it
        // means we are already inside the lock.
        if self.state.owner.load(Ordering::Acquire) == token {
            self.state.count.fetch_add(1, Ordering::Relaxed);
            return self.guard();
        }

        while self.flag.swap(true, Ordering::Acquire) {
            hint::spin_loop();
        }
        self.claim_ownership(token);
        self.guard()
    }

    /// Non-blocking mirror of `lock`
    #[inline]
    pub fn try_lock(&self) -> Option<SpinRecursiveMutexGuard<'_>> {
        let token = current_thread_token();
        if self.state.owner.load(Ordering::Acquire) == token {
            self.state.count.fetch_add(1, Ordering::Relaxed);
            return Some(self.guard());
        }

        if self.flag.swap(true, Ordering::Acquire) {
            return None;
        }
        self.claim_ownership(token);
        Some(self.guard())
    }

    /// Advisory probe; the answer can be stale the instant it returns
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Record first-acquisition ownership. Caller must hold the flag.
    fn claim_ownership(&self, token: usize) {
        let _claim = self.claim.lock();
        debug_assert_eq!(self.state.count.load(Ordering::Relaxed), 0);
        self.state.owner.store(token, Ordering::Release);
        self.state.count.store(1, Ordering::Relaxed);
    }

    fn guard(&self) -> SpinRecursiveMutexGuard<'_> {
        SpinRecursiveMutexGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }
}

impl Default for SpinRecursiveMutex {
    fn default() -> Self {
        Self::new()
    }
}

/// One hold on a [`SpinRecursiveMutex`]; dropping it decrements the
/// count and releases the lock when the count reaches zero
#[must_use = "the hold is released immediately if the guard is dropped"]
#[derive(Debug)]
pub struct SpinRecursiveMutexGuard<'a> {
    lock: &'a SpinRecursiveMutex,
    // Ownership is per-thread; the guard must be dropped where it was taken
    _not_send: PhantomData<*const ()>,
}

impl Drop for SpinRecursiveMutexGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        let state = &self.lock.state;
        debug_assert_eq!(state.owner.load(Ordering::Relaxed), current_thread_token());
        if state.count.fetch_sub(1, Ordering::Relaxed) == 1 {
            state.owner.store(0, Ordering::Relaxed);
            self.lock.flag.store(false, Ordering::Release);
        }
    }
}
