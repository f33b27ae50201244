/*!
 * Spin Mutex
 * Exclusive, non-reentrant busy-spin lock over one atomic flag
 */

use crate::cache::CachePadded;
use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lightweight mutex that spins in active-CPU-land instead of yielding
/// context. Target use is code regions that are not highly contended,
/// or contended regions that execute fast.
///
/// Not reentrant: a second `lock` from the owning thread deadlocks.
///
/// # Performance
///
/// The flag lives on its own cache line so contending threads never
/// false-share it with neighboring state.
///
/// # Example
///
/// ```
/// use spinsync::SpinMutex;
///
/// let mutex = SpinMutex::new();
/// {
///     let _guard = mutex.lock();
///     // critical section
/// }
/// assert!(!mutex.is_locked());
/// ```
#[derive(Debug)]
pub struct SpinMutex {
    flag: CachePadded<AtomicBool>,
}

impl SpinMutex {
    /// Create an unlocked mutex
    #[inline]
    pub const fn new() -> Self {
        Self {
            flag: CachePadded::new(AtomicBool::new(false)),
        }
    }

    /// Acquire, spinning until the flag transitions free-to-held for
    /// this caller. The winning exchange is the acquire edge.
    #[inline]
    pub fn lock(&self) -> SpinMutexGuard<'_> {
        while self.flag.swap(true, Ordering::Acquire) {
            hint::spin_loop();
        }
        SpinMutexGuard { flag: &self.flag }
    }

    /// Single acquisition attempt; never blocks
    #[inline]
    pub fn try_lock(&self) -> Option<SpinMutexGuard<'_>> {
        if self.flag.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(SpinMutexGuard { flag: &self.flag })
        }
    }

    /// Advisory probe; the answer can be stale the instant it returns
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Default for SpinMutex {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the [`SpinMutex`] on drop (the release edge)
#[must_use = "the mutex unlocks immediately if the guard is dropped"]
#[derive(Debug)]
pub struct SpinMutexGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SpinMutexGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
