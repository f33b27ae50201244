/*!
 * Mutex Family
 * Busy-spin mutual exclusion with different fairness/backoff strategies:
 * - SpinMutex: plain exchange lock, lowest latency
 * - SpinYieldMutex: yields the timeslice after bounded failed attempts
 * - SpinRecursiveMutex: reentrant for the owning thread
 * - SpinRwMutex: multiple readers / single writer, writer-preferring
 *
 * All locking is guard-based: dropping the guard is the only unlock
 * path, so double-unlock and unlock-from-non-owner cannot be written.
 */

mod recursive;
mod rwlock;
mod spin;
mod yielding;

pub use recursive::{SpinRecursiveMutex, SpinRecursiveMutexGuard};
pub use rwlock::{SpinRwMutex, SpinRwReadGuard, SpinRwWriteGuard};
pub use spin::{SpinMutex, SpinMutexGuard};
pub use yielding::{SpinYieldMutex, SpinYieldMutexGuard};
