/*!
 * spinsync
 * Spin-based synchronization primitives: cache-line aware mutexes,
 * reusable thread barriers, and unbounded FIFO containers for
 * concurrent producers and consumers.
 *
 * # Architecture
 *
 * Every primitive waits by busy-spinning (optionally yielding its
 * timeslice); none of them sleep or park. The mutex family is built on
 * a single padded atomic flag, the barriers on a padded arrival
 * counter, and the containers on a sentinel-headed linked list whose
 * hot ends live on separate cache lines.
 *
 * # Performance
 *
 * - Cache-line aligned state to prevent false sharing
 * - Acquire/release orderings only where the contracts require them
 * - No allocation on any lock or barrier path; containers allocate one
 *   node per element, outside their critical sections
 */

pub mod backoff;
pub mod barrier;
pub mod cache;
pub mod error;
pub mod mutex;
pub mod queue;

// Re-exports
pub use backoff::SpinPolicy;
pub use barrier::{CyclicSpinBarrier, SpinBarrier};
pub use cache::{CachePadded, CACHE_LINE_SIZE};
pub use error::PushError;
pub use mutex::{
    SpinMutex, SpinMutexGuard, SpinRecursiveMutex, SpinRecursiveMutexGuard, SpinRwMutex,
    SpinRwReadGuard, SpinRwWriteGuard, SpinYieldMutex, SpinYieldMutexGuard,
};
pub use queue::{stream, stream_with_policy, ConcurrentQueue, StreamConsumer, StreamProducer};
