/*!
 * Reader/Writer Spin Mutex
 * Multiple readers or one writer, writer-preferring
 */

use crate::backoff::{SpinPolicy, Spinner};
use crate::cache::CachePadded;
use crate::mutex::{SpinMutex, SpinMutexGuard};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Busy-spin lock supporting any number of concurrent readers or a
/// single writer.
///
/// The protocol is serialized by an internal `order` mutex. A reader
/// registers by briefly passing through the `writer` mutex and bumping
/// the reader count. A writer takes the `writer` mutex and then drains:
/// it keeps holding the `order` mutex while it spins for the reader
/// count to reach zero, which is what stops any *new* reader from
/// registering (writer preference); readers already inside finish
/// normally.
///
/// Reads and writes produce distinct guard types, so a hold is always
/// released in the mode it was acquired.
///
/// # Example
///
/// ```
/// use spinsync::SpinRwMutex;
///
/// let rw = SpinRwMutex::new();
/// {
///     let r1 = rw.read();
///     let r2 = rw.read(); // readers share
///     assert_eq!(rw.reader_count(), 2);
///     drop((r1, r2));
/// }
/// let _w = rw.write(); // exclusive
/// ```
#[derive(Debug)]
pub struct SpinRwMutex {
    /// Number of readers currently inside
    readers: CachePadded<AtomicUsize>,
    /// Serializes the lock protocol itself
    order: SpinMutex,
    /// Held by the active writer; readers pass through it while registering
    writer: SpinMutex,
    policy: SpinPolicy,
}

impl SpinRwMutex {
    /// Create an unlocked mutex that drains readers with pure spinning
    #[inline]
    pub const fn new() -> Self {
        Self::with_policy(SpinPolicy::spin())
    }

    /// Create an unlocked mutex with the given drain backoff
    #[inline]
    pub const fn with_policy(policy: SpinPolicy) -> Self {
        Self {
            readers: CachePadded::new(AtomicUsize::new(0)),
            order: SpinMutex::new(),
            writer: SpinMutex::new(),
            policy,
        }
    }

    /// Acquire shared access. Blocks while a writer holds the lock or is
    /// draining readers.
    #[inline]
    pub fn read(&self) -> SpinRwReadGuard<'_> {
        let _order = self.order.lock();
        {
            let _writer = self.writer.lock();
            self.readers.fetch_add(1, Ordering::Acquire);
        }
        SpinRwReadGuard { readers: &self.readers }
    }

    /// Acquire exclusive access. Takes the writer slot, then spins until
    /// every registered reader has left.
    #[inline]
    pub fn write(&self) -> SpinRwWriteGuard<'_> {
        let _order = self.order.lock();
        let writer = self.writer.lock();
        let mut spinner = Spinner::new(self.policy);
        while self.readers.load(Ordering::Acquire) > 0 {
            spinner.snooze();
        }
        // `_order` releases here; new readers now queue on `writer`
        SpinRwWriteGuard { _writer: writer }
    }

    /// Non-blocking `read`
    #[inline]
    pub fn try_read(&self) -> Option<SpinRwReadGuard<'_>> {
        let _order = self.order.try_lock()?;
        let _writer = self.writer.try_lock()?;
        self.readers.fetch_add(1, Ordering::Acquire);
        Some(SpinRwReadGuard { readers: &self.readers })
    }

    /// Non-blocking `write`; fails instead of draining readers
    #[inline]
    pub fn try_write(&self) -> Option<SpinRwWriteGuard<'_>> {
        let _order = self.order.try_lock()?;
        let writer = self.writer.try_lock()?;
        if self.readers.load(Ordering::Acquire) > 0 {
            return None;
        }
        Some(SpinRwWriteGuard { _writer: writer })
    }

    /// Advisory reader count; stale the instant it returns
    #[inline]
    pub fn reader_count(&self) -> usize {
        self.readers.load(Ordering::Relaxed)
    }
}

impl Default for SpinRwMutex {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared hold on a [`SpinRwMutex`]; drop deregisters the reader
#[must_use = "the read hold is released immediately if the guard is dropped"]
#[derive(Debug)]
pub struct SpinRwReadGuard<'a> {
    readers: &'a AtomicUsize,
}

impl Drop for SpinRwReadGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        let previous = self.readers.fetch_sub(1, Ordering::Release);
        debug_assert!(previous > 0);
    }
}

/// Exclusive hold on a [`SpinRwMutex`]; drop releases the writer slot
#[must_use = "the write hold is released immediately if the guard is dropped"]
#[derive(Debug)]
pub struct SpinRwWriteGuard<'a> {
    _writer: SpinMutexGuard<'a>,
}
