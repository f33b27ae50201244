/*!
 * Concurrent Stream
 * Single-producer/single-consumer FIFO with lock-free hand-off
 */

use super::node::Node;
use crate::backoff::{SpinPolicy, Spinner};
use crate::cache::CachePadded;
use crate::error::PushError;
use log::trace;
use std::cell::UnsafeCell;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Create a connected producer/consumer pair over one empty stream.
///
/// With exactly one pushing handle and one popping handle there is
/// nothing to lock: the producer only ever writes the tail node's
/// `next` and advances the tail, the consumer only ever reads the head
/// node's `next` and advances the head. Correctness rests on `next`
/// being published with release ordering and observed with acquire
/// ordering, so the consumer never sees a node before it is fully
/// built. Neither handle can be cloned, which is what pins the
/// single-producer/single-consumer contract at compile time.
///
/// # Example
///
/// ```
/// use std::thread;
///
/// let (mut producer, mut consumer) = spinsync::stream();
/// let worker = thread::spawn(move || {
///     for value in 0..100 {
///         producer.push(value).unwrap();
///     }
/// });
/// for expected in 0..100 {
///     assert_eq!(consumer.pop_wait(), expected);
/// }
/// worker.join().unwrap();
/// ```
pub fn stream<T>() -> (StreamProducer<T>, StreamConsumer<T>) {
    stream_with_policy(SpinPolicy::spin())
}

/// [`stream`], with `policy` driving the consumer's blocking pop
pub fn stream_with_policy<T>(policy: SpinPolicy) -> (StreamProducer<T>, StreamConsumer<T>) {
    let sentinel = Node::sentinel();
    let inner = Arc::new(StreamInner {
        head: CachePadded::new(UnsafeCell::new(sentinel)),
        tail: CachePadded::new(UnsafeCell::new(sentinel)),
        len: CachePadded::new(AtomicUsize::new(0)),
        policy,
    });
    (
        StreamProducer {
            inner: Arc::clone(&inner),
        },
        StreamConsumer { inner },
    )
}

struct StreamInner<T> {
    /// Current sentinel; consumer side only
    head: CachePadded<UnsafeCell<NonNull<Node<T>>>>,
    /// Last node in the chain; producer side only
    tail: CachePadded<UnsafeCell<NonNull<Node<T>>>>,
    /// Element count, mutated without locking: each end has exactly one
    /// writer
    len: CachePadded<AtomicUsize>,
    policy: SpinPolicy,
}

// SAFETY: head is only touched through the single StreamConsumer, tail
// only through the single StreamProducer; the handles cannot be cloned
// and their mutating methods take &mut self. Cross-thread hand-off goes
// through the release/acquire `next` link.
unsafe impl<T: Send> Send for StreamInner<T> {}
unsafe impl<T: Send> Sync for StreamInner<T> {}

impl<T> Drop for StreamInner<T> {
    fn drop(&mut self) {
        // Runs once both handles are gone; the chain is exclusively
        // owned here.
        let dropped = unsafe { Node::drain_chain(*self.head.get()) };
        if dropped > 0 {
            trace!("stream dropped with {dropped} elements still enqueued");
        }
    }
}

/// Pushing half of a [`stream`]; exactly one exists per stream
pub struct StreamProducer<T> {
    inner: Arc<StreamInner<T>>,
}

impl<T> StreamProducer<T> {
    /// Append a value. Allocation failure hands the value back instead
    /// of dropping it.
    pub fn push(&mut self, value: T) -> Result<(), PushError<T>> {
        let node = Node::try_alloc(value).map_err(PushError)?;

        // Count before publishing: the length may transiently
        // over-report during a push, but never under-report.
        self.inner.len.fetch_add(1, Ordering::Relaxed);

        // SAFETY: tail belongs to this handle alone; the release store
        // publishes the fully built node to the consumer.
        unsafe {
            let tail = *self.inner.tail.get();
            (*tail.as_ptr()).next.store(node.as_ptr(), Ordering::Release);
            *self.inner.tail.get() = node;
        }
        Ok(())
    }

    /// Advisory element count; may be stale under concurrent popping
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len.load(Ordering::Relaxed)
    }

    /// Advisory emptiness probe
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for StreamProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamProducer")
            .field("len", &self.len())
            .finish()
    }
}

/// Popping half of a [`stream`]; exactly one exists per stream
pub struct StreamConsumer<T> {
    inner: Arc<StreamInner<T>>,
}

impl<T> StreamConsumer<T> {
    /// Remove and return the oldest element, or `None` when the stream
    /// is currently empty. Never blocks.
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: head belongs to this handle alone. The acquire load
        // pairs with the producer's release store, and once head moves
        // past the old sentinel no other thread can reach it.
        unsafe {
            let sentinel = *self.inner.head.get();
            let next = NonNull::new((*sentinel.as_ptr()).next.load(Ordering::Acquire))?;

            let value = (*next.as_ptr()).value.take();
            debug_assert!(value.is_some());
            *self.inner.head.get() = next; // `next` is the new sentinel
            Node::dealloc(sentinel);
            self.inner.len.fetch_sub(1, Ordering::Relaxed);
            value
        }
    }

    /// Remove and return the oldest element, spinning per the stream's
    /// policy until the producer supplies one
    pub fn pop_wait(&mut self) -> T {
        let mut spinner = Spinner::new(self.inner.policy);
        loop {
            if let Some(value) = self.pop() {
                return value;
            }
            spinner.snooze();
        }
    }

    /// Copy of the oldest element without removing it
    pub fn front(&self) -> Option<T>
    where
        T: Clone,
    {
        // SAFETY: head is stable (only this handle moves it, and `front`
        // holds it shared); the node is read, not unlinked.
        unsafe {
            let sentinel = *self.inner.head.get();
            let next = NonNull::new((*sentinel.as_ptr()).next.load(Ordering::Acquire))?;
            (*next.as_ptr()).value.clone()
        }
    }

    /// Drain every element currently in the stream. The sentinel stays;
    /// the stream remains usable afterwards.
    pub fn clear(&mut self) {
        let mut drained = 0usize;
        while self.pop().is_some() {
            drained += 1;
        }
        if drained > 0 {
            trace!("stream cleared, {drained} elements dropped");
        }
    }

    /// Advisory element count; may be stale under concurrent pushing
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len.load(Ordering::Relaxed)
    }

    /// Advisory emptiness probe
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for StreamConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConsumer")
            .field("len", &self.len())
            .finish()
    }
}
