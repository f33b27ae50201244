/*!
 * Concurrent Queue
 * Unbounded MPMC FIFO over the node list, two-lock discipline
 */

use super::node::Node;
use crate::backoff::{SpinPolicy, Spinner};
use crate::cache::CachePadded;
use crate::error::PushError;
use crate::mutex::SpinMutex;
use log::trace;
use std::cell::UnsafeCell;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Unbounded multi-producer/multi-consumer FIFO.
///
/// The two ends are guarded by independent spin mutexes, so one
/// producer and one consumer can proceed concurrently without touching
/// the same lock; multiple producers serialize against each other, and
/// likewise multiple consumers. The list always keeps a sentinel node
/// at the head; `head.next` is the logical first element.
///
/// Dropping the queue while another thread is still pushing or popping
/// is not supported; quiesce it first.
///
/// # Example
///
/// ```
/// use spinsync::ConcurrentQueue;
///
/// let queue = ConcurrentQueue::new();
/// queue.push(1).unwrap();
/// queue.push(2).unwrap();
/// assert_eq!(queue.pop(), Some(1));
/// assert_eq!(queue.pop(), Some(2));
/// assert_eq!(queue.pop(), None);
/// ```
pub struct ConcurrentQueue<T> {
    /// Sentinel node; pop side only
    head: CachePadded<UnsafeCell<NonNull<Node<T>>>>,
    /// Last node in the chain; push side only
    tail: CachePadded<UnsafeCell<NonNull<Node<T>>>>,
    push_lock: SpinMutex,
    pop_lock: SpinMutex,
    /// Element count; advisory for lock-free readers
    len: CachePadded<AtomicUsize>,
    policy: SpinPolicy,
}

// SAFETY: the head/tail cells are only dereferenced under their
// respective mutexes, and a node handed out by pop is exclusively owned
// by the popping thread.
unsafe impl<T: Send> Send for ConcurrentQueue<T> {}
unsafe impl<T: Send> Sync for ConcurrentQueue<T> {}

impl<T> ConcurrentQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::with_policy(SpinPolicy::spin())
    }

    /// Create an empty queue whose blocking operations use `policy`
    pub fn with_policy(policy: SpinPolicy) -> Self {
        let sentinel = Node::sentinel();
        Self {
            head: CachePadded::new(UnsafeCell::new(sentinel)),
            tail: CachePadded::new(UnsafeCell::new(sentinel)),
            push_lock: SpinMutex::new(),
            pop_lock: SpinMutex::new(),
            len: CachePadded::new(AtomicUsize::new(0)),
            policy,
        }
    }

    /// Append a value. The node is allocated outside the critical
    /// section; allocation failure hands the value back instead of
    /// dropping it.
    pub fn push(&self, value: T) -> Result<(), PushError<T>> {
        let node = Node::try_alloc(value).map_err(PushError)?;

        let _guard = self.push_lock.lock();
        // SAFETY: tail is only dereferenced/updated under push_lock; the
        // release store publishes the fully built node to the pop side.
        unsafe {
            let tail = *self.tail.get();
            (*tail.as_ptr()).next.store(node.as_ptr(), Ordering::Release);
            *self.tail.get() = node;
        }
        self.len.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Remove and return the oldest element, or `None` when the queue
    /// is empty. Never blocks on emptiness.
    pub fn pop(&self) -> Option<T> {
        let _guard = self.pop_lock.lock();
        // SAFETY: head is only dereferenced/updated under pop_lock. Once
        // head moves past the old sentinel, no other thread can reach
        // it, so freeing it here is the single point of destruction.
        unsafe {
            let sentinel = *self.head.get();
            let next = NonNull::new((*sentinel.as_ptr()).next.load(Ordering::Acquire))?;

            let value = (*next.as_ptr()).value.take();
            debug_assert!(value.is_some());
            *self.head.get() = next; // `next` is the new sentinel
            Node::dealloc(sentinel);
            self.len.fetch_sub(1, Ordering::Relaxed);
            value
        }
    }

    /// Remove and return the oldest element, spinning per the queue's
    /// policy until one arrives
    pub fn pop_wait(&self) -> T {
        let mut spinner = Spinner::new(self.policy);
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
        let _guard = self.pop_lock.lock();
        // SAFETY: head is stable under pop_lock; the node is read, not
        // unlinked.
        unsafe {
            let sentinel = *self.head.get();
            let next = NonNull::new((*sentinel.as_ptr()).next.load(Ordering::Acquire))?;
            (*next.as_ptr()).value.clone()
        }
    }

    /// Drain every element currently in the queue
    pub fn clear(&self) {
        let mut drained = 0usize;
        while self.pop().is_some() {
            drained += 1;
        }
        if drained > 0 {
            trace!("queue cleared, {drained} elements dropped");
        }
    }

    /// Advisory element count; may be stale under concurrent mutation
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Advisory emptiness probe
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ConcurrentQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentQueue")
            .field("len", &self.len())
            .finish()
    }
}

impl<T> Drop for ConcurrentQueue<T> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` proves no other thread can reach the list;
        // every node from the sentinel onward is owned here exactly once.
        let dropped = unsafe { Node::drain_chain(*self.head.get()) };
        if dropped > 0 {
            trace!("queue dropped with {dropped} elements still enqueued");
        }
    }
}
