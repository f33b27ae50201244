/*!
 * Mutex Integration Tests
 * Mutual exclusion, non-blocking attempts, and recursive ownership
 */

use pretty_assertions::assert_eq;
use serial_test::serial;
use spinsync::{SpinMutex, SpinRecursiveMutex, SpinYieldMutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Occupancy probe: counts threads inside a critical section and
/// remembers whether two were ever inside at once.
#[derive(Default)]
struct Occupancy {
    inside: AtomicUsize,
    violated: AtomicBool,
}

impl Occupancy {
    fn enter(&self) {
        if self.inside.fetch_add(1, Ordering::SeqCst) != 0 {
            self.violated.store(true, Ordering::SeqCst);
        }
    }

    fn exit(&self) {
        self.inside.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
#[serial]
fn spin_mutex_is_mutually_exclusive() {
    let mutex = Arc::new(SpinMutex::new());
    let occupancy = Arc::new(Occupancy::default());
    let total = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mutex = Arc::clone(&mutex);
            let occupancy = Arc::clone(&occupancy);
            let total = Arc::clone(&total);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    let _guard = mutex.lock();
                    occupancy.enter();
                    total.fetch_add(1, Ordering::Relaxed);
                    occupancy.exit();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!occupancy.violated.load(Ordering::SeqCst));
    assert_eq!(total.load(Ordering::Relaxed), 40_000);
}

#[test]
#[serial]
fn yield_mutex_is_mutually_exclusive() {
    let mutex = Arc::new(SpinYieldMutex::with_yield_threshold(4));
    let occupancy = Arc::new(Occupancy::default());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mutex = Arc::clone(&mutex);
            let occupancy = Arc::clone(&occupancy);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    let _guard = mutex.lock();
                    occupancy.enter();
                    occupancy.exit();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!occupancy.violated.load(Ordering::SeqCst));
}

#[test]
fn try_lock_does_not_block() {
    let mutex = Arc::new(SpinMutex::new());
    let guard = mutex.lock();

    let mutex_clone = Arc::clone(&mutex);
    let handle = thread::spawn(move || mutex_clone.try_lock().is_some());
    assert!(!handle.join().unwrap());

    drop(guard);
    let mutex_clone = Arc::clone(&mutex);
    let handle = thread::spawn(move || mutex_clone.try_lock().is_some());
    assert!(handle.join().unwrap());
}

#[test]
fn recursive_mutex_allows_reentry() {
    let mutex = Arc::new(SpinRecursiveMutex::new());

    let outer = mutex.lock();
    let inner = mutex.lock();

    // A second thread cannot get in while this thread holds twice
    let mutex_clone = Arc::clone(&mutex);
    let handle = thread::spawn(move || mutex_clone.try_lock().is_some());
    assert!(!handle.join().unwrap());

    // One unlock is not enough: the first lock still holds
    drop(inner);
    let mutex_clone = Arc::clone(&mutex);
    let handle = thread::spawn(move || mutex_clone.try_lock().is_some());
    assert!(!handle.join().unwrap());

    // The matching final unlock releases the lock for other threads
    drop(outer);
    let mutex_clone = Arc::clone(&mutex);
    let handle = thread::spawn(move || mutex_clone.try_lock().is_some());
    assert!(handle.join().unwrap());
}

#[test]
#[serial]
fn recursive_mutex_excludes_other_threads() {
    let mutex = Arc::new(SpinRecursiveMutex::new());
    let occupancy = Arc::new(Occupancy::default());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mutex = Arc::clone(&mutex);
            let occupancy = Arc::clone(&occupancy);
            thread::spawn(move || {
                for _ in 0..5_000 {
                    let outer = mutex.lock();
                    let inner = mutex.lock();
                    occupancy.enter();
                    occupancy.exit();
                    drop(inner);
                    drop(outer);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!occupancy.violated.load(Ordering::SeqCst));
}

#[test]
fn contended_lock_hands_over() {
    let mutex = Arc::new(SpinYieldMutex::new());
    let guard = mutex.lock();

    let mutex_clone = Arc::clone(&mutex);
    let acquired = Arc::new(AtomicBool::new(false));
    let acquired_clone = Arc::clone(&acquired);
    let handle = thread::spawn(move || {
        let _guard = mutex_clone.lock();
        acquired_clone.store(true, Ordering::SeqCst);
    });

    // Give the contender time to start spinning
    thread::sleep(Duration::from_millis(50));
    assert!(!acquired.load(Ordering::SeqCst));

    drop(guard);
    handle.join().unwrap();
    assert!(acquired.load(Ordering::SeqCst));
}
