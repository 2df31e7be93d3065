//! Fan-out/fan-in completion barrier.
//!
//! A [CompletionBarrier] is armed with a number of outstanding operations.
//! Each successful operation calls [signal](CompletionBarrier::signal); the
//! signal that brings the count to zero runs the completion callback,
//! synchronously and exactly once.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Counter of outstanding operations with a single-fire completion callback.
///
/// # Invariants
/// - The pending count never goes below zero; signalling more often than
///   armed panics.
/// - The callback runs at most once and a fired barrier never un-fires.
pub struct CompletionBarrier {
    pending: AtomicUsize,
    on_complete: Mutex<Option<Callback>>,
}

impl fmt::Debug for CompletionBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionBarrier")
            .field("pending", &self.pending())
            .finish()
    }
}

impl CompletionBarrier {
    /// Arms a barrier with `pending` outstanding operations.
    ///
    /// If `pending` is zero, `on_complete` runs before this returns.
    pub fn new<F>(pending: usize, on_complete: F) -> Arc<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let barrier = Arc::new(Self {
            pending: AtomicUsize::new(pending),
            on_complete: Mutex::new(Some(Box::new(on_complete))),
        });

        if pending == 0 {
            barrier.fire();
        }

        barrier
    }

    /// Marks one operation as done.
    ///
    /// # Returns
    /// `true` if this signal brought the count to zero and ran the callback.
    ///
    /// # Panics
    /// Panics if the barrier has no outstanding operations left.
    pub fn signal(&self) -> bool {
        // Decrement and test in one step, so exactly one signal sees 1 -> 0
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| p.checked_sub(1));

        match previous {
            Err(_) => panic!("completion barrier signalled more often than armed"),
            Ok(1) => {
                self.fire();
                true
            }
            Ok(_) => false,
        }
    }

    /// Returns the number of outstanding operations.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns `true` once all operations are done.
    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    fn fire(&self) {
        let callback = self
            .on_complete
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(callback) = callback {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn counting_barrier(pending: usize) -> (Arc<CompletionBarrier>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let barrier = CompletionBarrier::new(pending, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (barrier, fired)
    }

    #[test]
    fn test_fires_on_last_signal() {
        let (barrier, fired) = counting_barrier(3);
        assert!(!barrier.signal());
        assert!(!barrier.signal());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(barrier.pending(), 1);

        assert!(barrier.signal());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_zero_pending_fires_immediately() {
        let (barrier, fired) = counting_barrier(0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_callback_runs_inside_signal() {
        let flag = Arc::new(AtomicBool::new(false));
        let inner = Arc::clone(&flag);
        let barrier = CompletionBarrier::new(1, move || inner.store(true, Ordering::SeqCst));

        barrier.signal();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    #[should_panic]
    fn test_over_signal_panics() {
        let (barrier, _) = counting_barrier(1);
        barrier.signal();
        barrier.signal();
    }

    #[test]
    fn test_fires_exactly_once_across_threads() {
        let signals = 64;
        let (barrier, fired) = counting_barrier(signals);

        let handles: Vec<_> = (0..signals)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || barrier.signal())
            })
            .collect();
        let firing_signals = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&fired_here| fired_here)
            .count();

        assert_eq!(firing_signals, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
