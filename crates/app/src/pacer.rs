//! Bulk send pacing and cancellation.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

/// A source of delays between bulk send iterations.
pub trait Pacer {
    /// Blocks the caller for the given duration.
    fn pause(&mut self, duration: Duration);
}

impl<T: ?Sized + Pacer> Pacer for &mut T {
    fn pause(&mut self, duration: Duration) {
        T::pause(self, duration);
    }
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A cooperative cancellation flag checked at each bulk send iteration.
///
/// Clones share the same flag, so it can be raised from another thread.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_thread_pacer_sleeps() {
        let started = Instant::now();
        ThreadPacer.pause(Duration::from_millis(20));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::default();
        let remote = token.clone();
        assert!(!token.is_cancelled());

        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());

        token.reset();
        assert!(!token.is_cancelled());
    }
}
