use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative cancellation; the search polls this on a fixed cadence.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;
}

/// A token that is never cancelled.
pub struct NeverCancel;

impl Cancellable for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellable for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<C: Cancellable + ?Sized> Cancellable for &C {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// An outer token combined with a wall-clock budget.
pub struct Deadline<'a> {
    inner: &'a dyn Cancellable,
    expires: Instant,
}

impl<'a> Deadline<'a> {
    pub fn new(inner: &'a dyn Cancellable, budget: Duration) -> Self {
        Deadline {
            inner,
            expires: Instant::now() + budget,
        }
    }
}

impl Cancellable for Deadline<'_> {
    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled() || Instant::now() >= self.expires
    }
}
