//! A non-reentrant one-shot initializer that works with and without `std`.

#[cfg(feature = "std")]
use std::sync::OnceLock as Inner;

#[cfg(not(feature = "std"))]
use spin::Once as Inner;

/// A value that is computed by the first caller of
/// [`get_or_init`](OneShot::get_or_init) and shared by every caller after it.
#[repr(transparent)]
pub(crate) struct OneShot<T: 'static + Send + Sync>(Inner<T>);

impl<T: 'static + Send + Sync> OneShot<T> {
    /// Creates an uninitialized one-shot.
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(Inner::new())
    }

    /// Returns the value, running `init` first if no caller has done so yet.
    ///
    /// If `init` panics the one-shot stays unusable: later callers panic as
    /// well instead of observing a half-initialized state.
    #[inline]
    pub(crate) fn get_or_init(&'static self, init: impl FnOnce() -> T) -> &'static T {
        #[cfg(feature = "std")]
        let value = self.0.get_or_init(init);

        #[cfg(not(feature = "std"))]
        let value = self.0.call_once(init);

        value
    }

    /// Returns whether the initializer has completed.
    #[inline]
    pub(crate) fn is_completed(&'static self) -> bool {
        #[cfg(feature = "std")]
        let completed = self.0.get().is_some();

        #[cfg(not(feature = "std"))]
        let completed = self.0.is_completed();

        completed
    }
}
