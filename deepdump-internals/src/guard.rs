//! Guarded invocation of code that may panic.
//!
//! Custom textual representations are arbitrary user code. The renderer runs
//! them through [`call_guarded`] so that a panic becomes a value it can print
//! instead of unwinding into the caller that asked for a diagnostic.

use alloc::{borrow::Cow, string::String};
use core::{any::Any, fmt};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A panic caught by [`call_guarded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Panicked {
    /// The panic payload rendered as text.
    message: Cow<'static, str>,
}

impl Panicked {
    /// Extracts a message from a panic payload.
    ///
    /// Payloads raised by `panic!` are `&'static str` or `String`; anything
    /// else gets a placeholder, as the standard panic hook does.
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            Cow::Borrowed(*message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Cow::Owned(message.clone())
        } else {
            Cow::Borrowed("Box<dyn Any>")
        };
        Self { message }
    }

    /// Returns the panic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for Panicked {}

/// Runs `f`, converting a panic into [`Panicked`].
///
/// `f` is treated as unwind safe: callers only hand in closures that produce
/// a fresh value and observe shared state through shared references.
pub fn call_guarded<R>(f: impl FnOnce() -> R) -> Result<R, Panicked> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Panicked::from_payload(&*payload))
}
