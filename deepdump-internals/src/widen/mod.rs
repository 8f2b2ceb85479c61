//! The access widener.
//!
//! Widening turns a handle that may only be inspected structurally into one
//! that also permits method invocation and pointer derivation. The referenced
//! value is never touched; only the capabilities of the returned handle
//! change.
//!
//! Two backends implement [`Widener`]:
//!
//! - [`LayoutWidener`] (feature `widen`, the default) writes the control word
//!   of a copied handle through a raw pointer. Before its first write it runs
//!   the one-shot [`layout`] self-check, which aborts the process on mismatch.
//! - [`SafeWidener`] never widens and reports [`Unavailable`].
//!
//! [`widen`] and [`is_available`] dispatch to the backend selected at build
//! time, [`DefaultWidener`].

pub mod layout;

use core::fmt;

use crate::handle::RawHandle;

/// Reported by a backend that cannot widen handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unavailable;

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("access widening is not available in this build")
    }
}

impl core::error::Error for Unavailable {}

/// A mechanism that escalates the capabilities of a [`RawHandle`].
pub trait Widener {
    /// Whether this backend can widen at all.
    const AVAILABLE: bool;

    /// Returns a readable, addressable handle to the same value.
    ///
    /// A handle that is already readable and addressable is returned
    /// unchanged, as is the invalid handle. Otherwise backends that cannot
    /// widen return [`Unavailable`].
    fn widen<'a, T: ?Sized>(handle: RawHandle<'a, T>) -> Result<RawHandle<'a, T>, Unavailable>;
}

/// Returns whether `handle` needs no widening.
#[inline]
fn is_wide<T: ?Sized>(handle: &RawHandle<'_, T>) -> bool {
    !handle.is_valid() || (handle.is_readable() && handle.is_addressable())
}

/// The capable backend: raises capabilities through a verified raw write.
#[cfg(feature = "widen")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutWidener;

#[cfg(feature = "widen")]
impl Widener for LayoutWidener {
    const AVAILABLE: bool = true;

    fn widen<'a, T: ?Sized>(handle: RawHandle<'a, T>) -> Result<RawHandle<'a, T>, Unavailable> {
        if is_wide(&handle) {
            return Ok(handle);
        }

        layout::ensure_verified();

        let mut widened = handle;
        let control = layout::control_word_mut(&mut widened);
        // SAFETY:
        // 1. `control` points into `widened`, a live local that we borrow mutably
        //    for the duration of this block only.
        // 2. `layout::ensure_verified` has confirmed that a `usize` control word
        //    lives at `layout::FLAG_OFFSET`, so the pointer is in bounds,
        //    aligned and initialized.
        let bits = unsafe { control.read() };
        let bits = (bits & !layout::READ_ONLY) | layout::ADDRESSABLE;
        // SAFETY: Same pointer as above. Any `usize` is a valid control word,
        // and `widened` is a copy, so the caller's handle is unaffected.
        unsafe { control.write(bits) };

        Ok(widened)
    }
}

/// The safe backend: never widens.
#[derive(Clone, Copy, Debug, Default)]
pub struct SafeWidener;

impl Widener for SafeWidener {
    const AVAILABLE: bool = false;

    fn widen<'a, T: ?Sized>(handle: RawHandle<'a, T>) -> Result<RawHandle<'a, T>, Unavailable> {
        if is_wide(&handle) {
            Ok(handle)
        } else {
            Err(Unavailable)
        }
    }
}

/// The backend selected at build time.
#[cfg(feature = "widen")]
pub type DefaultWidener = LayoutWidener;

/// The backend selected at build time.
#[cfg(not(feature = "widen"))]
pub type DefaultWidener = SafeWidener;

/// Widens `handle` with the [`DefaultWidener`].
#[inline]
pub fn widen<'a, T: ?Sized>(handle: RawHandle<'a, T>) -> Result<RawHandle<'a, T>, Unavailable> {
    DefaultWidener::widen(handle)
}

/// Returns whether the [`DefaultWidener`] can widen handles.
#[inline]
pub const fn is_available() -> bool {
    <DefaultWidener as Widener>::AVAILABLE
}
