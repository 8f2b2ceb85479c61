//! Capability-carrying handles to values.
//!
//! This module encapsulates the `flag` field of [`RawHandle`], ensuring it is
//! only visible within this module. Code elsewhere can inspect the
//! capabilities of a handle but has no safe way to raise them: a handle
//! derived from a read-only or non-addressable parent stays that way. The one
//! sanctioned escalation path is [`crate::widen`].
//!
//! # Capabilities
//!
//! - **Valid**: the handle refers to a value. The invalid handle refers to
//!   nothing and renders as a sentinel.
//! - **Addressable**: the value lives at a stable location reached through a
//!   pointer or a slice, so a pointer to it may be derived. Methods with a
//!   pointer receiver require this.
//! - **Read-only**: the value was reached through a field its owner did not
//!   export. Its structure may be inspected with [`RawHandle::peek`], but
//!   [`RawHandle::get`] withholds it, so no method can be invoked on it.
//!
//! # Layout
//!
//! [`RawHandle`] is `#[repr(C)]` with the control word first. The widener
//! depends on that; [`crate::widen::layout`] verifies it once per process.

use core::fmt;

/// Set on every handle that refers to a value.
const FLAG_VALID: usize = 1 << 0;
/// Set when a pointer to the value may be derived.
const FLAG_ADDRESSABLE: usize = 1 << 1;
/// Set when the value was reached through an unexported field.
const FLAG_READ_ONLY: usize = 1 << 2;

/// How a child handle was reached from its parent.
///
/// The derivation decides which capabilities the child inherits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Derivation {
    /// A named or positional struct field.
    Field {
        /// Whether the field is visible outside its defining crate.
        exported: bool,
    },
    /// An element of a growable or borrowed sequence. Always addressable.
    SliceElement,
    /// An element of a fixed-size array. Addressable only if the array is.
    ArrayElement,
    /// A key or value of a map. Never addressable.
    MapEntry,
    /// The target of a pointer. Always addressable.
    PointerTarget,
    /// The concrete value inside a polymorphic box. Never addressable.
    InterfaceElement,
}

/// A reference to a value together with the capabilities granted on it.
///
/// The empty (invalid) handle is created with [`RawHandle::invalid`].
#[repr(C)]
pub struct RawHandle<'a, T: ?Sized> {
    /// Control word holding the capability bits.
    ///
    /// # Layout
    ///
    /// This field must stay first in this `#[repr(C)]` struct, with the type
    /// `usize`. The widener writes it through a raw pointer.
    flag: usize,

    /// The referenced value, or `None` for the invalid handle.
    target: Option<&'a T>,
}

impl<T: ?Sized> Clone for RawHandle<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for RawHandle<'_, T> {}

impl<'a, T: ?Sized> RawHandle<'a, T> {
    /// Creates a readable, non-addressable handle to `value`.
    ///
    /// This is the handle a value passed directly to the renderer gets: it
    /// was copied or borrowed in, so no stable pointer to it is implied.
    #[inline]
    pub const fn new(value: &'a T) -> Self {
        Self {
            flag: FLAG_VALID,
            target: Some(value),
        }
    }

    /// Creates the invalid handle, which refers to nothing.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            flag: 0,
            target: None,
        }
    }

    /// Creates a handle to `value`, reached from `self` via `derivation`.
    ///
    /// Read-only status is always inherited, and is added for unexported
    /// fields. Addressability depends on the derivation.
    #[inline]
    pub fn child<U: ?Sized>(self, value: &'a U, derivation: Derivation) -> RawHandle<'a, U> {
        let inherited_read_only = self.flag & FLAG_READ_ONLY;
        let inherited_addressable = self.flag & FLAG_ADDRESSABLE;

        let flag = FLAG_VALID
            | inherited_read_only
            | match derivation {
                Derivation::Field { exported: true } => inherited_addressable,
                Derivation::Field { exported: false } => inherited_addressable | FLAG_READ_ONLY,
                Derivation::ArrayElement => inherited_addressable,
                Derivation::SliceElement | Derivation::PointerTarget => FLAG_ADDRESSABLE,
                Derivation::MapEntry | Derivation::InterfaceElement => 0,
            };

        RawHandle {
            flag,
            target: Some(value),
        }
    }

    /// Returns whether the handle refers to a value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.flag & FLAG_VALID != 0 && self.target.is_some()
    }

    /// Returns whether a pointer to the value may be derived.
    #[inline]
    pub fn is_addressable(&self) -> bool {
        self.flag & FLAG_ADDRESSABLE != 0
    }

    /// Returns whether the value was reached through an unexported field.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flag & FLAG_READ_ONLY != 0
    }

    /// Returns whether methods may be invoked on the value.
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.is_valid() && !self.is_read_only()
    }

    /// Returns the value for structural inspection, regardless of
    /// capabilities.
    #[inline]
    pub fn peek(&self) -> Option<&'a T> {
        self.target
    }

    /// Returns the value for method invocation.
    ///
    /// This is `None` unless the handle [is readable](Self::is_readable).
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        if self.is_readable() {
            self.target
        } else {
            None
        }
    }

    /// Returns the address of the value, or 0 for the invalid handle.
    #[inline]
    pub fn address(&self) -> usize {
        self.target
            .map_or(0, |target| core::ptr::from_ref(target).cast::<()>().addr())
    }

    /// Returns the raw control word.
    ///
    /// Only the layout self-check needs this, to compare it with the word it
    /// reads through the raw path.
    #[inline]
    pub(crate) fn flag_bits(&self) -> usize {
        self.flag
    }
}

impl<T: ?Sized> fmt::Debug for RawHandle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHandle")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("valid", &self.is_valid())
            .field("addressable", &self.is_addressable())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
