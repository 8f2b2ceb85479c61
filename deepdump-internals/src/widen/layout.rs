//! One-shot structural self-check of the [`RawHandle`] layout.
//!
//! The capable widener writes the control word of a handle through a raw
//! pointer, trusting three hard-coded facts: where the word lives, which bit
//! marks a handle read-only, and which bit marks it addressable. None of
//! these are taken from the handle module; instead the self-check derives
//! them independently from sample handles with known differences:
//!
//! - a handle's word read through the raw path must equal the word reported
//!   by its accessor, which pins down the offset,
//! - an exported and an unexported field of the same struct differ exactly in
//!   the read-only bit,
//! - a value and the same value reached through a pointer differ exactly in
//!   the addressable bit.
//!
//! A mismatch is an integrity violation: [`ensure_verified`] aborts through
//! [`fail_fast!`](crate::fail_fast) before any widening happens.

use core::{fmt, mem};

use crate::{
    handle::{Derivation, RawHandle},
    once::OneShot,
};

/// Byte offset of the control word within a [`RawHandle`].
pub(crate) const FLAG_OFFSET: usize = 0;
/// Control word bit marking a handle read-only.
pub(crate) const READ_ONLY: usize = 1 << 2;
/// Control word bit marking a handle addressable.
pub(crate) const ADDRESSABLE: usize = 1 << 1;

/// The facts the widener relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expectations {
    /// Byte offset of the control word.
    pub offset: usize,
    /// The read-only bit.
    pub read_only: usize,
    /// The addressable bit.
    pub addressable: usize,
}

/// The expectations compiled into the widener.
pub const EXPECTED: Expectations = Expectations {
    offset: FLAG_OFFSET,
    read_only: READ_ONLY,
    addressable: ADDRESSABLE,
};

/// The handle representation does not match what the widener expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMismatch {
    /// The expected offset does not leave room for an aligned `usize` inside
    /// the smallest handle.
    OutOfBounds {
        /// The expected offset.
        offset: usize,
        /// Size of the smallest handle.
        size: usize,
    },
    /// The word read at the expected offset differs from the control word.
    ControlWordOffset {
        /// The expected offset.
        offset: usize,
        /// The control word as reported by the handle.
        expected: usize,
        /// The word found at the offset.
        found: usize,
    },
    /// Exported and unexported sample fields differ in other bits than
    /// expected.
    ReadOnlyBit {
        /// The hard-coded bit.
        expected: usize,
        /// The derived difference.
        found: usize,
    },
    /// Addressable and non-addressable samples differ in other bits than
    /// expected.
    AddressableBit {
        /// The hard-coded bit.
        expected: usize,
        /// The derived difference.
        found: usize,
    },
}

impl fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OutOfBounds { offset, size } => write!(
                f,
                "control word offset {offset} does not fit an aligned usize in a {size}-byte handle"
            ),
            Self::ControlWordOffset {
                offset,
                expected,
                found,
            } => write!(
                f,
                "word at offset {offset} is {found:#x}, but the control word is {expected:#x}"
            ),
            Self::ReadOnlyBit { expected, found } => {
                write!(f, "read-only bit is {found:#x}, expected {expected:#x}")
            }
            Self::AddressableBit { expected, found } => {
                write!(f, "addressable bit is {found:#x}, expected {expected:#x}")
            }
        }
    }
}

impl core::error::Error for LayoutMismatch {}

/// Set once the self-check has passed.
static VERIFIED: OneShot<()> = OneShot::new();

/// Runs the self-check against [`EXPECTED`] exactly once per process.
///
/// # Panics
///
/// Panics (on this and every later call) if the check fails.
pub fn ensure_verified() {
    VERIFIED.get_or_init(|| {
        if let Err(mismatch) = verify() {
            trace_event!(error, %mismatch, "handle layout self-check failed");
            crate::fail_fast!(
                false,
                "handle layout self-check failed, refusing to widen: ",
                mismatch
            );
        }
        trace_event!(debug, "handle layout self-check passed");
    });
}

/// Returns whether the self-check has run and passed.
pub fn is_verified() -> bool {
    VERIFIED.is_completed()
}

/// Checks the handle layout against [`EXPECTED`].
pub fn verify() -> Result<(), LayoutMismatch> {
    check(&EXPECTED)
}

/// Sample struct with one exported and one unexported field.
struct Sample {
    /// Reached with [`Derivation::Field`] `{ exported: true }`.
    exported: u32,
    /// Reached with [`Derivation::Field`] `{ exported: false }`.
    unexported: u32,
}

/// Checks the handle layout against `expected`.
pub fn check(expected: &Expectations) -> Result<(), LayoutMismatch> {
    let size = mem::size_of::<RawHandle<'static, u8>>();
    if expected.offset % mem::align_of::<usize>() != 0
        || expected.offset + mem::size_of::<usize>() > size
    {
        return Err(LayoutMismatch::OutOfBounds {
            offset: expected.offset,
            size,
        });
    }

    let sample = Sample {
        exported: 1,
        unexported: 2,
    };
    let root = RawHandle::new(&sample);
    let target = root.child(&sample, Derivation::PointerTarget);
    let exported = root.child(&sample.exported, Derivation::Field { exported: true });
    let unexported = root.child(&sample.unexported, Derivation::Field { exported: false });
    let unsized_sample = RawHandle::new("sample");

    let words = [
        (control_word(&root, expected.offset), root.flag_bits()),
        (control_word(&target, expected.offset), target.flag_bits()),
        (control_word(&exported, expected.offset), exported.flag_bits()),
        (control_word(&unexported, expected.offset), unexported.flag_bits()),
        (control_word(&unsized_sample, expected.offset), unsized_sample.flag_bits()),
    ];
    if let Some(&(found, word)) = words.iter().find(|(found, word)| found != word) {
        return Err(LayoutMismatch::ControlWordOffset {
            offset: expected.offset,
            expected: word,
            found,
        });
    }

    let read_only = words[2].0 ^ words[3].0;
    if read_only != expected.read_only {
        return Err(LayoutMismatch::ReadOnlyBit {
            expected: expected.read_only,
            found: read_only,
        });
    }

    let addressable = words[0].0 ^ words[1].0;
    if addressable != expected.addressable {
        return Err(LayoutMismatch::AddressableBit {
            expected: expected.addressable,
            found: addressable,
        });
    }

    Ok(())
}

/// Reads the word at `offset` within `handle` through a raw pointer.
///
/// `offset` must have passed the bounds and alignment check in [`check`].
fn control_word<T: ?Sized>(handle: &RawHandle<'_, T>, offset: usize) -> usize {
    let base: *const RawHandle<'_, T> = handle;
    let word = base.cast::<u8>().wrapping_add(offset).cast::<usize>();
    // SAFETY:
    // 1. `check` verified that `offset` is a multiple of the alignment of `usize`,
    //    and a `RawHandle` is at least `usize`-aligned, so `word` is aligned.
    // 2. `check` verified that `offset + size_of::<usize>()` is within the
    //    smallest `RawHandle`, so the read stays inside `*handle`.
    // 3. `RawHandle` is `#[repr(C)]` with a `usize` and a reference, neither of
    //    which has padding, so every byte read is initialized.
    unsafe { word.read() }
}

/// Returns a pointer to the control word of `handle`.
///
/// Dereferencing it is only sound after [`ensure_verified`] has returned.
#[cfg(feature = "widen")]
pub(super) fn control_word_mut<T: ?Sized>(handle: &mut RawHandle<'_, T>) -> *mut usize {
    let base: *mut RawHandle<'_, T> = handle;
    base.cast::<u8>().wrapping_add(FLAG_OFFSET).cast::<usize>()
}
