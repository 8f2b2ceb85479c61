#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`deepdump`].
//!
//! # Overview
//!
//! This crate contains the low-level pieces that the [`deepdump`] renderer
//! builds on: capability-carrying value handles, the access widener that
//! escalates those capabilities, and the guarded call used to survive panics
//! raised by user formatting code.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`deepdump`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - **[`handle`]**: [`RawHandle`], a reference to a value plus a control word
//!   of capability flags. The control word is private to that module, so the
//!   rest of the program can only *read* capabilities.
//! - **[`widen`]**: the access widener. The capable backend raises the
//!   capabilities of a handle by writing the control word through a raw
//!   pointer at an offset that is verified once per process by
//!   [`widen::layout`]. The safe backend reports [`widen::Unavailable`].
//! - **[`guard`]**: panic-catching invocation of arbitrary code (requires the
//!   `std` feature).
//! - **[`fail_fast!`]**: the startup assertion primitive used by the layout
//!   self-check.
//!
//! # Safety Strategy
//!
//! The widener is the only unsafe code in the workspace. It relies on:
//!
//! - **`#[repr(C)]` layout** of [`RawHandle`], so the control word has a fixed
//!   offset and alignment independent of the referenced type
//! - **A one-shot structural self-check** that derives the offset and the flag bit
//!   positions from handles with known differences and compares them against
//!   the hard-coded expectations before the first write
//! - **Failing fast**: a mismatch aborts with a panic before any widening is
//!   attempted
//!
//! [`deepdump`]: https://docs.rs/deepdump/latest/deepdump/

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod assert;
#[cfg(feature = "std")]
pub mod guard;
pub mod handle;
mod once;
pub mod widen;

pub use handle::{Derivation, RawHandle};
