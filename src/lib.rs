#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![forbid(unsafe_code)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A deep, cycle-aware renderer of arbitrary values.
//!
//! ## Overview
//!
//! This crate turns a value into stable, human-readable text that shows its
//! complete structure: every field, every element, every map entry, and the
//! values behind every pointer. It is meant for diagnostics, and in
//! particular for the "got" and "want" snapshots in test failure messages,
//! where a faithful rendering of a deeply nested or self-referential value
//! matters more than compactness.
//!
//! ## Quick Example
//!
//! ```
//! deepdump::reflect! {
//!     pub struct Point {
//!         pub x: i32,
//!         pub y: i32,
//!     }
//! }
//!
//! let points = vec![Point { x: 1, y: 2 }];
//! assert_eq!(
//!     deepdump::render(&points),
//!     "(Vec<Point>) (len=1) {\n (Point) {\n  x: (i32) 1,\n  y: (i32) 2\n }\n}"
//! );
//! ```
//!
//! ## Output Format
//!
//! Every value is annotated with its type, with module paths stripped:
//!
//! - scalars render as `(<type>) <value>`
//! - strings render as `(<type>) (len=<n>) "<escaped text>"`
//! - sequences and maps render as `(<type>) (len=<n>) {` followed by one
//!   member per line and a closing `}`; byte sequences render as a hex dump
//! - structs render as `(<type>) {` followed by one `name: value` per line
//! - pointers render as `(*<type>)(<address>)(<target>)`, with chains of
//!   pointers collapsed into `(**<type>)(<outer>-><inner>)(<target>)`
//! - missing values (null pointers, `None` sequences and maps, empty boxes)
//!   render as `<nil>`
//!
//! A pointer target that is already being rendered further up the current
//! path renders as `<already shown>`, so rendering terminates on cyclic
//! graphs. The same target reached through two separate paths is rendered in
//! full both times.
//!
//! ## Reflection
//!
//! Rust has no runtime reflection, so types describe themselves through the
//! [`Reflect`] trait. It is implemented for primitives, strings, the
//! standard collections, smart pointers, `dyn Reflect` trait objects,
//! function pointers, raw pointers and channels. User structs implement it
//! with the [`reflect!`] macro or by hand.
//!
//! ## Custom Representations
//!
//! A type can offer its own text through [`Reflect::method`], backed by its
//! [`Display`] or [`Error`] impl. The renderer invokes it in place of the
//! structural rendering, unless [`Config::disable_methods`] is set. A panic
//! from that code is caught and rendered inline as `(PANIC=<message>)`,
//! followed by the structural rendering.
//!
//! Representations that are only reachable through a pointer to the value
//! (see [`Receiver::Pointer`]), or that belong to a private field, need
//! capabilities the value may not have been reached with. The renderer
//! raises those capabilities through the access widener of
//! [`deepdump_internals`], which validates its assumptions once per process
//! and panics if they do not hold. Whether widening is part of the build is
//! reported by [`widening_available`]; without it, such values are rendered
//! structurally.
//!
//! [`Display`]: core::fmt::Display
//! [`Error`]: core::error::Error
//!
//! ## Features
//!
//! - `std` (default): invoking custom representations (which requires
//!   catching panics), the `std` collections and channels, and [`dump`].
//! - `widen` (default): the capable access widener.
//! - `tracing`: emits `tracing` events for the layout self-check, caught
//!   panics and skipped representations.
//! - `compat-anyhow1`, `compat-eyre06`: [`Reflect`] for [`anyhow::Error`]
//!   and [`eyre::Report`].
//!
//! [`anyhow::Error`]: https://docs.rs/anyhow/1/anyhow/struct.Error.html
//! [`eyre::Report`]: https://docs.rs/eyre/0.6/eyre/struct.Report.html

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod compat;
mod config;
mod dump;
pub mod format;
mod reflect;

use alloc::string::String;

pub use deepdump_internals::{Derivation, RawHandle};

pub use self::{
    config::{Config, Dumped},
    reflect::{
        Complex, Field, Handle, Kind, MapView, Method, Nil, Pointer, Receiver, Reflect, Seq,
        StructView,
    },
};

/// Renders `value` with [`Config::DEFAULT`].
///
/// ```
/// assert_eq!(deepdump::render(&Some(3u8)), "(u8) 3");
/// assert_eq!(deepdump::render(&None::<Vec<u8>>), "(Vec<u8>) <nil>");
/// ```
pub fn render<T: Reflect>(value: &T) -> String {
    Config::DEFAULT.render(value)
}

/// Renders `value` with `config`.
pub fn render_with<T: Reflect>(value: &T, config: &Config) -> String {
    config.render(value)
}

/// Returns an adapter that renders `value` with [`Config::DEFAULT`] when
/// displayed.
pub fn display<T: Reflect>(value: &T) -> Dumped<'_> {
    Dumped::with_default(value)
}

/// Renders `value` with [`Config::DEFAULT`] to standard output.
#[cfg(feature = "std")]
pub fn dump<T: Reflect>(value: &T) {
    Config::DEFAULT.dump(value);
}

/// Returns whether this build can widen the capabilities of values, which
/// custom representations behind pointers and private fields depend on.
pub const fn widening_available() -> bool {
    deepdump_internals::widen::is_available()
}

/// Returns whether this build can invoke custom representations at all.
pub const fn methods_available() -> bool {
    cfg!(feature = "std")
}

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    pub use alloc::vec;

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub fn is_exported(visibility: &str) -> bool {
        visibility == "pub"
    }
}
