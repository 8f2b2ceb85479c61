//! [`Reflect`] for [`eyre::Report`].
//!
//! This module specifically supports `eyre` version 0.6.x. To enable this
//! integration, add the `compat-eyre06` feature flag to your `Cargo.toml`.
//!
//! An [`eyre::Report`] renders as `(Report) <message>`, where the message is
//! the outermost context as shown by its [`Display`] impl.
//!
//! ```
//! let report = eyre::eyre!("permission denied");
//! assert_eq!(deepdump::render(&report), "(Report) permission denied");
//! ```
//!
//! [`Reflect`]: crate::Reflect
//! [`Display`]: core::fmt::Display

super::impl_opaque_error!(eyre::Report);
