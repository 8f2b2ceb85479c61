//! [`Reflect`] for [`anyhow::Error`].
//!
//! This module specifically supports `anyhow` version 1.x. To enable this
//! integration, add the `compat-anyhow1` feature flag to your `Cargo.toml`.
//!
//! An [`anyhow::Error`] renders as `(Error) <message>`, where the message is
//! the outermost context as shown by its [`Display`] impl. With custom
//! representations disabled it renders as an empty struct.
//!
//! ```
//! use deepdump::Config;
//!
//! let error = anyhow::anyhow!("connection refused").context("fetching index");
//! assert_eq!(deepdump::render(&error), "(Error) fetching index");
//! assert_eq!(Config::DIFF.render(&error), "(Error) {\n}");
//! ```
//!
//! [`Reflect`]: crate::Reflect
//! [`Display`]: core::fmt::Display

super::impl_opaque_error!(anyhow::Error);
