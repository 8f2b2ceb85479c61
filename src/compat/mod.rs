//! [`Reflect`](crate::Reflect) for the error types of other error handling
//! libraries.
//!
//! # Available Integrations
//!
//! - [`anyhow1`] - [`anyhow::Error`] from `anyhow` 1.x (requires the
//!   `compat-anyhow1` feature flag)
//! - [`eyre06`] - [`eyre::Report`] from `eyre` 0.6.x (requires the
//!   `compat-eyre06` feature flag)
//!
//! Both render as an opaque struct whose custom representation is the error
//! message, so they show up readably when they are part of a value under
//! inspection:
//!
//! ```
//! # #[cfg(feature = "compat-anyhow1")] {
//! let outcome: Result<u8, anyhow::Error> = Err(anyhow::anyhow!("disk full"));
//! assert_eq!(deepdump::render(&outcome.err()), "(Error) disk full");
//! # }
//! ```
//!
//! [`anyhow::Error`]: ::anyhow::Error
//! [`eyre::Report`]: ::eyre::Report

#[cfg(feature = "compat-anyhow1")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-anyhow1")))]
pub mod anyhow1;

#[cfg(feature = "compat-eyre06")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-eyre06")))]
pub mod eyre06;

/// Renders an error type as an opaque struct with its message as the
/// custom representation.
#[cfg(any(feature = "compat-anyhow1", feature = "compat-eyre06"))]
macro_rules! impl_opaque_error {
    ($error:ty) => {
        impl $crate::Reflect for $error {
            fn reflect(&self) -> $crate::Kind<'_> {
                $crate::Kind::Struct($crate::StructView::new(alloc::vec::Vec::new()))
            }

            fn method(&self) -> Option<($crate::Receiver, $crate::Method<'_>)> {
                Some(($crate::Receiver::Value, $crate::Method::Display(self)))
            }
        }
    };
}

#[cfg(any(feature = "compat-anyhow1", feature = "compat-eyre06"))]
use impl_opaque_error;
