//! Crate-private logging macro.

/// Emits a `tracing` event when the `tracing` feature is enabled, and expands
/// to nothing otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

/// Emits a `tracing` event when the `tracing` feature is enabled, and expands
/// to nothing otherwise.
#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {};
}
