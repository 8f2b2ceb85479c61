//! The fail-fast assertion primitive.
//!
//! [`fail_fast!`] is reserved for startup integrity checks, where continuing
//! with an unverified assumption would be worse than stopping. It is never
//! used on a per-value rendering path.

use alloc::string::String;
use core::fmt::{Display, Write};

/// Aborts with a message joined from `parts` if `condition` is false.
///
/// The parts are formatted with [`Display`] and concatenated without
/// separators.
///
/// # Examples
///
/// ```
/// let offset = 0usize;
/// deepdump_internals::fail_fast!(offset == 0, "unexpected control word offset ", offset);
/// ```
///
/// ```should_panic
/// let found = 8usize;
/// deepdump_internals::fail_fast!(found == 0, "unexpected control word offset ", found);
/// ```
#[macro_export]
macro_rules! fail_fast {
    ($condition:expr, $($part:expr),+ $(,)?) => {
        if !$condition {
            $crate::assert::fail(&[$(&$part as &dyn ::core::fmt::Display),+])
        }
    };
}

/// Panics with the concatenation of `parts`.
///
/// This is the out-of-line half of [`fail_fast!`]; prefer the macro.
#[cold]
#[track_caller]
pub fn fail(parts: &[&dyn Display]) -> ! {
    let mut message = String::new();
    for part in parts {
        // Writing into a `String` cannot fail
        let _ = write!(message, "{part}");
    }
    panic!("{message}")
}
