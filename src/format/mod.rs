//! Pure rendering rules for the individual parts of the output.
//!
//! Everything here writes into a [`fmt::Write`] sink and depends on nothing
//! but its arguments, which keeps each rule testable on its own. The
//! traversal engine decides *which* rule applies; this module decides *what
//! the text looks like*.

pub mod hexdump;

use alloc::string::String;
use core::fmt;

use crate::reflect::Complex;

/// Rendered for the invalid handle.
pub const INVALID: &str = "<invalid>";
/// Rendered for missing values: nil pointers, slices, maps and the like.
pub const NIL: &str = "<nil>";
/// Rendered in place of a pointer target that is already being rendered
/// further up the current path.
pub const ALREADY_SHOWN: &str = "<already shown>";
/// Rendered in place of the members of a composite nested past the
/// configured maximum depth.
pub const MAX_DEPTH_REACHED: &str = "<max depth reached>";

/// Returns whether `c` can be part of a path segment.
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Writes a type name with every module path stripped.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`. Generic
/// arguments, references, tuples and `dyn` prefixes are preserved.
pub fn write_type_name<W: fmt::Write + ?Sized>(out: &mut W, name: &str) -> fmt::Result {
    let mut rest = name;
    while let Some(index) = rest.find("::") {
        let head = &rest[..index];
        let segment_start = head
            .char_indices()
            .rev()
            .find(|&(_, c)| !is_ident_char(c))
            .map_or(0, |(index, c)| index + c.len_utf8());
        out.write_str(&head[..segment_start])?;
        rest = &rest[index + 2..];
    }
    out.write_str(rest)
}

/// Returns a type name with every module path stripped.
///
/// ```
/// use deepdump::format::short_type_name;
///
/// assert_eq!(short_type_name("alloc::vec::Vec<alloc::string::String>"), "Vec<String>");
/// assert_eq!(short_type_name("&dyn core::fmt::Debug"), "&dyn Debug");
/// assert_eq!(short_type_name("(u8, core::option::Option<i32>)"), "(u8, Option<i32>)");
/// ```
pub fn short_type_name(name: &str) -> String {
    let mut short = String::with_capacity(name.len());
    // Writing into a `String` never fails
    let _ = write_type_name(&mut short, name);
    short
}

/// Writes `(<name>) `, the type annotation in front of most values.
pub fn write_type_annotation<W: fmt::Write + ?Sized>(out: &mut W, name: &str) -> fmt::Result {
    out.write_char('(')?;
    write_type_name(out, name)?;
    out.write_str(") ")
}

/// Writes the length and capacity annotation of a container.
///
/// With a capacity, an empty container shows only `(cap=m) `.
pub fn write_len_cap<W: fmt::Write + ?Sized>(
    out: &mut W,
    len: usize,
    capacity: Option<usize>,
) -> fmt::Result {
    match capacity {
        None => write!(out, "(len={len}) "),
        Some(capacity) if len == 0 => write!(out, "(cap={capacity}) "),
        Some(capacity) => write!(out, "(len={len} cap={capacity}) "),
    }
}

/// Writes an address as `0x...`, or [`NIL`] for zero.
pub fn write_address<W: fmt::Write + ?Sized>(out: &mut W, address: usize) -> fmt::Result {
    if address == 0 {
        out.write_str(NIL)
    } else {
        write!(out, "{address:#x}")
    }
}

/// Writes a pointer chain annotation: `(*T)` or `(**T)(a->b)`.
///
/// `depth` is the number of indirections and `addresses` the address of
/// each pointer target, outermost first. `None` omits the address part.
pub fn write_pointer_header<W: fmt::Write + ?Sized>(
    out: &mut W,
    depth: usize,
    pointee: &str,
    addresses: Option<&[usize]>,
) -> fmt::Result {
    out.write_char('(')?;
    for _ in 0..depth {
        out.write_char('*')?;
    }
    write_type_name(out, pointee)?;
    out.write_char(')')?;

    if let Some(addresses) = addresses {
        out.write_char('(')?;
        for (index, &address) in addresses.iter().enumerate() {
            if index > 0 {
                out.write_str("->")?;
            }
            write_address(out, address)?;
        }
        out.write_char(')')?;
    }
    Ok(())
}

/// Writes a complex number as `(re+imi)`.
pub fn write_complex<W, F>(out: &mut W, value: Complex<F>) -> fmt::Result
where
    W: fmt::Write + ?Sized,
    F: fmt::Display,
{
    write!(out, "({}{:+}i)", value.re, value.im)
}

/// Writes text quoted, with control characters and quotes escaped.
pub fn write_quoted<W: fmt::Write + ?Sized>(out: &mut W, text: &str) -> fmt::Result {
    write!(out, "{text:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("i8"), "i8");
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::string::String, u8>"),
            "HashMap<String, u8>"
        );
        assert_eq!(
            short_type_name("alloc::boxed::Box<dyn deepdump::reflect::Reflect + core::marker::Send>"),
            "Box<dyn Reflect + Send>"
        );
        assert_eq!(short_type_name("[my_crate::Item; 4]"), "[Item; 4]");
        assert_eq!(short_type_name("fn(i32) -> my_crate::Out"), "fn(i32) -> Out");
    }

    #[test]
    fn test_len_cap() {
        let mut out = String::new();
        write_len_cap(&mut out, 3, None).unwrap();
        write_len_cap(&mut out, 3, Some(8)).unwrap();
        write_len_cap(&mut out, 0, Some(8)).unwrap();
        assert_eq!(out, "(len=3) (len=3 cap=8) (cap=8) ");
    }

    #[test]
    fn test_pointer_header() {
        let mut out = String::new();
        write_pointer_header(&mut out, 2, "i8", Some(&[0xc0, 0xd0])).unwrap();
        assert_eq!(out, "(**i8)(0xc0->0xd0)");

        out.clear();
        write_pointer_header(&mut out, 1, "my_crate::Node", None).unwrap();
        assert_eq!(out, "(*Node)");

        out.clear();
        write_pointer_header(&mut out, 1, "u8", Some(&[0])).unwrap();
        assert_eq!(out, "(*u8)(<nil>)");
    }

    #[test]
    fn test_complex() {
        let mut out = String::new();
        write_complex(&mut out, Complex::new(1.5f64, -2.0)).unwrap();
        out.push(' ');
        write_complex(&mut out, Complex::new(0.0f32, 3.25)).unwrap();
        assert_eq!(out, "(1.5-2i) (0+3.25i)");
    }

    #[test]
    fn test_quoted() {
        let mut out = String::new();
        write_quoted(&mut out, "a\"b\n").unwrap();
        assert_eq!(out, r#""a\"b\n""#);
    }
}
