//! Hex dump of byte sequences.
//!
//! Rows hold 16 bytes:
//!
//! ```text
//! 00000000  00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f  |................|
//! ```
//!
//! An 8-digit offset, the bytes in hex with an extra gap after the eighth,
//! and a gutter with the printable ASCII characters. A short final row is
//! padded with spaces so its gutter lines up with the rows above.

use core::fmt;

/// Bytes per row.
const ROW_LEN: usize = 16;

/// Returns the gutter character for `byte`.
fn gutter_char(byte: u8) -> char {
    if (32..=126).contains(&byte) {
        char::from(byte)
    } else {
        '.'
    }
}

/// Writes the hex dump of `bytes`, each row preceded by `prefix` and
/// terminated by a newline.
///
/// Taking an iterator lets a buffer split in two halves, like a wrapped
/// ring buffer, dump exactly like a contiguous one.
pub fn write_hex_dump<W, I>(out: &mut W, bytes: I, prefix: &str) -> fmt::Result
where
    W: fmt::Write + ?Sized,
    I: IntoIterator<Item = u8>,
{
    let mut bytes = bytes.into_iter().peekable();
    let mut offset = 0;
    while bytes.peek().is_some() {
        let mut row = [0u8; ROW_LEN];
        let mut len = 0;
        for (slot, byte) in row.iter_mut().zip(bytes.by_ref()) {
            *slot = byte;
            len += 1;
        }
        write_row(out, offset, &row[..len], prefix)?;
        offset += len;
    }
    Ok(())
}

/// Writes one row of at most [`ROW_LEN`] bytes.
fn write_row<W: fmt::Write + ?Sized>(
    out: &mut W,
    offset: usize,
    chunk: &[u8],
    prefix: &str,
) -> fmt::Result {
    out.write_str(prefix)?;
    write!(out, "{offset:08x}  ")?;

    for slot in 0..ROW_LEN {
        match chunk.get(slot) {
            Some(byte) => write!(out, "{byte:02x} ")?,
            None => out.write_str("   ")?,
        }
        if slot == 7 {
            out.write_char(' ')?;
        }
    }

    out.write_str(" |")?;
    for &byte in chunk {
        out.write_char(gutter_char(byte))?;
    }
    out.write_str("|\n")
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use super::*;

    #[test]
    fn test_full_row() {
        let bytes: Vec<u8> = (0x41..0x51).collect();
        let mut out = String::new();
        write_hex_dump(&mut out, bytes.iter().copied(), "").unwrap();
        assert_eq!(
            out,
            "00000000  41 42 43 44 45 46 47 48  49 4a 4b 4c 4d 4e 4f 50  |ABCDEFGHIJKLMNOP|\n"
        );
    }

    #[test]
    fn test_short_row_is_padded() {
        let mut out = String::new();
        write_hex_dump(&mut out, [0x00, 0x7f, b'z'], "  ").unwrap();
        let expected = String::from("  00000000  00 7f 7a")
            + &" ".repeat(3 * 13 + 3)
            + "|..z|\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_offsets_advance_by_row() {
        let bytes = [0u8; 40];
        let mut out = String::new();
        write_hex_dump(&mut out, bytes.iter().copied(), "").unwrap();
        let offsets: Vec<&str> = out.lines().map(|line| &line[..8]).collect();
        assert_eq!(offsets, ["00000000", "00000010", "00000020"]);
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let mut out = String::new();
        write_hex_dump(&mut out, [0u8; 0], "  ").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_split_input_matches_contiguous() {
        let bytes: Vec<u8> = (0..40).collect();
        let (front, back) = bytes.split_at(13);

        let mut contiguous = String::new();
        write_hex_dump(&mut contiguous, bytes.iter().copied(), " ").unwrap();
        let mut split = String::new();
        write_hex_dump(&mut split, front.iter().chain(back).copied(), " ").unwrap();

        assert_eq!(split, contiguous);
        assert_eq!(split.lines().count(), 3);
    }
}
