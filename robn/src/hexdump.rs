//! Hexdump rendering for diagnostics and test failure output.

use std::fmt::{
    Debug,
    Display,
};

#[inline]
pub fn hexdump(bytes: &[u8]) -> Hexdump<'_> {
    Hexdump::new(bytes)
}

/// Displays a byte slice as offset, hex columns and an ASCII gutter.
pub struct Hexdump<'a> {
    bytes: &'a [u8],
}

impl<'a> Hexdump<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl Display for Hexdump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Hexdump: {} bytes", self.bytes.len())?;
        for (row, chunk) in self.bytes.chunks(16).enumerate() {
            write!(f, "{:04x} ", row * 16)?;
            for column in 0..16 {
                match chunk.get(column) {
                    Some(byte) => write!(f, " {byte:02x}")?,
                    None => write!(f, "   ")?,
                }
            }
            write!(f, "  |")?;
            for byte in chunk {
                if byte.is_ascii_graphic() || *byte == b' ' {
                    write!(f, "{}", *byte as char)?;
                }
                else {
                    write!(f, ".")?;
                }
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

impl Debug for Hexdump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_offset_hex_and_ascii() {
        let rendered = hexdump(b"hi\x00\xff").to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Hexdump: 4 bytes"));
        let line = lines.next().unwrap();
        assert!(line.starts_with("0000  68 69 00 ff"));
        assert!(line.ends_with("|hi..|"));
    }

    #[test]
    fn empty_input_renders_header_only() {
        assert_eq!(hexdump(&[]).to_string(), "Hexdump: 0 bytes\n");
    }
}
