//! Wire kinds and type tags.
//!
//! Every ROBN element starts with a single tag byte: the low 7 bits name a
//! [`Kind`], the high bit carries the payload's [`Endianness`] where the
//! kind has one. Codes 0, 3, 14, 20–22 and 123–126 are reserved — they are
//! never produced, and decoding one fails with [`Error::InvalidType`].
//!
//! [`Error::InvalidType`]: crate::Error::InvalidType

use crate::endianness::Endianness;

/// Mask of the endianness bit in a tag byte.
const ENDIANNESS_BIT: u8 = 0x80;

/// The kinds of value the wire format can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    /// NUL-terminated UTF-8 bytes.
    String = 1,
    /// One byte, zero for false and anything else for true.
    Bool = 2,
    Int8 = 4,
    Int16 = 5,
    Int32 = 6,
    Int64 = 7,
    UInt8 = 8,
    UInt16 = 9,
    UInt32 = 10,
    UInt64 = 11,
    /// IEEE-754 binary32.
    Float = 12,
    /// IEEE-754 binary64.
    Double = 13,
    /// Typed length, one shared element tag, then packed element payloads.
    Vector = 15,
    /// Two fully tagged elements of possibly different kinds.
    Pair = 16,
    /// Typed length, then `Pair`-tagged key/value entries.
    Map = 17,
    Int128 = 18,
    UInt128 = 19,
}

impl Kind {
    /// Looks up the kind a tag code names, `None` for reserved or
    /// unassigned codes.
    pub fn from_code(code: u8) -> Option<Kind> {
        Some(match code {
            1 => Kind::String,
            2 => Kind::Bool,
            4 => Kind::Int8,
            5 => Kind::Int16,
            6 => Kind::Int32,
            7 => Kind::Int64,
            8 => Kind::UInt8,
            9 => Kind::UInt16,
            10 => Kind::UInt32,
            11 => Kind::UInt64,
            12 => Kind::Float,
            13 => Kind::Double,
            15 => Kind::Vector,
            16 => Kind::Pair,
            17 => Kind::Map,
            18 => Kind::Int128,
            19 => Kind::UInt128,
            _ => return None,
        })
    }

    /// The tag code, without an endianness bit.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Payload width in bytes for fixed-width primitive kinds, 0 otherwise.
    pub fn width(self) -> usize {
        match self {
            Kind::Bool | Kind::Int8 | Kind::UInt8 => 1,
            Kind::Int16 | Kind::UInt16 => 2,
            Kind::Int32 | Kind::UInt32 | Kind::Float => 4,
            Kind::Int64 | Kind::UInt64 | Kind::Double => 8,
            Kind::Int128 | Kind::UInt128 => 16,
            Kind::String | Kind::Vector | Kind::Pair | Kind::Map => 0,
        }
    }

    /// Whether this kind decodes through the numeric conversion path.
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Kind::String | Kind::Vector | Kind::Pair | Kind::Map
        )
    }
}

/// A single wire tag byte.
///
/// Splits into a [`Kind`] (low 7 bits) and an [`Endianness`] (high bit).
/// The raw byte is kept so errors can report unknown codes verbatim.
#[derive(Clone, Copy, PartialEq, Eq, derive_more::From, derive_more::Into)]
pub struct Tag(u8);

impl Tag {
    /// Assembles a tag from a kind and a payload byte order.
    #[inline]
    pub fn new(kind: Kind, endianness: Endianness) -> Self {
        let bit = match endianness {
            Endianness::Little => 0,
            Endianness::Big => ENDIANNESS_BIT,
        };
        Self(kind.code() | bit)
    }

    /// The tag an encoder emits for a kind: native byte order stamped on
    /// multi-byte primitives, the bare code everywhere else.
    #[inline]
    pub fn native(kind: Kind) -> Self {
        if kind.width() > 1 {
            Self::new(kind, Endianness::NATIVE)
        }
        else {
            Self::bare(kind)
        }
    }

    /// The tag code alone, endianness bit clear.
    #[inline]
    pub fn bare(kind: Kind) -> Self {
        Self(kind.code())
    }

    /// The kind this tag names, `None` for reserved or unassigned codes.
    #[inline]
    pub fn kind(self) -> Option<Kind> {
        Kind::from_code(self.0 & !ENDIANNESS_BIT)
    }

    /// The payload byte order carried in the high bit.
    #[inline]
    pub fn endianness(self) -> Endianness {
        if self.0 & ENDIANNESS_BIT == 0 {
            Endianness::Little
        }
        else {
            Endianness::Big
        }
    }

    /// The raw tag byte.
    #[inline]
    pub fn byte(self) -> u8 {
        self.0
    }
}

impl From<Kind> for Tag {
    #[inline]
    fn from(kind: Kind) -> Self {
        Self::native(kind)
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "Tag({:?}, {:?})", kind, self.endianness()),
            None => write!(f, "Tag({:#04x})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..=u8::MAX {
            if let Some(kind) = Kind::from_code(code) {
                assert_eq!(kind.code(), code);
            }
        }
    }

    #[test]
    fn reserved_codes_have_no_kind() {
        for code in [0u8, 3, 14, 20, 21, 22, 123, 124, 125, 126] {
            assert_eq!(Kind::from_code(code), None);
        }
    }

    #[test]
    fn tag_splits_kind_and_endianness() {
        let tag = Tag::new(Kind::UInt32, Endianness::Big);
        assert_eq!(tag.byte(), 0x8a);
        assert_eq!(tag.kind(), Some(Kind::UInt32));
        assert_eq!(tag.endianness(), Endianness::Big);

        let tag = Tag::new(Kind::UInt32, Endianness::Little);
        assert_eq!(tag.byte(), 0x0a);
        assert_eq!(tag.endianness(), Endianness::Little);
    }

    #[test]
    fn native_tags_leave_structural_kinds_bare() {
        assert_eq!(Tag::native(Kind::Vector).byte(), Kind::Vector.code());
        assert_eq!(Tag::native(Kind::Pair).byte(), Kind::Pair.code());
        assert_eq!(Tag::native(Kind::Map).byte(), Kind::Map.code());
        assert_eq!(Tag::native(Kind::String).byte(), Kind::String.code());
        assert_eq!(Tag::native(Kind::Bool).byte(), Kind::Bool.code());
        assert_eq!(Tag::native(Kind::UInt8).byte(), Kind::UInt8.code());
    }

    #[test]
    fn widths_match_the_wire_table() {
        assert_eq!(Kind::Bool.width(), 1);
        assert_eq!(Kind::Int8.width(), 1);
        assert_eq!(Kind::UInt16.width(), 2);
        assert_eq!(Kind::Int32.width(), 4);
        assert_eq!(Kind::Float.width(), 4);
        assert_eq!(Kind::UInt64.width(), 8);
        assert_eq!(Kind::Double.width(), 8);
        assert_eq!(Kind::Int128.width(), 16);
        assert_eq!(Kind::Vector.width(), 0);
        assert_eq!(Kind::Map.width(), 0);
    }
}
