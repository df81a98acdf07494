//! Self-describing binary serialization with in-band type tags.
//!
//! A blob is a run of consecutive elements with no space between them.
//! Every element is one type tag byte followed by that kind's payload; the
//! tag's low 7 bits name the kind, the high bit carries the byte order of
//! multi-byte primitives. Encoders emit native order; decoders accept
//! either and swap when the tag disagrees with the host.
//!
//! | kind | payload |
//! |---|---|
//! | `String` | NUL-terminated UTF-8 bytes |
//! | `Bool` | one byte, zero is false and anything else is true |
//! | `Int8`…`Int128`, `UInt8`…`UInt128` | the value's bytes, 1–16 wide |
//! | `Float`, `Double` | IEEE-754 binary32 / binary64 |
//! | `Vector` | typed length, one shared element tag, packed payloads |
//! | `Pair` | two fully tagged elements |
//! | `Map` | typed length, then `Pair`-tagged key/value entries |
//!
//! Numeric decodes are forgiving: any numeric kind converts into any
//! numeric target with a truncating cast at the target width, so a peer
//! that widens a field from `u32` to `u64` stays readable.
//!
//! ```
//! let bytes = robn::encode(&vec![1u16, 2, 3])?;
//! assert_eq!(robn::decode::<Vec<u16>>(&bytes)?, [1, 2, 3]);
//! // the element kind is carried in-band, so a different numeric target works too
//! assert_eq!(robn::decode::<Vec<u64>>(&bytes)?, [1, 2, 3]);
//! # Ok::<(), robn::Error>(())
//! ```
//!
//! User aggregates join in two ways: implementing [`Encode`] and
//! [`Decode`] directly, or declaring named fields through [`Fields`] and
//! letting the field table drive a map-shaped encoding. [`RobnObject`]
//! holds any encoded value opaquely and answers typed reads on demand.

mod auto;
mod cursor;
mod decode;
mod encode;
mod endianness;
mod error;
pub mod hexdump;
mod object;
mod tag;

pub use self::{
    auto::{
        FieldHandle,
        Fields,
    },
    cursor::Cursor,
    decode::{
        decode,
        Decode,
    },
    encode::{
        encode,
        Encode,
    },
    endianness::{
        Endianness,
        SwapEndianness,
    },
    error::{
        Error,
        Result,
    },
    object::RobnObject,
    tag::{
        Kind,
        Tag,
    },
};

/// A self-contained encoded blob.
///
/// Being a plain byte vector, a blob is itself encodable (as a `Vector`
/// of `UInt8`), which is what lets field tables and [`RobnObject`] carry
/// nested encodings.
pub type Robn = Vec<u8>;

/// Implements [`Encode`] and [`Decode`] for a fieldless enum by routing
/// through its underlying integer type.
///
/// The enum must be `Copy` and list every variant. Decoding a value that
/// matches no variant fails with [`Error::IncompatibleBinary`].
///
/// ```
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// #[repr(u8)]
/// enum Suit {
///     Clubs = 0,
///     Diamonds = 1,
///     Hearts = 2,
///     Spades = 3,
/// }
///
/// robn::robn_enum!(Suit: u8 { Clubs, Diamonds, Hearts, Spades });
///
/// let bytes = robn::encode(&Suit::Hearts)?;
/// assert_eq!(robn::decode::<Suit>(&bytes)?, Suit::Hearts);
/// # Ok::<(), robn::Error>(())
/// ```
#[macro_export]
macro_rules! robn_enum {
    ($ty:ty : $repr:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::Encode for $ty {
            fn wire_kind() -> $crate::Kind {
                <$repr as $crate::Encode>::wire_kind()
            }

            fn fixed_wire_size() -> Option<u64> {
                <$repr as $crate::Encode>::fixed_wire_size()
            }

            fn encode_payload(&self, out: &mut $crate::Robn) -> $crate::Result<()> {
                <$repr as $crate::Encode>::encode_payload(&(*self as $repr), out)
            }
        }

        impl $crate::Decode for $ty {
            fn decode_payload(
                cursor: &mut $crate::Cursor<'_>,
                tag: $crate::Tag,
            ) -> $crate::Result<Self> {
                let value = <$repr as $crate::Decode>::decode_payload(cursor, tag)?;
                $(
                    if value == <$ty>::$variant as $repr {
                        return Ok(<$ty>::$variant);
                    }
                )+
                Err($crate::Error::IncompatibleBinary {
                    tag: tag.byte(),
                    offset: cursor.position(),
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    #[repr(i64)]
    enum Mode {
        Idle = 0,
        Active = 7,
        Draining = -2,
    }

    robn_enum!(Mode: i64 { Idle, Active, Draining });

    #[test]
    fn enums_round_trip_through_their_underlying_integer() {
        for mode in [Mode::Idle, Mode::Active, Mode::Draining] {
            let bytes = encode(&mode).unwrap();
            assert_eq!(bytes[0], 0x07); // Int64 tag
            assert_eq!(decode::<Mode>(&bytes).unwrap(), mode);
        }
    }

    #[test]
    fn enums_decode_from_any_numeric_kind() {
        // a peer that shrank the discriminant width still interoperates
        let bytes = encode(&7u8).unwrap();
        assert_eq!(decode::<Mode>(&bytes).unwrap(), Mode::Active);
    }

    #[test]
    fn unknown_discriminant_is_incompatible() {
        let bytes = encode(&99i64).unwrap();
        assert!(matches!(
            decode::<Mode>(&bytes).unwrap_err(),
            Error::IncompatibleBinary { .. }
        ));
    }

    #[test]
    fn values_of_mixed_depth_compose() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(
            "objects".to_owned(),
            vec![
                RobnObject::encode_from(&Mode::Active).unwrap(),
                RobnObject::encode_from(&vec![vec![1u8, 2], vec![3]]).unwrap(),
            ],
        );
        let bytes = encode(&map).unwrap();
        let decoded = decode::<BTreeMap<String, Vec<RobnObject>>>(&bytes).unwrap();
        let objects = &decoded["objects"];
        assert_eq!(objects[0].get::<Mode>().unwrap(), Mode::Active);
        assert_eq!(
            objects[1].get::<Vec<Vec<u8>>>().unwrap(),
            vec![vec![1, 2], vec![3]]
        );
    }
}
