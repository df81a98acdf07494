//! Decoding blobs back into values.
//!
//! Decode is a strict walk of the type tree: read a tag, dispatch on its
//! kind, validate bounds before every read. Multi-byte primitives are
//! accepted in either byte order; the swap happens before any numeric
//! conversion. Numeric targets accept every numeric kind and convert with
//! a truncating cast at the target width.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{
    cursor::Cursor,
    endianness::SwapEndianness,
    error::{
        Error,
        Result,
    },
    tag::{
        Kind,
        Tag,
    },
};

/// The decoding half of the serialization capability.
///
/// The outer type tag has already been consumed when
/// [`decode_payload`](Decode::decode_payload) runs; implementors see the
/// payload bytes only, plus the tag for its kind and byte order.
pub trait Decode: Sized {
    /// Decodes the payload of an element whose tag has been consumed.
    fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self>;

    /// Decodes a full element (tag, then payload) from the start of a
    /// blob. Trailing bytes are left for the caller.
    fn decode(robn: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(robn);
        let tag = cursor.read_tag()?;
        Self::decode_payload(&mut cursor, tag)
    }

    /// Decodes `len` vector elements sharing one element tag.
    ///
    /// `vector_start` is the cursor position of the vector's length
    /// element; the numeric override rewinds there for its cross-kind
    /// path.
    fn decode_elements(
        cursor: &mut Cursor<'_>,
        elem_tag: Tag,
        len: usize,
        vector_start: usize,
    ) -> Result<Vec<Self>> {
        let _ = vector_start;
        let mut elements = Vec::with_capacity(len.min(cursor.remaining()));
        for _ in 0..len {
            elements.push(Self::decode_payload(cursor, elem_tag)?);
        }
        Ok(elements)
    }
}

/// Decodes a value from the start of a blob.
#[inline]
pub fn decode<T: Decode>(robn: &[u8]) -> Result<T> {
    T::decode(robn)
}

/// Resolves a tag's kind, failing with [`Error::InvalidType`] on reserved
/// or unassigned codes.
#[inline]
pub(crate) fn expect_kind(tag: Tag, cursor: &Cursor<'_>) -> Result<Kind> {
    tag.kind().ok_or_else(|| {
        Error::InvalidType {
            code: tag.byte(),
            offset: cursor.position(),
        }
    })
}

#[inline]
fn incompatible(tag: Tag, cursor: &Cursor<'_>) -> Error {
    Error::IncompatibleBinary {
        tag: tag.byte(),
        offset: cursor.position(),
    }
}

/// Reads a container length element. Emitted as `UInt64`, but any numeric
/// kind is accepted and converted.
pub(crate) fn decode_length(cursor: &mut Cursor<'_>) -> Result<usize> {
    let tag = cursor.read_tag()?;
    let len = u64::decode_payload(cursor, tag)?;
    usize::try_from(len).map_err(|_| {
        Error::Truncated {
            offset: cursor.position(),
            needed: usize::MAX,
            remaining: cursor.remaining(),
        }
    })
}

// Reads one numeric payload of the tag's kind and converts it to the
// destination type. The endianness correction happens on the source type,
// before the cast.
macro_rules! numeric_payload {
    ($cursor:ident, $tag:ident, $dst:ty) => {{
        let kind = expect_kind($tag, $cursor)?;
        match kind {
            Kind::Bool => Ok(u8::from($cursor.read_byte()? != 0) as $dst),
            Kind::Int8 => Ok(($cursor.read_byte()? as i8) as $dst),
            Kind::UInt8 => Ok($cursor.read_byte()? as $dst),
            Kind::Int16 => {
                let value = i16::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::UInt16 => {
                let value = u16::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::Int32 => {
                let value = i32::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::UInt32 => {
                let value = u32::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::Int64 => {
                let value = i64::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::UInt64 => {
                let value = u64::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::Int128 => {
                let value = i128::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::UInt128 => {
                let value = u128::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::Float => {
                let value = f32::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            Kind::Double => {
                let value = f64::from_ne_bytes($cursor.read_array()?);
                Ok($tag.endianness().to_native(value) as $dst)
            }
            _ => Err(incompatible($tag, $cursor)),
        }
    }};
}

// Cross-kind vector path: the cursor has been rewound to the vector's
// length element; decode the whole vector as its source type, then cast
// every element to the destination.
macro_rules! cast_vector {
    ($cursor:ident, $kind:ident, $elem_tag:ident, $dst:ty) => {
        match $kind {
            Kind::Bool => {
                let elements = <Vec<bool>>::decode_payload($cursor, Tag::bare(Kind::Vector))?;
                Ok(elements.into_iter().map(|value| (value as u8) as $dst).collect())
            }
            Kind::Int8 => cast_vector!(@arm $cursor, i8, $dst),
            Kind::Int16 => cast_vector!(@arm $cursor, i16, $dst),
            Kind::Int32 => cast_vector!(@arm $cursor, i32, $dst),
            Kind::Int64 => cast_vector!(@arm $cursor, i64, $dst),
            Kind::Int128 => cast_vector!(@arm $cursor, i128, $dst),
            Kind::UInt8 => cast_vector!(@arm $cursor, u8, $dst),
            Kind::UInt16 => cast_vector!(@arm $cursor, u16, $dst),
            Kind::UInt32 => cast_vector!(@arm $cursor, u32, $dst),
            Kind::UInt64 => cast_vector!(@arm $cursor, u64, $dst),
            Kind::UInt128 => cast_vector!(@arm $cursor, u128, $dst),
            Kind::Float => cast_vector!(@arm $cursor, f32, $dst),
            Kind::Double => cast_vector!(@arm $cursor, f64, $dst),
            _ => Err(incompatible($elem_tag, $cursor)),
        }
    };
    (@arm $cursor:ident, $src:ty, $dst:ty) => {{
        let elements = <Vec<$src>>::decode_payload($cursor, Tag::bare(Kind::Vector))?;
        Ok(elements.into_iter().map(|value| value as $dst).collect())
    }};
}

macro_rules! impl_decode_numeric {
    {
        $(
            $ty:ty : $kind:ident;
        )*
    } => {
        $(
            impl Decode for $ty {
                fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
                    numeric_payload!(cursor, tag, $ty)
                }

                fn decode_elements(
                    cursor: &mut Cursor<'_>,
                    elem_tag: Tag,
                    len: usize,
                    vector_start: usize,
                ) -> Result<Vec<Self>> {
                    let kind = expect_kind(elem_tag, cursor)?;
                    if kind == Kind::$kind {
                        let width = Kind::$kind.width();
                        let total = len.checked_mul(width).ok_or_else(|| {
                            Error::Truncated {
                                offset: cursor.position(),
                                needed: usize::MAX,
                                remaining: cursor.remaining(),
                            }
                        })?;
                        // one bounds check for the whole span
                        let bytes = cursor.read_slice(total)?;
                        let mut elements = Vec::with_capacity(len);
                        if width == 1 || elem_tag.endianness().is_native() {
                            for chunk in bytes.chunks_exact(width) {
                                elements.push(<$ty>::from_ne_bytes(
                                    chunk.try_into().unwrap(),
                                ));
                            }
                        }
                        else {
                            for chunk in bytes.chunks_exact(width) {
                                let value = <$ty>::from_ne_bytes(
                                    chunk.try_into().unwrap(),
                                );
                                elements.push(value.swap_endianness());
                            }
                        }
                        Ok(elements)
                    }
                    else if kind.is_numeric() {
                        cursor.set_position(vector_start);
                        cast_vector!(cursor, kind, elem_tag, $ty)
                    }
                    else {
                        Err(incompatible(elem_tag, cursor))
                    }
                }
            }
        )*
    };
}

impl_decode_numeric! {
    i8: Int8;
    i16: Int16;
    i32: Int32;
    i64: Int64;
    i128: Int128;
    u8: UInt8;
    u16: UInt16;
    u32: UInt32;
    u64: UInt64;
    u128: UInt128;
    f32: Float;
    f64: Double;
}

impl Decode for bool {
    /// Any numeric kind is accepted; the value is true iff it is nonzero.
    fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
        let kind = expect_kind(tag, cursor)?;
        match kind {
            Kind::Bool | Kind::Int8 | Kind::UInt8 => Ok(cursor.read_byte()? != 0),
            Kind::Int16 | Kind::UInt16 => {
                let value = u16::from_ne_bytes(cursor.read_array()?);
                Ok(tag.endianness().to_native(value) != 0)
            }
            Kind::Int32 | Kind::UInt32 => {
                let value = u32::from_ne_bytes(cursor.read_array()?);
                Ok(tag.endianness().to_native(value) != 0)
            }
            Kind::Int64 | Kind::UInt64 => {
                let value = u64::from_ne_bytes(cursor.read_array()?);
                Ok(tag.endianness().to_native(value) != 0)
            }
            Kind::Int128 | Kind::UInt128 => {
                let value = u128::from_ne_bytes(cursor.read_array()?);
                Ok(tag.endianness().to_native(value) != 0)
            }
            Kind::Float => {
                let value = f32::from_ne_bytes(cursor.read_array()?);
                Ok(tag.endianness().to_native(value) != 0.0)
            }
            Kind::Double => {
                let value = f64::from_ne_bytes(cursor.read_array()?);
                Ok(tag.endianness().to_native(value) != 0.0)
            }
            _ => Err(incompatible(tag, cursor)),
        }
    }
}

impl Decode for String {
    /// Terminates at the first NUL or at end of buffer, whichever comes
    /// first; the terminator is consumed when present.
    fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
        let kind = expect_kind(tag, cursor)?;
        if kind != Kind::String {
            return Err(incompatible(tag, cursor));
        }
        let rest = cursor.rest();
        let (bytes, consumed) = match memchr::memchr(0, rest) {
            Some(nul) => (&rest[..nul], nul + 1),
            None => (rest, rest.len()),
        };
        let string = std::str::from_utf8(bytes)
            .map_err(|_| incompatible(tag, cursor))?
            .to_owned();
        cursor.skip(consumed)?;
        Ok(string)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
        let kind = expect_kind(tag, cursor)?;
        if kind != Kind::Vector {
            return Err(incompatible(tag, cursor));
        }
        let vector_start = cursor.position();
        let len = decode_length(cursor)?;
        let elem_tag = cursor.read_tag()?;
        T::decode_elements(cursor, elem_tag, len, vector_start)
    }
}

impl<A: Decode, B: Decode> Decode for (A, B) {
    fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
        let kind = expect_kind(tag, cursor)?;
        if kind != Kind::Pair {
            return Err(incompatible(tag, cursor));
        }
        let first_tag = cursor.read_tag()?;
        let first = A::decode_payload(cursor, first_tag)?;
        let second_tag = cursor.read_tag()?;
        let second = B::decode_payload(cursor, second_tag)?;
        Ok((first, second))
    }
}

// Duplicate keys: last insert wins, silently, in both map flavors.
macro_rules! impl_decode_map {
    ($map:ident $(, $bound:path)*) => {
        impl<K: Decode $(+ $bound)*, V: Decode> Decode for $map<K, V> {
            fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
                let kind = expect_kind(tag, cursor)?;
                if kind != Kind::Map {
                    return Err(incompatible(tag, cursor));
                }
                let len = decode_length(cursor)?;
                let mut map = $map::new();
                for _ in 0..len {
                    let pair_tag = cursor.read_tag()?;
                    let (key, value) = <(K, V)>::decode_payload(cursor, pair_tag)?;
                    map.insert(key, value);
                }
                Ok(map)
            }
        }
    };
}

impl_decode_map!(BTreeMap, Ord);
impl_decode_map!(IndexMap, std::hash::Hash, Eq);
