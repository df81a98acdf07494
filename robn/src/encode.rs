//! Encoding values into self-describing blobs.
//!
//! Every element is a type tag followed by that kind's payload. Encoders
//! always emit native byte order and stamp it into the tag of multi-byte
//! primitives.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{
    error::Result,
    tag::{
        Kind,
        Tag,
    },
    Robn,
};

/// The encoding half of the serialization capability.
///
/// Implementors promise to emit their payload bytes; the leading type tag
/// is derived from [`wire_kind`](Encode::wire_kind). Containers erase this
/// trait behind closures (see [`Fields`](crate::Fields)); everywhere else
/// dispatch is static.
pub trait Encode {
    /// Kind of the leading type tag this value emits.
    fn wire_kind() -> Kind
    where
        Self: Sized;

    /// Fixed payload width in bytes, if this type always encodes to the
    /// same size. Lets container encoders reserve capacity up front.
    fn fixed_wire_size() -> Option<u64>
    where
        Self: Sized,
    {
        None
    }

    /// Appends the payload bytes, without the leading type tag.
    fn encode_payload(&self, out: &mut Robn) -> Result<()>;

    /// Appends the full element: type tag, then payload.
    ///
    /// On error the contents of `out` are unspecified; use
    /// [`encode`](Encode::encode) when the no-partial-blob guarantee
    /// matters.
    fn encode_into(&self, out: &mut Robn) -> Result<()>
    where
        Self: Sized,
    {
        out.push(Tag::native(Self::wire_kind()).byte());
        self.encode_payload(out)
    }

    /// Encodes into a fresh blob. A failed encode returns the error and no
    /// bytes.
    fn encode(&self) -> Result<Robn>
    where
        Self: Sized,
    {
        let mut out = Robn::new();
        if let Some(size) = Self::fixed_wire_size() {
            out.reserve(size as usize + 1);
        }
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// Appends the payloads of a run of elements, without per-element type
    /// tags. Overridden where a bulk copy is possible.
    fn encode_elements(elements: &[Self], out: &mut Robn) -> Result<()>
    where
        Self: Sized,
    {
        for element in elements {
            element.encode_payload(out)?;
        }
        Ok(())
    }
}

/// Encodes a value into a fresh blob.
#[inline]
pub fn encode<T: Encode>(value: &T) -> Result<Robn> {
    value.encode()
}

/// Appends a container length element: always `UInt64` in native order,
/// though decoders accept any numeric kind here.
pub(crate) fn encode_length(len: usize, out: &mut Robn) {
    out.push(Tag::native(Kind::UInt64).byte());
    out.extend_from_slice(&(len as u64).to_ne_bytes());
}

macro_rules! impl_encode_numeric {
    {
        $(
            $ty:ty : $kind:ident;
        )*
    } => {
        $(
            impl Encode for $ty {
                #[inline]
                fn wire_kind() -> Kind {
                    Kind::$kind
                }

                #[inline]
                fn fixed_wire_size() -> Option<u64> {
                    Some(Kind::$kind.width() as u64)
                }

                #[inline]
                fn encode_payload(&self, out: &mut Robn) -> Result<()> {
                    out.extend_from_slice(&self.to_ne_bytes());
                    Ok(())
                }
            }
        )*
    };
}

impl_encode_numeric! {
    i8: Int8;
    i16: Int16;
    i32: Int32;
    i64: Int64;
    i128: Int128;
    u16: UInt16;
    u32: UInt32;
    u64: UInt64;
    u128: UInt128;
    f32: Float;
    f64: Double;
}

impl Encode for u8 {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::UInt8
    }

    #[inline]
    fn fixed_wire_size() -> Option<u64> {
        Some(1)
    }

    #[inline]
    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        out.push(*self);
        Ok(())
    }

    #[inline]
    fn encode_elements(elements: &[Self], out: &mut Robn) -> Result<()> {
        out.extend_from_slice(elements);
        Ok(())
    }
}

impl Encode for bool {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::Bool
    }

    #[inline]
    fn fixed_wire_size() -> Option<u64> {
        Some(1)
    }

    #[inline]
    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        out.push(u8::from(*self));
        Ok(())
    }
}

impl Encode for String {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::String
    }

    #[inline]
    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        self.as_str().encode_payload(out)
    }
}

impl Encode for &str {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::String
    }

    /// The bytes followed by one NUL terminator. A decoder stops at the
    /// first NUL, so interior NULs truncate the decoded string.
    #[inline]
    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        out.extend_from_slice(self.as_bytes());
        out.push(0);
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::Vector
    }

    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        encode_length(self.len(), out);
        out.push(Tag::native(T::wire_kind()).byte());
        if let Some(size) = T::fixed_wire_size() {
            out.reserve(self.len().saturating_mul(size as usize));
        }
        T::encode_elements(self, out)
    }
}

impl<A: Encode, B: Encode> Encode for (A, B) {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::Pair
    }

    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        self.0.encode_into(out)?;
        self.1.encode_into(out)
    }
}

// Both map flavors share the wire shape; they differ only in iteration
// order (sorted keys vs. insertion order).
macro_rules! impl_encode_map {
    ($($map:ident),*) => {
        $(
            impl<K: Encode, V: Encode> Encode for $map<K, V> {
                #[inline]
                fn wire_kind() -> Kind {
                    Kind::Map
                }

                fn encode_payload(&self, out: &mut Robn) -> Result<()> {
                    encode_length(self.len(), out);
                    for (key, value) in self {
                        out.push(Tag::bare(Kind::Pair).byte());
                        key.encode_into(out)?;
                        value.encode_into(out)?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_encode_map!(BTreeMap, IndexMap);
