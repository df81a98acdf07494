//! An opaque, comparable value container.

use std::cmp::Ordering;

use crate::{
    cursor::Cursor,
    decode::{
        decode,
        Decode,
    },
    encode::{
        encode,
        Encode,
    },
    error::Result,
    tag::{
        Kind,
        Tag,
    },
    Robn,
};

/// An owned blob that remembers its encoded bytes and answers typed reads
/// on demand.
///
/// Assignment replaces the blob with a fresh encoding; [`get`](Self::get)
/// decodes it as any decodable type. Equality is byte identity, and the
/// total order (length first, then lexicographic bytes) lets the container
/// key an ordered map without committing to a typed comparison.
///
/// ```
/// use robn::RobnObject;
///
/// let mut object = RobnObject::new();
/// object.set(&"yeet")?;
/// assert_eq!(object.get::<String>()?, "yeet");
///
/// object.set(&12u8)?;
/// assert_eq!(object.get::<u64>()?, 12);
/// # Ok::<(), robn::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, derive_more::From, derive_more::Into)]
pub struct RobnObject {
    robn: Robn,
}

impl RobnObject {
    /// An empty container. Reading from it fails until a value is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value` into a fresh container.
    pub fn encode_from<T: Encode>(value: &T) -> Result<Self> {
        Ok(Self {
            robn: encode(value)?,
        })
    }

    /// Replaces the blob with a fresh encoding of `value`.
    pub fn set<T: Encode>(&mut self, value: &T) -> Result<()> {
        self.robn = encode(value)?;
        Ok(())
    }

    /// Decodes the blob as a `T`.
    pub fn get<T: Decode>(&self) -> Result<T> {
        decode(&self.robn)
    }

    /// The encoded bytes held by the container.
    pub fn bytes(&self) -> &[u8] {
        &self.robn
    }
}

impl Ord for RobnObject {
    /// Shorter blob first, then lexicographic byte order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.robn
            .len()
            .cmp(&other.robn.len())
            .then_with(|| self.robn.cmp(&other.robn))
    }
}

impl PartialOrd for RobnObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// On the wire the container carries its blob as a `Vector` of `UInt8`, so
// it nests inside vectors, maps and field tables like any other value.
impl Encode for RobnObject {
    #[inline]
    fn wire_kind() -> Kind {
        Kind::Vector
    }

    fn encode_payload(&self, out: &mut Robn) -> Result<()> {
        self.robn.encode_payload(out)
    }
}

impl Decode for RobnObject {
    fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
        Ok(Self {
            robn: Robn::decode_payload(cursor, tag)?,
        })
    }
}
