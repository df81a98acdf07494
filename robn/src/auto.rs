//! Field-driven encoding for user aggregates.
//!
//! A type declares its fields by name; the table drives encode and decode
//! over a map of those fields, so producers and consumers can add,
//! reorder, or conditionally omit fields without breaking each other.
//!
//! ```
//! use robn::{Cursor, Decode, Encode, Fields, Kind, Result, Robn, Tag};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Player {
//!     version: u32,
//!     name: String,
//!     hp: u32,
//! }
//!
//! impl Player {
//!     fn fields() -> Fields<Player> {
//!         let mut fields = Fields::new();
//!         fields.register("version", |p: &Player| &p.version, |p: &mut Player| &mut p.version);
//!         fields.register("name", |p: &Player| &p.name, |p: &mut Player| &mut p.name);
//!         fields
//!             .register("hp", |p: &Player| &p.hp, |p: &mut Player| &mut p.hp)
//!             .depends_on("version")
//!             .required_if(|p: &Player| p.version > 0);
//!         fields
//!     }
//! }
//!
//! impl Encode for Player {
//!     fn wire_kind() -> Kind {
//!         Kind::Map
//!     }
//!
//!     fn encode_payload(&self, out: &mut Robn) -> Result<()> {
//!         Self::fields().encode_payload(self, out)
//!     }
//! }
//!
//! impl Decode for Player {
//!     fn decode_payload(cursor: &mut Cursor<'_>, tag: Tag) -> Result<Self> {
//!         let mut player = Player::default();
//!         Self::fields().decode_payload_into(&mut player, cursor, tag)?;
//!         Ok(player)
//!     }
//! }
//!
//! let player = Player { version: 1, name: "rogue".into(), hp: 20 };
//! let bytes = robn::encode(&player)?;
//! assert_eq!(robn::decode::<Player>(&bytes)?, player);
//! # Ok::<(), robn::Error>(())
//! ```

use indexmap::IndexMap;

use crate::{
    cursor::Cursor,
    decode::Decode,
    encode::Encode,
    error::{
        Error,
        Result,
    },
    tag::{
        Kind,
        Tag,
    },
    Robn,
};

type EncodeFn<T> = Box<dyn Fn(&T) -> Result<Robn> + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&mut T, &mut Cursor<'_>, Tag) -> Result<()> + Send + Sync>;
type RequiredFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Field<T> {
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
    required_if: Option<RequiredFn<T>>,
    depends_on: Vec<String>,
}

/// The field table of one aggregate type.
///
/// Fields are walked in a topological order of their declared
/// dependencies, ties broken by registration order. The emitted artifact
/// is a map from field name to that field's encoded bytes.
pub struct Fields<T> {
    fields: IndexMap<String, Field<T>>,
    config_error: Option<Error>,
}

impl<T> Fields<T> {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            config_error: None,
        }
    }

    /// Registers a field under `name` with a pair of accessors.
    ///
    /// The returned handle sets per-field options. A duplicate name is a
    /// configuration error, reported by the next encode or decode rather
    /// than here, so registration chains stay infallible.
    pub fn register<V, G, S>(&mut self, name: &str, get: G, set: S) -> FieldHandle<'_, T>
    where
        V: Encode + Decode + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        if self.fields.contains_key(name) {
            if self.config_error.is_none() {
                self.config_error = Some(Error::InvalidConfiguration {
                    reason: format!("duplicate field `{name}`"),
                });
            }
            return FieldHandle { field: None };
        }

        let field = Field {
            encode: Box::new(move |value| get(value).encode()),
            decode: Box::new(move |value, cursor, tag| {
                *set(value) = V::decode_payload(cursor, tag)?;
                Ok(())
            }),
            required_if: None,
            depends_on: Vec::new(),
        };
        let (index, _) = self.fields.insert_full(name.to_owned(), field);
        FieldHandle {
            field: self.fields.get_index_mut(index).map(|(_, field)| field),
        }
    }

    fn validated_order(&self) -> Result<Vec<usize>> {
        if let Some(error) = &self.config_error {
            return Err(error.clone());
        }

        // resolve dependency names to indices up front
        let mut dependencies = Vec::with_capacity(self.fields.len());
        for (name, field) in &self.fields {
            let mut indices = Vec::with_capacity(field.depends_on.len());
            for dep in &field.depends_on {
                match self.fields.get_index_of(dep) {
                    Some(index) => indices.push(index),
                    None => {
                        return Err(Error::InvalidConfiguration {
                            reason: format!(
                                "field `{name}` depends on unregistered field `{dep}`"
                            ),
                        });
                    }
                }
            }
            dependencies.push(indices);
        }

        let mut order = Vec::with_capacity(self.fields.len());
        let mut emitted = vec![false; self.fields.len()];
        while order.len() < self.fields.len() {
            let mut progressed = false;
            for index in 0..self.fields.len() {
                if emitted[index] {
                    continue;
                }
                if dependencies[index].iter().all(|&dep| emitted[dep]) {
                    emitted[index] = true;
                    order.push(index);
                    progressed = true;
                }
            }
            if !progressed {
                return Err(Error::InvalidConfiguration {
                    reason: "dependency cycle between fields".to_owned(),
                });
            }
        }
        Ok(order)
    }

    /// Encodes `value` as a full element: `Map` tag, then the field map.
    pub fn encode(&self, value: &T) -> Result<Robn> {
        let mut out = Robn::new();
        out.push(Tag::bare(Kind::Map).byte());
        self.encode_payload(value, &mut out)?;
        Ok(out)
    }

    /// Encodes the field map payload. Fields whose required predicate is
    /// false are skipped; everything else is emitted in topological order.
    pub fn encode_payload(&self, value: &T, out: &mut Robn) -> Result<()> {
        let order = self.validated_order()?;
        let mut map = IndexMap::new();
        for index in order {
            if let Some((name, field)) = self.fields.get_index(index) {
                if let Some(required) = &field.required_if {
                    if !required(value) {
                        continue;
                    }
                }
                map.insert(name.clone(), (field.encode)(value)?);
            }
        }
        map.encode_payload(out)
    }

    /// Decodes a full element (tag, then field map) into `value`.
    pub fn decode_into(&self, value: &mut T, robn: &[u8]) -> Result<()> {
        let mut cursor = Cursor::new(robn);
        let tag = cursor.read_tag()?;
        self.decode_payload_into(value, &mut cursor, tag)
    }

    /// Decodes a field map whose outer tag has been consumed.
    ///
    /// A field present in the map overwrites `value`'s field; one absent
    /// and required fails; one absent and optional keeps its current
    /// value. Names with no registered field are ignored for forward
    /// compatibility.
    pub fn decode_payload_into(
        &self,
        value: &mut T,
        cursor: &mut Cursor<'_>,
        tag: Tag,
    ) -> Result<()> {
        let order = self.validated_order()?;
        let map = IndexMap::<String, Robn>::decode_payload(cursor, tag)?;
        for index in order {
            if let Some((name, field)) = self.fields.get_index(index) {
                match map.get(name) {
                    Some(blob) => {
                        let mut field_cursor = Cursor::new(blob);
                        let field_tag = field_cursor.read_tag()?;
                        (field.decode)(value, &mut field_cursor, field_tag)?;
                    }
                    None => {
                        let required =
                            field.required_if.as_ref().map_or(true, |f| f(value));
                        if required {
                            return Err(Error::MissingRequiredField {
                                name: name.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T> Default for Fields<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-field options, set fluently right after registration.
pub struct FieldHandle<'a, T> {
    field: Option<&'a mut Field<T>>,
}

impl<'a, T> FieldHandle<'a, T> {
    /// Declares that this field must be encoded and decoded after `name`.
    pub fn depends_on(mut self, name: &str) -> Self {
        if let Some(field) = self.field.as_deref_mut() {
            field.depends_on.push(name.to_owned());
        }
        self
    }

    /// Makes the field conditionally required. Without a predicate a field
    /// is always required.
    pub fn required_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if let Some(field) = self.field.as_deref_mut() {
            field.required_if = Some(Box::new(predicate));
        }
        self
    }
}
