//! Fields and the per-document record.
//!
//! A [`Record`] maps canonical field names to [`Field`]s in insertion order.
//! The first field inserted under a name wins; later fields with the same name
//! (for example a label repeated in the running header of a later page) are
//! dropped without merging.

use indexmap::IndexMap;

use crate::datum::{Datum, EncodedValue};
use crate::error::Result;

/// A named field and the data attached to it, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Canonical field name
    pub name: String,
    /// Attached data in discovery order
    pub data: Vec<Datum>,
}

impl Field {
    /// Create an empty field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Vec::new(),
        }
    }

    /// Append one datum.
    pub fn push(&mut self, datum: Datum) {
        self.data.push(datum);
    }

    /// The first `Value` attached to the field, if any.
    pub fn value(&self) -> Option<&Datum> {
        self.data.iter().find(|d| d.is_value())
    }

    /// Feed every encoded pair of every datum to `encode`, in data order.
    ///
    /// # Examples
    ///
    /// ```
    /// use labtool::datum::Datum;
    /// use labtool::record::Field;
    ///
    /// let mut field = Field::new("Serum/Sodi");
    /// field.push(Datum::value("140"));
    /// field.push(Datum::unit("mmol/L"));
    ///
    /// let mut keys = Vec::new();
    /// field.encode(|key, _| keys.push(key.to_string()));
    /// assert_eq!(keys, ["value", "unit"]);
    /// ```
    pub fn encode<F>(&self, mut encode: F)
    where
        F: FnMut(&str, &EncodedValue),
    {
        for datum in &self.data {
            for (key, value) in datum.encode() {
                encode(key, &value);
            }
        }
    }
}

impl Field {
    /// Encoded pairs keyed by name, in data order. When two data produce the
    /// same key, the first one wins.
    pub fn encoded(&self) -> IndexMap<String, EncodedValue> {
        let mut encoded = IndexMap::new();
        self.encode(|key, value| {
            encoded
                .entry(key.to_string())
                .or_insert_with(|| value.clone());
        });
        encoded
    }
}

/// Structured result for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field unless its name is already present.
    ///
    /// Returns `true` when the field was inserted.
    pub fn insert_if_absent(&mut self, field: Field) -> bool {
        if self.fields.contains_key(&field.name) {
            log::debug!("Dropping repeated field {:?}", field.name);
            return false;
        }
        self.fields.insert(field.name.clone(), field);
        true
    }

    /// Whether a field with this canonical name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Look up a field by canonical name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Canonical names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// JSON object of every field's [`Field::encoded`] map, keyed by
    /// canonical name in insertion order.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut fields = serde_json::Map::new();
        for field in self.fields() {
            fields.insert(field.name.clone(), serde_json::to_value(field.encoded())?);
        }
        Ok(serde_json::Value::Object(fields))
    }

    /// Consume the record, yielding fields in insertion order.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields.into_values().collect()
    }
}
