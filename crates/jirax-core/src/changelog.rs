//! Issue changelog entries.

use crate::error::{FieldValueError, Result};
use crate::mover::{Field, FieldMover};
use crate::raw::{RawMap, Shape};
use crate::record::{decode_element, DecodeContext, FromRaw};
use crate::transform;
use serde::Serialize;
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// One changelog entry: the set of fields an update touched.
///
/// Holds at least one field change, and no two share a field ID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    id: i64,
    fields: BTreeMap<String, FieldChange>,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl Change {
    /// Changelog entry ID.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Changed fields keyed by Jira field ID.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldChange> {
        &self.fields
    }

    /// Unrecognized fields kept from the raw data.
    #[must_use]
    pub const fn extras(&self) -> &RawMap {
        &self.extras
    }

    /// Look up the change to one field by its ID.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldChange> {
        self.fields.get(id)
    }

    fn collect_fields(
        items: Value,
        cx: DecodeContext<'_>,
    ) -> std::result::Result<BTreeMap<String, FieldChange>, FieldValueError> {
        let mut fields = BTreeMap::new();
        for (index, item) in transform::array(items)?.into_iter().enumerate() {
            let field: FieldChange = decode_element(index, item, cx)?;
            match fields.entry(field.id.clone()) {
                btree_map::Entry::Occupied(entry) => {
                    return Err(FieldValueError::DuplicateKey {
                        key: field.id.clone(),
                        first: Box::new(entry.remove()),
                        second: Box::new(field),
                    });
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(field);
                }
            }
        }
        if fields.is_empty() {
            return Err(FieldValueError::EmptyCollection);
        }
        Ok(fields)
    }
}

impl FromRaw for Change {
    const KIND: &'static str = "changelog entry";

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        let cx = mover.context();
        let id = mover.require(
            Field::new("id").shapes(&[Shape::Integer, Shape::String]),
            transform::integer,
        )?;
        let fields = mover.require(
            Field::new("fields").source("items").shapes(&[Shape::Array]),
            |items| Self::collect_fields(items, cx),
        )?;
        Ok(Self {
            id,
            fields,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A change to one issue field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    name: String,
    id: String,
    #[serde(rename = "type")]
    field_type: String,
    old: FieldValue,
    new: FieldValue,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl FieldChange {
    /// The field name, e.g. `"status"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field ID, e.g. `"customfield_10010"`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The field type, `"jira"` or `"custom"`.
    #[must_use]
    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    #[must_use]
    pub const fn old(&self) -> &FieldValue {
        &self.old
    }

    #[must_use]
    pub const fn new(&self) -> &FieldValue {
        &self.new
    }

    #[must_use]
    pub const fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl FromRaw for FieldChange {
    const KIND: &'static str = "issue field change";

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        let name = mover.string(Field::new("name").source("field"))?;
        let id = mover.string(Field::new("id").source("fieldId"))?;
        let field_type = mover.string(Field::new("type").source("fieldtype"))?;
        let old = FieldValue::new(
            mover.value(Field::new("").source("from"))?,
            mover.value(Field::new("").source("fromString"))?,
        );
        let new = FieldValue::new(
            mover.value(Field::new("").source("to"))?,
            mover.value(Field::new("").source("toString"))?,
        );
        mover.store("old", old.to_value());
        mover.store("new", new.to_value());
        Ok(Self {
            name,
            id,
            field_type,
            old,
            new,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field {:?} (ID {:?}, type {:?}) value {} -> {}",
            self.name, self.id, self.field_type, self.old, self.new
        )
    }
}

/// A field value as Jira reports it: the raw value and its display string.
///
/// Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    raw: Option<Value>,
    #[serde(rename = "str")]
    string: Option<Value>,
}

impl FieldValue {
    #[must_use]
    pub const fn new(raw: Option<Value>, string: Option<Value>) -> Self {
        Self { raw, string }
    }

    /// The raw, uncooked value.
    #[must_use]
    pub const fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// The display string, if Jira sent one as a string.
    #[must_use]
    pub fn string(&self) -> Option<&str> {
        self.string.as_ref().and_then(Value::as_str)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_none() && self.string.is_none()
    }

    /// The value as a `{"raw": ..., "str": ...}` object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = RawMap::new();
        map.insert("raw".to_string(), self.raw.clone().unwrap_or(Value::Null));
        map.insert("str".to_string(), self.string.clone().unwrap_or(Value::Null));
        Value::Object(map)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw.as_ref().unwrap_or(&Value::Null);
        let string = self.string.as_ref().unwrap_or(&Value::Null);
        write!(f, "{raw} (string {string})")
    }
}
