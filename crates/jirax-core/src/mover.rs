//! The field mover: pulls named fields out of a raw map one at a time.
//!
//! A mover is bound to one raw source map for one decode call. Every
//! [`FieldMover::move_field`] removes a field from the set of remaining
//! fields, checks its shape, runs its transform, and records it under its
//! semantic name. Once a record has taken everything it knows about,
//! [`FieldMover::check_extra`] decides what to do with the rest.

use crate::error::{DecodeError, FieldValueError, Result};
use crate::raw::{is_of_shape, RawMap, Shape};
use crate::record::{DecodeContext, FromRaw, Strictness};
use crate::resource::{Resource, ResourceKind};
use crate::transform;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Declares one field to move.
///
/// ```
/// use jirax_core::{Field, Shape};
///
/// let field = Field::new("type").source("webhookEvent").shapes(&[Shape::String]);
/// assert_eq!(field.source_name(), "webhookEvent");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'n> {
    name: &'n str,
    source: Option<&'n str>,
    shapes: Option<&'static [Shape]>,
    required: bool,
}

impl<'n> Field<'n> {
    /// A required field with the given semantic name.
    ///
    /// An empty name moves the field without recording it under any
    /// semantic name, for values that feed a composite built by the caller.
    #[must_use]
    pub const fn new(name: &'n str) -> Self {
        Self {
            name,
            source: None,
            shapes: None,
            required: true,
        }
    }

    /// Read the field from `source` instead of the semantic name.
    #[must_use]
    pub const fn source(mut self, source: &'n str) -> Self {
        self.source = Some(source);
        self
    }

    /// Reject values that match none of `shapes`.
    #[must_use]
    pub const fn shapes(mut self, shapes: &'static [Shape]) -> Self {
        self.shapes = Some(shapes);
        self
    }

    /// Allow the field to be absent.
    #[must_use]
    pub const fn optional(self) -> Self {
        self.required(false)
    }

    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'n str {
        self.name
    }

    /// The name the field has in the raw data.
    #[must_use]
    pub const fn source_name(&self) -> &'n str {
        match self.source {
            Some(source) => source,
            None => self.name,
        }
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Moves fields from a raw source map into a typed record.
#[derive(Debug)]
pub struct FieldMover<'a> {
    kind: &'static str,
    source: &'a RawMap,
    remaining: RawMap,
    target: RawMap,
    cx: DecodeContext<'a>,
}

impl<'a> FieldMover<'a> {
    /// Start moving fields out of `source`.
    #[must_use]
    pub fn new(kind: &'static str, source: &'a RawMap, cx: DecodeContext<'a>) -> Self {
        Self {
            kind,
            source,
            remaining: source.clone(),
            target: RawMap::new(),
            cx,
        }
    }

    /// The kind of record being decoded.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// The raw data being decoded; never modified.
    #[must_use]
    pub const fn source(&self) -> &'a RawMap {
        self.source
    }

    /// Source fields not moved yet.
    #[must_use]
    pub const fn remaining(&self) -> &RawMap {
        &self.remaining
    }

    /// Moved values keyed by semantic name.
    ///
    /// Optional fields that were absent appear as `null`. Composites built
    /// from unnamed moves appear once stored with [`FieldMover::store`].
    #[must_use]
    pub const fn target(&self) -> &RawMap {
        &self.target
    }

    /// The context nested decodes run in.
    #[must_use]
    pub const fn context(&self) -> DecodeContext<'a> {
        self.cx
    }

    /// Move a field, passing its value through `transform`.
    ///
    /// Returns `None` only when an optional field is absent.
    ///
    /// # Errors
    /// - `DecodeError::MissingField` if a required field is absent.
    /// - `DecodeError::WrongFieldType` if the value matches none of the
    ///   field's shapes.
    /// - `DecodeError::RejectedFieldValue` if `transform` fails; the
    ///   transform's error becomes the source.
    pub fn move_field<T, F>(&mut self, field: Field<'_>, transform: F) -> Result<Option<T>>
    where
        F: FnOnce(Value) -> std::result::Result<T, FieldValueError>,
    {
        let Some(value) = self.remaining.remove(field.source_name()) else {
            if field.required {
                return Err(self.missing(field.source_name()));
            }
            self.record(field.name, Value::Null);
            return Ok(None);
        };

        if let Some(shapes) = field.shapes {
            if !is_of_shape(&value, shapes) {
                return Err(DecodeError::WrongFieldType {
                    kind: self.kind,
                    raw: self.raw(),
                    name: field.source_name().to_string(),
                    value,
                    expected: shapes,
                });
            }
        }

        let moved = value.clone();
        match transform(value) {
            Ok(output) => {
                self.record(field.name, moved);
                Ok(Some(output))
            }
            Err(cause) => Err(DecodeError::RejectedFieldValue {
                kind: self.kind,
                raw: self.raw(),
                name: field.source_name().to_string(),
                value: moved,
                cause,
            }),
        }
    }

    /// Move a field that must be present.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn require<T, F>(&mut self, field: Field<'_>, transform: F) -> Result<T>
    where
        F: FnOnce(Value) -> std::result::Result<T, FieldValueError>,
    {
        let field = field.required(true);
        match self.move_field(field, transform)? {
            Some(output) => Ok(output),
            None => Err(self.missing(field.source_name())),
        }
    }

    /// Move a field without transforming it.
    ///
    /// Present `null` values come back as `None`, same as absent optional
    /// fields.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn value(&mut self, field: Field<'_>) -> Result<Option<Value>> {
        Ok(self
            .move_field(field, transform::identity)?
            .filter(|value| !value.is_null()))
    }

    /// Move a required string field.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn string(&mut self, field: Field<'_>) -> Result<String> {
        self.require(field.shapes(&[Shape::String]), transform::string)
    }

    /// Move an optional string field.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn optional_string(&mut self, field: Field<'_>) -> Result<Option<String>> {
        self.move_field(field.optional().shapes(&[Shape::String]), transform::string)
    }

    /// Move a required integer field.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn integer(&mut self, field: Field<'_>) -> Result<i64> {
        self.require(field.shapes(&[Shape::Integer]), transform::integer)
    }

    /// Move a required boolean field.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn boolean(&mut self, field: Field<'_>) -> Result<bool> {
        self.require(field.shapes(&[Shape::Bool]), transform::boolean)
    }

    /// Move an object field and decode it as a nested record.
    ///
    /// The nested record gets its own mover and this mover's converter, and
    /// is always decoded strictly. Its errors surface as `RejectedFieldValue`
    /// on this field.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn nested<T: FromRaw>(&mut self, field: Field<'_>) -> Result<Option<T>> {
        let cx = self.cx.with_strictness(Strictness::Strict);
        self.move_field(field.shapes(&[Shape::Object]), move |value| {
            let raw = transform::object(value)?;
            T::from_raw_with(&raw, cx).map_err(|e| FieldValueError::Nested(Box::new(e)))
        })
    }

    /// Move a required nested record.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn require_nested<T: FromRaw>(&mut self, field: Field<'_>) -> Result<T> {
        let field = field.required(true);
        match self.nested(field)? {
            Some(record) => Ok(record),
            None => Err(self.missing(field.source_name())),
        }
    }

    /// Move an object field and hand it to the resource converter.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn resource(&mut self, field: Field<'_>, kind: ResourceKind) -> Result<Option<Resource>> {
        let converter = self.cx.converter();
        self.move_field(field.shapes(&[Shape::Object]), move |value| {
            let raw = transform::object(value)?;
            converter
                .convert(kind, raw)
                .map_err(|cause| FieldValueError::Conversion { kind, cause })
        })
    }

    /// Move a required resource.
    ///
    /// # Errors
    /// See [`FieldMover::move_field`].
    pub fn require_resource(&mut self, field: Field<'_>, kind: ResourceKind) -> Result<Resource> {
        let field = field.required(true);
        match self.resource(field, kind)? {
            Some(resource) => Ok(resource),
            None => Err(self.missing(field.source_name())),
        }
    }

    /// Check for fields that were never moved.
    ///
    /// Returns the names of the leftover fields. With `strict` set, any
    /// leftover is an error; otherwise leftovers are logged.
    ///
    /// # Errors
    /// Returns `DecodeError::ExtraFields` if `strict` and fields remain.
    pub fn check_extra(&self, strict: bool) -> Result<BTreeSet<String>> {
        let names: BTreeSet<String> = self.remaining.keys().cloned().collect();
        if !names.is_empty() {
            if strict {
                return Err(DecodeError::ExtraFields {
                    kind: self.kind,
                    raw: self.raw(),
                    names,
                });
            }
            warn!(kind = self.kind, fields = ?names, "Found extra fields");
        }
        Ok(names)
    }

    /// Record a composite value under `name` after assembling it from
    /// unnamed moves.
    pub fn store(&mut self, name: &str, value: Value) {
        self.record(name, value);
    }

    /// Finish, returning the fields that were never moved.
    #[must_use]
    pub fn into_remaining(self) -> RawMap {
        self.remaining
    }

    fn record(&mut self, name: &str, value: Value) {
        if !name.is_empty() {
            self.target.insert(name.to_string(), value);
        }
    }

    fn raw(&self) -> Value {
        Value::Object(self.source.clone())
    }

    fn missing(&self, name: &str) -> DecodeError {
        DecodeError::MissingField {
            kind: self.kind,
            raw: self.raw(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> RawMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn cx() -> DecodeContext<'static> {
        DecodeContext::new(Strictness::Strict)
    }

    #[test]
    fn test_move_renames_and_records() {
        let source = map(json!({"webhookEvent": "user_created", "timestamp": 1}));
        let mut mover = FieldMover::new("webhook event", &source, cx());

        let event_type = mover
            .string(Field::new("type").source("webhookEvent"))
            .unwrap();

        assert_eq!(event_type, "user_created");
        assert_eq!(mover.target().get("type"), Some(&json!("user_created")));
        assert!(!mover.remaining().contains_key("webhookEvent"));
        assert!(mover.remaining().contains_key("timestamp"));
        assert_eq!(mover.source().len(), 2);
    }

    #[test]
    fn test_missing_required_field() {
        let source = map(json!({}));
        let mut mover = FieldMover::new("issue link", &source, cx());

        let err = mover.integer(Field::new("source").source("sourceIssueId")).unwrap_err();

        assert!(matches!(err, DecodeError::MissingField { ref name, .. } if name == "sourceIssueId"));
        assert_eq!(err.kind(), "issue link");
    }

    #[test]
    fn test_missing_optional_field() {
        let source = map(json!({}));
        let mut mover = FieldMover::new("webhook event", &source, cx());

        let value = mover
            .optional_string(Field::new("issue_event_type").source("issue_event_type_name"))
            .unwrap();

        assert_eq!(value, None);
        assert_eq!(mover.target().get("issue_event_type"), Some(&Value::Null));
    }

    #[test]
    fn test_unnamed_field_not_recorded() {
        let source = map(json!({"from": "1", "fromString": null}));
        let mut mover = FieldMover::new("issue field change", &source, cx());

        assert_eq!(mover.value(Field::new("").source("from")).unwrap(), Some(json!("1")));
        assert_eq!(mover.value(Field::new("").source("fromString")).unwrap(), None);
        assert!(mover.target().is_empty());
        assert!(mover.remaining().is_empty());
    }

    #[test]
    fn test_wrong_type() {
        let source = map(json!({"id": [1]}));
        let mut mover = FieldMover::new("changelog entry", &source, cx());

        let err = mover
            .require(
                Field::new("id").shapes(&[Shape::Integer, Shape::String]),
                transform::integer,
            )
            .unwrap_err();

        match err {
            DecodeError::WrongFieldType {
                name,
                value,
                expected,
                ..
            } => {
                assert_eq!(name, "id");
                assert_eq!(value, json!([1]));
                assert_eq!(expected, &[Shape::Integer, Shape::String]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejected_value_keeps_cause() {
        let source = map(json!({"id": "abc"}));
        let mut mover = FieldMover::new("changelog entry", &source, cx());

        let err = mover
            .require(
                Field::new("id").shapes(&[Shape::Integer, Shape::String]),
                transform::integer,
            )
            .unwrap_err();

        assert_eq!(err.field_name(), Some("id"));
        assert!(matches!(err.value_error(), Some(FieldValueError::Invalid(_))));
        assert!(mover.target().is_empty());
    }

    #[test]
    fn test_field_moves_once() {
        let source = map(json!({"name": "Blocks"}));
        let mut mover = FieldMover::new("issue link type", &source, cx());

        mover.string(Field::new("name")).unwrap();
        let err = mover.string(Field::new("name")).unwrap_err();

        assert!(matches!(err, DecodeError::MissingField { .. }));
    }

    #[test]
    fn test_check_extra() {
        let source = map(json!({"id": 1, "self": "https://jira/rest/api/2/x", "expand": ""}));
        let mut mover = FieldMover::new("issue link", &source, cx());
        mover.integer(Field::new("id")).unwrap();

        let err = mover.check_extra(true).unwrap_err();
        assert!(err.to_string().ends_with("found extra fields: expand, self"));

        let names = mover.check_extra(false).unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["expand", "self"]);

        let extras = mover.into_remaining();
        assert_eq!(extras.get("self"), Some(&json!("https://jira/rest/api/2/x")));
    }

    #[test]
    fn test_check_extra_when_exhausted() {
        let source = map(json!({"id": 1}));
        let mut mover = FieldMover::new("issue link", &source, cx());
        mover.integer(Field::new("id")).unwrap();

        assert!(mover.check_extra(true).unwrap().is_empty());
    }

    #[test]
    fn test_resource_conversion_failure() {
        let source = map(json!({"user": {"displayName": "Nobody"}}));
        let mut mover = FieldMover::new("webhook event", &source, cx());

        let err = mover
            .require_resource(Field::new("user"), ResourceKind::User)
            .unwrap_err();

        assert!(matches!(
            err.value_error(),
            Some(FieldValueError::Conversion {
                kind: ResourceKind::User,
                ..
            })
        ));
    }
}
