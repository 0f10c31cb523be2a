//! Error types for jirax-core.

use crate::changelog::FieldChange;
use crate::raw::{shape_names, Shape};
use crate::resource::{ConversionError, ResourceKind};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Raw data could not be decoded into a typed record.
///
/// Every variant carries the kind of record being decoded (e.g.
/// `"changelog entry"`) and the offending raw data.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A required field is absent.
    #[error("raw {kind} {raw}: field {name}: is missing")]
    MissingField {
        kind: &'static str,
        raw: Value,
        name: String,
    },

    /// A field is present but has none of the expected shapes.
    #[error(
        "raw {kind} {raw}: field {name}: value {value} is {} but should be one of: {}",
        Shape::of(.value),
        shape_names(.expected)
    )]
    WrongFieldType {
        kind: &'static str,
        raw: Value,
        name: String,
        value: Value,
        expected: &'static [Shape],
    },

    /// A field passed the shape check but its transform rejected it.
    #[error("raw {kind} {raw}: field {name}: invalid field value {value}")]
    RejectedFieldValue {
        kind: &'static str,
        raw: Value,
        name: String,
        value: Value,
        #[source]
        cause: FieldValueError,
    },

    /// Strict decoding left fields unconsumed.
    #[error(
        "raw {kind} {raw}: found extra fields: {}",
        .names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    )]
    ExtraFields {
        kind: &'static str,
        raw: Value,
        names: BTreeSet<String>,
    },

    /// The discriminator field is absent.
    #[error("raw {kind} {raw}: type tag is missing")]
    MissingDiscriminator { kind: &'static str, raw: Value },

    /// The discriminator names no registered variant.
    #[error("raw {kind} {raw}: unknown webhook event type {value:?}")]
    UnknownDiscriminator {
        kind: &'static str,
        raw: Value,
        value: String,
    },
}

impl DecodeError {
    /// The kind of record that was being decoded.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { kind, .. }
            | Self::WrongFieldType { kind, .. }
            | Self::RejectedFieldValue { kind, .. }
            | Self::ExtraFields { kind, .. }
            | Self::MissingDiscriminator { kind, .. }
            | Self::UnknownDiscriminator { kind, .. } => *kind,
        }
    }

    /// The offending raw data.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        match self {
            Self::MissingField { raw, .. }
            | Self::WrongFieldType { raw, .. }
            | Self::RejectedFieldValue { raw, .. }
            | Self::ExtraFields { raw, .. }
            | Self::MissingDiscriminator { raw, .. }
            | Self::UnknownDiscriminator { raw, .. } => raw,
        }
    }

    /// The source name of the offending field, for field-level errors.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::MissingField { name, .. }
            | Self::WrongFieldType { name, .. }
            | Self::RejectedFieldValue { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The transform-level cause of a [`DecodeError::RejectedFieldValue`].
    #[must_use]
    pub const fn value_error(&self) -> Option<&FieldValueError> {
        match self {
            Self::RejectedFieldValue { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Follow nested-record and element rejections down to the error that
    /// started them.
    #[must_use]
    pub fn innermost(&self) -> &Self {
        let mut current = self;
        while let Some(
            FieldValueError::Nested(inner) | FieldValueError::Element { cause: inner, .. },
        ) = current.value_error()
        {
            current = inner;
        }
        current
    }

    /// The dotted source-field path from this record down to the innermost error.
    ///
    /// Collection elements contribute their index, e.g. `changelog.items.1.fieldId`.
    #[must_use]
    pub fn field_path(&self) -> String {
        let mut parts = Vec::new();
        let mut current = self;
        loop {
            if let Some(name) = current.field_name() {
                parts.push(name.to_string());
            }
            match current.value_error() {
                Some(FieldValueError::Nested(inner)) => current = inner,
                Some(FieldValueError::Element { index, cause }) => {
                    parts.push(index.to_string());
                    current = cause;
                }
                _ => break,
            }
        }
        parts.join(".")
    }
}

/// A field transform rejected a value.
///
/// Transforms return this; the field mover wraps it into
/// [`DecodeError::RejectedFieldValue`].
#[derive(Debug, Error)]
pub enum FieldValueError {
    /// Two elements of a keyed collection share a key.
    #[error("duplicate key {key:?}: {first} versus {second}")]
    DuplicateKey {
        key: String,
        /// The element seen first.
        first: Box<FieldChange>,
        /// The element that tried to replace it.
        second: Box<FieldChange>,
    },

    /// A collection required to be non-empty was empty.
    #[error("collection is empty")]
    EmptyCollection,

    /// A nested record failed to decode.
    #[error("invalid {}", .0.kind())]
    Nested(#[source] Box<DecodeError>),

    /// An element of a collection failed to decode.
    #[error("invalid element {index}")]
    Element {
        index: usize,
        #[source]
        cause: Box<DecodeError>,
    },

    /// The resource layer refused the sub-map.
    #[error("invalid Jira {kind}")]
    Conversion {
        kind: ResourceKind,
        #[source]
        cause: ConversionError,
    },

    /// The value is out of range or otherwise unusable.
    #[error("{0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as _;

    fn missing(kind: &'static str, name: &str) -> DecodeError {
        DecodeError::MissingField {
            kind,
            raw: json!({}),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            missing("issue link", "id").to_string(),
            "raw issue link {}: field id: is missing"
        );

        let err = DecodeError::WrongFieldType {
            kind: "changelog entry",
            raw: json!({"id": true}),
            name: "id".to_string(),
            value: json!(true),
            expected: &[Shape::Integer, Shape::String],
        };
        assert_eq!(
            err.to_string(),
            r#"raw changelog entry {"id":true}: field id: value true is bool but should be one of: integer, string"#
        );

        let err = DecodeError::ExtraFields {
            kind: "webhook event",
            raw: json!({}),
            names: ["zeta", "alpha"].into_iter().map(String::from).collect(),
        };
        assert!(err.to_string().ends_with("found extra fields: alpha, zeta"));
    }

    #[test]
    fn test_source_chain_and_path() {
        let err = DecodeError::RejectedFieldValue {
            kind: "webhook event",
            raw: json!({}),
            name: "changelog".to_string(),
            value: json!({}),
            cause: FieldValueError::Nested(Box::new(DecodeError::RejectedFieldValue {
                kind: "changelog entry",
                raw: json!({}),
                name: "items".to_string(),
                value: json!([]),
                cause: FieldValueError::Element {
                    index: 1,
                    cause: Box::new(missing("issue field change", "fieldId")),
                },
            })),
        };

        assert_eq!(err.field_path(), "changelog.items.1.fieldId");
        assert_eq!(err.innermost().kind(), "issue field change");
        assert_eq!(err.innermost().field_name(), Some("fieldId"));

        let cause = err.source().expect("nested cause");
        assert_eq!(cause.to_string(), "invalid changelog entry");
        assert!(cause.source().is_some());
    }
}
