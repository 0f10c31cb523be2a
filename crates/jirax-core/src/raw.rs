//! Raw payload shapes.
//!
//! Webhook bodies arrive as untyped JSON trees. Decoders never look at Rust
//! types here; they check a value against a small closed set of [`Shape`]s.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// An untyped key/value tree as parsed from a webhook body.
pub type RawMap = Map<String, Value>;

/// The runtime shape of a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Null,
    Bool,
    /// A number without a fractional part that fits `i64` or `u64`.
    Integer,
    /// A number that is not an [`Shape::Integer`].
    Float,
    String,
    Array,
    Object,
}

impl Shape {
    /// Shapes accepted for numeric fields.
    pub const NUMBER: &'static [Self] = &[Self::Integer, Self::Float];

    /// Return the shape of `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Check whether `value` has this shape.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        Self::of(value) == self
    }

    /// The lowercase name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check whether `value` matches any of `shapes`.
#[must_use]
pub fn is_of_shape(value: &Value, shapes: &[Shape]) -> bool {
    shapes.iter().any(|shape| shape.matches(value))
}

/// Render shapes as a comma separated list, e.g. `integer, string`.
#[must_use]
pub fn shape_names(shapes: &[Shape]) -> String {
    shapes
        .iter()
        .map(|shape| shape.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_of_numbers() {
        assert_eq!(Shape::of(&json!(1)), Shape::Integer);
        assert_eq!(Shape::of(&json!(-7)), Shape::Integer);
        assert_eq!(Shape::of(&json!(u64::MAX)), Shape::Integer);
        assert_eq!(Shape::of(&json!(1.5)), Shape::Float);
    }

    #[test]
    fn test_is_of_shape() {
        assert!(is_of_shape(&json!("x"), &[Shape::Integer, Shape::String]));
        assert!(is_of_shape(&json!(1_500_000_000_000_i64), Shape::NUMBER));
        assert!(!is_of_shape(&json!(null), &[Shape::String]));
        assert!(!is_of_shape(&json!({}), &[]));
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(shape_names(&[Shape::Integer, Shape::String]), "integer, string");
        assert_eq!(Shape::Object.to_string(), "object");
    }
}
