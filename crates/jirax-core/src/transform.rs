//! Field value transforms.
//!
//! Each transform takes ownership of a raw value that already passed the
//! shape check and either converts it or rejects it with a
//! [`FieldValueError`].

use crate::error::FieldValueError;
use crate::raw::{RawMap, Shape};
use chrono::{DateTime, Utc};
use serde_json::Value;

type Transformed<T> = Result<T, FieldValueError>;

fn unexpected(expected: &str, value: &Value) -> FieldValueError {
    FieldValueError::Invalid(format!("expected {expected}, got {}", Shape::of(value)))
}

/// Keep the value as is.
///
/// # Errors
/// Never fails.
#[allow(clippy::unnecessary_wraps)]
pub const fn identity(value: Value) -> Transformed<Value> {
    Ok(value)
}

/// Take a string.
///
/// # Errors
/// Returns `FieldValueError::Invalid` for anything but a string.
pub fn string(value: Value) -> Transformed<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(unexpected("a string", &other)),
    }
}

/// Take a boolean.
///
/// # Errors
/// Returns `FieldValueError::Invalid` for anything but a boolean.
pub fn boolean(value: Value) -> Transformed<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(unexpected("a boolean", &other)),
    }
}

/// Take an integer, coercing numeric strings such as `"10042"`.
///
/// # Errors
/// Returns `FieldValueError::Invalid` if the value does not denote an `i64`.
pub fn integer(value: Value) -> Transformed<i64> {
    match &value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| FieldValueError::Invalid(format!("{n} is not a 64-bit integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| FieldValueError::Invalid(format!("{s:?} is not an integer"))),
        other => Err(unexpected("an integer", other)),
    }
}

/// Take an object.
///
/// # Errors
/// Returns `FieldValueError::Invalid` for anything but an object.
pub fn object(value: Value) -> Transformed<RawMap> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(unexpected("an object", &other)),
    }
}

/// Take an array.
///
/// # Errors
/// Returns `FieldValueError::Invalid` for anything but an array.
pub fn array(value: Value) -> Transformed<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(unexpected("an array", &other)),
    }
}

/// Convert milliseconds since the Unix epoch into a UTC date-time.
///
/// The value is divided by 1000 in floating point, so sub-millisecond
/// fractions survive as nanoseconds.
///
/// # Errors
/// Returns `FieldValueError::Invalid` if the value is not a number or falls
/// outside the representable range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn millis_to_datetime(value: Value) -> Transformed<DateTime<Utc>> {
    let millis = value
        .as_f64()
        .ok_or_else(|| unexpected("a number", &value))?;
    let out_of_range = || FieldValueError::Invalid(format!("timestamp {value} is out of range"));

    let seconds = millis / 1000.0;
    if !seconds.is_finite() {
        return Err(out_of_range());
    }
    let mut whole = seconds.floor();
    let mut nanos = ((seconds - whole) * 1e9).round();
    if nanos >= 1e9 {
        whole += 1.0;
        nanos = 0.0;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32).ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_coercion() {
        assert_eq!(integer(json!(10042)).unwrap(), 10042);
        assert_eq!(integer(json!("10042")).unwrap(), 10042);
        assert_eq!(integer(json!(" -3 ")).unwrap(), -3);
        assert!(integer(json!("ten")).is_err());
        assert!(integer(json!(u64::MAX)).is_err());
        assert!(integer(json!(1.5)).is_err());
    }

    #[test]
    fn test_millis_to_datetime() {
        let ts = millis_to_datetime(json!(1_500_000_000_000_i64)).unwrap();
        assert_eq!(ts.timestamp(), 1_500_000_000);
        assert_eq!(ts.timestamp_subsec_nanos(), 0);

        let ts = millis_to_datetime(json!(1_500_000_000_250.5)).unwrap();
        assert_eq!(ts.timestamp(), 1_500_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 250);

        let ts = millis_to_datetime(json!(-1500)).unwrap();
        assert_eq!(ts.timestamp(), -2);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_millis_out_of_range() {
        let err = millis_to_datetime(json!(1e300)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_shape_transforms() {
        assert_eq!(string(json!("x")).unwrap(), "x");
        assert!(string(json!(1)).is_err());
        assert!(boolean(json!(true)).unwrap());
        assert_eq!(array(json!([1, 2])).unwrap().len(), 2);
        assert!(object(json!([])).is_err());
    }
}
