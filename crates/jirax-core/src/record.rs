//! Typed-record construction from raw data.
//!
//! A decodable record implements [`FromRaw::collect`] as a sequence of field
//! moves. [`FromRaw::from_raw`] drives it: open a mover over the raw map,
//! collect, apply the extra-field policy, attach leftovers as extras.

use crate::error::{FieldValueError, Result};
use crate::mover::FieldMover;
use crate::raw::{RawMap, Shape};
use crate::resource::{BasicConverter, ResourceConverter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Policy for unknown discriminators and unconsumed fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unknown discriminators and extra fields are errors.
    #[default]
    Strict,
    /// Unknown discriminators fall back to a generic event; extra fields are
    /// logged and kept as extras.
    Warn,
    /// Like [`Strictness::Warn`] but silent, and extra fields are not checked.
    Ignore,
}

impl Strictness {
    /// The `strict` argument for [`FieldMover::check_extra`], or `None` to
    /// skip the check.
    #[must_use]
    pub const fn extra_policy(self) -> Option<bool> {
        match self {
            Self::Strict => Some(true),
            Self::Warn => Some(false),
            Self::Ignore => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Warn => "warn",
            Self::Ignore => "ignore",
        }
    }
}

impl From<Option<bool>> for Strictness {
    fn from(strict: Option<bool>) -> Self {
        match strict {
            Some(true) => Self::Strict,
            Some(false) => Self::Warn,
            None => Self::Ignore,
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized strictness name.
#[derive(Debug, Error)]
#[error("invalid strictness '{0}', expected one of: true, false, none, strict, warn, ignore")]
pub struct ParseStrictnessError(String);

impl FromStr for Strictness {
    type Err = ParseStrictnessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "strict" => Ok(Self::Strict),
            "false" | "warn" => Ok(Self::Warn),
            "none" | "ignore" => Ok(Self::Ignore),
            _ => Err(ParseStrictnessError(s.to_string())),
        }
    }
}

/// Everything a decode call needs besides the raw data.
#[derive(Clone, Copy)]
pub struct DecodeContext<'c> {
    strictness: Strictness,
    converter: &'c dyn ResourceConverter,
}

impl DecodeContext<'static> {
    /// A context using [`BasicConverter`] for embedded resources.
    #[must_use]
    pub const fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            converter: &BasicConverter,
        }
    }
}

impl<'c> DecodeContext<'c> {
    /// Use `converter` for embedded resources.
    #[must_use]
    pub const fn with_converter<'d>(
        self,
        converter: &'d dyn ResourceConverter,
    ) -> DecodeContext<'d> {
        DecodeContext {
            strictness: self.strictness,
            converter,
        }
    }

    /// The same context with a different strictness.
    #[must_use]
    pub const fn with_strictness(self, strictness: Strictness) -> Self {
        Self { strictness, ..self }
    }

    #[must_use]
    pub const fn strictness(&self) -> Strictness {
        self.strictness
    }

    #[must_use]
    pub const fn converter(&self) -> &'c dyn ResourceConverter {
        self.converter
    }
}

impl Default for DecodeContext<'static> {
    fn default() -> Self {
        Self::new(Strictness::default())
    }
}

impl fmt::Debug for DecodeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("strictness", &self.strictness)
            .finish_non_exhaustive()
    }
}

/// A record that can be decoded from raw data.
pub trait FromRaw: Sized {
    /// The kind of raw data, used in error messages.
    const KIND: &'static str;

    /// Move every field the record needs out of `mover` and build the record.
    ///
    /// Errors propagate unchanged; implementations never recover locally.
    ///
    /// # Errors
    /// Returns `DecodeError` if a field is missing, mistyped, or rejected.
    fn collect(mover: &mut FieldMover<'_>) -> Result<Self>;

    /// Attach the fields that were left unconsumed.
    #[must_use]
    fn with_extras(self, extras: RawMap) -> Self;

    /// Decode `raw` using the default resource converter.
    ///
    /// # Errors
    /// Returns `DecodeError` if `raw` does not describe a valid record.
    fn from_raw(raw: &RawMap, strictness: Strictness) -> Result<Self> {
        Self::from_raw_with(raw, DecodeContext::new(strictness))
    }

    /// Decode `raw` within the given context.
    ///
    /// # Errors
    /// Returns `DecodeError` if `raw` does not describe a valid record.
    fn from_raw_with(raw: &RawMap, cx: DecodeContext<'_>) -> Result<Self> {
        let mut mover = FieldMover::new(Self::KIND, raw, cx);
        let record = Self::collect(&mut mover)?;
        if let Some(strict) = cx.strictness().extra_policy() {
            mover.check_extra(strict)?;
        }
        Ok(record.with_extras(mover.into_remaining()))
    }
}

/// Decode one element of a raw collection, for use inside a field transform.
///
/// Elements are always decoded strictly, whatever the strictness of `cx`.
///
/// # Errors
/// Returns `FieldValueError::Element` if the element is not an object or
/// does not decode.
pub fn decode_element<T: FromRaw>(
    index: usize,
    value: Value,
    cx: DecodeContext<'_>,
) -> std::result::Result<T, FieldValueError> {
    let Value::Object(raw) = value else {
        return Err(FieldValueError::Invalid(format!(
            "element {index} is {}, not an object",
            Shape::of(&value)
        )));
    };
    let cx = cx.with_strictness(Strictness::Strict);
    T::from_raw_with(&raw, cx).map_err(|e| FieldValueError::Element {
        index,
        cause: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictness_parse() {
        assert_eq!("true".parse::<Strictness>().unwrap(), Strictness::Strict);
        assert_eq!("False".parse::<Strictness>().unwrap(), Strictness::Warn);
        assert_eq!("none".parse::<Strictness>().unwrap(), Strictness::Ignore);
        assert_eq!("ignore".parse::<Strictness>().unwrap(), Strictness::Ignore);
        assert!("maybe".parse::<Strictness>().is_err());
    }

    #[test]
    fn test_strictness_from_option() {
        assert_eq!(Strictness::from(Some(true)), Strictness::Strict);
        assert_eq!(Strictness::from(Some(false)), Strictness::Warn);
        assert_eq!(Strictness::from(None), Strictness::Ignore);
        assert_eq!(Strictness::Ignore.extra_policy(), None);
    }

    #[test]
    fn test_strictness_serde() {
        let value = serde_json::to_value(Strictness::Warn).unwrap();
        assert_eq!(value, serde_json::json!("warn"));
        let parsed: Strictness = serde_json::from_value(serde_json::json!("ignore")).unwrap();
        assert_eq!(parsed, Strictness::Ignore);
    }

    #[test]
    fn test_with_strictness_overrides_policy() {
        let cx = DecodeContext::new(Strictness::Ignore).with_strictness(Strictness::Strict);
        assert_eq!(cx.strictness(), Strictness::Strict);
        assert_eq!(DecodeContext::default().strictness(), Strictness::Strict);
    }
}
