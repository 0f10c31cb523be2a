//! Jira resources carried by webhook events.
//!
//! Building full resource objects (users, issues, ...) belongs to whatever
//! client layer sits on top of this crate. Decoders only need a
//! [`ResourceConverter`] that either accepts a raw sub-map or refuses it.

use crate::raw::RawMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Kind of Jira resource embedded in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Issue,
    Project,
    Board,
    Worklog,
    Comment,
    Attachment,
}

impl ResourceKind {
    /// Fields that identify a resource of this kind, in order of preference.
    #[must_use]
    pub const fn identity_keys(self) -> &'static [&'static str] {
        match self {
            Self::User => &["accountId", "key", "name"],
            Self::Issue | Self::Project => &["id", "key"],
            Self::Board | Self::Worklog | Self::Comment | Self::Attachment => &["id"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Issue => write!(f, "Issue"),
            Self::Project => write!(f, "Project"),
            Self::Board => write!(f, "Board"),
            Self::Worklog => write!(f, "Worklog"),
            Self::Comment => write!(f, "Comment"),
            Self::Attachment => write!(f, "Attachment"),
        }
    }
}

/// A Jira resource as accepted by a [`ResourceConverter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    raw: RawMap,
}

impl Resource {
    /// Create a resource from its kind, identifier and raw representation.
    #[must_use]
    pub const fn new(kind: ResourceKind, id: Option<String>, raw: RawMap) -> Self {
        Self { kind, id, raw }
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The identifying value, rendered as a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The raw representation the resource was built from.
    #[must_use]
    pub const fn raw(&self) -> &RawMap {
        &self.raw
    }

    /// Look up a raw field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

/// A converter refused a raw sub-map.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// None of the identifying fields carried a usable value.
    #[error("no identifying field among: {}", .0.join(", "))]
    MissingIdentity(&'static [&'static str]),

    /// The resource layer rejected the data for its own reasons.
    #[error("{0}")]
    Rejected(String),
}

/// Turns raw sub-maps into resources.
///
/// Implementations may do anything, including fetching related data, as long
/// as they return before the enclosing decode continues.
pub trait ResourceConverter: Send + Sync {
    /// Convert `raw` into a resource of the given kind.
    ///
    /// # Errors
    /// Returns `ConversionError` if `raw` does not describe a valid resource.
    fn convert(&self, kind: ResourceKind, raw: RawMap) -> Result<Resource, ConversionError>;
}

impl<F> ResourceConverter for F
where
    F: Fn(ResourceKind, RawMap) -> Result<Resource, ConversionError> + Send + Sync,
{
    fn convert(&self, kind: ResourceKind, raw: RawMap) -> Result<Resource, ConversionError> {
        self(kind, raw)
    }
}

/// Accepts any sub-map that carries an identifying field for its kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicConverter;

impl ResourceConverter for BasicConverter {
    fn convert(&self, kind: ResourceKind, raw: RawMap) -> Result<Resource, ConversionError> {
        let keys = kind.identity_keys();
        let id = keys
            .iter()
            .find_map(|key| match raw.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .ok_or(ConversionError::MissingIdentity(keys))?;
        Ok(Resource::new(kind, Some(id), raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> RawMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_basic_converter_prefers_account_id() {
        let user = BasicConverter
            .convert(
                ResourceKind::User,
                map(json!({"name": "alice", "accountId": "5b10a2844c20165700ede21g"})),
            )
            .unwrap();

        assert_eq!(user.kind(), ResourceKind::User);
        assert_eq!(user.id(), Some("5b10a2844c20165700ede21g"));
        assert_eq!(user.get("name"), Some(&json!("alice")));
    }

    #[test]
    fn test_basic_converter_numeric_id() {
        let board = BasicConverter
            .convert(ResourceKind::Board, map(json!({"id": 42, "name": "Sprint board"})))
            .unwrap();
        assert_eq!(board.id(), Some("42"));
    }

    #[test]
    fn test_basic_converter_rejects_anonymous() {
        let err = BasicConverter
            .convert(ResourceKind::Issue, map(json!({"id": "", "fields": {}})))
            .unwrap_err();
        assert_eq!(err.to_string(), "no identifying field among: id, key");
    }

    #[test]
    fn test_closure_converter() {
        let refuse = |_: ResourceKind, _: RawMap| -> Result<Resource, ConversionError> {
            Err(ConversionError::Rejected("session closed".to_string()))
        };
        let err = refuse.convert(ResourceKind::Comment, RawMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "session closed");
    }
}
