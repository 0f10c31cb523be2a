//! Issue links and their types.

use crate::error::Result;
use crate::mover::{Field, FieldMover};
use crate::raw::RawMap;
use crate::record::FromRaw;
use serde::Serialize;
use std::fmt;

/// A kind of relationship between two issues, e.g. "Blocks".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLinkType {
    id: i64,
    name: String,
    outward: String,
    inward: String,
    is_subtask: bool,
    is_system: bool,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl IssueLinkType {
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outward link name, typically an active verb such as "clones".
    #[must_use]
    pub fn outward(&self) -> &str {
        &self.outward
    }

    /// Inward link name, typically a passive verb such as "is cloned by".
    #[must_use]
    pub fn inward(&self) -> &str {
        &self.inward
    }

    /// Whether this type links a subtask to its parent.
    #[must_use]
    pub const fn is_subtask(&self) -> bool {
        self.is_subtask
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.is_system
    }

    #[must_use]
    pub const fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl FromRaw for IssueLinkType {
    const KIND: &'static str = "issue link type";

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            id: mover.integer(Field::new("id"))?,
            name: mover.string(Field::new("name"))?,
            outward: mover.string(Field::new("outward").source("outwardName"))?,
            inward: mover.string(Field::new("inward").source("inwardName"))?,
            is_subtask: mover.boolean(Field::new("is_subtask").source("isSubTaskLinkType"))?,
            is_system: mover.boolean(Field::new("is_system").source("isSystemLinkType"))?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A directed link from one issue to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLink {
    id: i64,
    #[serde(rename = "type")]
    link_type: IssueLinkType,
    source: i64,
    destination: i64,
    is_system: bool,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl IssueLink {
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub const fn link_type(&self) -> &IssueLinkType {
        &self.link_type
    }

    /// The source issue ID.
    #[must_use]
    pub const fn source(&self) -> i64 {
        self.source
    }

    /// The destination issue ID.
    #[must_use]
    pub const fn destination(&self) -> i64 {
        self.destination
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.is_system
    }

    #[must_use]
    pub const fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl FromRaw for IssueLink {
    const KIND: &'static str = "issue link";

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            id: mover.integer(Field::new("id"))?,
            link_type: mover.require_nested(Field::new("type").source("issueLinkType"))?,
            source: mover.integer(Field::new("source").source("sourceIssueId"))?,
            destination: mover.integer(Field::new("destination").source("destinationIssueId"))?,
            is_system: mover.boolean(Field::new("is_system").source("systemLink"))?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

impl fmt::Display for IssueLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_system {
            write!(f, "system ")?;
        }
        write!(
            f,
            "issue link ID {} \"issue {} {} issue {}\"",
            self.id, self.source, self.link_type.outward, self.destination
        )
    }
}
