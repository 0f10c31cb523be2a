//! Jira webhook events.
//!
//! Each event record is assembled from fragments: the [`EventHeader`] every
//! event has, then whichever of [`WithUser`], [`WithIssue`], [`WithComment`]
//! and [`WithIssueLink`] apply, always extracted in that order, then the
//! record's own fields.
//!
//! See the [Jira webhook documentation] for the payloads.
//!
//! [Jira webhook documentation]: https://developer.atlassian.com/cloud/jira/software/webhooks/

use crate::changelog::Change;
use crate::dispatch::{EventKind, DISCRIMINATOR};
use crate::error::Result;
use crate::issuelink::IssueLink;
use crate::mover::{Field, FieldMover};
use crate::raw::{RawMap, Shape};
use crate::record::FromRaw;
use crate::resource::{Resource, ResourceKind};
use crate::transform;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind label for errors raised while decoding any webhook event.
pub const KIND: &str = "webhook event";

/// A group of fields shared by several event records.
pub trait Fragment: Sized {
    /// Move this fragment's fields out of `mover`.
    ///
    /// # Errors
    /// Returns `DecodeError` if a field is missing, mistyped, or rejected.
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self>;
}

/// Read access shared by all event records.
pub trait EventRecord {
    fn header(&self) -> &EventHeader;

    /// Unrecognized fields kept from the payload.
    fn extras(&self) -> &RawMap;
}

/// Fields every webhook event carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventHeader {
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    event_type: String,
}

impl EventHeader {
    /// When the event happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The `webhookEvent` string, e.g. `"jira:issue_updated"`.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

impl Fragment for EventHeader {
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            timestamp: mover.require(
                Field::new("timestamp").shapes(Shape::NUMBER),
                transform::millis_to_datetime,
            )?,
            event_type: mover.string(Field::new("type").source(DISCRIMINATOR))?,
        })
    }
}

/// The user an event is about or was caused by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithUser {
    user: Resource,
}

impl Fragment for WithUser {
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            user: mover.require_resource(Field::new("user"), ResourceKind::User)?,
        })
    }
}

/// The issue an event is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithIssue {
    issue: Resource,
}

impl Fragment for WithIssue {
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            issue: mover.require_resource(Field::new("issue"), ResourceKind::Issue)?,
        })
    }
}

/// The comment an event is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithComment {
    comment: Resource,
}

impl Fragment for WithComment {
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            comment: mover.require_resource(Field::new("comment"), ResourceKind::Comment)?,
        })
    }
}

/// A comment that may accompany an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithOptionalComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<Resource>,
}

impl Fragment for WithOptionalComment {
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            comment: mover.resource(Field::new("comment").optional(), ResourceKind::Comment)?,
        })
    }
}

/// The issue link an event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithIssueLink {
    issue_link: IssueLink,
}

impl Fragment for WithIssueLink {
    fn extract(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            issue_link: mover.require_nested(Field::new("issue_link").source("issueLink"))?,
        })
    }
}

/// An event of a type this crate does not know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericEvent {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl FromRaw for GenericEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A user was created, updated, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEvent {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(flatten)]
    user: WithUser,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl UserEvent {
    #[must_use]
    pub const fn user(&self) -> &Resource {
        &self.user.user
    }
}

impl FromRaw for UserEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            user: WithUser::extract(mover)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A project was created, updated, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEvent {
    #[serde(flatten)]
    header: EventHeader,
    project: Resource,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl ProjectEvent {
    #[must_use]
    pub const fn project(&self) -> &Resource {
        &self.project
    }
}

impl FromRaw for ProjectEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            project: mover.require_resource(Field::new("project"), ResourceKind::Project)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A board was created, updated, reconfigured, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEvent {
    #[serde(flatten)]
    header: EventHeader,
    board: Resource,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl BoardEvent {
    #[must_use]
    pub const fn board(&self) -> &Resource {
        &self.board
    }
}

impl FromRaw for BoardEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            board: mover.require_resource(Field::new("board"), ResourceKind::Board)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// An issue was created or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueEvent {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(flatten)]
    user: WithUser,
    #[serde(flatten)]
    issue: WithIssue,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_event_type: Option<String>,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl IssueEvent {
    #[must_use]
    pub const fn user(&self) -> &Resource {
        &self.user.user
    }

    #[must_use]
    pub const fn issue(&self) -> &Resource {
        &self.issue.issue
    }

    /// The `issue_event_type_name`, e.g. `"issue_generic"`.
    #[must_use]
    pub fn issue_event_type(&self) -> Option<&str> {
        self.issue_event_type.as_deref()
    }
}

fn issue_event_type(mover: &mut FieldMover<'_>) -> Result<Option<String>> {
    mover.optional_string(Field::new("issue_event_type").source("issue_event_type_name"))
}

impl FromRaw for IssueEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            user: WithUser::extract(mover)?,
            issue: WithIssue::extract(mover)?,
            issue_event_type: issue_event_type(mover)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// An issue was updated, possibly with a comment and a changelog entry.
///
/// Also used for work logged on an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueUpdatedEvent {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(flatten)]
    user: WithUser,
    #[serde(flatten)]
    issue: WithIssue,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_event_type: Option<String>,
    #[serde(flatten)]
    comment: WithOptionalComment,
    #[serde(skip_serializing_if = "Option::is_none")]
    change: Option<Change>,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl IssueUpdatedEvent {
    #[must_use]
    pub const fn user(&self) -> &Resource {
        &self.user.user
    }

    #[must_use]
    pub const fn issue(&self) -> &Resource {
        &self.issue.issue
    }

    #[must_use]
    pub fn issue_event_type(&self) -> Option<&str> {
        self.issue_event_type.as_deref()
    }

    #[must_use]
    pub const fn comment(&self) -> Option<&Resource> {
        self.comment.comment.as_ref()
    }

    /// What changed, if the payload carried a changelog.
    #[must_use]
    pub const fn change(&self) -> Option<&Change> {
        self.change.as_ref()
    }
}

impl FromRaw for IssueUpdatedEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            user: WithUser::extract(mover)?,
            issue: WithIssue::extract(mover)?,
            issue_event_type: issue_event_type(mover)?,
            comment: WithOptionalComment::extract(mover)?,
            change: mover.nested(Field::new("change").source("changelog").optional())?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A worklog was created, updated, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorklogEvent {
    #[serde(flatten)]
    header: EventHeader,
    worklog: Resource,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl WorklogEvent {
    #[must_use]
    pub const fn worklog(&self) -> &Resource {
        &self.worklog
    }
}

impl FromRaw for WorklogEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            worklog: mover.require_resource(Field::new("worklog"), ResourceKind::Worklog)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// A comment was created, updated, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentEvent {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(flatten)]
    comment: WithComment,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl CommentEvent {
    #[must_use]
    pub const fn comment(&self) -> &Resource {
        &self.comment.comment
    }
}

impl FromRaw for CommentEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            comment: WithComment::extract(mover)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// An issue link was created or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLinkEvent {
    #[serde(flatten)]
    header: EventHeader,
    #[serde(flatten)]
    link: WithIssueLink,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl IssueLinkEvent {
    #[must_use]
    pub const fn issue_link(&self) -> &IssueLink {
        &self.link.issue_link
    }
}

impl FromRaw for IssueLinkEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            link: WithIssueLink::extract(mover)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

/// An attachment was created or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentEvent {
    #[serde(flatten)]
    header: EventHeader,
    attachment: Resource,
    #[serde(skip_serializing_if = "RawMap::is_empty")]
    extras: RawMap,
}

impl AttachmentEvent {
    #[must_use]
    pub const fn attachment(&self) -> &Resource {
        &self.attachment
    }
}

impl FromRaw for AttachmentEvent {
    const KIND: &'static str = KIND;

    fn collect(mover: &mut FieldMover<'_>) -> Result<Self> {
        Ok(Self {
            header: EventHeader::extract(mover)?,
            attachment: mover.require_resource(Field::new("attachment"), ResourceKind::Attachment)?,
            extras: RawMap::new(),
        })
    }

    fn with_extras(self, extras: RawMap) -> Self {
        Self { extras, ..self }
    }
}

impl EventRecord for GenericEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for UserEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for ProjectEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for BoardEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for IssueEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for IssueUpdatedEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for WorklogEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for CommentEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for IssueLinkEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

impl EventRecord for AttachmentEvent {
    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn extras(&self) -> &RawMap {
        &self.extras
    }
}

/// A decoded webhook event, one arm per `webhookEvent` value.
///
/// Serializes as the inner record, whose `type` field carries the
/// discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WebhookEvent {
    UserCreated(UserEvent),
    UserUpdated(UserEvent),
    UserDeleted(UserEvent),
    ProjectCreated(ProjectEvent),
    ProjectUpdated(ProjectEvent),
    ProjectDeleted(ProjectEvent),
    BoardCreated(BoardEvent),
    BoardUpdated(BoardEvent),
    BoardConfigurationChanged(BoardEvent),
    BoardDeleted(BoardEvent),
    IssueCreated(IssueEvent),
    IssueUpdated(IssueUpdatedEvent),
    IssueDeleted(IssueEvent),
    /// Work was logged on an issue (`jira:worklog_updated`).
    IssueWorkLogged(IssueUpdatedEvent),
    WorklogCreated(WorklogEvent),
    WorklogUpdated(WorklogEvent),
    WorklogDeleted(WorklogEvent),
    CommentCreated(CommentEvent),
    CommentUpdated(CommentEvent),
    CommentDeleted(CommentEvent),
    IssueLinkCreated(IssueLinkEvent),
    IssueLinkDeleted(IssueLinkEvent),
    AttachmentCreated(AttachmentEvent),
    AttachmentDeleted(AttachmentEvent),
    /// Fallback for unknown event types in non-strict decoding.
    Generic(GenericEvent),
}

impl WebhookEvent {
    /// The registered kind, or `None` for [`WebhookEvent::Generic`].
    #[must_use]
    pub const fn kind(&self) -> Option<EventKind> {
        Some(match self {
            Self::UserCreated(_) => EventKind::UserCreated,
            Self::UserUpdated(_) => EventKind::UserUpdated,
            Self::UserDeleted(_) => EventKind::UserDeleted,
            Self::ProjectCreated(_) => EventKind::ProjectCreated,
            Self::ProjectUpdated(_) => EventKind::ProjectUpdated,
            Self::ProjectDeleted(_) => EventKind::ProjectDeleted,
            Self::BoardCreated(_) => EventKind::BoardCreated,
            Self::BoardUpdated(_) => EventKind::BoardUpdated,
            Self::BoardConfigurationChanged(_) => EventKind::BoardConfigurationChanged,
            Self::BoardDeleted(_) => EventKind::BoardDeleted,
            Self::IssueCreated(_) => EventKind::IssueCreated,
            Self::IssueUpdated(_) => EventKind::IssueUpdated,
            Self::IssueDeleted(_) => EventKind::IssueDeleted,
            Self::IssueWorkLogged(_) => EventKind::IssueWorkLogged,
            Self::WorklogCreated(_) => EventKind::WorklogCreated,
            Self::WorklogUpdated(_) => EventKind::WorklogUpdated,
            Self::WorklogDeleted(_) => EventKind::WorklogDeleted,
            Self::CommentCreated(_) => EventKind::CommentCreated,
            Self::CommentUpdated(_) => EventKind::CommentUpdated,
            Self::CommentDeleted(_) => EventKind::CommentDeleted,
            Self::IssueLinkCreated(_) => EventKind::IssueLinkCreated,
            Self::IssueLinkDeleted(_) => EventKind::IssueLinkDeleted,
            Self::AttachmentCreated(_) => EventKind::AttachmentCreated,
            Self::AttachmentDeleted(_) => EventKind::AttachmentDeleted,
            Self::Generic(_) => return None,
        })
    }

    fn record(&self) -> &dyn EventRecord {
        match self {
            Self::UserCreated(e) | Self::UserUpdated(e) | Self::UserDeleted(e) => e,
            Self::ProjectCreated(e) | Self::ProjectUpdated(e) | Self::ProjectDeleted(e) => e,
            Self::BoardCreated(e)
            | Self::BoardUpdated(e)
            | Self::BoardConfigurationChanged(e)
            | Self::BoardDeleted(e) => e,
            Self::IssueCreated(e) | Self::IssueDeleted(e) => e,
            Self::IssueUpdated(e) | Self::IssueWorkLogged(e) => e,
            Self::WorklogCreated(e) | Self::WorklogUpdated(e) | Self::WorklogDeleted(e) => e,
            Self::CommentCreated(e) | Self::CommentUpdated(e) | Self::CommentDeleted(e) => e,
            Self::IssueLinkCreated(e) | Self::IssueLinkDeleted(e) => e,
            Self::AttachmentCreated(e) | Self::AttachmentDeleted(e) => e,
            Self::Generic(e) => e,
        }
    }

    #[must_use]
    pub fn header(&self) -> &EventHeader {
        self.record().header()
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header().timestamp()
    }

    /// The `webhookEvent` string as received.
    #[must_use]
    pub fn event_type(&self) -> &str {
        self.header().event_type()
    }

    /// Unrecognized top-level fields kept from the payload.
    #[must_use]
    pub fn extras(&self) -> &RawMap {
        self.record().extras()
    }

    /// The user, for user and issue events.
    #[must_use]
    pub const fn user(&self) -> Option<&Resource> {
        match self {
            Self::UserCreated(e) | Self::UserUpdated(e) | Self::UserDeleted(e) => Some(e.user()),
            Self::IssueCreated(e) | Self::IssueDeleted(e) => Some(e.user()),
            Self::IssueUpdated(e) | Self::IssueWorkLogged(e) => Some(e.user()),
            _ => None,
        }
    }

    /// The issue, for issue events.
    #[must_use]
    pub const fn issue(&self) -> Option<&Resource> {
        match self {
            Self::IssueCreated(e) | Self::IssueDeleted(e) => Some(e.issue()),
            Self::IssueUpdated(e) | Self::IssueWorkLogged(e) => Some(e.issue()),
            _ => None,
        }
    }

    /// The comment, for comment events and commented issue updates.
    #[must_use]
    pub const fn comment(&self) -> Option<&Resource> {
        match self {
            Self::CommentCreated(e) | Self::CommentUpdated(e) | Self::CommentDeleted(e) => {
                Some(e.comment())
            }
            Self::IssueUpdated(e) | Self::IssueWorkLogged(e) => e.comment(),
            _ => None,
        }
    }

    /// The changelog entry, for issue updates that carry one.
    #[must_use]
    pub const fn change(&self) -> Option<&Change> {
        match self {
            Self::IssueUpdated(e) | Self::IssueWorkLogged(e) => e.change(),
            _ => None,
        }
    }

    /// The issue link, for issue link events.
    #[must_use]
    pub const fn issue_link(&self) -> Option<&IssueLink> {
        match self {
            Self::IssueLinkCreated(e) | Self::IssueLinkDeleted(e) => Some(e.issue_link()),
            _ => None,
        }
    }

    /// The resource a project, board, worklog, or attachment event is about.
    #[must_use]
    pub const fn resource(&self) -> Option<&Resource> {
        match self {
            Self::ProjectCreated(e) | Self::ProjectUpdated(e) | Self::ProjectDeleted(e) => {
                Some(e.project())
            }
            Self::BoardCreated(e)
            | Self::BoardUpdated(e)
            | Self::BoardConfigurationChanged(e)
            | Self::BoardDeleted(e) => Some(e.board()),
            Self::WorklogCreated(e) | Self::WorklogUpdated(e) | Self::WorklogDeleted(e) => {
                Some(e.worklog())
            }
            Self::AttachmentCreated(e) | Self::AttachmentDeleted(e) => Some(e.attachment()),
            _ => None,
        }
    }
}
