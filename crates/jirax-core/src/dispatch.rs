//! Discriminator-based webhook event dispatch.

use crate::error::{DecodeError, Result};
use crate::raw::{RawMap, Shape};
use crate::record::{DecodeContext, FromRaw, Strictness};
use crate::webhook::{GenericEvent, WebhookEvent, KIND};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Raw field that selects the event type.
pub const DISCRIMINATOR: &str = "webhookEvent";

/// Decodes raw data into one arm of [`WebhookEvent`].
pub type DecodeFn = fn(&RawMap, DecodeContext<'_>) -> Result<WebhookEvent>;

/// Every event type the dispatcher knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum EventKind {
    UserCreated,
    UserUpdated,
    UserDeleted,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    BoardCreated,
    BoardUpdated,
    BoardConfigurationChanged,
    BoardDeleted,
    IssueCreated,
    IssueUpdated,
    IssueDeleted,
    IssueWorkLogged,
    WorklogCreated,
    WorklogUpdated,
    WorklogDeleted,
    CommentCreated,
    CommentUpdated,
    CommentDeleted,
    IssueLinkCreated,
    IssueLinkDeleted,
    AttachmentCreated,
    AttachmentDeleted,
}

impl EventKind {
    pub const ALL: [Self; 24] = [
        Self::UserCreated,
        Self::UserUpdated,
        Self::UserDeleted,
        Self::ProjectCreated,
        Self::ProjectUpdated,
        Self::ProjectDeleted,
        Self::BoardCreated,
        Self::BoardUpdated,
        Self::BoardConfigurationChanged,
        Self::BoardDeleted,
        Self::IssueCreated,
        Self::IssueUpdated,
        Self::IssueDeleted,
        Self::IssueWorkLogged,
        Self::WorklogCreated,
        Self::WorklogUpdated,
        Self::WorklogDeleted,
        Self::CommentCreated,
        Self::CommentUpdated,
        Self::CommentDeleted,
        Self::IssueLinkCreated,
        Self::IssueLinkDeleted,
        Self::AttachmentCreated,
        Self::AttachmentDeleted,
    ];

    /// The `webhookEvent` value for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserCreated => "user_created",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::ProjectDeleted => "project_deleted",
            Self::BoardCreated => "board_created",
            Self::BoardUpdated => "board_updated",
            Self::BoardConfigurationChanged => "board_configuration_changed",
            Self::BoardDeleted => "board_deleted",
            Self::IssueCreated => "jira:issue_created",
            Self::IssueUpdated => "jira:issue_updated",
            Self::IssueDeleted => "jira:issue_deleted",
            Self::IssueWorkLogged => "jira:worklog_updated",
            Self::WorklogCreated => "worklog_created",
            Self::WorklogUpdated => "worklog_updated",
            Self::WorklogDeleted => "worklog_deleted",
            Self::CommentCreated => "comment_created",
            Self::CommentUpdated => "comment_updated",
            Self::CommentDeleted => "comment_deleted",
            Self::IssueLinkCreated => "issuelink_created",
            Self::IssueLinkDeleted => "issuelink_deleted",
            Self::AttachmentCreated => "attachment_created",
            Self::AttachmentDeleted => "attachment_deleted",
        }
    }

    /// Look up a kind by its `webhookEvent` value. Matching is exact.
    #[must_use]
    pub fn from_discriminator(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// The family of entity this event is about, e.g. `"issue"`.
    #[must_use]
    pub const fn family(self) -> &'static str {
        match self {
            Self::UserCreated | Self::UserUpdated | Self::UserDeleted => "user",
            Self::ProjectCreated | Self::ProjectUpdated | Self::ProjectDeleted => "project",
            Self::BoardCreated
            | Self::BoardUpdated
            | Self::BoardConfigurationChanged
            | Self::BoardDeleted => "board",
            Self::IssueCreated | Self::IssueUpdated | Self::IssueDeleted | Self::IssueWorkLogged => {
                "issue"
            }
            Self::WorklogCreated | Self::WorklogUpdated | Self::WorklogDeleted => "worklog",
            Self::CommentCreated | Self::CommentUpdated | Self::CommentDeleted => "comment",
            Self::IssueLinkCreated | Self::IssueLinkDeleted => "issue link",
            Self::AttachmentCreated | Self::AttachmentDeleted => "attachment",
        }
    }

    /// The decode function registered for this kind.
    #[must_use]
    pub fn decoder(self) -> DecodeFn {
        match self {
            Self::UserCreated => |raw, cx| decode_as(raw, cx, WebhookEvent::UserCreated),
            Self::UserUpdated => |raw, cx| decode_as(raw, cx, WebhookEvent::UserUpdated),
            Self::UserDeleted => |raw, cx| decode_as(raw, cx, WebhookEvent::UserDeleted),
            Self::ProjectCreated => |raw, cx| decode_as(raw, cx, WebhookEvent::ProjectCreated),
            Self::ProjectUpdated => |raw, cx| decode_as(raw, cx, WebhookEvent::ProjectUpdated),
            Self::ProjectDeleted => |raw, cx| decode_as(raw, cx, WebhookEvent::ProjectDeleted),
            Self::BoardCreated => |raw, cx| decode_as(raw, cx, WebhookEvent::BoardCreated),
            Self::BoardUpdated => |raw, cx| decode_as(raw, cx, WebhookEvent::BoardUpdated),
            Self::BoardConfigurationChanged => {
                |raw, cx| decode_as(raw, cx, WebhookEvent::BoardConfigurationChanged)
            }
            Self::BoardDeleted => |raw, cx| decode_as(raw, cx, WebhookEvent::BoardDeleted),
            Self::IssueCreated => |raw, cx| decode_as(raw, cx, WebhookEvent::IssueCreated),
            Self::IssueUpdated => |raw, cx| decode_as(raw, cx, WebhookEvent::IssueUpdated),
            Self::IssueDeleted => |raw, cx| decode_as(raw, cx, WebhookEvent::IssueDeleted),
            Self::IssueWorkLogged => |raw, cx| decode_as(raw, cx, WebhookEvent::IssueWorkLogged),
            Self::WorklogCreated => |raw, cx| decode_as(raw, cx, WebhookEvent::WorklogCreated),
            Self::WorklogUpdated => |raw, cx| decode_as(raw, cx, WebhookEvent::WorklogUpdated),
            Self::WorklogDeleted => |raw, cx| decode_as(raw, cx, WebhookEvent::WorklogDeleted),
            Self::CommentCreated => |raw, cx| decode_as(raw, cx, WebhookEvent::CommentCreated),
            Self::CommentUpdated => |raw, cx| decode_as(raw, cx, WebhookEvent::CommentUpdated),
            Self::CommentDeleted => |raw, cx| decode_as(raw, cx, WebhookEvent::CommentDeleted),
            Self::IssueLinkCreated => {
                |raw, cx| decode_as(raw, cx, WebhookEvent::IssueLinkCreated)
            }
            Self::IssueLinkDeleted => {
                |raw, cx| decode_as(raw, cx, WebhookEvent::IssueLinkDeleted)
            }
            Self::AttachmentCreated => {
                |raw, cx| decode_as(raw, cx, WebhookEvent::AttachmentCreated)
            }
            Self::AttachmentDeleted => {
                |raw, cx| decode_as(raw, cx, WebhookEvent::AttachmentDeleted)
            }
        }
    }

    /// Decode `raw` as this kind of event.
    ///
    /// # Errors
    /// Returns `DecodeError` if `raw` is not a valid event of this kind.
    pub fn decode(self, raw: &RawMap, cx: DecodeContext<'_>) -> Result<WebhookEvent> {
        (self.decoder())(raw, cx)
    }
}

impl From<EventKind> for &'static str {
    fn from(kind: EventKind) -> Self {
        kind.as_str()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode_as<T: FromRaw>(
    raw: &RawMap,
    cx: DecodeContext<'_>,
    wrap: fn(T) -> WebhookEvent,
) -> Result<WebhookEvent> {
    T::from_raw_with(raw, cx).map(wrap)
}

/// Decode a webhook payload, picking the event type from `webhookEvent`.
///
/// # Errors
/// See [`decode_event_with`].
pub fn decode_event(raw: &RawMap, strictness: Strictness) -> Result<WebhookEvent> {
    decode_event_with(raw, DecodeContext::new(strictness))
}

/// Decode a webhook payload within the given context.
///
/// An unknown `webhookEvent` is an error when strict. Otherwise the payload
/// decodes as a [`GenericEvent`] carrying only the header, with a warning
/// logged unless strictness is [`Strictness::Ignore`].
///
/// # Errors
/// - `DecodeError::MissingDiscriminator` if `webhookEvent` is absent.
/// - `DecodeError::WrongFieldType` if `webhookEvent` is not a string.
/// - `DecodeError::UnknownDiscriminator` if it is unknown and decoding is strict.
/// - Any error from the selected event record.
pub fn decode_event_with(raw: &RawMap, cx: DecodeContext<'_>) -> Result<WebhookEvent> {
    let event_type = match raw.get(DISCRIMINATOR) {
        None => {
            return Err(DecodeError::MissingDiscriminator {
                kind: KIND,
                raw: Value::Object(raw.clone()),
            });
        }
        Some(Value::String(event_type)) => event_type,
        Some(other) => {
            return Err(DecodeError::WrongFieldType {
                kind: KIND,
                raw: Value::Object(raw.clone()),
                name: DISCRIMINATOR.to_string(),
                value: other.clone(),
                expected: &[Shape::String],
            });
        }
    };

    if let Some(kind) = EventKind::from_discriminator(event_type) {
        debug!(%kind, "Decoding webhook event");
        return kind.decode(raw, cx);
    }

    match cx.strictness() {
        Strictness::Strict => {
            return Err(DecodeError::UnknownDiscriminator {
                kind: KIND,
                raw: Value::Object(raw.clone()),
                value: event_type.clone(),
            });
        }
        Strictness::Warn => {
            warn!(%event_type, "Unknown webhook event type, decoding as generic event");
        }
        Strictness::Ignore => {}
    }
    GenericEvent::from_raw_with(raw, cx).map(WebhookEvent::Generic)
}
