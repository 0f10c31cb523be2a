//! jirax-core: Strict decoding of Jira webhook payloads into typed events.
//!
//! This crate provides:
//! - `FieldMover`: Field-by-field extraction from a raw JSON map
//! - `FromRaw`: The decode protocol every typed record follows
//! - `WebhookEvent`: Typed webhook events, selected by `webhookEvent`
//! - `Change`, `IssueLink`: Records embedded in events
//! - `DecodeError`: A taxonomy of decode failures that keeps the raw input

pub mod changelog;
pub mod dispatch;
pub mod error;
pub mod issuelink;
pub mod mover;
pub mod raw;
pub mod record;
pub mod resource;
pub mod transform;
pub mod webhook;

pub use changelog::{Change, FieldChange, FieldValue};
pub use dispatch::{decode_event, decode_event_with, DecodeFn, EventKind, DISCRIMINATOR};
pub use error::{DecodeError, FieldValueError, Result};
pub use issuelink::{IssueLink, IssueLinkType};
pub use mover::{Field, FieldMover};
pub use raw::{RawMap, Shape};
pub use record::{decode_element, DecodeContext, FromRaw, ParseStrictnessError, Strictness};
pub use resource::{BasicConverter, ConversionError, Resource, ResourceConverter, ResourceKind};
pub use webhook::{EventHeader, EventRecord, Fragment, GenericEvent, WebhookEvent};
