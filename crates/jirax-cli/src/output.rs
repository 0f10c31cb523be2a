//! Output formatting for the CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use jirax_core::{DecodeError, EventKind, Resource, WebhookEvent};
use serde::Serialize;
use std::fmt::Write;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Print a list in the specified format.
pub fn print_list<T: Serialize + HumanDisplay>(values: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for value in values {
                println!("{}", value.human_display());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(values).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(values).context("Failed to serialize to YAML")?;
            print!("{yaml}");
        }
    }
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{message}"),
        OutputFormat::Json => {
            let json = serde_json::json!({"status": "ok", "message": message});
            println!("{json}");
        }
        OutputFormat::Yaml => {
            #[derive(Serialize)]
            struct Success<'a> {
                status: &'a str,
                message: &'a str,
            }
            let yaml = serde_yaml::to_string(&Success {
                status: "ok",
                message,
            })
            .context("Failed to serialize to YAML")?;
            print!("{yaml}");
        }
    }
    Ok(())
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self) -> String;
}

/// What came of decoding one payload.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    /// File path, or `-` for stdin.
    pub source: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The payload decoded.
    Ok { event: Box<WebhookEvent> },
    /// The payload could not be read or parsed as a JSON object.
    Unreadable { error: String },
    /// The payload did not decode.
    Invalid {
        error: String,
        kind: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        #[serde(skip)]
        innermost: String,
    },
}

impl DecodeReport {
    pub fn decoded(source: String, event: WebhookEvent) -> Self {
        Self {
            source,
            outcome: Outcome::Ok {
                event: Box::new(event),
            },
        }
    }

    pub const fn unreadable(source: String, error: String) -> Self {
        Self {
            source,
            outcome: Outcome::Unreadable { error },
        }
    }

    pub fn invalid(source: String, err: &DecodeError) -> Self {
        let field = Some(err.field_path()).filter(|path| !path.is_empty());
        Self {
            source,
            outcome: Outcome::Invalid {
                error: err.to_string(),
                kind: err.kind(),
                field,
                innermost: err.innermost().to_string(),
            },
        }
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }
}

impl HumanDisplay for DecodeReport {
    fn human_display(&self) -> String {
        let mut out = String::new();

        match &self.outcome {
            Outcome::Ok { event } => {
                let kind = event.kind().map_or("generic", EventKind::family);
                writeln!(
                    out,
                    "{}  {}  {}  {}",
                    style(&self.source).bold(),
                    style(event.event_type()).green(),
                    kind,
                    format_time(&event.timestamp())
                )
                .ok();
                write_event(&mut out, event);
            }
            Outcome::Unreadable { error } => {
                writeln!(out, "{}  {}  {error}", style(&self.source).bold(), style("unreadable").red()).ok();
            }
            Outcome::Invalid {
                field, innermost, ..
            } => {
                let at = field.as_deref().map_or_else(String::new, |f| format!(" at {f}"));
                writeln!(out, "{}  {}{at}", style(&self.source).bold(), style("invalid").red()).ok();
                writeln!(out, "  {innermost}").ok();
            }
        }

        out.trim_end().to_string()
    }
}

fn write_event(out: &mut String, event: &WebhookEvent) {
    if let Some(user) = event.user() {
        writeln!(out, "  user:       {}", resource_label(user)).ok();
    }
    if let Some(issue) = event.issue() {
        writeln!(out, "  issue:      {}", resource_label(issue)).ok();
    }
    if let Some(resource) = event.resource() {
        writeln!(out, "  {:<11} {}", format!("{}:", resource.kind()).to_lowercase(), resource_label(resource)).ok();
    }
    if let Some(comment) = event.comment() {
        writeln!(out, "  comment:    {}", resource_label(comment)).ok();
    }
    if let Some(link) = event.issue_link() {
        writeln!(out, "  link:       {link}").ok();
    }
    if let Some(change) = event.change() {
        writeln!(out, "  change {}:", change.id()).ok();
        for field in change.fields().values() {
            writeln!(out, "    {field}").ok();
        }
    }
    if !event.extras().is_empty() {
        let names: Vec<&str> = event.extras().keys().map(String::as_str).collect();
        writeln!(out, "  {} {}", style("extras:").yellow(), names.join(", ")).ok();
    }
}

fn resource_label(resource: &Resource) -> String {
    let id = resource.id().unwrap_or("?");
    match resource.get("key").and_then(|key| key.as_str()) {
        Some(key) if key != id => format!("{key} ({id})"),
        _ => id.to_string(),
    }
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
}

/// One registered event type, for `jirax kinds`.
#[derive(Debug, Serialize)]
pub struct KindRow {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub family: &'static str,
}

impl From<EventKind> for KindRow {
    fn from(kind: EventKind) -> Self {
        Self {
            event_type: kind.as_str(),
            family: kind.family(),
        }
    }
}

impl HumanDisplay for KindRow {
    fn human_display(&self) -> String {
        format!("{:<30} {}", self.event_type, self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jirax_core::{decode_event, Strictness};
    use serde_json::json;

    fn event() -> WebhookEvent {
        let raw = json!({
            "webhookEvent": "jira:issue_created",
            "timestamp": 1_500_000_000_000_i64,
            "user": {"accountId": "abc123"},
            "issue": {"id": "10010", "key": "JRA-20"},
            "unexpected": 1
        });
        let serde_json::Value::Object(raw) = raw else {
            unreachable!()
        };
        decode_event(&raw, Strictness::Ignore).unwrap()
    }

    #[test]
    fn test_decoded_report_display() {
        console::set_colors_enabled(false);
        let report = DecodeReport::decoded("created.json".to_string(), event());

        let text = report.human_display();

        assert!(text.starts_with("created.json  jira:issue_created  issue  2017-07-14 02:40:00.000 UTC"));
        assert!(text.contains("issue:      JRA-20 (10010)"));
        assert!(text.contains("user:       abc123"));
        assert!(text.contains("extras: unexpected"));
    }

    #[test]
    fn test_report_serialization() {
        let report = DecodeReport::decoded("created.json".to_string(), event());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], json!("ok"));
        assert_eq!(value["source"], json!("created.json"));
        assert_eq!(value["event"]["type"], json!("jira:issue_created"));

        let report = DecodeReport::unreadable("-".to_string(), "not JSON".to_string());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], json!("unreadable"));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_kind_row() {
        let row = KindRow::from(EventKind::IssueWorkLogged);
        assert_eq!(row.event_type, "jira:worklog_updated");
        assert_eq!(row.family, "issue");
    }
}
