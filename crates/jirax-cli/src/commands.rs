//! CLI command implementations.

use crate::output::{self, DecodeReport, KindRow, OutputFormat};
use anyhow::{bail, Context, Result};
use jirax_config::ReceiverConfig;
use jirax_core::{decode_event, EventKind, Strictness};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Initialize configuration in `dir`.
pub fn init(dir: &Path, format: OutputFormat) -> Result<()> {
    ReceiverConfig::init(dir).context("Failed to initialize configuration")?;
    output::print_success(
        &format!(
            "Initialized configuration at {}",
            ReceiverConfig::path(dir).display()
        ),
        format,
    )
}

/// Decode webhook payloads from files, directories, or stdin.
pub fn decode(
    dir: &Path,
    paths: &[PathBuf],
    strict: Option<Strictness>,
    format: OutputFormat,
) -> Result<()> {
    let strictness = resolve_strictness(dir, strict)?;
    let sources = collect_sources(paths)?;
    debug!(count = sources.len(), %strictness, "Decoding payloads");

    let reports: Vec<DecodeReport> = sources
        .iter()
        .map(|source| decode_source(source, strictness))
        .collect();
    output::print_list(&reports, format)?;

    let failed = reports.iter().filter(|report| !report.is_ok()).count();
    if failed > 0 {
        bail!("{failed} of {} payloads failed to decode", reports.len());
    }
    Ok(())
}

/// List the registered event types.
pub fn kinds(format: OutputFormat) -> Result<()> {
    let rows: Vec<KindRow> = EventKind::ALL.into_iter().map(KindRow::from).collect();
    output::print_list(&rows, format)
}

/// Run the webhook receiver.
pub fn serve(
    dir: &Path,
    strict: Option<Strictness>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = ReceiverConfig::load_or_default(dir).context("Failed to load configuration")?;
    if let Some(strictness) = strict {
        config.decode.strictness = strictness;
    }
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(jirax_server::serve(&config))
}

fn resolve_strictness(dir: &Path, strict: Option<Strictness>) -> Result<Strictness> {
    if let Some(strictness) = strict {
        return Ok(strictness);
    }
    let config = ReceiverConfig::load_or_default(dir).context("Failed to load configuration")?;
    Ok(config.decode.strictness)
}

/// Where one payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn name(&self) -> String {
        match self {
            Self::Stdin => "-".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn read(&self) -> io::Result<String> {
        match self {
            Self::Stdin => io::read_to_string(io::stdin()),
            Self::File(path) => fs::read_to_string(path),
        }
    }
}

/// Expand the command-line paths: `-` is stdin, directories contribute
/// their `*.json` files in name order.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            sources.push(Source::Stdin);
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
                if entry.file_type().is_file() && is_json {
                    sources.push(Source::File(entry.into_path()));
                }
            }
        } else {
            sources.push(Source::File(path.clone()));
        }
    }
    Ok(sources)
}

fn decode_source(source: &Source, strictness: Strictness) -> DecodeReport {
    let name = source.name();

    let text = match source.read() {
        Ok(text) => text,
        Err(err) => return DecodeReport::unreadable(name, format!("cannot read: {err}")),
    };
    let raw = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(raw)) => raw,
        Ok(_) => return DecodeReport::unreadable(name, "not a JSON object".to_string()),
        Err(err) => return DecodeReport::unreadable(name, format!("not JSON: {err}")),
    };

    match decode_event(&raw, strictness) {
        Ok(event) => DecodeReport::decoded(name, event),
        Err(err) => DecodeReport::invalid(name, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const COMMENT_DELETED: &str = r#"{
        "webhookEvent": "comment_deleted",
        "timestamp": 1500000000000,
        "comment": {"id": "10100"}
    }"#;

    #[test]
    fn test_collect_sources_walks_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("b.json"), "{}").unwrap();
        fs::write(tmp.path().join("a.json"), "{}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::write(tmp.path().join("nested/c.json"), "{}").unwrap();

        let sources = collect_sources(&[PathBuf::from("-"), tmp.path().to_path_buf()]).unwrap();

        assert_eq!(
            sources,
            vec![
                Source::Stdin,
                Source::File(tmp.path().join("a.json")),
                Source::File(tmp.path().join("b.json")),
                Source::File(tmp.path().join("nested/c.json")),
            ]
        );
    }

    #[test]
    fn test_decode_source() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.json");
        fs::write(&good, COMMENT_DELETED).unwrap();
        let array = tmp.path().join("array.json");
        fs::write(&array, "[]").unwrap();
        let missing = tmp.path().join("missing.json");

        assert!(decode_source(&Source::File(good), Strictness::Strict).is_ok());
        assert!(!decode_source(&Source::File(array), Strictness::Strict).is_ok());
        assert!(!decode_source(&Source::File(missing), Strictness::Strict).is_ok());
    }

    #[test]
    fn test_decode_source_invalid_event() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, COMMENT_DELETED.replace("\"id\"", "\"self\"")).unwrap();

        let report = decode_source(&Source::File(path), Strictness::Strict);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], serde_json::json!("invalid"));
        assert_eq!(value["field"], serde_json::json!("comment"));
    }

    #[test]
    fn test_strictness_flag_wins_over_config() {
        let tmp = TempDir::new().unwrap();
        ReceiverConfig::init(tmp.path()).unwrap();

        assert_eq!(
            resolve_strictness(tmp.path(), None).unwrap(),
            Strictness::Strict
        );
        assert_eq!(
            resolve_strictness(tmp.path(), Some(Strictness::Ignore)).unwrap(),
            Strictness::Ignore
        );
    }
}
