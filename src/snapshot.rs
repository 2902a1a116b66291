//! Debug snapshots of the polled feed for postmortem inspection.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::status::DepartureInformation;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to write snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Writes `raw`, annotated with the computed status and time, to
/// `<dir>/result-<timestamp>.json` as 4-space indented JSON.
pub fn write_debug_snapshot(
    dir: &Path,
    information: &DepartureInformation,
    raw: &Value,
) -> Result<PathBuf, SnapshotError> {
    let document = annotate(information, raw)?;

    let mut body = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
    document.serialize(&mut serializer)?;

    let path = dir.join(format!(
        "result-{}.json",
        information.observed_at.format("%Y-%m-%dT%H:%M:%S")
    ));
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, &body))
        .map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), bytes = body.len(), "Debug snapshot written");
    Ok(path)
}

fn annotate(information: &DepartureInformation, raw: &Value) -> Result<Value, SnapshotError> {
    let mut document = match raw {
        Value::Object(_) => raw.clone(),
        other => serde_json::json!({ "document": other }),
    };
    if let Value::Object(map) = &mut document {
        map.insert(
            "crawler_status".to_string(),
            serde_json::to_value(information.status)?,
        );
        map.insert(
            "crawler_time".to_string(),
            serde_json::to_value(information.observed_at)?,
        );
        map.insert(
            "crawler_messages".to_string(),
            serde_json::to_value(&information.messages)?,
        );
    }
    Ok(document)
}
