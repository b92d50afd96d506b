//! Append-only JSON ledger of completed runs.
//!
//! One file, one JSON array, rewritten whole on every save with 4-space
//! indentation and non-ASCII text stored verbatim. An absent file reads as an
//! empty ledger; a file that exists but does not parse is an error, since
//! silently discarding history would lose completed-run records.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::TsResult;
use crate::model::LedgerEntry;

/// Load all entries from the ledger at `path`.
pub fn load(path: &Path) -> TsResult<Vec<LedgerEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let entries = serde_json::from_str(&content)?;
    Ok(entries)
}

/// Persist `entries` to `path`, replacing the previous contents.
pub fn save(path: &Path, entries: &[LedgerEntry]) -> TsResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut serializer)?;
    fs::write(path, buf)?;
    tracing::debug!(path = %path.display(), count = entries.len(), "ledger saved");
    Ok(())
}
