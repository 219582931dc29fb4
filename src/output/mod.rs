//! Persistence of extraction artifacts.
//!
//! Two documents per run, both pretty-printed JSON so they stay
//! human-inspectable: the entity table as a mapping from entity key to
//! attribute map, and the extraction summary. The summary path derives from
//! the table path with an `_summary` suffix.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::OutputError;
use crate::extract::Extraction;
use crate::types::{EntityTable, ExtractionSummary};

/// Write the entity table to `path` as a key-to-attribute-map JSON document.
pub fn write_entity_table(path: impl AsRef<Path>, table: &EntityTable) -> Result<(), OutputError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), table)?;
    Ok(())
}

/// Write the extraction summary to `path` as a JSON document.
pub fn write_summary(
    path: impl AsRef<Path>,
    summary: &ExtractionSummary,
) -> Result<(), OutputError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)?;
    Ok(())
}

/// Derive the summary document's path from the table document's path:
/// `players.json` becomes `players_summary.json`, in the same directory.
pub fn summary_path_for(table_path: &Path) -> PathBuf {
    match table_path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => table_path.with_file_name(format!("{stem}_summary.json")),
        None => table_path.with_file_name("summary.json"),
    }
}

/// Persist both artifacts of an extraction: the table at `table_path`, the
/// summary alongside it. Returns the summary path.
pub fn write_extraction(
    table_path: impl AsRef<Path>,
    extraction: &Extraction,
) -> Result<PathBuf, OutputError> {
    let table_path = table_path.as_ref();
    write_entity_table(table_path, &extraction.table)?;
    let summary_path = summary_path_for(table_path);
    write_summary(&summary_path, &extraction.summary)?;
    Ok(summary_path)
}
