//! Schema probing: header decode, bounded type/cardinality sample, and a
//! terminator-counting pass for the approximate row count.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::error::SchemaError;
use crate::schema::classify;
use crate::types::{Column, ColumnInventory, PrimitiveType};

/// Default number of rows sampled for type inference and classification.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Result of probing a file: the column inventory plus file-level facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    /// Ordered, read-only column inventory.
    pub inventory: ColumnInventory,
    /// Data rows in the file, from the line-counting pass. Approximate:
    /// counts line terminators only, so quoted embedded newlines overcount.
    pub approx_row_count: u64,
    /// Size of the input file in bytes.
    pub file_size_bytes: u64,
    /// The raw sampled rows, retained so operators can preview data without a
    /// second read.
    pub sampled_rows: Vec<Vec<String>>,
}

/// Probe `path`: read the header and up to `sample_size` rows, infer each
/// column's primitive type and cardinality, attach default semantic roles via
/// the classifier, and count line terminators for the approximate row count.
///
/// Malformed byte sequences in header or cells are replaced, never fatal. An
/// empty file (no header row) is a [`SchemaError::EmptyInput`].
///
/// This is the only place the whole file is read before extraction, and that
/// pass parses no fields; the resident working set stays bounded by
/// `sample_size` rows.
pub fn probe(path: impl AsRef<Path>, sample_size: usize) -> Result<SchemaReport, SchemaError> {
    let path = path.as_ref();
    let file_size_bytes = std::fs::metadata(path)?.len();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = rdr.byte_headers()?.clone();
    if headers.is_empty() {
        return Err(SchemaError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let names: Vec<String> = headers
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut sampled_rows: Vec<Vec<String>> = Vec::new();
    let mut record = csv::ByteRecord::new();
    while sampled_rows.len() < sample_size && rdr.read_byte_record(&mut record)? {
        sampled_rows.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect(),
        );
    }

    let mut columns = Vec::with_capacity(names.len());
    for (ordinal, name) in names.iter().enumerate() {
        let column_values: Vec<String> = sampled_rows
            .iter()
            .map(|row| row.get(ordinal).cloned().unwrap_or_default())
            .collect();
        let (inferred_type, distinct_sampled) = infer_primitive(&column_values);
        let role = classify::resolve(&classify::classify(name, Some(&column_values)));
        columns.push(Column {
            ordinal,
            name: name.clone(),
            role,
            inferred_type,
            distinct_sampled,
        });
    }

    let approx_row_count = count_data_rows(path)?;

    Ok(SchemaReport {
        inventory: ColumnInventory::new(columns),
        approx_row_count,
        file_size_bytes,
        sampled_rows,
    })
}

/// Header plus the first `rows` raw data rows, lossily decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePreview {
    /// Header names.
    pub header: Vec<String>,
    /// Up to `rows` data rows.
    pub rows: Vec<Vec<String>>,
}

/// Read only the header and the first `rows` data rows of `path`.
///
/// A bounded peek for operators choosing columns; no inference, no counting.
pub fn preview(path: impl AsRef<Path>, rows: usize) -> Result<FilePreview, SchemaError> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = rdr.byte_headers()?.clone();
    if headers.is_empty() {
        return Err(SchemaError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let header: Vec<String> = headers
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut out = Vec::with_capacity(rows);
    let mut record = csv::ByteRecord::new();
    while out.len() < rows && rdr.read_byte_record(&mut record)? {
        out.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect(),
        );
    }

    Ok(FilePreview { header, rows: out })
}

/// Infer a column's primitive type and distinct-value count from its sample.
///
/// INTEGER if every non-empty value parses as `i64`; FLOAT if every non-empty
/// value parses as `f64` and the integer check failed; TEXT otherwise, and for
/// all-empty columns.
fn infer_primitive(values: &[String]) -> (PrimitiveType, usize) {
    let mut all_int = true;
    let mut all_float = true;
    let mut non_empty = 0usize;
    let mut distinct: HashSet<&str> = HashSet::new();

    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        non_empty += 1;
        distinct.insert(trimmed);
        if trimmed.parse::<i64>().is_err() {
            all_int = false;
        }
        if trimmed.parse::<f64>().is_err() {
            all_float = false;
        }
    }

    let inferred = if non_empty == 0 {
        PrimitiveType::Text
    } else if all_int {
        PrimitiveType::Integer
    } else if all_float {
        PrimitiveType::Float
    } else {
        PrimitiveType::Text
    };
    (inferred, distinct.len())
}

/// Count line terminators without parsing fields, minus the header line.
fn count_data_rows(path: &Path) -> Result<u64, SchemaError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::with_capacity(8 * 1024);
    let mut lines = 0u64;
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        lines += 1;
    }
    Ok(lines.saturating_sub(1))
}
