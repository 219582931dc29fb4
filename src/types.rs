//! Core data model types for probing and extraction.
//!
//! Probing a file produces a read-only [`ColumnInventory`]; extraction folds
//! rows into an [`EntityTable`] of [`ExtractedRecord`]s whose cells are typed
//! [`Value`]s, and reports an [`ExtractionSummary`] alongside it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Semantic role of a column, as assigned by the classifier.
///
/// Variant order is the resolution priority: when a name matches several
/// keyword groups, the first variant in this order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SemanticRole {
    /// Identifies the entity a row describes (e.g. a player's full name).
    EntityKey,
    /// Low-cardinality dimension such as position or team.
    Categorical,
    /// Date/season/week style column.
    Temporal,
    /// Numeric or textual statistic worth projecting.
    Statistic,
    /// No keyword group matched, or an entity-key candidate was demoted.
    Unclassified,
}

/// Primitive type inferred for a column from the probe sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveType {
    /// Every sampled non-empty value parsed as a 64-bit integer.
    Integer,
    /// Every sampled non-empty value parsed as a decimal number.
    Float,
    /// Fallback, including all-empty columns.
    Text,
}

/// One column of the probed file.
///
/// Immutable once produced by the prober; an operator selection may override
/// the role downstream, but never this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Zero-based position in the header row.
    pub ordinal: usize,
    /// Header name as decoded (malformed bytes replaced).
    pub name: String,
    /// Default semantic role from the classifier.
    pub role: SemanticRole,
    /// Primitive type inferred from the sample.
    pub inferred_type: PrimitiveType,
    /// Distinct non-empty values observed in the sample (cardinality estimate).
    pub distinct_sampled: usize,
}

/// Ordered column inventory with name lookup.
///
/// If the source file has duplicate header names, the last occurrence wins for
/// name lookup while the first occurrence keeps its ordinal. Documented quirk,
/// preserved as observed behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInventory {
    columns: Vec<Column>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl ColumnInventory {
    /// Build an inventory from columns in ordinal order.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut by_name = HashMap::with_capacity(columns.len());
        for col in &columns {
            by_name.insert(col.name.clone(), col.ordinal);
        }
        Self { columns, by_name }
    }

    /// Columns in ordinal order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the inventory has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at `ordinal`, if present.
    pub fn get(&self, ordinal: usize) -> Option<&Column> {
        self.columns.get(ordinal)
    }

    /// Ordinal of the column named `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Column looked up by name.
    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.index_of(name).and_then(|i| self.columns.get(i))
    }

    /// Iterate column names in ordinal order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// A single typed cell value.
///
/// Serializes untagged, so integers, floats, and text land in output documents
/// as bare JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 text, the universal fallback.
    Text(String),
}

impl Value {
    /// Coerce a raw cell through the ordered attempt chain: integer, then
    /// float, then the trimmed original text. Never fails; one unparseable
    /// cell must not cost the rest of a multi-gigabyte file.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Value::Int64(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Value::Float64(v);
        }
        Value::Text(trimmed.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One extracted row, keyed by its trimmed entity-key value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    /// Trimmed, non-empty value of the entity-key column.
    pub entity_key: String,
    /// Projected column name to coerced value.
    pub attributes: BTreeMap<String, Value>,
}

/// Frozen mapping from entity key to its latest known record.
///
/// Produced only by finalizing an accumulator; there is no mutation API, so a
/// table handed to a writer is always a stable snapshot. Consolidation is
/// last-write-wins at whole-record granularity: a later row for an existing
/// key replaced the previous record entirely, including attributes the later
/// row left empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityTable {
    records: BTreeMap<String, ExtractedRecord>,
}

impl EntityTable {
    pub(crate) fn from_records(records: BTreeMap<String, ExtractedRecord>) -> Self {
        Self { records }
    }

    /// Record for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&ExtractedRecord> {
        self.records.get(key)
    }

    /// Whether `key` has a record.
    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Iterate `(key, record)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtractedRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Distribution of an attribute's values across all records.
    ///
    /// Values are counted by their display rendering; records without the
    /// attribute are not counted.
    pub fn value_counts(&self, attribute: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            if let Some(value) = record.attributes.get(attribute) {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Serialize for EntityTable {
    /// Serializes as a mapping from entity key to attribute map.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (key, record) in &self.records {
            map.serialize_entry(key, &record.attributes)?;
        }
        map.end()
    }
}

/// Counters and metadata describing one extraction run.
///
/// Row-level anomalies are never errors; this is where they become visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSummary {
    /// Unix timestamp (seconds) at which extraction started.
    pub started_at: u64,
    /// Data rows read, including skipped and filtered-out rows.
    pub row_count_seen: u64,
    /// Rows dropped for being too short or having an empty entity key.
    pub row_count_skipped: u64,
    /// Rows discarded by the row filter (counted separately from skipped).
    pub row_count_filtered: u64,
    /// Records in the finalized table.
    pub record_count: u64,
    /// Entity-key column first, then the projected columns in order.
    pub columns_selected: Vec<String>,
    /// First record that reached the accumulator, if any.
    pub sample_record: Option<ExtractedRecord>,
}
