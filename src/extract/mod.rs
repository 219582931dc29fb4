//! Chunked streaming extraction.
//!
//! [`extract`] re-reads a probed file sequentially in bounded windows,
//! applying the per-row pipeline (short-row guard, entity-key extraction, row
//! filter, typed coercion) and folding surviving records into an
//! [`EntityAccumulator`] in file order. Windowing is a memory and progress
//! boundary only: it never changes the result, just the cadence of counter
//! flushes, progress notifications, and buffer reclaim.
//!
//! [`ExtractionRequest`] bundles the whole probe, select, extract flow into an
//! owned object for callers that want a single entrypoint.

pub mod accumulator;
pub mod filter;
pub mod progress;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ExtractResult, SchemaError, StreamCause, StreamError};
use crate::schema::probe::{DEFAULT_SAMPLE_SIZE, SchemaReport, probe};
use crate::types::{
    ColumnInventory, EntityTable, ExtractedRecord, ExtractionSummary, SemanticRole, Value,
};

pub use accumulator::EntityAccumulator;
pub use filter::{Predicate, RowFilter};
pub use progress::{CompositeProgress, FileProgress, ProgressObserver, StdErrProgress};

/// Default window size, in rows.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Which columns to extract: the entity-key column plus the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    /// Column whose trimmed value keys each record.
    pub entity_key: String,
    /// Columns projected into each record's attributes, in order.
    pub projected: Vec<String>,
}

impl ColumnSelection {
    /// Create a selection from explicit column names.
    pub fn new(entity_key: impl Into<String>, projected: Vec<String>) -> Self {
        Self {
            entity_key: entity_key.into(),
            projected,
        }
    }

    /// Heuristic selection from classifier defaults: the first entity-key
    /// column, projecting every statistic and categorical column in file
    /// order.
    ///
    /// Errors with [`SchemaError::NoEntityKey`] when no column classified as
    /// an entity key.
    pub fn from_inventory(inventory: &ColumnInventory) -> Result<Self, SchemaError> {
        let entity = inventory
            .columns()
            .iter()
            .find(|c| c.role == SemanticRole::EntityKey)
            .ok_or(SchemaError::NoEntityKey)?;

        let projected = inventory
            .columns()
            .iter()
            .filter(|c| c.ordinal != entity.ordinal)
            .filter(|c| {
                matches!(
                    c.role,
                    SemanticRole::Statistic | SemanticRole::Categorical
                )
            })
            .map(|c| c.name.clone())
            .collect();

        Ok(Self {
            entity_key: entity.name.clone(),
            projected,
        })
    }
}

/// Options controlling extraction behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Rows per window. Affects memory and progress cadence, never results.
    pub chunk_size: usize,
    /// Optional observer for progress counters; fire-and-forget.
    pub progress: Option<Arc<dyn ProgressObserver>>,
    /// Optional cancellation flag, checked only at window boundaries.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("chunk_size", &self.chunk_size)
            .field("progress_set", &self.progress.is_some())
            .field("cancel_set", &self.cancel.is_some())
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: None,
            cancel: None,
        }
    }
}

/// A finished extraction: the frozen table and its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Frozen entity table.
    pub table: EntityTable,
    /// Counters and metadata for the run.
    pub summary: ExtractionSummary,
}

/// Stream `path` and fold matching rows into an entity table.
///
/// The file is read once, sequentially, in windows of `options.chunk_size`
/// rows; the resident working set is the current window's records plus the
/// table built so far. Per row, in order:
///
/// - rows too short to reach the entity-key column or the furthest projected
///   column are skipped and counted;
/// - the entity-key cell is trimmed; empty keys are skipped and counted;
/// - the row filter runs next; misses are counted as filtered-out, separately
///   from skipped;
/// - every projected cell is coerced (integer, then float, then text) and the
///   record is folded in with last-write-wins per key.
///
/// Selection and filter columns are resolved against `inventory` up front; an
/// unknown name is a [`SchemaError`] and no rows are read. I/O failure
/// mid-stream (or a cancellation observed at a window boundary) aborts with a
/// [`StreamError`] carrying the partial table and summary-so-far.
///
/// # Panics
///
/// Panics if `options.chunk_size == 0`.
pub fn extract(
    path: impl AsRef<Path>,
    inventory: &ColumnInventory,
    selection: &ColumnSelection,
    filter: &RowFilter,
    options: &ExtractOptions,
) -> ExtractResult<Extraction> {
    assert!(options.chunk_size > 0, "chunk_size must be > 0");
    let path = path.as_ref();

    let entity_idx = resolve_column(inventory, &selection.entity_key)?;
    let mut projected = Vec::with_capacity(selection.projected.len());
    for name in &selection.projected {
        projected.push((name.clone(), resolve_column(inventory, name)?));
    }
    let mut bound = Vec::with_capacity(filter.predicates().len());
    for pred in filter.predicates() {
        bound.push((resolve_column(inventory, pred.column())?, pred));
    }
    let max_required = projected
        .iter()
        .map(|&(_, idx)| idx)
        .fold(entity_idx, usize::max);

    let mut columns_selected = Vec::with_capacity(projected.len() + 1);
    columns_selected.push(selection.entity_key.clone());
    columns_selected.extend(projected.iter().map(|(name, _)| name.clone()));

    let mut state = RunState::new(columns_selected);

    let mut rdr = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
    {
        Ok(rdr) => rdr,
        Err(e) => return Err(state.abort(StreamCause::Csv(e)).into()),
    };

    let mut record = csv::ByteRecord::new();
    let mut rows_in_window = 0usize;
    let mut chunks_done = 0u64;
    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(state.abort(StreamCause::Csv(e)).into()),
        }
        state.rows_seen += 1;
        rows_in_window += 1;

        match decode_row(&record, entity_idx, &projected, &bound, max_required) {
            RowOutcome::Record(rec) => {
                if state.sample_record.is_none() {
                    state.sample_record = Some(rec.clone());
                }
                state.window.push(rec);
            }
            RowOutcome::Skipped => state.rows_skipped += 1,
            RowOutcome::Filtered => state.rows_filtered += 1,
        }

        if rows_in_window == options.chunk_size {
            state.fold_window();
            chunks_done += 1;
            rows_in_window = 0;
            if let Some(obs) = &options.progress {
                obs.on_progress(state.rows_seen, chunks_done);
            }
            if is_cancelled(options) {
                return Err(state.abort(StreamCause::Cancelled).into());
            }
        }
    }

    // Trailing partial window.
    if rows_in_window > 0 {
        state.fold_window();
        chunks_done += 1;
        if let Some(obs) = &options.progress {
            obs.on_progress(state.rows_seen, chunks_done);
        }
    }

    let extraction = state.finish();
    if let Some(obs) = &options.progress {
        obs.on_finished(&extraction.summary);
    }
    Ok(extraction)
}

fn resolve_column(inventory: &ColumnInventory, name: &str) -> Result<usize, SchemaError> {
    inventory
        .index_of(name)
        .ok_or_else(|| SchemaError::UnknownColumn {
            name: name.to_string(),
        })
}

fn is_cancelled(options: &ExtractOptions) -> bool {
    options
        .cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::SeqCst))
}

enum RowOutcome {
    Record(ExtractedRecord),
    Skipped,
    Filtered,
}

fn decode_row(
    record: &csv::ByteRecord,
    entity_idx: usize,
    projected: &[(String, usize)],
    bound: &[(usize, &Predicate)],
    max_required: usize,
) -> RowOutcome {
    // Short/corrupt line: not enough fields to reach the entity key or the
    // furthest projected column.
    if record.len() <= max_required {
        return RowOutcome::Skipped;
    }

    let key = String::from_utf8_lossy(record.get(entity_idx).unwrap_or(b""));
    let key = key.trim();
    if key.is_empty() {
        return RowOutcome::Skipped;
    }

    for (idx, pred) in bound {
        let cell = String::from_utf8_lossy(record.get(*idx).unwrap_or(b""));
        if !pred.accepts(cell.trim()) {
            return RowOutcome::Filtered;
        }
    }

    let mut attributes = BTreeMap::new();
    for (name, idx) in projected {
        let cell = String::from_utf8_lossy(record.get(*idx).unwrap_or(b""));
        attributes.insert(name.clone(), Value::coerce(&cell));
    }

    RowOutcome::Record(ExtractedRecord {
        entity_key: key.to_string(),
        attributes,
    })
}

/// Mutable run bookkeeping; folds windows and freezes into the final result.
struct RunState {
    started_at: u64,
    rows_seen: u64,
    rows_skipped: u64,
    rows_filtered: u64,
    columns_selected: Vec<String>,
    sample_record: Option<ExtractedRecord>,
    acc: EntityAccumulator,
    window: Vec<ExtractedRecord>,
}

impl RunState {
    fn new(columns_selected: Vec<String>) -> Self {
        Self {
            started_at: progress::unix_ts(),
            rows_seen: 0,
            rows_skipped: 0,
            rows_filtered: 0,
            columns_selected,
            sample_record: None,
            acc: EntityAccumulator::new(),
            window: Vec::new(),
        }
    }

    /// Fold the buffered window into the accumulator, in file order.
    fn fold_window(&mut self) {
        for rec in self.window.drain(..) {
            self.acc.upsert(rec);
        }
    }

    fn summarize(&self, record_count: u64) -> ExtractionSummary {
        ExtractionSummary {
            started_at: self.started_at,
            row_count_seen: self.rows_seen,
            row_count_skipped: self.rows_skipped,
            row_count_filtered: self.rows_filtered,
            record_count,
            columns_selected: self.columns_selected.clone(),
            sample_record: self.sample_record.clone(),
        }
    }

    fn finish(mut self) -> Extraction {
        self.fold_window();
        let table = std::mem::take(&mut self.acc).finalize();
        let summary = self.summarize(table.len() as u64);
        Extraction { table, summary }
    }

    /// Salvage path: fold what was decoded, freeze, and wrap in a
    /// [`StreamError`] so the caller can keep the partial results.
    fn abort(mut self, cause: StreamCause) -> StreamError {
        self.fold_window();
        let rows_seen = self.rows_seen;
        let table = std::mem::take(&mut self.acc).finalize();
        let summary = self.summarize(table.len() as u64);
        StreamError {
            cause,
            rows_seen,
            partial: table,
            summary,
        }
    }
}

/// Owned probe-select-extract pipeline.
///
/// Probes the file, resolves the column selection (explicit, or heuristic via
/// classifier defaults when `selection` is `None`), and runs extraction.
#[derive(Clone)]
pub struct ExtractionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Rows sampled during probing.
    pub sample_size: usize,
    /// Explicit selection; `None` auto-selects from the inventory.
    pub selection: Option<ColumnSelection>,
    /// Row filter; empty accepts all rows.
    pub filter: RowFilter,
    /// Extraction options.
    pub options: ExtractOptions,
}

impl fmt::Debug for ExtractionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionRequest")
            .field("path", &self.path)
            .field("sample_size", &self.sample_size)
            .field("selection", &self.selection)
            .field("filter_predicates", &self.filter.predicates().len())
            .field("options", &self.options)
            .finish()
    }
}

impl ExtractionRequest {
    /// Create a request with default sampling, no filter, default options.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            selection: None,
            filter: RowFilter::new(),
            options: ExtractOptions::default(),
        }
    }

    /// Probe, select, and extract; returns the probe report alongside the
    /// extraction so callers keep the inventory that drove the run.
    pub fn run(&self) -> ExtractResult<(SchemaReport, Extraction)> {
        let report = probe(&self.path, self.sample_size)?;
        let selection = match &self.selection {
            Some(sel) => sel.clone(),
            None => ColumnSelection::from_inventory(&report.inventory)?,
        };
        let extraction = extract(
            &self.path,
            &report.inventory,
            &selection,
            &self.filter,
            &self.options,
        )?;
        Ok((report, extraction))
    }
}
