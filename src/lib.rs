//! `statstream` extracts entity/statistic records from very large
//! delimited-text exports (multi-gigabyte tabular files) without loading the
//! file into memory at once.
//!
//! The pipeline, in order:
//!
//! - [`schema::probe`]: read the header and a bounded row sample to build a
//!   read-only [`types::ColumnInventory`] (inferred primitive types,
//!   cardinality estimates, default semantic roles) plus an approximate row
//!   count from a terminator-counting pass.
//! - [`schema::classify`]: the pure column classifier behind those default
//!   roles; also usable directly when an operator overrides a role.
//! - [`extract::extract`]: stream the file in bounded windows, apply the row
//!   filter and column projection, coerce cells (integer, then float, then
//!   text — never failing), and fold records into a frozen
//!   [`types::EntityTable`] with last-write-wins per entity key.
//! - [`output`]: persist the table and its [`types::ExtractionSummary`] as
//!   human-inspectable JSON documents.
//!
//! Execution is single-threaded and synchronous; the resident working set at
//! any instant is the current window's records plus the table built so far.
//! Row-level problems (short lines, empty keys, unparseable cells) never
//! abort a run — they are counted on the summary and the stream continues.
//! Mid-stream I/O failures abort with [`StreamError`], which carries the
//! partial table so callers can salvage what was read.
//!
//! ## Quick example: probe, auto-select, extract
//!
//! ```no_run
//! use statstream::extract::{ExtractionRequest, RowFilter};
//!
//! # fn main() -> Result<(), statstream::ExtractError> {
//! let mut request = ExtractionRequest::new("season_stats.csv");
//! request.filter = RowFilter::new().with_values("position", ["QB", "RB"]);
//!
//! let (report, extraction) = request.run()?;
//! println!(
//!     "~{} rows in file, {} records extracted",
//!     report.approx_row_count,
//!     extraction.table.len()
//! );
//! statstream::output::write_extraction("players.json", &extraction)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Explicit selection
//!
//! ```no_run
//! use statstream::extract::{extract, ColumnSelection, ExtractOptions, RowFilter};
//! use statstream::schema::probe;
//!
//! # fn main() -> Result<(), statstream::ExtractError> {
//! let report = probe("season_stats.csv", 1000)?;
//! let selection = ColumnSelection::new(
//!     "player_name",
//!     vec!["team".to_string(), "fantasy_points".to_string()],
//! );
//! let extraction = extract(
//!     "season_stats.csv",
//!     &report.inventory,
//!     &selection,
//!     &RowFilter::new(),
//!     &ExtractOptions::default(),
//! )?;
//! println!("records={}", extraction.table.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Value coercion
//!
//! Cells degrade through an ordered attempt chain rather than erroring:
//!
//! ```rust
//! use statstream::types::Value;
//!
//! assert_eq!(Value::coerce("17"), Value::Int64(17));
//! assert_eq!(Value::coerce("12.5"), Value::Float64(12.5));
//! assert_eq!(Value::coerce("N/A"), Value::Text("N/A".to_string()));
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: probing and semantic column classification
//! - [`extract`]: chunked streaming extraction, accumulation, filtering, progress
//! - [`output`]: artifact persistence
//! - [`types`]: shared data model
//! - [`error`]: error taxonomy

pub mod error;
pub mod extract;
pub mod output;
pub mod schema;
pub mod types;

pub use error::{ExtractError, ExtractResult, OutputError, SchemaError, StreamCause, StreamError};
