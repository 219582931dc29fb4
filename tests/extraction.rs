use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use statstream::extract::{
    ColumnSelection, ExtractOptions, Extraction, ExtractionRequest, RowFilter, extract,
};
use statstream::schema::{SchemaReport, probe};
use statstream::types::Value;
use statstream::{ExtractError, SchemaError, StreamCause};

const SEASON: &str = "tests/fixtures/season_stats.csv";
const PLAYERS: &str = "tests/fixtures/players.csv";

fn season_report() -> SchemaReport {
    probe(SEASON, 1000).unwrap()
}

fn season_selection() -> ColumnSelection {
    ColumnSelection::new(
        "player_name",
        vec![
            "team".to_string(),
            "position".to_string(),
            "fantasy_points".to_string(),
            "rush_yards".to_string(),
            "notes".to_string(),
        ],
    )
}

fn extract_season(filter: &RowFilter, options: &ExtractOptions) -> Extraction {
    let report = season_report();
    extract(
        SEASON,
        &report.inventory,
        &season_selection(),
        filter,
        options,
    )
    .unwrap()
}

#[test]
fn three_row_scenario() {
    let report = probe(PLAYERS, 1000).unwrap();
    let selection = ColumnSelection::new("name", vec!["team".to_string(), "points".to_string()]);
    let out = extract(
        PLAYERS,
        &report.inventory,
        &selection,
        &RowFilter::new(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(out.table.len(), 1);
    let alice = out.table.get("Alice").unwrap();
    assert_eq!(
        alice.attributes.get("team"),
        Some(&Value::Text("NYG".to_string()))
    );
    assert_eq!(alice.attributes.get("points"), Some(&Value::Int64(12)));

    assert_eq!(out.summary.row_count_seen, 3);
    assert_eq!(out.summary.row_count_skipped, 1);
    assert_eq!(out.summary.row_count_filtered, 0);
    assert_eq!(out.summary.record_count, 1);
    assert_eq!(out.summary.columns_selected, vec!["name", "team", "points"]);

    // The sample is the first record that reached the accumulator: Alice's
    // earlier row, before the duplicate overwrote it.
    let sample = out.summary.sample_record.as_ref().unwrap();
    assert_eq!(sample.entity_key, "Alice");
    assert_eq!(sample.attributes.get("points"), Some(&Value::Float64(10.5)));
}

#[test]
fn chunk_size_changes_cadence_not_results() {
    let baseline = extract_season(&RowFilter::new(), &ExtractOptions::default());
    for chunk_size in [1usize, 7, 10_000] {
        let options = ExtractOptions {
            chunk_size,
            ..Default::default()
        };
        let out = extract_season(&RowFilter::new(), &options);
        assert_eq!(out.table, baseline.table, "chunk_size={chunk_size}");
        assert_eq!(out.summary.row_count_seen, baseline.summary.row_count_seen);
        assert_eq!(out.summary.record_count, baseline.summary.record_count);
    }
}

#[test]
fn duplicate_key_later_row_replaces_whole_record() {
    let out = extract_season(&RowFilter::new(), &ExtractOptions::default());

    // Josh Allen appears in weeks 1 and 2; only week 2's row survives.
    let allen = out.table.get("Josh Allen").unwrap();
    assert_eq!(
        allen.attributes.get("fantasy_points"),
        Some(&Value::Float64(24.0))
    );
    assert_eq!(allen.attributes.get("rush_yards"), Some(&Value::Int64(41)));
    // Week 1 carried notes; week 2 left them empty. The earlier text must not
    // survive the replacement.
    assert_eq!(
        allen.attributes.get("notes"),
        Some(&Value::Text(String::new()))
    );
}

#[test]
fn whitespace_entity_key_rows_are_skipped_not_recorded() {
    let out = extract_season(&RowFilter::new(), &ExtractOptions::default());

    assert_eq!(out.summary.row_count_seen, 6);
    assert_eq!(out.summary.row_count_skipped, 1);
    assert_eq!(out.table.len(), 4);
    assert!(!out.table.contains_key(""));
    let keys: Vec<_> = out.table.keys().collect();
    assert_eq!(
        keys,
        vec![
            "CeeDee Lamb",
            "Josh Allen",
            "Justin Jefferson",
            "Saquon Barkley",
        ]
    );
}

#[test]
fn coercion_degrades_int_float_text() {
    let out = extract_season(&RowFilter::new(), &ExtractOptions::default());

    let lamb = out.table.get("CeeDee Lamb").unwrap();
    assert_eq!(
        lamb.attributes.get("fantasy_points"),
        Some(&Value::Float64(14.75))
    );
    assert_eq!(lamb.attributes.get("rush_yards"), Some(&Value::Int64(12)));
    assert_eq!(
        lamb.attributes.get("notes"),
        Some(&Value::Text("N/A".to_string()))
    );
}

#[test]
fn categorical_filter_counts_misses_separately_from_skips() {
    let filter = RowFilter::new().with_values("position", ["QB"]);
    let out = extract_season(&filter, &ExtractOptions::default());

    assert_eq!(out.table.keys().collect::<Vec<_>>(), vec!["Josh Allen"]);
    assert_eq!(out.summary.row_count_seen, 6);
    // The whitespace-name row is skipped before the filter ever runs.
    assert_eq!(out.summary.row_count_skipped, 1);
    assert_eq!(out.summary.row_count_filtered, 3);
    assert_eq!(out.summary.record_count, 1);
}

#[test]
fn widening_a_filter_never_removes_keys() {
    let narrow = extract_season(
        &RowFilter::new().with_values("position", ["QB", "RB"]),
        &ExtractOptions::default(),
    );
    let wide = extract_season(
        &RowFilter::new().with_values("position", ["QB", "RB", "WR"]),
        &ExtractOptions::default(),
    );
    let unfiltered = extract_season(&RowFilter::new(), &ExtractOptions::default());

    for key in narrow.table.keys() {
        assert!(wide.table.contains_key(key));
    }
    for key in wide.table.keys() {
        assert!(unfiltered.table.contains_key(key));
    }
}

#[test]
fn temporal_filter_is_a_one_element_set() {
    let filter = RowFilter::new().with_values("week", ["1"]);
    let out = extract_season(&filter, &ExtractOptions::default());

    assert_eq!(out.table.len(), 3);
    // With week 2 filtered out, Josh Allen's record is the week-1 row.
    let allen = out.table.get("Josh Allen").unwrap();
    assert_eq!(
        allen.attributes.get("fantasy_points"),
        Some(&Value::Float64(31.5))
    );
    assert_eq!(
        allen.attributes.get("notes"),
        Some(&Value::Text("sharp outing".to_string()))
    );
}

#[test]
fn value_counts_reports_distribution_over_records() {
    let out = extract_season(&RowFilter::new(), &ExtractOptions::default());
    let counts = out.table.value_counts("position");
    assert_eq!(counts.get("QB"), Some(&1));
    assert_eq!(counts.get("RB"), Some(&1));
    assert_eq!(counts.get("WR"), Some(&2));
}

#[test]
fn auto_selection_uses_classifier_defaults() {
    let report = season_report();
    let selection = ColumnSelection::from_inventory(&report.inventory).unwrap();

    assert_eq!(selection.entity_key, "player_name");
    // Statistic and categorical columns in file order; temporal and
    // unclassified columns stay out of the default projection.
    assert_eq!(
        selection.projected,
        vec!["team", "position", "fantasy_points", "rush_yards"]
    );
}

#[test]
fn auto_selection_without_entity_candidate_errors() {
    let report = probe("tests/fixtures/header_only.csv", 1000).unwrap();
    let err = ColumnSelection::from_inventory(&report.inventory).unwrap_err();
    assert!(matches!(err, SchemaError::NoEntityKey));
}

#[test]
fn request_runs_probe_select_extract_end_to_end() {
    let mut request = ExtractionRequest::new(SEASON);
    request.filter = RowFilter::new().with_values("position", ["QB", "RB"]);

    let (report, extraction) = request.run().unwrap();
    assert_eq!(report.approx_row_count, 6);
    assert_eq!(extraction.table.len(), 2);
    assert!(extraction.table.contains_key("Josh Allen"));
    assert!(extraction.table.contains_key("Saquon Barkley"));
}

#[test]
fn header_only_file_extracts_an_empty_table() {
    let report = probe("tests/fixtures/header_only.csv", 1000).unwrap();
    let selection = ColumnSelection::new("name", vec!["team".to_string(), "points".to_string()]);
    let out = extract(
        "tests/fixtures/header_only.csv",
        &report.inventory,
        &selection,
        &RowFilter::new(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert!(out.table.is_empty());
    assert_eq!(out.summary.record_count, 0);
    assert_eq!(out.summary.row_count_seen, 0);
    assert!(out.summary.sample_record.is_none());
}

#[test]
fn projection_through_duplicate_header_reads_last_occurrence() {
    let report = probe("tests/fixtures/dup_headers.csv", 1000).unwrap();
    let selection = ColumnSelection::new("name", vec!["points".to_string()]);
    let out = extract(
        "tests/fixtures/dup_headers.csv",
        &report.inventory,
        &selection,
        &RowFilter::new(),
        &ExtractOptions::default(),
    )
    .unwrap();

    let alice = out.table.get("Alice Smith").unwrap();
    assert_eq!(alice.attributes.get("points"), Some(&Value::Int64(9)));
}

#[test]
fn unknown_selection_column_is_a_schema_error() {
    let report = season_report();
    let selection = ColumnSelection::new("nope", vec!["team".to_string()]);
    let err = extract(
        SEASON,
        &report.inventory,
        &selection,
        &RowFilter::new(),
        &ExtractOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ExtractError::Schema(SchemaError::UnknownColumn { name }) if name == "nope"
    ));
}

#[test]
fn missing_file_surfaces_stream_error_with_empty_partial() {
    let report = season_report();
    let err = extract(
        "tests/fixtures/does_not_exist.csv",
        &report.inventory,
        &season_selection(),
        &RowFilter::new(),
        &ExtractOptions::default(),
    )
    .unwrap_err();

    match err {
        ExtractError::Stream(stream) => {
            assert!(matches!(stream.cause, StreamCause::Csv(_)));
            assert!(stream.partial.is_empty());
            assert_eq!(stream.summary.row_count_seen, 0);
        }
        other => panic!("expected stream error, got {other:?}"),
    }
}

#[test]
fn cancellation_at_chunk_boundary_keeps_partial_table() {
    let report = season_report();
    let options = ExtractOptions {
        chunk_size: 1,
        cancel: Some(Arc::new(AtomicBool::new(true))),
        ..Default::default()
    };
    let err = extract(
        SEASON,
        &report.inventory,
        &season_selection(),
        &RowFilter::new(),
        &options,
    )
    .unwrap_err();

    match err {
        ExtractError::Stream(stream) => {
            assert!(matches!(stream.cause, StreamCause::Cancelled));
            // One window of one row completed before the flag was observed.
            assert_eq!(stream.rows_seen, 1);
            assert_eq!(stream.partial.len(), 1);
            assert!(stream.partial.contains_key("Josh Allen"));
        }
        other => panic!("expected stream error, got {other:?}"),
    }
}
