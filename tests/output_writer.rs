use std::fs;
use std::path::PathBuf;

use statstream::extract::{ColumnSelection, ExtractOptions, Extraction, RowFilter, extract};
use statstream::output::{summary_path_for, write_extraction};
use statstream::schema::probe;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("statstream_{tag}_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn players_extraction() -> Extraction {
    let report = probe("tests/fixtures/players.csv", 1000).unwrap();
    let selection = ColumnSelection::new("name", vec!["team".to_string(), "points".to_string()]);
    extract(
        "tests/fixtures/players.csv",
        &report.inventory,
        &selection,
        &RowFilter::new(),
        &ExtractOptions::default(),
    )
    .unwrap()
}

#[test]
fn artifacts_round_trip_through_json() {
    let dir = scratch_dir("roundtrip");
    let table_path = dir.join("players.json");

    let extraction = players_extraction();
    let summary_path = write_extraction(&table_path, &extraction).unwrap();
    assert_eq!(
        summary_path.file_name().unwrap().to_str().unwrap(),
        "players_summary.json"
    );

    // The table document is a mapping from entity key to attribute map, with
    // typed scalars preserved.
    let table: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&table_path).unwrap()).unwrap();
    assert_eq!(table["Alice"]["team"], serde_json::json!("NYG"));
    assert_eq!(table["Alice"]["points"], serde_json::json!(12));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["record_count"], serde_json::json!(1));
    assert_eq!(summary["row_count_seen"], serde_json::json!(3));
    assert_eq!(summary["row_count_skipped"], serde_json::json!(1));
    assert_eq!(
        summary["columns_selected"],
        serde_json::json!(["name", "team", "points"])
    );
    assert!(summary["started_at"].as_u64().unwrap() > 0);
    assert_eq!(summary["sample_record"]["entity_key"], "Alice");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn summary_path_derivation_is_stable() {
    assert_eq!(
        summary_path_for(&PathBuf::from("out/players.json"))
            .file_name()
            .unwrap(),
        "players_summary.json"
    );
}
