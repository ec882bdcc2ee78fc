//! End-to-end tests for the harvest pipeline.
//!
//! These tests drive the full flow against a mock PLANTS service:
//! symbol list → run_harvest (fetch + normalize + aggregate) → CSV tables.
//!
//! The MockPlantsApi implements the same PlantsApi trait as the real
//! client, so every production path is exercised except the HTTP
//! transport itself.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use harvester_core::FailureKind;
use integration_tests::fixtures;
use integration_tests::mocks::{CharacteristicsReply, MockPlantsApi, ProfileReply};
use pipeline::run_harvest;

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// One known symbol with all sections plus one unknown symbol.
#[tokio::test]
async fn test_known_and_unknown_symbol_scenario() {
    let mock = MockPlantsApi::new();
    let mut profile = fixtures::full_profile(1001, "ABCD");
    profile.ancestors.clear();
    mock.script_profile("ABCD", vec![ProfileReply::Found(profile)]);
    mock.script_characteristics(
        1001,
        vec![CharacteristicsReply::Entries(vec![
            fixtures::characteristic("Growth Rate", "Slow"),
            fixtures::characteristic("Lifespan", "Long"),
            fixtures::blank_characteristic("Toxicity"),
        ])],
    );
    // XXXX left unscripted: the service answers it with a null body

    let report = run_harvest(
        Arc::new(mock.clone()),
        fixtures::symbols(&["ABCD", "XXXX"]),
        &fixtures::fetch_config(),
        None,
        CancellationToken::new(),
    )
    .await;

    // ABCD resolves into one plant and its child rows
    assert_eq!(report.tables.plants.len(), 1);
    assert_eq!(report.tables.native_statuses.len(), 1);
    assert_eq!(report.tables.ancestors.len(), 0, "no lineage in the profile");
    assert_eq!(
        report.tables.characteristics.len(),
        2,
        "blank-valued characteristic must be dropped"
    );

    // Every child row joins back to the plant; names are HTML-stripped
    let plant = &report.tables.plants[0];
    assert_eq!(plant.id, 1001);
    assert_eq!(
        plant.scientific_name.as_deref(),
        Some("Abies concolor (Gord. & Glend.) Lindl.")
    );
    assert!(report
        .tables
        .native_statuses
        .iter()
        .all(|r| r.plant_id == plant.id));
    assert!(report
        .tables
        .characteristics
        .iter()
        .all(|r| r.plant_id == plant.id));

    // XXXX fails terminally on the first attempt, no retries
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.symbol.as_str(), "XXXX");
    assert_eq!(failure.kind, FailureKind::Permanent);
    assert_eq!(failure.attempts, 1);
    assert_eq!(mock.profile_calls("XXXX"), 1);

    // Accounting: every input symbol lands in exactly one place
    assert_eq!(report.tables.plants.len() + report.failures.len(), 2);
    assert_eq!(report.summary.attempted, 2);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.permanent, 1);
}

/// Full disk round trip: symbol CSV in, four table CSVs out.
#[tokio::test]
async fn test_symbol_file_to_csv_tables() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("symbols.csv");
    let mut file = std::fs::File::create(&input).unwrap();
    writeln!(file, "Name,Symbol").unwrap();
    writeln!(file, "White fir, abcd ").unwrap();
    writeln!(file, "Unknown,XXXX").unwrap();
    writeln!(file, "Duplicate,ABCD").unwrap();
    drop(file);

    let symbols = tables::read_symbols(&input).unwrap();
    assert_eq!(symbols.len(), 2, "trimmed, uppercased, deduplicated");

    let mock = MockPlantsApi::new();
    mock.script_profile(
        "ABCD",
        vec![ProfileReply::Found(fixtures::full_profile(1001, "ABCD"))],
    );
    mock.script_characteristics(
        1001,
        vec![CharacteristicsReply::Entries(vec![fixtures::characteristic(
            "Growth Rate",
            "Slow",
        )])],
    );

    let report = run_harvest(
        Arc::new(mock),
        symbols,
        &fixtures::fetch_config(),
        None,
        CancellationToken::new(),
    )
    .await;

    let out_dir = dir.path().join("out");
    tables::write_tables(&report.tables, &out_dir).unwrap();

    let plants = lines(&out_dir.join(tables::PLANTS_FILE));
    assert!(plants[0].starts_with("Id,Symbol,ScientificName"));
    assert_eq!(plants.len(), 2);
    assert!(plants[1].starts_with("1001,ABCD,"));
    assert!(
        !plants[1].contains('<'),
        "HTML tags must not survive into the CSV"
    );

    let statuses = lines(&out_dir.join(tables::NATIVE_STATUS_FILE));
    assert_eq!(statuses[0], "PlantID,Region,Status,Type");
    assert_eq!(statuses.len(), 2);

    let ancestors = lines(&out_dir.join(tables::ANCESTORS_FILE));
    assert_eq!(ancestors.len(), 2);
    assert!(ancestors[1].starts_with("1001,500,ABIES,"));

    let characteristics = lines(&out_dir.join(tables::CHARACTERISTICS_FILE));
    assert_eq!(characteristics.len(), 2);
    assert!(characteristics[1].starts_with("1001,Growth Rate,Slow"));
}

/// A characteristics outage degrades the symbol instead of failing it.
#[tokio::test(start_paused = true)]
async fn test_characteristics_outage_degrades_symbol() {
    let mock = MockPlantsApi::new();
    mock.script_profile(
        "ABCD",
        vec![ProfileReply::Found(fixtures::full_profile(1001, "ABCD"))],
    );
    mock.script_characteristics(1001, vec![CharacteristicsReply::ServerError(503)]);

    let report = run_harvest(
        Arc::new(mock.clone()),
        fixtures::symbols(&["ABCD"]),
        &fixtures::fetch_config(),
        None,
        CancellationToken::new(),
    )
    .await;

    assert!(report.failures.is_empty());
    assert_eq!(report.tables.plants.len(), 1);
    assert_eq!(report.tables.native_statuses.len(), 1);
    assert!(report.tables.characteristics.is_empty());
    // The characteristics endpoint got its full retry budget before degrading
    assert_eq!(mock.characteristics_calls(1001), 3);
}

/// Cancellation keeps resolved symbols and records the rest as cancelled.
#[tokio::test]
async fn test_cancellation_keeps_finished_work() {
    let mock = MockPlantsApi::new();
    mock.script_profile(
        "FAST",
        vec![ProfileReply::Found(fixtures::minimal_profile(1, "FAST"))],
    );
    mock.script_profile(
        "SLOW",
        vec![ProfileReply::Found(fixtures::minimal_profile(2, "SLOW"))],
    );
    mock.delay_profile("SLOW", Duration::from_secs(3600));

    let cancel = CancellationToken::new();
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let run = tokio::spawn({
        let mock = mock.clone();
        let cancel = cancel.clone();
        async move {
            run_harvest(
                Arc::new(mock),
                fixtures::symbols(&["FAST", "SLOW"]),
                &fixtures::fetch_config(),
                Some(tx),
                cancel,
            )
            .await
        }
    });

    // Wait for FAST to resolve, then stop the run
    let first = rx.recv().await.unwrap();
    assert_eq!(first.symbol().as_str(), "FAST");
    cancel.cancel();

    let report = run.await.unwrap();
    assert_eq!(report.tables.plants.len(), 1);
    assert_eq!(report.tables.plants[0].symbol, "FAST");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol.as_str(), "SLOW");
    assert_eq!(report.failures[0].kind, FailureKind::Cancelled);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.cancelled, 1);
}
