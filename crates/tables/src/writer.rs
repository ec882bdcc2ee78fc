//! CSV table output.
//!
//! Headers are written explicitly rather than inferred from the first
//! row, so an empty run still produces all four files with their full
//! column sets.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use harvester_core::{Error, Result, TableSet};
use telemetry::metrics;

pub const PLANTS_FILE: &str = "plants.csv";
pub const NATIVE_STATUS_FILE: &str = "native_status.csv";
pub const ANCESTORS_FILE: &str = "ancestors.csv";
pub const CHARACTERISTICS_FILE: &str = "characteristics.csv";

/// Published column sets, in order. Kept in sync with the row structs in
/// harvester-core (guarded by a test).
const PLANT_HEADER: [&str; 17] = [
    "Id",
    "Symbol",
    "ScientificName",
    "CommonName",
    "Group",
    "RankId",
    "Rank",
    "HasCharacteristics",
    "HasDistributionData",
    "HasImages",
    "HasRelatedLinks",
    "Durations",
    "GrowthHabits",
    "HasLegalStatuses",
    "LegalStatuses",
    "HasNoxiousStatuses",
    "NoxiousStatuses",
];
const NATIVE_STATUS_HEADER: [&str; 4] = ["PlantID", "Region", "Status", "Type"];
const ANCESTORS_HEADER: [&str; 7] = [
    "PlantID",
    "AncestorID",
    "Symbol",
    "ScientificName",
    "CommonName",
    "RankId",
    "Rank",
];
const CHARACTERISTICS_HEADER: [&str; 6] = [
    "PlantID",
    "PlantCharacteristicName",
    "PlantCharacteristicValue",
    "PlantCharacteristicCategory",
    "CultivarName",
    "SynonymName",
];

/// Writes the four tables under `out_dir`, creating the directory if
/// needed. Plants are deduplicated by id at this point; child tables are
/// written as accumulated.
pub fn write_tables(tables: &TableSet, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let plants = tables.deduped_plants();
    let mut rows = 0;
    rows += write_table(&out_dir.join(PLANTS_FILE), &plants, &PLANT_HEADER)?;
    rows += write_table(
        &out_dir.join(NATIVE_STATUS_FILE),
        &tables.native_statuses,
        &NATIVE_STATUS_HEADER,
    )?;
    rows += write_table(
        &out_dir.join(ANCESTORS_FILE),
        &tables.ancestors,
        &ANCESTORS_HEADER,
    )?;
    rows += write_table(
        &out_dir.join(CHARACTERISTICS_FILE),
        &tables.characteristics,
        &CHARACTERISTICS_HEADER,
    )?;
    metrics().rows_emitted.inc_by(rows as u64);

    info!(
        out_dir = %out_dir.display(),
        plants = plants.len(),
        native_statuses = tables.native_statuses.len(),
        ancestors = tables.ancestors.len(),
        characteristics = tables.characteristics.len(),
        "Tables written"
    );
    Ok(())
}

fn write_table<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::table(format!("cannot create {}: {}", path.display(), e)))?;

    writer
        .write_record(header)
        .map_err(|e| Error::table(format!("cannot write header to {}: {}", path.display(), e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| Error::table(format!("cannot write row to {}: {}", path.display(), e)))?;
    }
    writer.flush()?;

    Ok(rows.len())
}
