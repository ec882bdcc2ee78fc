//! Flat output row schemas for the four tables.
//!
//! Field order and serde renames fix the CSV column layout, so the structs
//! here are the table schemas. `PlantID` / `AncestorID` spellings are the
//! published column names and deliberately differ from the profile's
//! `RankId` casing.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::FailureKind;
use crate::symbol::Symbol;

/// Join key across all four tables: the database-issued record id.
pub type PlantId = i64;

/// One row of the plants table, exactly one per normalized symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlantRow {
    pub id: PlantId,
    pub symbol: String,
    /// HTML-stripped.
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub group: Option<String>,
    pub rank_id: Option<i64>,
    pub rank: Option<String>,
    pub has_characteristics: Option<bool>,
    pub has_distribution_data: Option<bool>,
    pub has_images: Option<bool>,
    pub has_related_links: Option<bool>,
    /// Comma-joined; empty when the source list is empty.
    pub durations: String,
    pub growth_habits: String,
    pub has_legal_statuses: Option<bool>,
    pub legal_statuses: String,
    pub has_noxious_statuses: Option<bool>,
    pub noxious_statuses: String,
}

/// One native-status entry for a plant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NativeStatusRow {
    #[serde(rename = "PlantID")]
    pub plant_id: PlantId,
    pub region: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "Type")]
    pub status_type: Option<String>,
}

/// One taxonomic-lineage entry for a plant, in source insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AncestorRow {
    #[serde(rename = "PlantID")]
    pub plant_id: PlantId,
    #[serde(rename = "AncestorID")]
    pub ancestor_id: Option<i64>,
    pub symbol: Option<String>,
    /// HTML-stripped.
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub rank_id: Option<i64>,
    pub rank: Option<String>,
}

/// One characteristic fact for a plant. Entries with a blank value never
/// become rows (dropped during normalization).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CharacteristicRow {
    #[serde(rename = "PlantID")]
    pub plant_id: PlantId,
    pub plant_characteristic_name: Option<String>,
    pub plant_characteristic_value: String,
    pub plant_characteristic_category: Option<String>,
    pub cultivar_name: Option<String>,
    pub synonym_name: Option<String>,
}

/// All rows produced by one successful normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRows {
    pub plant: PlantRow,
    pub native_statuses: Vec<NativeStatusRow>,
    pub ancestors: Vec<AncestorRow>,
    pub characteristics: Vec<CharacteristicRow>,
}

/// Terminal record for a symbol that produced no rows.
#[derive(Debug, Clone, Serialize)]
pub struct FetchFailure {
    pub symbol: Symbol,
    pub kind: FailureKind,
    /// Attempts consumed against the profile endpoint.
    pub attempts: u32,
    pub detail: String,
}

/// Accumulated rows for a whole run, one collection per output table.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub plants: Vec<PlantRow>,
    pub native_statuses: Vec<NativeStatusRow>,
    pub ancestors: Vec<AncestorRow>,
    pub characteristics: Vec<CharacteristicRow>,
}

impl TableSet {
    /// Append one symbol's rows.
    pub fn push_record(&mut self, rows: RecordRows) {
        self.plants.push(rows.plant);
        self.native_statuses.extend(rows.native_statuses);
        self.ancestors.extend(rows.ancestors);
        self.characteristics.extend(rows.characteristics);
    }

    /// Total rows across all four tables.
    pub fn row_count(&self) -> usize {
        self.plants.len()
            + self.native_statuses.len()
            + self.ancestors.len()
            + self.characteristics.len()
    }

    /// Plants with duplicate ids removed, keeping the first occurrence.
    ///
    /// Two symbols can resolve to the same record (synonyms). The report
    /// keeps one plant row per symbol; the written table uses this view.
    /// Child rows stay keyed by the shared PlantId either way.
    pub fn deduped_plants(&self) -> Vec<&PlantRow> {
        let mut seen = HashSet::new();
        self.plants
            .iter()
            .filter(|plant| seen.insert(plant.id))
            .collect()
    }
}
