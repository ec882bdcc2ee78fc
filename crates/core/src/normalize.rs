//! Decomposition of one raw record into flat table rows.
//!
//! Pure and deterministic: the same raw record always yields identical rows.
//! Missing optional sections become empty row vectors; only a profile
//! missing its identity fields (`Id`, `Symbol`) fails normalization.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::record::{CharacteristicEntry, RawRecord};
use crate::rows::{AncestorRow, CharacteristicRow, NativeStatusRow, PlantId, PlantRow, RecordRows};
use crate::symbol::Symbol;

/// Matches HTML tags (`<i>`, `</i>`, ...) embedded in scientific names.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("invalid tag pattern"));

/// Remove HTML tags from a value.
pub fn strip_html(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

fn strip_html_opt(s: Option<String>) -> Option<String> {
    s.map(|v| strip_html(&v))
}

/// Render one list-valued profile field as a comma-joined cell.
///
/// String items render bare; anything else renders as compact JSON.
fn join_list(items: &[serde_json::Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a characteristic row, dropping entries with a null or blank value.
fn characteristic_row(plant_id: PlantId, entry: CharacteristicEntry) -> Option<CharacteristicRow> {
    let value = entry.plant_characteristic_value?;
    if value.trim().is_empty() {
        return None;
    }
    Some(CharacteristicRow {
        plant_id,
        plant_characteristic_name: entry.plant_characteristic_name,
        plant_characteristic_value: value,
        plant_characteristic_category: entry.plant_characteristic_category,
        cultivar_name: entry.cultivar_name,
        synonym_name: entry.synonym_name,
    })
}

/// Decompose one symbol's raw record into rows for all four tables.
///
/// The PlantId is assigned once from the profile's `Id` and propagated into
/// every child row. Scientific names are HTML-stripped for the plant and
/// each ancestor. Characteristic entries with a blank value are dropped.
pub fn normalize_record(symbol: &Symbol, record: RawRecord) -> Result<RecordRows> {
    let RawRecord {
        profile,
        characteristics,
    } = record;

    let plant_id = profile
        .id
        .ok_or_else(|| Error::normalization(symbol.as_str(), "profile is missing Id"))?;
    let record_symbol = profile
        .symbol
        .ok_or_else(|| Error::normalization(symbol.as_str(), "profile is missing Symbol"))?;

    let native_statuses = profile
        .native_statuses
        .into_iter()
        .map(|entry| NativeStatusRow {
            plant_id,
            region: entry.region,
            status: entry.status,
            status_type: entry.status_type,
        })
        .collect();

    let ancestors = profile
        .ancestors
        .into_iter()
        .map(|entry| AncestorRow {
            plant_id,
            ancestor_id: entry.id,
            symbol: entry.symbol,
            scientific_name: strip_html_opt(entry.scientific_name),
            common_name: entry.common_name,
            rank_id: entry.rank_id,
            rank: entry.rank,
        })
        .collect();

    let characteristics = characteristics
        .into_iter()
        .filter_map(|entry| characteristic_row(plant_id, entry))
        .collect();

    let plant = PlantRow {
        id: plant_id,
        symbol: record_symbol,
        scientific_name: strip_html_opt(profile.scientific_name),
        common_name: profile.common_name,
        group: profile.group,
        rank_id: profile.rank_id,
        rank: profile.rank,
        has_characteristics: profile.has_characteristics,
        has_distribution_data: profile.has_distribution_data,
        has_images: profile.has_images,
        has_related_links: profile.has_related_links,
        durations: join_list(&profile.durations),
        growth_habits: join_list(&profile.growth_habits),
        has_legal_statuses: profile.has_legal_statuses,
        legal_statuses: join_list(&profile.legal_statuses),
        has_noxious_statuses: profile.has_noxious_statuses,
        noxious_statuses: join_list(&profile.noxious_statuses),
    };

    Ok(RecordRows {
        plant,
        native_statuses,
        ancestors,
        characteristics,
    })
}
