//! Raw USDA PLANTS service payloads.
//!
//! Deserialization is deliberately lenient: every field is optional,
//! list-valued profile fields accept arbitrary JSON items, and unknown keys
//! are ignored. Schema drift then surfaces as a normalization failure for
//! one symbol instead of a decode failure, and a missing or null section is
//! an empty section rather than an error.

use serde::{Deserialize, Deserializer};

/// The service emits a literal `null` for some absent list sections.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Plant profile as returned by `GET /PlantProfile?symbol=...`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlantProfile {
    pub id: Option<i64>,
    pub symbol: Option<String>,
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub group: Option<String>,
    pub rank_id: Option<i64>,
    pub rank: Option<String>,
    pub has_characteristics: Option<bool>,
    pub has_distribution_data: Option<bool>,
    pub has_images: Option<bool>,
    pub has_related_links: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub durations: Vec<serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub growth_habits: Vec<serde_json::Value>,
    pub has_legal_statuses: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub legal_statuses: Vec<serde_json::Value>,
    pub has_noxious_statuses: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub noxious_statuses: Vec<serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub native_statuses: Vec<NativeStatusEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub ancestors: Vec<AncestorEntry>,
}

/// One entry of the profile's `NativeStatuses` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NativeStatusEntry {
    pub region: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "Type")]
    pub status_type: Option<String>,
}

/// One entry of the profile's `Ancestors` lineage section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AncestorEntry {
    pub id: Option<i64>,
    pub symbol: Option<String>,
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub rank_id: Option<i64>,
    pub rank: Option<String>,
}

/// One entry of the `GET /PlantCharacteristics/{id}` response array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CharacteristicEntry {
    pub plant_characteristic_name: Option<String>,
    pub plant_characteristic_value: Option<String>,
    pub plant_characteristic_category: Option<String>,
    pub cultivar_name: Option<String>,
    pub synonym_name: Option<String>,
}

/// One symbol's fully fetched raw material: the profile plus its
/// characteristics section (empty when absent or degraded).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub profile: PlantProfile,
    pub characteristics: Vec<CharacteristicEntry>,
}
