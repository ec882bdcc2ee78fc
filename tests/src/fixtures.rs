//! Test fixtures: canned profiles, characteristics, and fetch settings.

use serde_json::json;

use harvester_core::{
    AncestorEntry, CharacteristicEntry, NativeStatusEntry, PlantProfile, Symbol,
};
use usda_client::FetchConfig;

/// Parse a known-good symbol.
pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("fixture symbol must be valid")
}

pub fn symbols(raw: &[&str]) -> Vec<Symbol> {
    raw.iter().map(|s| symbol(s)).collect()
}

/// A profile with identity fields only: no sections, no characteristics.
pub fn minimal_profile(id: i64, symbol: &str) -> PlantProfile {
    PlantProfile {
        id: Some(id),
        symbol: Some(symbol.to_string()),
        scientific_name: Some(format!("Plantae {}", symbol.to_lowercase())),
        ..PlantProfile::default()
    }
}

/// A fully populated profile: HTML-tagged scientific names, one native
/// status, one ancestor, and the characteristics flag set.
pub fn full_profile(id: i64, symbol: &str) -> PlantProfile {
    PlantProfile {
        id: Some(id),
        symbol: Some(symbol.to_string()),
        scientific_name: Some("<i>Abies concolor</i> (Gord. & Glend.) Lindl.".to_string()),
        common_name: Some("white fir".to_string()),
        group: Some("Gymnosperm".to_string()),
        rank_id: Some(180),
        rank: Some("Species".to_string()),
        has_characteristics: Some(true),
        has_distribution_data: Some(true),
        has_images: Some(false),
        has_related_links: Some(false),
        durations: vec![json!("Perennial")],
        growth_habits: vec![json!("Tree"), json!("Shrub")],
        has_legal_statuses: Some(false),
        legal_statuses: Vec::new(),
        has_noxious_statuses: Some(false),
        noxious_statuses: Vec::new(),
        native_statuses: vec![NativeStatusEntry {
            region: Some("L48".to_string()),
            status: Some("N".to_string()),
            status_type: Some("Native".to_string()),
        }],
        ancestors: vec![AncestorEntry {
            id: Some(500),
            symbol: Some("ABIES".to_string()),
            scientific_name: Some("<i>Abies</i> Mill.".to_string()),
            common_name: Some("fir".to_string()),
            rank_id: Some(160),
            rank: Some("Genus".to_string()),
        }],
    }
}

/// One characteristic entry with a usable value.
pub fn characteristic(name: &str, value: &str) -> CharacteristicEntry {
    CharacteristicEntry {
        plant_characteristic_name: Some(name.to_string()),
        plant_characteristic_value: Some(value.to_string()),
        plant_characteristic_category: Some("Growth Requirements".to_string()),
        cultivar_name: None,
        synonym_name: None,
    }
}

/// A characteristic entry with a blank value, dropped by normalization.
pub fn blank_characteristic(name: &str) -> CharacteristicEntry {
    CharacteristicEntry {
        plant_characteristic_name: Some(name.to_string()),
        plant_characteristic_value: Some("   ".to_string()),
        ..CharacteristicEntry::default()
    }
}

/// Fetch settings for deterministic tests: no jitter, short backoff,
/// three attempts.
pub fn fetch_config() -> FetchConfig {
    FetchConfig {
        concurrency: 4,
        max_attempts: 3,
        base_delay_ms: 100,
        max_delay_ms: 1_000,
        jitter: 0.0,
        ..FetchConfig::default()
    }
}
