//! Symbol list loading from CSV.

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use harvester_core::{Error, Result, Symbol};

/// Reads the `Symbol` column of a CSV file into a clean request list:
/// values are trimmed and uppercased, empties are dropped, and duplicates
/// are removed keeping the first occurrence. Other columns are ignored.
pub fn read_symbols(path: &Path) -> Result<Vec<Symbol>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        Error::table(format!(
            "cannot open symbol file {}: {}",
            path.display(),
            e
        ))
    })?;

    let headers = reader
        .headers()
        .map_err(|e| Error::table(format!("cannot read symbol file header: {}", e)))?;
    let column = headers
        .iter()
        .position(|name| name.trim() == "Symbol")
        .ok_or_else(|| {
            Error::table(format!(
                "symbol file {} has no Symbol column",
                path.display()
            ))
        })?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::table(format!("cannot read symbol file row: {}", e)))?;
        let raw = record.get(column).unwrap_or("").trim();
        if raw.is_empty() {
            continue;
        }
        match Symbol::parse(raw) {
            Ok(symbol) => {
                if seen.insert(symbol.clone()) {
                    symbols.push(symbol);
                }
            }
            Err(error) => {
                warn!(value = raw, error = %error, "Skipping invalid symbol");
            }
        }
    }

    Ok(symbols)
}
