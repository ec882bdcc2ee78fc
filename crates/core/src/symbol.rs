//! Plant symbol parsing and validation.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Accepted shape after trimming: 1-16 alphanumeric characters.
const SYMBOL_PATTERN: &str = r"^[A-Za-z0-9]{1,16}$";

/// Compiled symbol regex (lazy initialization).
static SYMBOL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SYMBOL_PATTERN).expect("invalid symbol pattern"));

/// Validated plant symbol, uppercased on construction (e.g. `ABBA`).
///
/// Symbols are the per-plant lookup key against the remote service and the
/// unit of accounting for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse and validate a raw symbol.
    ///
    /// Trims surrounding whitespace and uppercases. The trimmed value must
    /// be 1-16 alphanumeric characters.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::config("symbol is empty"));
        }
        if !SYMBOL_REGEX.is_match(trimmed) {
            return Err(Error::config(format!("invalid symbol: {:?}", trimmed)));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Get the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
