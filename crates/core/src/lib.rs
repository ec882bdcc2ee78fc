//! Core types, row schemas, and normalization for the plants harvester.

pub mod error;
pub mod normalize;
pub mod record;
pub mod rows;
pub mod symbol;

pub use error::{Error, FailureKind, Result};
pub use normalize::{normalize_record, strip_html};
pub use record::*;
pub use rows::*;
pub use symbol::Symbol;
