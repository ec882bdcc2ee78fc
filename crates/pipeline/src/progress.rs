//! Incremental progress events, one per resolved symbol.

use harvester_core::{FailureKind, Symbol};

/// Emitted once per input symbol, in completion order.
#[derive(Debug, Clone)]
pub enum Progress {
    /// The symbol was fetched and normalized into rows.
    Resolved {
        symbol: Symbol,
        completed: usize,
        total: usize,
        rows: usize,
    },
    /// The symbol failed terminally.
    Failed {
        symbol: Symbol,
        completed: usize,
        total: usize,
        kind: FailureKind,
    },
}

impl Progress {
    /// The input symbol this event is about.
    pub fn symbol(&self) -> &Symbol {
        match self {
            Progress::Resolved { symbol, .. } => symbol,
            Progress::Failed { symbol, .. } => symbol,
        }
    }

    /// How many symbols have resolved so far, including this one.
    pub fn completed(&self) -> usize {
        match self {
            Progress::Resolved { completed, .. } => *completed,
            Progress::Failed { completed, .. } => *completed,
        }
    }
}
