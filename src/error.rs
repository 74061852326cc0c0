//! Construction-time errors.
//!
//! Normal play never produces an `EngineError`: rejected swaps, exhausted
//! strategy searches and max-tier groups are reported as plain values
//! (`bool`, `Option`, a skipped group). Only configuration that cannot be
//! turned into a playable board ends up here.

use std::path::PathBuf;

/// Errors raised while loading configuration or building a board.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Row or column count is zero.
    #[error("Board dimensions must be positive, got {rows}x{cols}")]
    NonPositiveDimensions { rows: usize, cols: usize },

    /// The monster catalog has no entries.
    #[error("Monster catalog is empty")]
    EmptyCatalog,

    /// Layout cell count does not equal `rows * cols`.
    #[error("Layout has {found} cells, expected {expected}")]
    LayoutMismatch { expected: usize, found: usize },

    /// A layout or board string contains a code that cannot be parsed.
    #[error("Unrecognized cell code '{code}' in row {row} col {col}")]
    UnknownCellCode { code: String, row: usize, col: usize },

    /// The monster catalog lists the same type id more than once.
    #[error("Monster type '{0}' is listed more than once in the catalog")]
    DuplicateMonster(String),

    /// A monster references a type id that is not in the catalog.
    #[error("Monster type '{0}' is not in the catalog")]
    UnknownMonster(String),

    /// The requested grid id does not exist in the configuration.
    #[error("Grid {id} not found ({available} grids configured)")]
    GridNotFound { id: usize, available: usize },

    /// Reading a config file failed.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config JSON is malformed.
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The initial board could not be made match-free.
    #[error("Initial board still has matches after {rounds} repair rounds")]
    RepairExhausted { rounds: usize },
}
