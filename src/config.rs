//! Board and catalog configuration.
//!
//! A configuration document lists one or more grids (dimensions plus a
//! per-cell layout) and the monster catalog shared by all of them:
//!
//! ```json
//! {
//!   "grids": [ { "row": 3, "col": 3, "data": ["MMM", "MSM", "MMM"] } ],
//!   "monsters": [ { "id": "R" }, { "id": "G" } ]
//! }
//! ```
//!
//! `GameConfig::board_setup` validates one grid and turns it into a `BoardSetup`,
//! the only thing the simulation needs.
use crate::engine::duplicate_id;
use crate::error::EngineError;
use crate::utils::layout_from_str_array;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What a layout position is filled with when the board is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutCode {
    Monster,
    Stone,
    Empty,
}

/// One configured grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub row: usize,
    pub col: usize,
    /// Layout rows: `M` monster, `S` stone, `.` empty.
    pub data: Vec<String>,
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterConfig {
    pub id: String,
}

/// The whole configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub grids: Vec<GridConfig>,
    pub monsters: Vec<MonsterConfig>,
}

/// A validated grid: everything needed to generate a board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSetup {
    pub rows: usize,
    pub cols: usize,
    /// One code per cell, row-major.
    pub layout: Vec<LayoutCode>,
    /// Ordered monster type ids.
    pub catalog: Vec<String>,
}

impl GameConfig {
    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Validates grid `grid_id` against the catalog.
    ///
    /// # Errors
    /// `GridNotFound`, `NonPositiveDimensions`, `EmptyCatalog`, `DuplicateMonster`,
    /// `LayoutMismatch` (layout cell count differs from `row * col`, or the
    /// layout rows are ragged) and `UnknownCellCode`.
    ///
    /// # Examples
    /// ```
    /// use monster_merge::config::GameConfig;
    ///
    /// let setup = GameConfig::default().board_setup(0).unwrap();
    /// assert_eq!(setup.layout.len(), setup.rows * setup.cols);
    /// assert!(GameConfig::default().board_setup(99).is_err());
    /// ```
    pub fn board_setup(&self, grid_id: usize) -> Result<BoardSetup, EngineError> {
        let grid = self.grids.get(grid_id).ok_or(EngineError::GridNotFound {
            id: grid_id,
            available: self.grids.len(),
        })?;
        if grid.row == 0 || grid.col == 0 {
            return Err(EngineError::NonPositiveDimensions {
                rows: grid.row,
                cols: grid.col,
            });
        }
        if self.monsters.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        let catalog: Vec<String> = self.monsters.iter().map(|m| m.id.clone()).collect();
        if let Some(id) = duplicate_id(&catalog) {
            return Err(EngineError::DuplicateMonster(id.to_string()));
        }

        let (_, _, layout) = layout_from_str_array(&grid.data)?;
        if layout.len() != grid.row * grid.col {
            return Err(EngineError::LayoutMismatch {
                expected: grid.row * grid.col,
                found: layout.len(),
            });
        }

        Ok(BoardSetup {
            rows: grid.row,
            cols: grid.col,
            layout,
            catalog,
        })
    }
}

impl Default for GameConfig {
    /// An 8x8 board with two stones and five monster types.
    fn default() -> Self {
        let data = [
            "MMMMMMMM", "MMMMMMMM", "MMMMMMMM", "MMMSMMMM", "MMMMSMMM", "MMMMMMMM", "MMMMMMMM",
            "MMMMMMMM",
        ];
        GameConfig {
            grids: vec![GridConfig {
                row: 8,
                col: 8,
                data: data.iter().map(|s| s.to_string()).collect(),
            }],
            monsters: ["R", "G", "B", "Y", "P"]
                .iter()
                .map(|id| MonsterConfig { id: id.to_string() })
                .collect(),
        }
    }
}
