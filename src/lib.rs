//! # Monster Merge Engine
//!
//! This library provides the board engine of a match-three style monster
//! merging game, plus an automatic player that picks swaps with a heuristic.
//!
//! Monsters of one type and tier that line up (horizontally, vertically or on
//! either diagonal) are merged into a single monster one tier higher. The
//! remaining cells are eliminated, the column above falls into the gaps, and
//! the board is refilled with new lowest-tier monsters. Stones are fixed
//! obstacles that never match or move.
//!
//! It is used by one binary:
//! - `auto_player`: loads a board configuration, then plays a number of
//!   turns with the chosen strategy and prints the board and the ledger.
//!
//! ## Modules
//! - `engine`: Board representation (`Board`, `Cell`, `Monster`, `Stone`, `Tier`)
//!   and the swap and fall primitives.
//! - `scanner`: Finds direct (3+) and probable (2) runs along every line.
//! - `synthesis`: Merges direct runs into upgraded monsters.
//! - `gravity`: Elimination, column compaction and refill.
//! - `heuristics`: Swap scoring and selection strategies.
//! - `ledger`: Cumulative tally of synthesized monsters.
//! - `game`: Initial board generation and the turn loop (`Game`).
//! - `config`: JSON board and catalog configuration.
//! - `error`: `EngineError`.
//! - `utils`: Parsing boards and layouts from strings.

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod gravity;
pub mod heuristics;
pub mod ledger;
pub mod scanner;
pub mod synthesis;
pub mod utils;
