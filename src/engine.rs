//! Core board model for the monster-merge puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Tier`: the ordered power class of a monster (`C < B < A`).
//! - `Cell`: a closed variant over `Monster`, `Stone` and `Empty`.
//! - `Board`: the row-major cell array, its dimensions, the monster catalog and
//!   the live per-type monster counts.
//!
//! Every write to the board goes through `Board::set`, `Board::swap` or
//! `Board::fall`, which keeps the stored cell indexes and the type counts in
//! step with the cell array.
use crate::error::EngineError;
use log::debug;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Level given to freshly spawned monsters.
pub const SPAWN_LEVEL: u32 = 1;

/// Ordered power class of a monster.
///
/// Synthesis advances a merged group by one tier. `Tier::A` is the top tier and
/// cannot advance further.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    C = 1,
    B = 2,
    A = 3,
}

impl Tier {
    /// Tier every new monster spawns with.
    pub const LOWEST: Tier = Tier::C;
    /// Highest reachable tier.
    pub const MAX: Tier = Tier::A;

    /// Numeric value used by the swap-effect heuristic.
    ///
    /// ```
    /// use monster_merge::engine::Tier;
    /// assert_eq!(Tier::C.value(), 1);
    /// assert_eq!(Tier::A.value(), 3);
    /// ```
    pub fn value(self) -> i64 {
        self as i64
    }

    /// The next tier up, or `None` if this is already the top tier.
    pub fn up(self) -> Option<Tier> {
        match self {
            Tier::C => Some(Tier::B),
            Tier::B => Some(Tier::A),
            Tier::A => None,
        }
    }

    pub fn is_max(self) -> bool {
        self == Tier::MAX
    }

    /// Parses a tier letter (`'A'`, `'B'` or `'C'`).
    pub fn from_char(c: char) -> Option<Tier> {
        match c {
            'A' => Some(Tier::A),
            'B' => Some(Tier::B),
            'C' => Some(Tier::C),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Tier::A => 'A',
            Tier::B => 'B',
            Tier::C => 'C',
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Type tag of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellType {
    Monster,
    Stone,
    Empty,
}

/// A matchable unit on the board.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Monster {
    /// Board index this monster currently occupies.
    pub index: usize,
    /// Catalog type id.
    pub kind: String,
    pub tier: Tier,
    /// Power count, aggregated across merges.
    pub level: u32,
}

impl Monster {
    pub fn new(index: usize, kind: impl Into<String>, tier: Tier, level: u32) -> Self {
        Monster {
            index,
            kind: kind.into(),
            tier,
            level,
        }
    }

    /// A lowest-tier monster at spawn level.
    pub fn spawn(index: usize, kind: impl Into<String>) -> Self {
        Monster::new(index, kind, Tier::LOWEST, SPAWN_LEVEL)
    }

    /// Two monsters are "the same" when both type id and tier match. Level is ignored.
    pub fn is_same(&self, other: &Monster) -> bool {
        self.kind == other.kind && self.tier == other.tier
    }
}

/// An obstacle. Stones never match, never move and are never removed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stone {
    pub index: usize,
    /// Remaining hit points.
    pub hp: u32,
}

impl Stone {
    pub fn new(index: usize, hp: u32) -> Self {
        Stone { index, hp }
    }

    /// Hit points for a freshly generated stone, uniform in `1..=7`.
    pub fn random_hp(rng: &mut impl Rng) -> u32 {
        rng.gen_range(1..=7)
    }
}

/// One board position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Monster(Monster),
    Stone(Stone),
    Empty,
}

impl Cell {
    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::Monster(_) => CellType::Monster,
            Cell::Stone(_) => CellType::Stone,
            Cell::Empty => CellType::Empty,
        }
    }

    pub fn is_monster(&self) -> bool {
        matches!(self, Cell::Monster(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_monster(&self) -> Option<&Monster> {
        match self {
            Cell::Monster(m) => Some(m),
            _ => None,
        }
    }

    /// True only when both cells are monsters of the same type and tier.
    pub fn is_same(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Monster(a), Cell::Monster(b)) => a.is_same(b),
            _ => false,
        }
    }

    /// Display form handed to rendering collaborators.
    pub fn render(&self) -> CellView {
        match self {
            Cell::Monster(m) => CellView::Monster {
                kind: m.kind.clone(),
                tier: m.tier,
                level: m.level,
            },
            Cell::Stone(s) => CellView::Stone { hp: s.hp },
            Cell::Empty => CellView::Blank,
        }
    }

    fn set_index(&mut self, index: usize) {
        match self {
            Cell::Monster(m) => m.index = index,
            Cell::Stone(s) => s.index = index,
            Cell::Empty => {}
        }
    }
}

/// Read-only, renderable form of a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellView {
    Monster { kind: String, tier: Tier, level: u32 },
    Stone { hp: u32 },
    Blank,
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellView::Monster { kind, tier, level } => write!(f, "{}{}{}", kind, tier, level),
            CellView::Stone { hp } => write!(f, "#{}", hp),
            CellView::Blank => Ok(()),
        }
    }
}

/// The game board: a row-major array of cells indexed by `row * cols + col`.
///
/// The board also owns the monster catalog and the live count of monsters per
/// type id. The counts always equal the number of `Cell::Monster` entries of
/// each type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    catalog: Vec<String>,
    type_counts: BTreeMap<String, usize>,
}

impl Board {
    /// Creates a board of the given dimensions with every cell `Cell::Empty`.
    ///
    /// # Errors
    /// `EngineError::NonPositiveDimensions` if `rows` or `cols` is zero and
    /// `EngineError::EmptyCatalog` if `catalog` has no entries.
    ///
    /// # Examples
    /// ```
    /// use monster_merge::engine::{Board, Cell};
    /// let board = Board::new_empty(3, 4, vec!["X".to_string()]).unwrap();
    /// assert_eq!(board.len(), 12);
    /// assert_eq!(board.get(0), &Cell::Empty);
    /// ```
    pub fn new_empty(rows: usize, cols: usize, catalog: Vec<String>) -> Result<Self, EngineError> {
        Self::from_cells(rows, cols, vec![Cell::Empty; rows * cols], catalog)
    }

    /// Creates a board from an explicit cell sequence.
    ///
    /// Stored cell indexes are rewritten to match their position and the type
    /// counts are computed from the cells.
    ///
    /// # Errors
    /// Dimension and catalog errors as for `new_empty`,
    /// `EngineError::LayoutMismatch` if `cells.len() != rows * cols`,
    /// `EngineError::DuplicateMonster` if `catalog` lists an id twice, and
    /// `EngineError::UnknownMonster` if a monster's type id is not in `catalog`.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<Cell>,
        catalog: Vec<String>,
    ) -> Result<Self, EngineError> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::NonPositiveDimensions { rows, cols });
        }
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        if let Some(id) = duplicate_id(&catalog) {
            return Err(EngineError::DuplicateMonster(id.to_string()));
        }
        if cells.len() != rows * cols {
            return Err(EngineError::LayoutMismatch {
                expected: rows * cols,
                found: cells.len(),
            });
        }

        let mut type_counts: BTreeMap<String, usize> =
            catalog.iter().map(|id| (id.clone(), 0)).collect();
        let mut cells = cells;
        for (index, cell) in cells.iter_mut().enumerate() {
            cell.set_index(index);
            if let Cell::Monster(m) = cell {
                match type_counts.get_mut(&m.kind) {
                    Some(count) => *count += 1,
                    None => return Err(EngineError::UnknownMonster(m.kind.clone())),
                }
            }
        }

        Ok(Board {
            rows,
            cols,
            cells,
            catalog,
            type_counts,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells (`rows * cols`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ordered list of monster type ids this board draws from.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Live monster count per type id. Every catalog id is present, possibly with 0.
    pub fn type_counts(&self) -> &BTreeMap<String, usize> {
        &self.type_counts
    }

    /// Number of monsters currently on the board.
    pub fn monster_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_monster()).count()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major index of `(row, col)`.
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// `(row, col)` of a row-major index.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Index one step of `(dr, dc)` away from `index`, or `None` if that
    /// position is off the board.
    pub fn offset(&self, index: usize, dr: isize, dc: isize) -> Option<usize> {
        let (r, c) = self.coords(index);
        let nr = r as isize + dr;
        let nc = c as isize + dc;
        if nr < 0 || nc < 0 || nr >= self.rows as isize || nc >= self.cols as isize {
            return None;
        }
        Some(self.index_of(nr as usize, nc as usize))
    }

    /// Returns the cell at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn get(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// Places `cell` at `index` and returns the previous occupant.
    ///
    /// The placed cell's stored index is rewritten to `index`, and the type
    /// counts are adjusted for both the outgoing and the incoming cell.
    ///
    /// # Errors
    /// `EngineError::UnknownMonster` if `cell` is a monster whose type id is
    /// not in the catalog. The board is left unchanged.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, cell: Cell) -> Result<Cell, EngineError> {
        if let Cell::Monster(m) = &cell {
            if !self.type_counts.contains_key(&m.kind) {
                return Err(EngineError::UnknownMonster(m.kind.clone()));
            }
        }
        Ok(self.place(index, cell))
    }

    /// `set` for callers that only place catalog types or board-derived cells.
    pub(crate) fn place(&mut self, index: usize, mut cell: Cell) -> Cell {
        cell.set_index(index);
        if let Cell::Monster(m) = &cell {
            debug_assert!(
                self.type_counts.contains_key(&m.kind),
                "monster type {} not in catalog",
                m.kind
            );
            if let Some(count) = self.type_counts.get_mut(&m.kind) {
                *count += 1;
            }
        }
        let old = std::mem::replace(&mut self.cells[index], cell);
        if let Cell::Monster(m) = &old {
            if let Some(count) = self.type_counts.get_mut(&m.kind) {
                *count = count.saturating_sub(1);
            }
        }
        old
    }

    /// Exchanges the monsters at `i` and `j`.
    ///
    /// The swap is rejected (and nothing changes) if either cell is not a
    /// monster, or if both monsters share type id and tier, which would make
    /// the swap a no-op.
    ///
    /// # Returns
    /// `true` if the cells were exchanged.
    ///
    /// # Examples
    /// ```
    /// use monster_merge::utils::board_from_str_array;
    /// let mut board = board_from_str_array(&["XC YC #2"], &["X", "Y"]).unwrap();
    /// assert!(board.swap(0, 1));
    /// assert!(!board.swap(1, 2)); // stones never move
    /// ```
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        let legal = match (&self.cells[i], &self.cells[j]) {
            (Cell::Monster(a), Cell::Monster(b)) => !a.is_same(b),
            _ => false,
        };
        if !legal {
            debug!("swap {} {} rejected", i, j);
            return false;
        }
        self.cells.swap(i, j);
        self.cells[i].set_index(i);
        self.cells[j].set_index(j);
        debug!("swap {} {}", i, j);
        true
    }

    /// Moves the monster at `from` into the empty slot `to`.
    ///
    /// This is the gravity primitive used by elimination. It fails without
    /// mutation when `from` is not a monster or `to` is not empty.
    pub fn fall(&mut self, from: usize, to: usize) -> bool {
        if !self.cells[from].is_monster() || !self.cells[to].is_empty() {
            return false;
        }
        self.cells.swap(from, to);
        self.cells[to].set_index(to);
        true
    }

    /// Render forms of every cell, in index order.
    pub fn snapshot(&self) -> Vec<CellView> {
        self.cells.iter().map(Cell::render).collect()
    }
}

/// First id that appears more than once in `catalog`.
pub fn duplicate_id(catalog: &[String]) -> Option<&str> {
    let mut seen = BTreeSet::new();
    for id in catalog {
        if !seen.insert(id.as_str()) {
            return Some(id.as_str());
        }
    }
    None
}

impl fmt::Display for Board {
    /// Box-drawn table, one cell per column.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const W: usize = 5;
        let bar = "━".repeat(W);
        let line = |left: &str, mid: &str, right: &str| {
            format!("{}{}{}", left, vec![bar.as_str(); self.cols].join(mid), right)
        };

        writeln!(f, "{}", line("┏", "┳", "┓"))?;
        for r in 0..self.rows {
            write!(f, "┃")?;
            for c in 0..self.cols {
                let view = self.cells[self.index_of(r, c)].render().to_string();
                write!(f, "{:^width$}┃", view, width = W)?;
            }
            writeln!(f)?;
            if r + 1 < self.rows {
                writeln!(f, "{}", line("┣", "╋", "┫"))?;
            }
        }
        write!(f, "{}", line("┗", "┻", "┛"))
    }
}
