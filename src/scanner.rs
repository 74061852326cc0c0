//! Line scanning for matches.
//!
//! The board is cut into 1-D lines in four orientations and each line is
//! walked once. Runs of consecutive monsters with equal type id and tier are
//! classified by length: two cells is a *probable* match (a hint target),
//! three or more is a *direct* match (ready for synthesis).
//!
//! `scan` is a pure function of the board and rebuilds its result from
//! scratch on every call.
use crate::engine::{Board, Tier};
use std::collections::BTreeMap;

/// Line orientation of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Along a row, left to right.
    East,
    /// Along a column, top to bottom.
    South,
    /// Anti-diagonal. Lines are walked from their top-right end downward.
    NorthEast,
    /// Main diagonal, walked top-left to bottom-right.
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::NorthEast,
        Direction::SouthEast,
    ];

    /// `(d_row, d_col)` between consecutive indexes of a line in this direction.
    pub fn step(self) -> (isize, isize) {
        match self {
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::NorthEast => (1, -1),
            Direction::SouthEast => (1, 1),
        }
    }
}

/// A contiguous run of same-type, same-tier monsters along one line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchRun {
    pub direction: Direction,
    pub kind: String,
    pub tier: Tier,
    /// Board indexes in walking order.
    pub indexes: Vec<usize>,
}

impl MatchRun {
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// Output of one scan, keyed by direction. Directions without runs have no key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Runs longer than two cells.
    pub direct: BTreeMap<Direction, Vec<MatchRun>>,
    /// Runs of exactly two cells.
    pub probable: BTreeMap<Direction, Vec<MatchRun>>,
}

impl ScanResult {
    pub fn has_direct(&self) -> bool {
        !self.direct.is_empty()
    }

    pub fn direct_runs(&self) -> impl Iterator<Item = &MatchRun> {
        self.direct.values().flatten()
    }

    pub fn probable_runs(&self) -> impl Iterator<Item = &MatchRun> {
        self.probable.values().flatten()
    }

    fn push(&mut self, run: MatchRun) {
        let map = if run.len() > 2 {
            &mut self.direct
        } else {
            &mut self.probable
        };
        map.entry(run.direction).or_default().push(run);
    }
}

/// Scans every line of the board in all four directions.
///
/// # Examples
/// ```
/// use monster_merge::scanner::{scan, Direction};
/// use monster_merge::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["XC XC XC", "YC ZC YC", "ZC YC ZC"], &["X", "Y", "Z"])
///     .unwrap();
/// let result = scan(&board);
/// let east = &result.direct[&Direction::East];
/// assert_eq!(east.len(), 1);
/// assert_eq!(east[0].indexes, vec![0, 1, 2]);
/// ```
pub fn scan(board: &Board) -> ScanResult {
    let mut result = ScanResult::default();
    for direction in Direction::ALL {
        for line in lines(board.rows(), board.cols(), direction) {
            scan_line(board, &line, direction, &mut result);
        }
    }
    result
}

/// Enumerates every line of a `rows` x `cols` board in `direction`.
///
/// Rows and columns are the obvious lines. Diagonal lines start from each
/// top-row cell, then from each cell of the left column (`SouthEast`) or the
/// right column (`NorthEast`) below row 0, and run until they leave the board,
/// so short corner lines of length 1 or 2 are included. The right-column
/// sweep of `NorthEast` is skipped on boards with fewer than three rows, where
/// its only line is the single bottom-right cell.
pub fn lines(rows: usize, cols: usize, direction: Direction) -> Vec<Vec<usize>> {
    let walk = |start_r: usize, start_c: usize| {
        let (dr, dc) = direction.step();
        let mut line = Vec::new();
        let (mut r, mut c) = (start_r as isize, start_c as isize);
        while r >= 0 && c >= 0 && r < rows as isize && c < cols as isize {
            line.push(r as usize * cols + c as usize);
            r += dr;
            c += dc;
        }
        line
    };

    match direction {
        Direction::East => (0..rows).map(|r| walk(r, 0)).collect(),
        Direction::South => (0..cols).map(|c| walk(0, c)).collect(),
        Direction::SouthEast => (0..cols)
            .map(|c| walk(0, c))
            .chain((1..rows).map(|r| walk(r, 0)))
            .collect(),
        Direction::NorthEast => {
            let mut result: Vec<Vec<usize>> = (0..cols).map(|c| walk(0, c)).collect();
            if rows >= 3 {
                result.extend((1..rows).map(|r| walk(r, cols - 1)));
            }
            result
        }
    }
}

fn scan_line(board: &Board, line: &[usize], direction: Direction, result: &mut ScanResult) {
    let mut run: Vec<usize> = Vec::new();
    for &index in line {
        let cell = board.get(index);
        let extends = run
            .first()
            .map_or(false, |&first| board.get(first).is_same(cell));
        if extends {
            run.push(index);
            continue;
        }
        flush_run(board, &run, direction, result);
        run.clear();
        if cell.is_monster() {
            run.push(index);
        }
    }
    flush_run(board, &run, direction, result);
}

fn flush_run(board: &Board, run: &[usize], direction: Direction, result: &mut ScanResult) {
    if run.len() < 2 {
        return;
    }
    let Some(head) = board.get(run[0]).as_monster() else {
        return;
    };
    result.push(MatchRun {
        direction,
        kind: head.kind.clone(),
        tier: head.tier,
        indexes: run.to_vec(),
    });
}
