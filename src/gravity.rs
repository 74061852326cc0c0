//! Elimination, column compaction and refill.
//!
//! After synthesis, removed cells are emptied and every column is compacted
//! from the bottom up so monsters fall into the gaps and the empties rise to
//! the top of each column segment. Stones never move; each one splits its
//! column into independent segments. The empties left behind are then refilled
//! with new lowest-tier monsters.
use crate::engine::{Board, Cell, CellType, Monster};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, VecDeque};

/// Empties every index in `removals` and lets monsters fall.
///
/// Each column is walked from the bottom row to the top with a FIFO queue of
/// empty slots, oldest (lowest) first. A monster found above queued empties
/// falls into the oldest one and its old position joins the queue. A stone
/// closes the current segment: the empties queued below it stay where they
/// are, and a fresh queue starts above it.
///
/// # Returns
/// The empty indexes after compaction, grouped per column from column 0, each
/// segment listed bottom-most first. These are the refill targets.
///
/// # Examples
/// ```
/// use monster_merge::gravity::eliminate;
/// use monster_merge::utils::board_from_str_array;
///
/// let mut board = board_from_str_array(&["XC", "YC", "ZC"], &["X", "Y", "Z"]).unwrap();
/// let removals = [2].into_iter().collect();
/// assert_eq!(eliminate(&mut board, &removals), vec![0]);
/// assert_eq!(board.get(2).as_monster().unwrap().kind, "Y");
/// ```
pub fn eliminate(board: &mut Board, removals: &BTreeSet<usize>) -> Vec<usize> {
    for &index in removals {
        board.place(index, Cell::Empty);
    }

    let mut vacated = Vec::new();
    for col in 0..board.cols() {
        let mut queue: VecDeque<usize> = VecDeque::new();
        for row in (0..board.rows()).rev() {
            let index = board.index_of(row, col);
            match board.get(index).cell_type() {
                CellType::Empty => queue.push_back(index),
                CellType::Stone => vacated.extend(queue.drain(..)),
                CellType::Monster => {
                    if let Some(&target) = queue.front() {
                        if board.fall(index, target) {
                            queue.pop_front();
                            queue.push_back(index);
                        }
                    }
                }
            }
        }
        vacated.extend(queue);
    }

    debug!("space {:?}", vacated);
    vacated
}

/// Picks a type id for a new monster.
///
/// Draws uniformly among catalog ids whose live count is below the current
/// maximum, steering refills away from over-represented types. When every id
/// is tied at the maximum, draws from the whole catalog.
pub fn pick_monster_kind(board: &Board, rng: &mut impl Rng) -> String {
    let counts = board.type_counts();
    let max_count = counts.values().copied().max().unwrap_or(0);
    let under: Vec<&String> = board
        .catalog()
        .iter()
        .filter(|id| counts.get(*id).copied().unwrap_or(0) != max_count)
        .collect();

    let choices: Vec<&String> = if under.is_empty() {
        board.catalog().iter().collect()
    } else {
        under
    };
    choices
        .choose(rng)
        .map(|id| id.to_string())
        .unwrap_or_default()
}

/// Spawns a new lowest-tier monster at every index in `empties`.
pub fn refill(board: &mut Board, empties: &[usize], rng: &mut impl Rng) {
    for &index in empties {
        let kind = pick_monster_kind(board, rng);
        debug!("generate {} at {}", kind, index);
        board.place(index, Cell::Monster(Monster::spawn(index, kind)));
    }
}
