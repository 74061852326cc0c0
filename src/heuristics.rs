//! Swap selection strategies.
//!
//! Two independent ways of looking for a move:
//! - `best_plan_to_swap` ("high-order-first") tries every adjacent swap, scores
//!   the direct matches it would create with `calculate_swap_effect`, and
//!   returns the best one.
//! - `rank_near_matches` ranks the cells that would complete a two-cell run,
//!   for hints and as a fallback view of "almost" matches. `hint_swap` turns
//!   the best of them into a swap with a randomly chosen partner monster.
//!
//! Neither leaves a trace on the board.
use crate::engine::{Board, Tier};
use crate::scanner::{scan, MatchRun};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Deref;

/// Vote weight of a completion cell that lies on the run's line.
pub const DIRECT_WEIGHT: f64 = 1.0;
/// Vote weight of a completion cell reached by index arithmetic that wraps
/// across a board edge.
pub const WRAPPED_WEIGHT: f64 = 0.5;
/// Candidates must accumulate more than this to be reported.
pub const CANDIDATE_THRESHOLD: f64 = 0.75;

/// Swap selection policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum StrategyType {
    /// Maximise the tier-weighted effect of the matches a swap creates.
    HighOrderFirst,
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyType::HighOrderFirst => write!(f, "high-order-first"),
        }
    }
}

/// A chosen swap and its score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapPlan {
    pub first: usize,
    pub second: usize,
    pub effect: i64,
}

/// A board position that would complete one or more two-cell runs of
/// `kind`/`tier`.
#[derive(Clone, Debug, PartialEq)]
pub struct SwapCandidate {
    pub kind: String,
    pub tier: Tier,
    pub index: usize,
    pub weight: f64,
}

/// A tentatively applied swap that is undone when dropped.
///
/// Holding the board through this guard means every exit path of a trial,
/// early returns included, puts the two cells back.
struct TrialSwap<'a> {
    board: &'a mut Board,
    first: usize,
    second: usize,
    applied: bool,
}

impl<'a> TrialSwap<'a> {
    fn apply(board: &'a mut Board, first: usize, second: usize) -> Self {
        let applied = board.swap(first, second);
        TrialSwap {
            board,
            first,
            second,
            applied,
        }
    }
}

impl Deref for TrialSwap<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for TrialSwap<'_> {
    fn drop(&mut self) {
        if self.applied {
            self.board.swap(self.first, self.second);
        }
    }
}

/// Effect of one direct run: `tier³ + (Σlevel − 3)·(tier − 1)³`.
fn run_effect(board: &Board, run: &MatchRun) -> i64 {
    let tier = run.tier.value();
    let level_sum: i64 = run
        .indexes
        .iter()
        .filter_map(|&i| board.get(i).as_monster())
        .map(|m| i64::from(m.level))
        .sum();
    tier.pow(3) + (level_sum - 3) * (tier - 1).pow(3)
}

/// Scores swapping `first` and `second`.
///
/// The swap is applied, the board scanned, and every resulting direct run
/// contributes `tier³ + (Σlevel − 3)·(tier − 1)³`. The swap is then reverted,
/// leaving the board exactly as it was. An illegal swap scores 0.
///
/// # Examples
/// ```
/// use monster_merge::heuristics::calculate_swap_effect;
/// use monster_merge::utils::board_from_str_array;
///
/// let mut board = board_from_str_array(&["XC XC YC XC"], &["X", "Y"]).unwrap();
/// let before = board.clone();
/// assert_eq!(calculate_swap_effect(&mut board, 2, 3), 1);
/// assert_eq!(calculate_swap_effect(&mut board, 1, 2), 0);
/// assert_eq!(board, before);
/// ```
pub fn calculate_swap_effect(board: &mut Board, first: usize, second: usize) -> i64 {
    let trial = TrialSwap::apply(board, first, second);
    if !trial.applied {
        return 0;
    }
    let result = scan(&trial);
    let effect = result.direct_runs().map(|run| run_effect(&trial, run)).sum();
    debug!("swap {} {} effect={}", first, second, effect);
    effect
}

/// Every horizontally or vertically adjacent pair, lower index first.
pub fn adjacent_pairs(board: &Board) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for index in 0..board.len() {
        if let Some(right) = board.offset(index, 0, 1) {
            pairs.push((index, right));
        }
        if let Some(down) = board.offset(index, 1, 0) {
            pairs.push((index, down));
        }
    }
    pairs
}

/// Finds the adjacent swap with the highest effect ("high-order-first").
///
/// Candidates are visited in `adjacent_pairs` order and the first one with
/// the maximum effect wins.
///
/// # Returns
/// `None` when no swap has a positive effect, which tells the caller there is
/// nothing left to play.
pub fn best_plan_to_swap(board: &mut Board) -> Option<SwapPlan> {
    let mut best: Option<SwapPlan> = None;
    for (first, second) in adjacent_pairs(board) {
        let effect = calculate_swap_effect(board, first, second);
        if effect > best.map_or(0, |plan| plan.effect) {
            best = Some(SwapPlan {
                first,
                second,
                effect,
            });
        }
    }
    best
}

/// Picks a swap with the given strategy.
pub fn swap_by_strategy(board: &mut Board, strategy: StrategyType) -> Option<SwapPlan> {
    match strategy {
        StrategyType::HighOrderFirst => best_plan_to_swap(board),
    }
}

/// One completion position of a run and its vote weight.
fn completion(board: &Board, index: usize, dr: isize, dc: isize) -> Option<(usize, f64)> {
    if let Some(pos) = board.offset(index, dr, dc) {
        return Some((pos, DIRECT_WEIGHT));
    }
    let raw = index as isize + dr * board.cols() as isize + dc;
    if raw >= 0 && (raw as usize) < board.len() {
        return Some((raw as usize, WRAPPED_WEIGHT));
    }
    None
}

/// The "pre" (before the first cell) and "next" (after the last cell)
/// completion positions of a run.
fn completions(board: &Board, run: &MatchRun) -> Vec<(usize, f64)> {
    let (Some(&first), Some(&last)) = (run.indexes.first(), run.indexes.last()) else {
        return Vec::new();
    };
    let (dr, dc) = run.direction.step();
    [
        completion(board, first, -dr, -dc),
        completion(board, last, dr, dc),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Ranks positions that would complete two-cell runs.
///
/// For every probable run, the cells just before and just after it vote for
/// `(type, tier, position)`: 1.0 when the cell lies on the run's line, 0.5
/// when it is only reached by wrapping across a board edge. Positions with
/// more than 0.75 votes that currently hold a monster are returned, highest
/// weight first.
pub fn rank_near_matches(board: &Board) -> Vec<SwapCandidate> {
    let result = scan(board);
    let mut votes: BTreeMap<(String, Tier, usize), f64> = BTreeMap::new();
    for run in result.probable_runs() {
        for (pos, weight) in completions(board, run) {
            *votes.entry((run.kind.clone(), run.tier, pos)).or_insert(0.0) += weight;
        }
    }

    let mut candidates: Vec<SwapCandidate> = votes
        .into_iter()
        .filter(|&((_, _, pos), weight)| weight > CANDIDATE_THRESHOLD && board.get(pos).is_monster())
        .map(|((kind, tier, index), weight)| SwapCandidate {
            kind,
            tier,
            index,
            weight,
        })
        .collect();
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    candidates
}

/// First on-line completion position of any two-cell run that holds a monster.
pub fn simple_swap_choice(board: &Board) -> Option<usize> {
    let result = scan(board);
    for run in result.probable_runs() {
        for (pos, weight) in completions(board, run) {
            if weight == DIRECT_WEIGHT && board.get(pos).is_monster() {
                return Some(pos);
            }
        }
    }
    None
}

/// Indexes of every two-cell run of the candidate's type and tier that the
/// candidate's position would complete.
pub fn nearby_runs(board: &Board, candidate: &SwapCandidate) -> Vec<Vec<usize>> {
    let result = scan(board);
    let mut runs = Vec::new();
    for run in result.probable_runs() {
        if run.kind != candidate.kind || run.tier != candidate.tier {
            continue;
        }
        if completions(board, run)
            .iter()
            .any(|&(pos, _)| pos == candidate.index)
        {
            runs.push(run.indexes.clone());
        }
    }
    runs
}

/// Whether either candidate's position belongs to a run the other would
/// complete.
pub fn is_intersect(board: &Board, a: &SwapCandidate, b: &SwapCandidate) -> bool {
    let touches = |from: &SwapCandidate, to: &SwapCandidate| {
        nearby_runs(board, from)
            .iter()
            .any(|indexes| indexes.contains(&to.index))
    };
    touches(a, b) || touches(b, a)
}

/// Picks a monster to move into the candidate's position.
///
/// Any monster of the candidate's type and tier qualifies, except the ones
/// already sitting in the runs the position would complete. Ties are broken
/// at random with `rng`.
///
/// # Returns
/// `None` when no such monster is left on the board.
pub fn completion_partner(
    board: &Board,
    candidate: &SwapCandidate,
    rng: &mut impl Rng,
) -> Option<usize> {
    let taken: BTreeSet<usize> = nearby_runs(board, candidate).into_iter().flatten().collect();
    let partners: Vec<usize> = board
        .cells()
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| cell.as_monster().map(|m| (index, m)))
        .filter(|(index, m)| {
            m.kind == candidate.kind
                && m.tier == candidate.tier
                && *index != candidate.index
                && !taken.contains(index)
        })
        .map(|(index, _)| index)
        .collect();
    partners.choose(rng).copied()
}

/// Turns the ranked near-matches into a concrete swap.
///
/// Candidates are tried highest weight first; the first one that has a
/// completion partner and does not already hold a monster of its own type and
/// tier gives `(position, partner)`.
pub fn hint_swap(board: &Board, rng: &mut impl Rng) -> Option<(usize, usize)> {
    for candidate in rank_near_matches(board) {
        let occupied_by_same = board
            .get(candidate.index)
            .as_monster()
            .map_or(false, |m| m.kind == candidate.kind && m.tier == candidate.tier);
        if occupied_by_same {
            continue;
        }
        if let Some(partner) = completion_partner(board, &candidate, rng) {
            debug!("hint swap {} {} for {}{}", candidate.index, partner, candidate.kind, candidate.tier);
            return Some((candidate.index, partner));
        }
    }
    None
}
