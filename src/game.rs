//! Board generation and turn execution.
//!
//! A `Game` owns the board, the progress ledger and a seeded RNG. One turn is:
//! pick a swap with a strategy, apply it, then cascade
//! (synthesize, eliminate, refill) until the board settles.
use crate::config::{BoardSetup, LayoutCode};
use crate::engine::{Board, Cell, Monster, Stone};
use crate::error::EngineError;
use crate::gravity::{eliminate, pick_monster_kind, refill};
use crate::heuristics::{
    hint_swap, rank_near_matches, swap_by_strategy, StrategyType, SwapCandidate, SwapPlan,
};
use crate::ledger::ProgressLedger;
use crate::scanner::scan;
use crate::synthesis::synthesize;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Upper bound on synthesize/eliminate/refill rounds in one turn.
pub const MAX_CASCADE_ROUNDS: usize = 256;
/// Upper bound on repair rounds when generating a board.
pub const MAX_REPAIR_ROUNDS: usize = 1024;

/// Builds a match-free starting board from a validated setup.
///
/// Monster positions get a lowest-tier monster whose type is drawn the same
/// way refills are, stone positions get a stone with random hit points. Any
/// direct match in the result is then broken up by retyping one random member
/// of each run, repeated until a scan finds none.
///
/// # Errors
/// Dimension and catalog errors from `Board::new_empty`, `LayoutMismatch` if
/// the layout does not cover the board, and `RepairExhausted` if the board is
/// still not match-free after `MAX_REPAIR_ROUNDS` (a one-type catalog with a
/// line of three monsters, for instance).
///
/// # Examples
/// ```
/// use monster_merge::config::GameConfig;
/// use monster_merge::game::generate_board;
/// use monster_merge::scanner::scan;
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
///
/// let setup = GameConfig::default().board_setup(0).unwrap();
/// let board = generate_board(&setup, &mut SmallRng::seed_from_u64(1)).unwrap();
/// assert!(!scan(&board).has_direct());
/// ```
pub fn generate_board(setup: &BoardSetup, rng: &mut impl Rng) -> Result<Board, EngineError> {
    let mut board = Board::new_empty(setup.rows, setup.cols, setup.catalog.clone())?;
    if setup.layout.len() != board.len() {
        return Err(EngineError::LayoutMismatch {
            expected: board.len(),
            found: setup.layout.len(),
        });
    }

    for (index, code) in setup.layout.iter().enumerate() {
        let cell = match code {
            LayoutCode::Monster => Cell::Monster(Monster::spawn(index, pick_monster_kind(&board, rng))),
            LayoutCode::Stone => Cell::Stone(Stone::new(index, Stone::random_hp(rng))),
            LayoutCode::Empty => continue,
        };
        board.place(index, cell);
    }

    repair(&mut board, rng)?;
    Ok(board)
}

fn repair(board: &mut Board, rng: &mut impl Rng) -> Result<(), EngineError> {
    for round in 0..MAX_REPAIR_ROUNDS {
        let result = scan(board);
        if !result.has_direct() {
            debug!("board repaired after {} rounds", round);
            return Ok(());
        }
        for run in result.direct_runs() {
            let Some(&index) = run.indexes.choose(rng) else {
                continue;
            };
            let Some(kind) = board.get(index).as_monster().map(|m| m.kind.clone()) else {
                continue;
            };
            let others: Vec<&String> = board.catalog().iter().filter(|k| **k != kind).collect();
            let Some(new_kind) = others.choose(rng).map(|k| k.to_string()) else {
                continue;
            };
            board.place(index, Cell::Monster(Monster::spawn(index, new_kind)));
        }
    }
    Err(EngineError::RepairExhausted {
        rounds: MAX_REPAIR_ROUNDS,
    })
}

/// What happened during one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The swap the strategy picked, if any.
    pub plan: Option<SwapPlan>,
    pub applied: bool,
    /// Synthesis rounds that removed something.
    pub cascades: usize,
    /// Merged groups across all rounds.
    pub synthesized: usize,
    /// Cells eliminated across all rounds.
    pub removed: usize,
}

/// A play session.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    ledger: ProgressLedger,
    rng: SmallRng,
    turns: u32,
}

impl Game {
    /// Generates a board from `setup` with an RNG seeded from `seed`.
    ///
    /// The same setup and seed always give the same game.
    pub fn new(setup: &BoardSetup, seed: u64) -> Result<Self, EngineError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = generate_board(setup, &mut rng)?;
        Ok(Game {
            board,
            ledger: ProgressLedger::new(),
            rng,
            turns: 0,
        })
    }

    /// Starts a session on an existing board.
    pub fn new_with_board(board: Board, seed: u64) -> Self {
        Game {
            board,
            ledger: ProgressLedger::new(),
            rng: SmallRng::seed_from_u64(seed),
            turns: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Number of turns in which a swap was applied.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Near-match positions on the current board.
    pub fn hints(&self) -> Vec<SwapCandidate> {
        rank_near_matches(&self.board)
    }

    /// A swap that would complete the best near-match, with the partner
    /// monster drawn from the session RNG.
    pub fn hint_swap(&mut self) -> Option<(usize, usize)> {
        hint_swap(&self.board, &mut self.rng)
    }

    /// Plays one turn with `strategy`.
    ///
    /// When the strategy finds nothing, the board is left untouched and the
    /// outcome has `applied == false`.
    pub fn play_turn(&mut self, strategy: StrategyType) -> TurnOutcome {
        let Some(plan) = swap_by_strategy(&mut self.board, strategy) else {
            warn!("can't find any swap plan");
            return TurnOutcome::default();
        };

        let mut outcome = TurnOutcome {
            plan: Some(plan),
            ..TurnOutcome::default()
        };
        if !self.board.swap(plan.first, plan.second) {
            warn!("plan {:?} could not be applied", plan);
            return outcome;
        }
        outcome.applied = true;
        self.turns += 1;

        self.cascade(&mut outcome);
        info!(
            "turn {}: swap {} {} effect={} cascades={} synthesized={} removed={}",
            self.turns,
            plan.first,
            plan.second,
            plan.effect,
            outcome.cascades,
            outcome.synthesized,
            outcome.removed
        );
        outcome
    }

    fn cascade(&mut self, outcome: &mut TurnOutcome) {
        loop {
            if outcome.cascades >= MAX_CASCADE_ROUNDS {
                warn!("cascade stopped after {} rounds", MAX_CASCADE_ROUNDS);
                return;
            }
            let report = synthesize(&mut self.board, &mut self.ledger);
            if report.removals.is_empty() {
                return;
            }
            outcome.cascades += 1;
            outcome.synthesized += report.merges.len();
            outcome.removed += report.removals.len();

            let empties = eliminate(&mut self.board, &report.removals);
            refill(&mut self.board, &empties, &mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::{CellType, Tier};
    use crate::utils::board_from_str_array;

    fn default_setup() -> BoardSetup {
        GameConfig::default().board_setup(0).unwrap()
    }

    fn counts_match_cells(board: &Board) -> bool {
        board.catalog().iter().all(|kind| {
            let live = board
                .cells()
                .iter()
                .filter_map(Cell::as_monster)
                .filter(|m| &m.kind == kind)
                .count();
            board.type_counts().get(kind).copied().unwrap_or(0) == live
        })
    }

    #[test]
    fn test_generate_board_follows_layout() {
        let setup = default_setup();
        let mut rng = SmallRng::seed_from_u64(514514);
        let board = generate_board(&setup, &mut rng).unwrap();

        assert!(!scan(&board).has_direct());
        for (index, code) in setup.layout.iter().enumerate() {
            let expected = match code {
                LayoutCode::Monster => CellType::Monster,
                LayoutCode::Stone => CellType::Stone,
                LayoutCode::Empty => CellType::Empty,
            };
            assert_eq!(board.get(index).cell_type(), expected);
        }
        for cell in board.cells() {
            match cell {
                Cell::Monster(m) => assert_eq!((m.tier, m.level), (Tier::C, 1)),
                Cell::Stone(s) => assert!((1..=7).contains(&s.hp)),
                Cell::Empty => {}
            }
        }
        assert!(counts_match_cells(&board));
    }

    #[test]
    fn test_generate_board_is_reproducible() {
        let setup = default_setup();
        let a = generate_board(&setup, &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = generate_board(&setup, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_board_keeps_empty_cells() {
        let setup = BoardSetup {
            rows: 2,
            cols: 2,
            layout: vec![
                LayoutCode::Empty,
                LayoutCode::Monster,
                LayoutCode::Stone,
                LayoutCode::Monster,
            ],
            catalog: vec!["X".to_string()],
        };
        let board = generate_board(&setup, &mut SmallRng::seed_from_u64(0)).unwrap();
        assert!(board.get(0).is_empty());
        assert_eq!(board.monster_count(), 2);
    }

    #[test]
    fn test_generate_board_single_type_line_exhausts() {
        let setup = BoardSetup {
            rows: 1,
            cols: 3,
            layout: vec![LayoutCode::Monster; 3],
            catalog: vec!["X".to_string()],
        };
        let err = generate_board(&setup, &mut SmallRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::RepairExhausted {
                rounds: MAX_REPAIR_ROUNDS
            }
        ));
    }

    #[test]
    fn test_generate_board_layout_mismatch() {
        let setup = BoardSetup {
            rows: 2,
            cols: 2,
            layout: vec![LayoutCode::Monster; 3],
            catalog: vec!["X".to_string()],
        };
        let err = generate_board(&setup, &mut SmallRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::LayoutMismatch {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn test_play_turn_synthesizes() {
        let board = board_from_str_array(&["XC XC YC XC"], &["X", "Y"]).unwrap();
        let mut game = Game::new_with_board(board, 1);
        let outcome = game.play_turn(StrategyType::HighOrderFirst);

        assert!(outcome.applied);
        assert_eq!(
            outcome.plan,
            Some(SwapPlan {
                first: 2,
                second: 3,
                effect: 1
            })
        );
        assert_eq!(
            (outcome.cascades, outcome.synthesized, outcome.removed),
            (1, 1, 2)
        );
        assert_eq!(game.turns(), 1);
        assert_eq!(game.ledger().total(), 1);

        let merged = game.board().get(1).as_monster().unwrap();
        assert_eq!((merged.kind.as_str(), merged.tier), ("X", Tier::B));
        assert_eq!(game.board().get(3).as_monster().unwrap().kind, "Y");
        // eliminated cells were refilled
        assert_eq!(game.board().monster_count(), 4);
        assert!(counts_match_cells(game.board()));
    }

    #[test]
    fn test_hint_swap_is_reproducible() {
        let board = board_from_str_array(&["XC XC YC", "ZC YC ZC", "XC ZC XC"], &["X", "Y", "Z"])
            .unwrap();
        let mut a = Game::new_with_board(board.clone(), 3);
        let mut b = Game::new_with_board(board.clone(), 3);
        let hint = a.hint_swap();
        assert_eq!(hint, b.hint_swap());
        assert!(matches!(hint, Some((2, 6)) | Some((2, 8))));
        assert_eq!(a.board(), &board);
    }

    #[test]
    fn test_play_turn_without_plan() {
        let board = board_from_str_array(&["XC YC ZC", "YC ZC XC"], &["X", "Y", "Z"]).unwrap();
        let mut game = Game::new_with_board(board.clone(), 1);
        let outcome = game.play_turn(StrategyType::HighOrderFirst);
        assert_eq!(outcome, TurnOutcome::default());
        assert_eq!(game.turns(), 0);
        assert_eq!(game.board(), &board);
        assert!(game.ledger().is_empty());
    }

    #[test]
    fn test_game_settles_after_each_turn() {
        let mut game = Game::new(&default_setup(), 514514).unwrap();
        for _ in 0..5 {
            game.play_turn(StrategyType::HighOrderFirst);
            assert!(scan(game.board()).direct_runs().all(|run| run.tier == Tier::A));
            assert!(counts_match_cells(game.board()));
        }
    }

    #[test]
    fn test_game_is_reproducible() {
        let setup = default_setup();
        let mut a = Game::new(&setup, 7).unwrap();
        let mut b = Game::new(&setup, 7).unwrap();
        for _ in 0..3 {
            assert_eq!(
                a.play_turn(StrategyType::HighOrderFirst),
                b.play_turn(StrategyType::HighOrderFirst)
            );
        }
        assert_eq!(a.board(), b.board());
        assert_eq!(a.ledger(), b.ledger());
    }
}
