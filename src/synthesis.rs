//! Tier synthesis: merging direct matches into a single upgraded monster.
use crate::engine::{Board, Cell, Monster, Tier};
use crate::ledger::ProgressLedger;
use crate::scanner::{scan, ScanResult};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// One merged group that produced a new monster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Merge {
    pub kind: String,
    /// Tier of the group before merging.
    pub tier: Tier,
    /// Every index of the merged group, ascending.
    pub indexes: Vec<usize>,
    pub target_index: usize,
    pub target_level: u32,
}

/// Result of one synthesis pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Indexes to eliminate. Empty means nothing was synthesized.
    pub removals: BTreeSet<usize>,
    pub merges: Vec<Merge>,
    /// `(type id, tier)` groups left alone because they are already top tier.
    pub skipped: Vec<(String, Tier)>,
}

/// Groups every direct run by `(type id, tier)`.
///
/// Runs of the same key are merged into one index set even when they lie on
/// different lines, so a monster sitting in both a row and a column run
/// appears once.
pub fn merge_groups(result: &ScanResult) -> BTreeMap<(String, Tier), BTreeSet<usize>> {
    let mut groups: BTreeMap<(String, Tier), BTreeSet<usize>> = BTreeMap::new();
    for run in result.direct_runs() {
        groups
            .entry((run.kind.clone(), run.tier))
            .or_default()
            .extend(run.indexes.iter().copied());
    }
    groups
}

/// Picks where a group's merged monster lands and what level it gets.
///
/// The target is the index closest to the arithmetic mean of the group's
/// indexes, the lowest index winning ties. The level is the sum of the
/// current levels in the group minus two, floored at zero and capped at
/// `u32::MAX`.
///
/// # Examples
/// ```
/// use monster_merge::synthesis::synthesis_target;
/// use monster_merge::utils::board_from_str_array;
/// use std::collections::BTreeSet;
///
/// let board = board_from_str_array(&["XC2 XC XC XC3"], &["X"]).unwrap();
/// let group: BTreeSet<usize> = [0, 1, 2, 3].into_iter().collect();
/// // mean 1.5: indexes 1 and 2 tie, the lower one wins
/// assert_eq!(synthesis_target(&board, &group), (1, 5));
/// ```
pub fn synthesis_target(board: &Board, indexes: &BTreeSet<usize>) -> (usize, u32) {
    let mean = indexes.iter().sum::<usize>() as f64 / indexes.len() as f64;
    let mut target_index = 0;
    let mut best_diff: Option<f64> = None;
    let mut level_sum: u64 = 0;

    for &index in indexes {
        let diff = (index as f64 - mean).abs();
        if best_diff.map_or(true, |best| diff < best) {
            target_index = index;
            best_diff = Some(diff);
        }
        level_sum += board.get(index).as_monster().map_or(0, |m| u64::from(m.level));
    }

    let level = u32::try_from(level_sum.saturating_sub(2)).unwrap_or(u32::MAX);
    (target_index, level)
}

/// Runs one synthesis pass over the board.
///
/// Every direct match is grouped by `(type id, tier)`. For each group below
/// the top tier, a monster one tier higher is placed at the group's target
/// index, the ledger is credited, and the rest of the group is marked for
/// removal. Groups already at the top tier are skipped without touching the
/// board.
///
/// # Returns
/// A `SynthesisReport` whose `removals` is the set of indexes the caller
/// should eliminate. An empty set ends the cascade for the current turn.
pub fn synthesize(board: &mut Board, ledger: &mut ProgressLedger) -> SynthesisReport {
    let result = scan(board);
    let mut report = SynthesisReport::default();
    if !result.has_direct() {
        return report;
    }

    for ((kind, tier), indexes) in merge_groups(&result) {
        let Some(next_tier) = tier.up() else {
            warn!("up the top tier {} {} {:?}", kind, tier, indexes);
            report.skipped.push((kind, tier));
            continue;
        };

        let (target_index, target_level) = synthesis_target(board, &indexes);
        debug!(
            "synthesize unit: {} {} {:?} target_index {}",
            kind, tier, indexes, target_index
        );

        board.place(
            target_index,
            Cell::Monster(Monster::new(target_index, kind.clone(), next_tier, target_level)),
        );
        ledger.record(&kind, tier, target_level);

        report
            .removals
            .extend(indexes.iter().copied().filter(|&i| i != target_index));
        report.merges.push(Merge {
            kind,
            tier,
            indexes: indexes.into_iter().collect(),
            target_index,
            target_level,
        });
    }

    info!(
        "synthesize: {:?} remove: {:?}",
        report.merges.iter().map(|m| m.target_index).collect::<Vec<_>>(),
        report.removals
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SoldierKey;
    use crate::utils::board_from_str_array;

    const XYZ: [&str; 3] = ["X", "Y", "Z"];

    #[test]
    fn test_synthesize_single_row() {
        let mut board =
            board_from_str_array(&["XC XC XC", "YC ZC YC", "ZC YC ZC"], &XYZ).unwrap();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);

        assert_eq!(report.removals, [0, 2].into_iter().collect());
        let merged = board.get(1).as_monster().unwrap();
        assert_eq!((merged.kind.as_str(), merged.tier, merged.level), ("X", Tier::B, 1));
        assert_eq!(merged.index, 1);

        let key = SoldierKey {
            kind: "X".to_string(),
            tier: Tier::C,
            level: 0,
        };
        assert_eq!(ledger.get(&key), Some(1));
        assert_eq!(report.merges.len(), 1);
        assert_eq!(report.merges[0].target_level, 1);
    }

    #[test]
    fn test_synthesize_level_sum() {
        let mut board = board_from_str_array(&["XC2 XC3 XC4 XC1 YC"], &XYZ).unwrap();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);

        // mean of 0..=3 is 1.5, ties go to index 1
        let merged = board.get(1).as_monster().unwrap();
        assert_eq!(merged.level, 2 + 3 + 4 + 1 - 2);
        assert_eq!(report.removals, [0, 2, 3].into_iter().collect());
        let key = SoldierKey {
            kind: "X".to_string(),
            tier: Tier::C,
            level: 7,
        };
        assert_eq!(ledger.get(&key), Some(8));
    }

    #[test]
    fn test_synthesize_merges_cross_runs() {
        // An L/T shape: row 0 and column 1 share index 1.
        let mut board = board_from_str_array(
            &["XC XC XC", "YC XC ZC", "ZC XC YC"],
            &XYZ,
        )
        .unwrap();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);

        assert_eq!(report.merges.len(), 1);
        assert_eq!(report.merges[0].indexes, vec![0, 1, 2, 4, 7]);
        // mean 2.8, closest is 2
        assert_eq!(report.merges[0].target_index, 2);
        assert_eq!(report.merges[0].target_level, 3);
        assert_eq!(report.removals, [0, 1, 4, 7].into_iter().collect());
        assert_eq!(board.get(2).as_monster().unwrap().tier, Tier::B);
    }

    #[test]
    fn test_synthesize_multiple_groups() {
        let mut board = board_from_str_array(
            &["XC XC XC", "ZC YC ZC", "YB YB YB"],
            &XYZ,
        )
        .unwrap();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);

        assert_eq!(report.merges.len(), 2);
        assert_eq!(board.get(1).as_monster().unwrap().tier, Tier::B);
        assert_eq!(board.get(7).as_monster().unwrap().tier, Tier::A);
        assert_eq!(report.removals, [0, 2, 6, 8].into_iter().collect());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_synthesize_skips_max_tier() {
        let mut board = board_from_str_array(&["XA XA XA", "YC ZC YC"], &XYZ).unwrap();
        let before = board.clone();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);

        assert!(report.removals.is_empty());
        assert!(report.merges.is_empty());
        assert_eq!(report.skipped, vec![("X".to_string(), Tier::A)]);
        assert_eq!(board, before);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_synthesize_nothing_to_do() {
        let mut board = board_from_str_array(&["XC YC", "YC ZC"], &XYZ).unwrap();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);
        assert_eq!(report, SynthesisReport::default());
    }

    #[test]
    fn test_synthesize_keeps_type_counts() {
        let mut board = board_from_str_array(&["XC XC XC YC"], &XYZ).unwrap();
        let mut ledger = ProgressLedger::new();
        synthesize(&mut board, &mut ledger);
        // the merged monster replaced one X; removals are not applied yet
        assert_eq!(board.type_counts()["X"], 3);
        assert_eq!(board.type_counts()["Y"], 1);
    }

    #[test]
    fn test_synthesize_huge_levels_saturate() {
        let mut board = board_from_str_array(&["XC4294967295 XC1 XC1"], &XYZ).unwrap();
        let mut ledger = ProgressLedger::new();
        let report = synthesize(&mut board, &mut ledger);
        assert_eq!(report.merges[0].target_level, u32::MAX);
        assert_eq!(board.get(1).as_monster().unwrap().level, u32::MAX);

        let board =
            board_from_str_array(&["XC4294967295 XC4294967295 XC4294967295"], &XYZ).unwrap();
        let group: BTreeSet<usize> = [0, 1, 2].into_iter().collect();
        assert_eq!(synthesis_target(&board, &group), (1, u32::MAX));
    }

    #[test]
    fn test_synthesis_target_tie_breaks_low() {
        let board = board_from_str_array(&["XC XC XC XC XC XC"], &XYZ).unwrap();
        let group: BTreeSet<usize> = [1, 2, 4, 5].into_iter().collect();
        // mean 3.0: 2 and 4 are equally close
        assert_eq!(synthesis_target(&board, &group), (2, 2));
    }
}
