//! Tally of synthesized monsters ("soldiers").
use crate::engine::Tier;
use std::collections::BTreeMap;
use std::fmt;

/// Key of a soldier record: type id, the tier the group merged *from*, and
/// the merged level minus one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SoldierKey {
    pub kind: String,
    pub tier: Tier,
    pub level: u32,
}

/// Cumulative count for one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoldierRecord {
    pub key: SoldierKey,
    pub count: u64,
}

impl fmt::Display for SoldierRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "soldier: type={} tier={} level={} count={}",
            self.key.kind, self.key.tier, self.key.level, self.count
        )
    }
}

/// Session-wide ledger. Records only grow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressLedger {
    records: BTreeMap<SoldierKey, u64>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one synthesis of `kind` from `tier` into a monster of
    /// `target_level`.
    ///
    /// The record is keyed by `target_level - 1` while the amount added is
    /// `target_level` itself. Display and tally code downstream rely on this
    /// pairing.
    ///
    /// ```
    /// use monster_merge::engine::Tier;
    /// use monster_merge::ledger::{ProgressLedger, SoldierKey};
    ///
    /// let mut ledger = ProgressLedger::new();
    /// ledger.record("X", Tier::C, 1);
    /// ledger.record("X", Tier::C, 1);
    /// let key = SoldierKey { kind: "X".to_string(), tier: Tier::C, level: 0 };
    /// assert_eq!(ledger.get(&key), Some(2));
    /// ```
    pub fn record(&mut self, kind: &str, tier: Tier, target_level: u32) {
        let key = SoldierKey {
            kind: kind.to_string(),
            tier,
            level: target_level.saturating_sub(1),
        };
        *self.records.entry(key).or_insert(0) += u64::from(target_level);
    }

    pub fn get(&self, key: &SoldierKey) -> Option<u64> {
        self.records.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every record's count.
    pub fn total(&self) -> u64 {
        self.records.values().sum()
    }

    /// Records ordered by tier, highest first, then by key.
    pub fn records(&self) -> Vec<SoldierRecord> {
        let mut result: Vec<SoldierRecord> = self
            .records
            .iter()
            .map(|(key, &count)| SoldierRecord {
                key: key.clone(),
                count,
            })
            .collect();
        result.sort_by(|a, b| b.key.tier.cmp(&a.key.tier).then_with(|| a.key.cmp(&b.key)));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: &str, tier: Tier, level: u32) -> SoldierKey {
        SoldierKey {
            kind: kind.to_string(),
            tier,
            level,
        }
    }

    #[test]
    fn test_record_creates_then_accumulates() {
        let mut ledger = ProgressLedger::new();
        ledger.record("X", Tier::C, 3);
        assert_eq!(ledger.get(&key("X", Tier::C, 2)), Some(3));

        ledger.record("X", Tier::C, 3);
        assert_eq!(ledger.get(&key("X", Tier::C, 2)), Some(6));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_distinct_keys() {
        let mut ledger = ProgressLedger::new();
        ledger.record("X", Tier::C, 1);
        ledger.record("X", Tier::B, 1);
        ledger.record("Y", Tier::C, 1);
        ledger.record("X", Tier::C, 2);
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.total(), 5);
        assert_eq!(ledger.get(&key("X", Tier::C, 0)), Some(1));
        assert_eq!(ledger.get(&key("X", Tier::C, 1)), Some(2));
        assert_eq!(ledger.get(&key("Z", Tier::C, 0)), None);
    }

    #[test]
    fn test_records_sorted_by_tier_descending() {
        let mut ledger = ProgressLedger::new();
        ledger.record("Y", Tier::C, 1);
        ledger.record("X", Tier::B, 4);
        ledger.record("A", Tier::C, 2);
        let tiers: Vec<Tier> = ledger.records().iter().map(|r| r.key.tier).collect();
        assert_eq!(tiers, vec![Tier::B, Tier::C, Tier::C]);
        assert_eq!(ledger.records()[1].key.kind, "A");
        assert_eq!(
            ledger.records()[0].to_string(),
            "soldier: type=X tier=B level=3 count=4"
        );
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = ProgressLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0);
        assert!(ledger.records().is_empty());
    }
}
