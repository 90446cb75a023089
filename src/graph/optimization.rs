//! Pool of optimization records waiting for their transition.
//!
//! Records are matched by target and consumed on match: once a transition
//! has taken a record no later transition can match it. Consumed slots are
//! tombstoned instead of removed so indexes stay valid.

use std::collections::HashMap;

use crate::model::OptimizationRecord;

/// Arena of unconsumed optimization records indexed by target
#[derive(Debug, Default)]
pub struct OptimizationPool {
    slots: Vec<Option<OptimizationRecord>>,
    by_target: HashMap<String, Vec<usize>>,
    live: usize,
}

impl OptimizationPool {
    /// Build a pool from the document's side list.
    pub fn new(records: Vec<OptimizationRecord>) -> Self {
        let mut by_target: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            by_target.entry(record.target.clone()).or_default().push(index);
        }
        Self {
            live: records.len(),
            slots: records.into_iter().map(Some).collect(),
            by_target,
        }
    }

    /// Remove and return every live record of `target` accepted by `matches`.
    pub fn take_matching<F>(&mut self, target: &str, mut matches: F) -> Vec<OptimizationRecord>
    where
        F: FnMut(&OptimizationRecord) -> bool,
    {
        let Some(indexes) = self.by_target.get(target) else {
            return Vec::new();
        };

        let mut taken = Vec::new();
        for &index in indexes {
            let slot = &mut self.slots[index];
            if slot.as_ref().map(&mut matches).unwrap_or(false) {
                if let Some(record) = slot.take() {
                    taken.push(record);
                }
            }
        }
        self.live -= taken.len();
        taken
    }

    /// Records not consumed yet.
    pub fn remaining(&self) -> usize {
        self.live
    }

    /// Whether every record has been consumed.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(target: &str, fragment: &str, kind: &str) -> OptimizationRecord {
        OptimizationRecord {
            target: target.to_string(),
            precursor_charge: 2,
            fragment_ion: Some(fragment.to_string()),
            product_charge: Some(1),
            optimization_type: kind.to_string(),
            value: 21.5,
        }
    }

    #[test]
    fn test_records_consumed_once() {
        let mut pool = OptimizationPool::new(vec![
            record("PEPTIDEK", "y5", "collision_energy"),
            record("PEPTIDEK", "y5", "declustering_potential"),
            record("PEPTIDEK", "y6", "collision_energy"),
            record("OTHERK", "y5", "collision_energy"),
        ]);
        assert_eq!(pool.remaining(), 4);

        let y5 = |r: &OptimizationRecord| r.fragment_ion.as_deref() == Some("y5");
        assert_eq!(pool.take_matching("PEPTIDEK", y5).len(), 2);
        assert!(pool.take_matching("PEPTIDEK", y5).is_empty());
        assert_eq!(pool.remaining(), 2);

        assert!(pool.take_matching("MISSING", |_| true).is_empty());
        assert_eq!(pool.take_matching("PEPTIDEK", |_| true).len(), 1);
        assert_eq!(pool.take_matching("OTHERK", |_| true).len(), 1);
        assert!(pool.is_empty());
    }
}
