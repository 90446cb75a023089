//! Property tests for weighted import progress
//!
//! - Weight redistribution never loses or invents weight
//! - Published percentages only ever go up and end at 100

use std::sync::Mutex;

use targetedms_import::progress::{
    Phase, PhasePlan, PhaseWeights, ProgressMonitor, StatusSink, TOTAL_WEIGHT,
};
use targetedms_import::Result;

/// Sink that keeps every published percentage
#[derive(Default)]
struct Recorder(Mutex<Vec<u32>>);

impl StatusSink for Recorder {
    fn publish(&self, percent: u32, _message: &str) -> Result<()> {
        self.0.lock().unwrap().push(percent);
        Ok(())
    }
}

fn plan(qc_cleanup: bool, fold_changes: bool, calibration_curves: bool) -> PhasePlan {
    PhasePlan {
        qc_cleanup,
        fold_changes,
        calibration_curves,
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn phase() -> impl Strategy<Value = Phase> {
        prop::sample::select(Phase::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_redistribution_keeps_total(qc in any::<bool>(), fc in any::<bool>(), cc in any::<bool>()) {
            let weights = PhaseWeights::redistribute(plan(qc, fc, cc));
            prop_assert_eq!(weights.total(), TOTAL_WEIGHT);
            if !fc {
                prop_assert_eq!(weights.weight(Phase::FoldChange), 0);
            }
            if !cc {
                prop_assert_eq!(weights.weight(Phase::CalibrationCurve), 0);
            }
        }

        #[test]
        fn test_published_percent_strictly_increases(
            qc in any::<bool>(),
            fc in any::<bool>(),
            cc in any::<bool>(),
            updates in prop::collection::vec((phase(), 0usize..200, 0usize..200), 0..60),
        ) {
            let recorder = Recorder::default();
            let mut monitor = ProgressMonitor::new(&recorder);
            monitor.plan(plan(qc, fc, cc));
            for (phase, done, total) in updates {
                monitor.update(phase, done, total).unwrap();
                prop_assert!(monitor.published() <= TOTAL_WEIGHT);
            }
            monitor.complete().unwrap();

            let published = recorder.0.lock().unwrap().clone();
            prop_assert!(published.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert_eq!(published.last().copied(), Some(100));
        }
    }
}
