//! # Import progress
//!
//! An import reports its completion as a single percentage built from four
//! weighted phases. The weights sum to [`TOTAL_WEIGHT`]; the last points up
//! to 100 belong to listeners that run after the import commits and are
//! published by [`ProgressMonitor::complete`].
//!
//! A phase that will have nothing to do hands its weight to QC cleanup when
//! that phase runs, otherwise to parsing, so the percentage does not stall
//! short of the end.
//!
//! Publishing goes through a [`StatusSink`]. The sink is also where a
//! cancellation request surfaces: once the job has been told to stop, the
//! next publish returns [`ImportError::Cancelled`].

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::error::{ImportError, Result};

/// Sum of the phase weights
pub const TOTAL_WEIGHT: u32 = 98;

/// Weighted stages of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Writing the entity graph
    Parse,
    /// Removing superseded QC sample files
    QcCleanup,
    /// Group comparison fold changes
    FoldChange,
    /// Calibration curves
    CalibrationCurve,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [
        Phase::Parse,
        Phase::QcCleanup,
        Phase::FoldChange,
        Phase::CalibrationCurve,
    ];

    fn index(self) -> usize {
        match self {
            Phase::Parse => 0,
            Phase::QcCleanup => 1,
            Phase::FoldChange => 2,
            Phase::CalibrationCurve => 3,
        }
    }
}

/// Which phases will do work for a given document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhasePlan {
    /// The target is a QC collection
    pub qc_cleanup: bool,
    /// The document defines group comparisons
    pub fold_changes: bool,
    /// The document asks for calibration curves
    pub calibration_curves: bool,
}

/// Share of [`TOTAL_WEIGHT`] assigned to each phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWeights([u32; 4]);

impl Default for PhaseWeights {
    fn default() -> Self {
        Self([80, 6, 6, 6])
    }
}

impl PhaseWeights {
    /// Move the weight of idle phases onto a phase that runs.
    pub fn redistribute(plan: PhasePlan) -> Self {
        let mut weights = Self::default().0;
        let sink = if plan.qc_cleanup {
            Phase::QcCleanup
        } else {
            Phase::Parse
        };
        let idle = [
            (Phase::QcCleanup, !plan.qc_cleanup),
            (Phase::FoldChange, !plan.fold_changes),
            (Phase::CalibrationCurve, !plan.calibration_curves),
        ];
        for (phase, is_idle) in idle {
            if is_idle {
                weights[sink.index()] += weights[phase.index()];
                weights[phase.index()] = 0;
            }
        }
        Self(weights)
    }

    /// Weight of one phase.
    pub fn weight(&self, phase: Phase) -> u32 {
        self.0[phase.index()]
    }

    /// Sum over all phases.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Receives the externally visible progress of an import.
pub trait StatusSink {
    /// Publish a new percentage (0 to 100) with a short description.
    ///
    /// Returns [`ImportError::Cancelled`] when the job has been asked to
    /// stop.
    fn publish(&self, percent: u32, message: &str) -> Result<()>;
}

/// Handle used to request that a running import stops
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Ask the import to stop at its next status write.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Status of one import job, shareable across threads
#[derive(Debug, Default)]
pub struct JobStatus {
    percent: AtomicU32,
    message: Mutex<String>,
    cancel: CancelHandle,
}

impl JobStatus {
    /// A fresh status at 0%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for cancelling the job from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Last published percentage.
    pub fn percent(&self) -> u32 {
        self.percent.load(Ordering::SeqCst)
    }

    /// Last published message.
    pub fn message(&self) -> String {
        match self.message.lock() {
            Ok(message) => message.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StatusSink for JobStatus {
    fn publish(&self, percent: u32, message: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }
        self.percent.store(percent, Ordering::SeqCst);
        let mut current = match self.message.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = message.to_string();
        Ok(())
    }
}

/// Turns per-phase fractions into published percentages
pub struct ProgressMonitor<'a> {
    sink: &'a dyn StatusSink,
    weights: PhaseWeights,
    progress: [f64; 4],
    published: u32,
}

impl<'a> ProgressMonitor<'a> {
    /// Monitor publishing to `sink`, starting from the default weights.
    pub fn new(sink: &'a dyn StatusSink) -> Self {
        Self {
            sink,
            weights: PhaseWeights::default(),
            progress: [0.0; 4],
            published: 0,
        }
    }

    /// Replace the weights once it is known which phases will run.
    pub fn plan(&mut self, plan: PhasePlan) {
        self.weights = PhaseWeights::redistribute(plan);
        debug!("Progress weights: {:?}", self.weights);
    }

    /// Current weights.
    pub fn weights(&self) -> PhaseWeights {
        self.weights
    }

    /// Last published percentage.
    pub fn published(&self) -> u32 {
        self.published
    }

    /// Record that `done` of `total` units of `phase` are finished and
    /// publish the overall percentage if it went up.
    pub fn update(&mut self, phase: Phase, done: usize, total: usize) -> Result<()> {
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).min(1.0)
        };
        self.progress[phase.index()] = fraction * self.weights.weight(phase) as f64;

        // Rounding guard so a finished phase set lands exactly on its weight
        let percent = (self.progress.iter().sum::<f64>() + 1e-9).floor() as u32;
        if percent > self.published {
            self.published = percent;
            self.sink.publish(percent, phase_message(phase))?;
        }
        Ok(())
    }

    /// Publish 100%.
    pub fn complete(&mut self) -> Result<()> {
        self.progress = Phase::ALL.map(|phase| self.weights.weight(phase) as f64);
        self.published = 100;
        self.sink.publish(100, "Import complete")
    }
}

fn phase_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Parse => "Importing document",
        Phase::QcCleanup => "Removing superseded sample files",
        Phase::FoldChange => "Calculating fold changes",
        Phase::CalibrationCurve => "Calculating calibration curves",
    }
}
