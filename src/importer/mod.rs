//! # Import orchestration
//!
//! An import happens in two calls:
//!
//! 1. [`Importer::prepare`] finds or creates the run row for a document.
//!    It is the only step serialized across concurrent imports, through a
//!    per-collection lock from [`CollectionLocks`].
//! 2. [`Importer::import`] loads the document into the run inside a single
//!    transaction: settings, replicates, iRT scale, the entity graph, then
//!    the collection-specific bookkeeping and quantification output.
//!
//! Either the whole document commits and the run ends `Success`, or the
//! transaction rolls back and the run is marked `Failed` with the error
//! message in a separate write.
//!
//! ## Example
//!
//! ```rust,no_run
//! use targetedms_import::prelude::*;
//!
//! let mut db = Database::open("targetedms.db")?;
//! let importer = Importer::new(ImportConfig::default());
//! let descriptor = ImportDescriptor::new("Plasma QC", CollectionType::QualityControl, "run42.json");
//!
//! let prepared = importer.prepare(&db, &descriptor)?;
//! if !prepared.already_imported {
//!     let status = JobStatus::new();
//!     let summary = importer.import(&mut db, prepared.run_id, &status)?;
//!     println!("{summary}");
//! }
//! # Ok::<(), targetedms_import::ImportError>(())
//! ```

mod qc;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, error, info, log, Level};
use rusqlite::Connection;
use uuid::Uuid;

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::graph::{GraphBuilder, GraphContext, GraphStats};
use crate::irt::{self, IrtOutcome};
use crate::progress::{Phase, PhasePlan, ProgressMonitor, StatusSink};
use crate::quant::{self, NoQuantification, Quantifier};
use crate::replicates::{delete_sample_files, import_replicates};
use crate::settings::import_settings;
use crate::source::{DocumentFormat, JsonDocumentFormat};
use crate::store::runs::{self, RunCounts, RunRecord};
use crate::store::{
    collections, execute_cached, AnnotationBatch, CollectionType, Database, RepresentativeDataState,
    RunRepresentativeState, RunStatus,
};

const JOB: &str = "targetedms::job";

/// Superseded sample files deleted between progress updates
const CLEANUP_CHUNK: usize = 50;

/// What to import and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDescriptor {
    /// Target collection name
    pub collection: String,
    /// Type of the collection, used when it has to be created
    pub collection_type: CollectionType,
    /// Path of the parsed document
    pub path: PathBuf,
}

impl ImportDescriptor {
    /// Describe an import of `path` into `collection`.
    pub fn new(collection: impl Into<String>, collection_type: CollectionType, path: impl Into<PathBuf>) -> Self {
        Self {
            collection: collection.into(),
            collection_type,
            path: path.into(),
        }
    }
}

/// Result of [`Importer::prepare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedRun {
    /// Run to import into, or the run that already holds the document
    pub run_id: i64,
    /// The document already has a run in the collection that did not fail
    pub already_imported: bool,
}

/// One lock per collection around run creation.
///
/// Clones share the same locks, so every importer of a process should be
/// built from one `CollectionLocks`.
#[derive(Debug, Clone, Default)]
pub struct CollectionLocks {
    locks: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl CollectionLocks {
    /// An empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding run creation in `collection_id`.
    pub fn lock_for(&self, collection_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(collection_id).or_default())
    }
}

/// Outcome of a committed import
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Imported run
    pub run_id: i64,
    /// Collection name
    pub collection: String,
    /// Collection type
    pub collection_type: CollectionType,
    /// Final run status
    pub status: RunStatus,
    /// Counts stored on the run
    pub counts: RunCounts,
    /// What the entity graph stage wrote
    pub graph: GraphStats,
    /// iRT reconciliation, when the document carries a scale
    pub irt: Option<IrtOutcome>,
    /// Sample files written
    pub sample_files: usize,
    /// Annotation rows written
    pub annotations: usize,
    /// Fold change rows written
    pub fold_changes: usize,
    /// Calibration curve rows written
    pub calibration_curves: usize,
    /// Earlier QC sample files replaced by this document
    pub superseded_sample_files: usize,
    /// Wall time of the import
    pub duration: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run {} in {} collection '{}': {} in {:.2}s",
            self.run_id,
            self.collection_type,
            self.collection,
            self.status,
            self.duration.as_secs_f64()
        )?;
        writeln!(
            f,
            "  {} peptide groups, {} peptides, {} small molecules, {} precursors, {} transitions",
            self.counts.peptide_groups,
            self.counts.peptides,
            self.counts.small_molecules,
            self.counts.precursors,
            self.counts.transitions
        )?;
        writeln!(
            f,
            "  {} replicates, {} sample files, {} annotations",
            self.counts.replicates, self.sample_files, self.annotations
        )?;
        writeln!(
            f,
            "  {} molecule, {} precursor, {} transition results; {} area ratios",
            self.graph.molecule_results,
            self.graph.precursor_results,
            self.graph.transition_results,
            self.graph.area_ratios
        )?;
        if self.graph.chromatogram_indexes > 0 {
            writeln!(f, "  {} chromatogram indexes", self.graph.chromatogram_indexes)?;
        }
        if let Some(irt) = &self.irt {
            writeln!(f, "  {irt}")?;
        }
        if self.superseded_sample_files > 0 {
            writeln!(f, "  {} superseded sample files removed", self.superseded_sample_files)?;
        }
        write!(
            f,
            "  {} fold changes, {} calibration curves",
            self.fold_changes, self.calibration_curves
        )
    }
}

/// Imports parsed documents into a [`Database`]
pub struct Importer {
    config: ImportConfig,
    format: Box<dyn DocumentFormat + Send + Sync>,
    quantifier: Box<dyn Quantifier>,
    locks: CollectionLocks,
}

impl Importer {
    /// Importer reading JSON documents, without quantification.
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            format: Box::new(JsonDocumentFormat),
            quantifier: Box::new(NoQuantification),
            locks: CollectionLocks::new(),
        }
    }

    /// Read documents with `format`.
    pub fn with_format(mut self, format: impl DocumentFormat + Send + Sync + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    /// Compute fold changes and calibration curves with `quantifier`.
    pub fn with_quantifier(mut self, quantifier: impl Quantifier + 'static) -> Self {
        self.quantifier = Box::new(quantifier);
        self
    }

    /// Share run-creation locks with other importers.
    pub fn with_locks(mut self, locks: CollectionLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Import options.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Find the run of a document, creating it if the document has not been
    /// imported into the collection yet.
    ///
    /// A document counts as imported while its latest run has not failed.
    pub fn prepare(&self, db: &Database, descriptor: &ImportDescriptor) -> Result<PreparedRun> {
        let conn = db.connection();
        let collection = collections::find_or_create(conn, &descriptor.collection, descriptor.collection_type)?;
        let file_name = descriptor.path.to_string_lossy();

        let lock = self.locks.lock_for(collection.id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(run_id) = runs::find_active(conn, collection.id, &file_name)? {
            info!(
                target: JOB,
                "{} is already imported into '{}' as run {}", file_name, collection.name, run_id
            );
            return Ok(PreparedRun {
                run_id,
                already_imported: true,
            });
        }
        let run_id = runs::create(conn, collection.id, &file_name)?;
        debug!("Created run {} for {} in '{}'", run_id, file_name, collection.name);
        Ok(PreparedRun {
            run_id,
            already_imported: false,
        })
    }

    /// Import the document of a prepared run.
    ///
    /// Every failure rolls the whole document back and leaves the run
    /// `Failed` with the error message.
    pub fn import(&self, db: &mut Database, run_id: i64, status: &dyn StatusSink) -> Result<RunSummary> {
        let started = Instant::now();
        let run = runs::get(db.connection(), run_id)?
            .ok_or_else(|| ImportError::bad_data(format!("Run {run_id} does not exist")))?;
        if run.status != RunStatus::Running {
            return Err(ImportError::bad_data(format!(
                "Run {run_id} has status {}; only running imports can be loaded",
                run.status
            )));
        }
        info!(target: JOB, "Importing {} into run {}", run.file_name, run.id);

        let outcome = self.load(db, &run, status);
        db.connection().flush_prepared_statement_cache();

        match outcome {
            Ok(mut summary) => {
                summary.duration = started.elapsed();
                info!(target: JOB, "{summary}");
                Ok(summary)
            }
            Err(err) => {
                log_failure(&run, &err);
                if let Err(status_err) =
                    runs::set_status(db.connection(), run.id, RunStatus::Failed, Some(&err.to_string()))
                {
                    error!("Could not mark run {} as failed: {}", run.id, status_err);
                }
                Err(err)
            }
        }
    }

    fn load(&self, db: &mut Database, run: &RunRecord, status: &dyn StatusSink) -> Result<RunSummary> {
        let path = PathBuf::from(&run.file_name);
        if !path.exists() {
            return Err(ImportError::Missing(path));
        }
        let size = fs::metadata(&path)?.len();
        let mut source = self.format.open(&path, &self.config)?;
        let counts = *source.counts();
        let save_transition_results = source.save_transition_chrom_info();
        let collection = collections::get(db.connection(), run.collection_id)?.ok_or_else(|| {
            ImportError::bad_data(format!("Collection {} of run {} does not exist", run.collection_id, run.id))
        })?;
        let collection_type = collection.collection_type;
        let mut progress = ProgressMonitor::new(status);

        let tx = db.connection_mut().transaction()?;
        let conn: &Connection = &tx;

        let mut info = source.info().clone();
        if info.guid.is_none() {
            info.guid = Some(Uuid::new_v4().to_string());
        }
        runs::set_document_stamp(conn, run.id, &info, i64::try_from(size).ok())?;

        let document_settings = source.settings().clone();
        let settings = import_settings(conn, run.id, &document_settings)?;
        let mut annotations = AnnotationBatch::new(self.config.batch_size);
        let replicates = import_replicates(
            conn,
            run.id,
            &collection,
            source.replicates(),
            &settings,
            &mut annotations,
        )?;

        let mut irt_peptides = source.irt_peptides().to_vec();
        let irt = irt::reconcile(
            conn,
            run.id,
            &collection,
            &mut irt_peptides,
            self.config.min_library_anchors,
        )?;

        let qc_targets = if collection_type == CollectionType::QualityControl {
            qc::collection_targets(conn, collection.id, run.id)?
        } else {
            None
        };

        let quantification = document_settings
            .peptide
            .quantification
            .as_ref()
            .filter(|q| q.has_regression());
        let plan = PhasePlan {
            qc_cleanup: collection_type == CollectionType::QualityControl,
            fold_changes: !document_settings.data.group_comparisons.is_empty(),
            calibration_curves: quantification.is_some(),
        };
        progress.plan(plan);

        if !save_transition_results {
            info!(
                target: JOB,
                "{} transition results exceed the limit of {}; keeping chromatogram indexes on precursor results instead",
                source.transition_chrom_info_count(),
                self.config.transition_chrom_info_ceiling
            );
        }

        let ctx = GraphContext {
            conn,
            run_id: run.id,
            collection: &collection,
            settings: &settings,
            replicates: &replicates,
            config: &self.config,
        };
        let optimizations = source.take_optimizations();
        let mut builder = GraphBuilder::new(ctx, &mut annotations, optimizations, save_transition_results)?;
        let mut done = 0;
        while let Some(group) = source.next_group()? {
            builder.add_group(group)?;
            done += 1;
            progress.update(Phase::Parse, done, counts.peptide_groups)?;
        }
        let graph = builder.finish()?;
        progress.update(Phase::Parse, 1, 1)?;
        debug!("{graph}");

        if let Some(existing) = &qc_targets {
            qc::check_targets(existing, &graph.targets)?;
        }

        let representative = mark_representative(conn, run.id, collection_type)?;
        if representative > 0 {
            debug!("Marked {} rows of run {} representative", representative, run.id);
        }

        let mut fold_changes = 0;
        if plan.fold_changes {
            let rows = self
                .quantifier
                .fold_changes(conn, run.id, &document_settings.data.group_comparisons)?;
            fold_changes = quant::insert_fold_changes(conn, run.id, &rows)?;
            progress.update(Phase::FoldChange, 1, 1)?;
        }
        let mut calibration_curves = 0;
        if let Some(quantification) = quantification {
            let rows = self.quantifier.calibration_curves(conn, run.id, quantification)?;
            calibration_curves = quant::insert_calibration_curves(conn, run.id, &rows)?;
            progress.update(Phase::CalibrationCurve, 1, 1)?;
        }

        let mut run_counts = RunCounts::from(&counts);
        run_counts.calibration_curves = calibration_curves as i64;
        runs::set_counts(conn, run.id, &run_counts)?;

        let mut superseded = 0;
        if plan.qc_cleanup {
            let ids = replicates.superseded_sample_files();
            for (index, chunk) in ids.chunks(CLEANUP_CHUNK).enumerate() {
                superseded += delete_sample_files(conn, chunk)?;
                progress.update(Phase::QcCleanup, (index * CLEANUP_CHUNK + chunk.len()).min(ids.len()), ids.len())?;
            }
            progress.update(Phase::QcCleanup, 1, 1)?;
            if superseded > 0 {
                info!(target: JOB, "Removed {} superseded sample files", superseded);
            }
        }

        if collection_type.is_library() {
            collections::bump_library_revision(conn, collection.id)?;
        }

        progress.complete()?;
        runs::set_status(conn, run.id, RunStatus::Success, None)?;
        tx.commit()?;

        Ok(RunSummary {
            run_id: run.id,
            collection: collection.name.clone(),
            collection_type,
            status: RunStatus::Success,
            counts: run_counts,
            graph,
            irt,
            sample_files: replicates.sample_file_count(),
            annotations: annotations.inserted(),
            fold_changes,
            calibration_curves,
            superseded_sample_files: superseded,
            duration: Duration::ZERO,
        })
    }
}

/// Mark the run's library rows as the live version. Returns the rows marked.
fn mark_representative(conn: &Connection, run_id: i64, collection_type: CollectionType) -> Result<usize> {
    let representative = RepresentativeDataState::Representative as i64;
    match collection_type {
        CollectionType::ProteinLibrary => {
            let marked = execute_cached(
                conn,
                "UPDATE peptide_group SET representative_data_state = ?1 WHERE run_id = ?2",
                [representative, run_id],
            )?;
            runs::set_representative_state(conn, run_id, RunRepresentativeState::RepresentativeProtein)?;
            Ok(marked)
        }
        CollectionType::PeptideLibrary => {
            let marked = execute_cached(
                conn,
                "UPDATE general_precursor SET representative_data_state = ?1 WHERE decoy = 0 \
                 AND general_molecule_id IN (SELECT gm.id FROM general_molecule gm \
                 JOIN peptide_group pg ON gm.peptide_group_id = pg.id WHERE pg.run_id = ?2)",
                [representative, run_id],
            )?;
            runs::set_representative_state(conn, run_id, RunRepresentativeState::RepresentativePeptide)?;
            Ok(marked)
        }
        CollectionType::Experiment | CollectionType::QualityControl => Ok(0),
    }
}

/// Level a failed import is logged at on the job target.
fn failure_level(err: &ImportError) -> Level {
    if err.kind().is_reportable() {
        Level::Error
    } else {
        Level::Warn
    }
}

fn log_failure(run: &RunRecord, err: &ImportError) {
    let level = failure_level(err);
    match err {
        ImportError::Cancelled => log!(target: JOB, level, "Import of {} was cancelled", run.file_name),
        _ => log!(target: JOB, level, "Import of {} failed: {}", run.file_name, err),
    }
    if err.kind().is_reportable() {
        error!("Import of run {} ({}) failed: {:?}", run.id, run.file_name, err);
    }
}
