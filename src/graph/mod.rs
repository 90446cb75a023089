//! # Entity graph
//!
//! Streams peptide groups from the document and writes the hierarchy below
//! each one in dependency order:
//!
//! ```text
//! peptide_group
//! └── general_molecule (+ peptide | molecule, explicit modifications)
//!     ├── general_molecule_chrom_info
//!     └── general_precursor (+ precursor | molecule_precursor, library matches)
//!         ├── precursor_chrom_info
//!         └── general_transition (+ transition | molecule_transition,
//!             │                     optimizations, neutral losses)
//!             └── transition_chrom_info
//! ```
//!
//! After the precursors of a molecule are written, peak area ratios between
//! isotope labels are computed from the results just inserted.
//!
//! When the document's transition-level results are not stored, precursor
//! results keep an index into the chromatogram store instead; those
//! indexes are staged in a scratch table and copied over in
//! [`GraphBuilder::finish`].

mod molecule;
pub mod optimization;
mod peptide_group;
mod precursor;
pub mod ratios;
mod transition;


use std::collections::{BTreeSet, HashSet};
use std::fmt;

use rusqlite::Connection;

use crate::config::ImportConfig;
use crate::error::Result;
use crate::model::{DocPeptideGroup, OptimizationRecord};
use crate::replicates::ReplicateInfo;
use crate::settings::SettingsInfo;
use crate::store::scratch::ChromIndexScratch;
use crate::store::{AnnotationBatch, Collection};

pub use optimization::OptimizationPool;
pub use peptide_group::{truncate_label, IdentifierParser, ProteinIdentifiers};

/// Read-only inputs of the graph stage
#[derive(Clone, Copy)]
pub struct GraphContext<'a> {
    /// Connection (inside the import transaction)
    pub conn: &'a Connection,
    /// Run being imported
    pub run_id: i64,
    /// Target collection
    pub collection: &'a Collection,
    /// Settings ids
    pub settings: &'a SettingsInfo,
    /// Replicate and sample file ids
    pub replicates: &'a ReplicateInfo,
    /// Import options
    pub config: &'a ImportConfig,
}

/// Totals of what the graph stage wrote
#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    /// Peptide groups
    pub peptide_groups: usize,
    /// Peptides
    pub peptides: usize,
    /// Small molecules
    pub small_molecules: usize,
    /// Precursors
    pub precursors: usize,
    /// Transitions
    pub transitions: usize,
    /// Molecule-level results
    pub molecule_results: usize,
    /// Precursor-level results
    pub precursor_results: usize,
    /// Transition-level results
    pub transition_results: usize,
    /// Area ratios across all levels
    pub area_ratios: usize,
    /// Optimization records matched to transitions
    pub optimizations: usize,
    /// Library matches skipped because the library is not in the settings
    pub skipped_library_matches: usize,
    /// Chromatogram indexes copied onto precursor results
    pub chromatogram_indexes: usize,
    /// Peptide modified sequences and small molecule keys targeted
    pub targets: BTreeSet<String>,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entity Graph:")?;
        writeln!(f, "  Peptide groups: {}", self.peptide_groups)?;
        writeln!(f, "  Peptides: {}", self.peptides)?;
        writeln!(f, "  Small molecules: {}", self.small_molecules)?;
        writeln!(f, "  Precursors: {}", self.precursors)?;
        writeln!(f, "  Transitions: {}", self.transitions)?;
        writeln!(
            f,
            "  Results: {} molecule, {} precursor, {} transition",
            self.molecule_results, self.precursor_results, self.transition_results
        )?;
        writeln!(f, "  Area ratios: {}", self.area_ratios)?;
        write!(f, "  Chromatogram indexes: {}", self.chromatogram_indexes)
    }
}

/// Writes the peptide groups of one document
pub struct GraphBuilder<'a> {
    ctx: GraphContext<'a>,
    annotations: &'a mut AnnotationBatch,
    identifiers: IdentifierParser,
    optimizations: OptimizationPool,
    save_transition_results: bool,
    scratch: Option<ChromIndexScratch>,
    warned_libraries: HashSet<String>,
    stats: GraphStats,
}

impl<'a> GraphBuilder<'a> {
    /// Prepare a builder. Creates the chromatogram index scratch table when
    /// transition-level results are not stored.
    pub fn new(
        ctx: GraphContext<'a>,
        annotations: &'a mut AnnotationBatch,
        optimizations: Vec<OptimizationRecord>,
        save_transition_results: bool,
    ) -> Result<Self> {
        let scratch = if save_transition_results {
            None
        } else {
            Some(ChromIndexScratch::create(ctx.conn)?)
        };
        Ok(Self {
            ctx,
            annotations,
            identifiers: IdentifierParser::new()?,
            optimizations: OptimizationPool::new(optimizations),
            save_transition_results,
            scratch,
            warned_libraries: HashSet::new(),
            stats: GraphStats::default(),
        })
    }

    /// Write one peptide group with its molecules.
    pub fn add_group(&mut self, group: DocPeptideGroup) -> Result<()> {
        self.insert_group(group)
    }

    /// Flush pending annotations and copy staged chromatogram indexes.
    pub fn finish(mut self) -> Result<GraphStats> {
        self.annotations.flush(self.ctx.conn)?;
        if let Some(scratch) = self.scratch.take() {
            self.stats.chromatogram_indexes = scratch.backfill(self.ctx.conn)?;
        }
        if !self.optimizations.is_empty() {
            log::debug!(
                "{} optimization records matched no transition",
                self.optimizations.remaining()
            );
        }
        Ok(self.stats)
    }
}
