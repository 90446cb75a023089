//! # targetedms-import
//!
//! Loads parsed Skyline targeted mass spectrometry documents into a
//! normalized relational store (SQLite).
//!
//! A document is imported as one *run* of a *collection*. Everything the
//! document contains (settings, replicates and sample files, the iRT
//! scale, the peptide group → molecule → precursor → transition hierarchy
//! and its chromatogram results) is written inside a single transaction:
//! either the whole document becomes visible or none of it does.
//!
//! ## Key Features
//!
//! - **Collection rules**: protein and peptide libraries reject duplicate
//!   proteins and precursors across runs; QC collections require every
//!   document to target the same peptides and molecules and replace
//!   re-acquired sample files.
//!
//! - **iRT scales**: a document's iRT peptides are calibrated against the
//!   collection's existing scale through its standard peptides and merged
//!   into it.
//!
//! - **Result volume control**: past a configurable ceiling, transition
//!   results are skipped and precursor results keep an index into the
//!   chromatogram store instead.
//!
//! - **Progress and cancellation**: weighted progress is published through
//!   a [`progress::StatusSink`], which is also where cancellation surfaces.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use targetedms_import::prelude::*;
//!
//! let mut db = Database::open("targetedms.db")?;
//! let importer = Importer::new(ImportConfig::default());
//!
//! let descriptor = ImportDescriptor::new("Plasma", CollectionType::Experiment, "plasma.json");
//! let prepared = importer.prepare(&db, &descriptor)?;
//! let summary = importer.import(&mut db, prepared.run_id, &JobStatus::new())?;
//! println!("{summary}");
//! # Ok::<(), targetedms_import::ImportError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: the parsed document as the importer consumes it
//! - [`settings`]: modifications, isotope labels, libraries and the other
//!   document-wide settings
//! - [`replicates`]: replicates, sample files and instruments
//! - [`irt`]: iRT scale calibration and merging
//! - [`graph`]: the entity hierarchy, results and area ratios
//! - [`importer`]: run creation and the transactional import sequence
//! - [`store`]: schema and row-level persistence
//! - [`progress`]: weighted progress and cancellation
//! - [`quant`]: fold change and calibration curve output

#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod graph;
pub mod importer;
pub mod irt;
pub mod keys;
pub mod model;
pub mod progress;
pub mod quant;
pub mod replicates;
pub mod settings;
pub mod source;
pub mod store;

pub use error::{ErrorKind, ImportError, Result};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, ImportConfig};
    pub use crate::error::{ErrorKind, ImportError};
    pub use crate::graph::GraphStats;
    pub use crate::importer::{CollectionLocks, ImportDescriptor, Importer, PreparedRun, RunSummary};
    pub use crate::irt::{IrtOutcome, IrtRegression};
    pub use crate::model::{DocPeptideGroup, DocumentCounts, DocumentInfo, DocumentSettings};
    pub use crate::progress::{CancelHandle, JobStatus, StatusSink};
    pub use crate::quant::{CalibrationCurveRow, FoldChangeRow, NoQuantification, Quantifier};
    pub use crate::source::{DocumentFormat, DocumentSource, JsonDocumentFormat, ParsedDocument};
    pub use crate::store::{CollectionType, Database, RunStatus};
}
