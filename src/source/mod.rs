//! # Document source
//!
//! Boundary to the document parser. The importer only needs a forward-only
//! walk over peptide groups plus one-shot accessors for document-wide data;
//! how the document gets parsed lives behind [`DocumentSource`].
//!
//! [`ParsedDocument`] is a fully materialized document (JSON serializable)
//! and [`JsonDocumentFormat`] opens one from disk.

mod json;

use std::path::Path;

use crate::config::ImportConfig;
use crate::error::Result;
use crate::model::{
    DocPeptideGroup, DocReplicate, DocumentCounts, DocumentInfo, DocumentSettings, IrtPeptide,
    OptimizationRecord,
};

pub use json::{JsonDocumentFormat, ParsedDocument, ParsedDocumentSource};

/// A parsed document as consumed by the importer.
pub trait DocumentSource {
    /// GUID and version stamp.
    fn info(&self) -> &DocumentInfo;

    /// Per-kind totals.
    fn counts(&self) -> &DocumentCounts;

    /// Document-wide settings.
    fn settings(&self) -> &DocumentSettings;

    /// Replicates in document order.
    fn replicates(&self) -> &[DocReplicate];

    /// The document's iRT scale, empty when it has none.
    fn irt_peptides(&self) -> &[IrtPeptide];

    /// Whether transition-level chromatogram results should be stored.
    fn save_transition_chrom_info(&self) -> bool;

    /// Number of transition-level chromatogram results in the document.
    fn transition_chrom_info_count(&self) -> usize;

    /// Hand over the optimization records not attached to any transition yet.
    ///
    /// Subsequent calls return an empty list.
    fn take_optimizations(&mut self) -> Vec<OptimizationRecord>;

    /// Next peptide group, or `None` at the end of the document.
    fn next_group(&mut self) -> Result<Option<DocPeptideGroup>>;

    /// Restart the peptide group traversal from the first group.
    fn rewind(&mut self) -> Result<()>;
}

/// Opens a document on disk.
pub trait DocumentFormat {
    /// Open `path` as a [`DocumentSource`].
    fn open(&self, path: &Path, config: &ImportConfig) -> Result<Box<dyn DocumentSource>>;
}
