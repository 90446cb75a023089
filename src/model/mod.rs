//! # Parsed document model
//!
//! In-memory representation of a Skyline document as handed over by the
//! document parser: settings, replicates, the iRT scale and the
//! peptide group → molecule → precursor → transition hierarchy with its
//! chromatogram results.
//!
//! All types deserialize from JSON so a parsed document can be stored and
//! replayed; missing fields take their defaults.

mod chromatogram;
mod entities;
mod replicate;
mod settings;

use serde::{Deserialize, Serialize};

pub use chromatogram::{ChromatogramIndex, CHROMATOGRAM_INDEX_LEN};
pub use entities::{
    DocMolecule, DocPeptideGroup, DocPrecursor, DocTransition, ExplicitModification, LibraryInfo,
    MoleculeChromInfo, MoleculeKind, OptimizationRecord, PeptideFields, PrecursorChromInfo,
    SmallMoleculeFields, TransitionChromInfo, TransitionLoss,
};
pub use replicate::{DocReplicate, DocSampleFile, InstrumentInfo};
pub use settings::{
    AnnotationDefinition, DataSettings, DigestSettings, DocumentSettings, Enzyme,
    FullScanSettings, GroupComparison, IsolationScheme, IsolationWindow, IsotopeLabel,
    IsotopeModification, LibrarySettings, ModificationSettings, PeptideSettings, PotentialLoss,
    Predictor, PredictorSetting, QuantificationSettings, SpectrumLibrary, StructuralModification,
    TransitionInstrument, TransitionPrediction, TransitionSettings,
};

/// Name of the default isotope label type
pub const LIGHT_LABEL: &str = "light";

/// A name/value annotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    /// Annotation name
    pub name: String,
    /// Annotation value
    pub value: Option<String>,
}

impl Annotation {
    /// Create an annotation.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Document identity and version stamp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    /// Document GUID
    pub guid: Option<String>,
    /// Document format version
    pub format_version: Option<String>,
    /// Version of the software that saved the document
    pub software_version: Option<String>,
}

/// Per-kind totals reported by the parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentCounts {
    /// Peptide groups (proteins and molecule lists)
    pub peptide_groups: usize,
    /// Peptides
    pub peptides: usize,
    /// Small molecules
    pub small_molecules: usize,
    /// Precursors
    pub precursors: usize,
    /// Transitions
    pub transitions: usize,
    /// Replicates
    pub replicates: usize,
    /// Group comparisons defined in the data settings
    pub group_comparisons: usize,
    /// Calibration curves that quantification will produce
    pub calibration_curves: usize,
}

/// iRT scale entry as carried by the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrtPeptide {
    /// Modified sequence
    pub modified_sequence: String,
    /// iRT value
    pub irt_value: f64,
    /// Whether this is a standard (reference) peptide
    pub irt_standard: bool,
    /// How the value was obtained
    pub time_source: Option<i32>,
}
