use serde::{Deserialize, Serialize};

use super::chromatogram::ChromatogramIndex;
use super::Annotation;

/// A protein or molecule-list group and the molecules it contains
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocPeptideGroup {
    /// Group label (protein name or list name)
    pub label: String,
    /// Free-text description
    pub description: Option<String>,
    /// Biological sequence when the group is a protein
    pub sequence: Option<String>,
    /// Decoy group
    pub decoy: bool,
    /// User note
    pub note: Option<String>,
    /// Alternative description
    pub alt_description: Option<String>,
    /// Group annotations
    pub annotations: Vec<Annotation>,
    /// Peptides or small molecules of this group
    pub molecules: Vec<DocMolecule>,
}

/// Fields specific to the kind of molecule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoleculeKind {
    /// A peptide
    Peptide(PeptideFields),
    /// A small molecule
    SmallMolecule(SmallMoleculeFields),
}

impl Default for MoleculeKind {
    fn default() -> Self {
        MoleculeKind::Peptide(PeptideFields::default())
    }
}

/// A peptide or small molecule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocMolecule {
    /// Peptide or small molecule fields
    pub kind: MoleculeKind,
    /// Retention time calculator score
    pub rt_calculator_score: Option<f64>,
    /// Predicted retention time
    pub predicted_rt: Option<f64>,
    /// Average measured retention time
    pub avg_measured_rt: Option<f64>,
    /// Explicit retention time
    pub explicit_rt: Option<f64>,
    /// User note
    pub note: Option<String>,
    /// Standard type ("Normalization", "iRT", "QC", ...)
    pub standard_type: Option<String>,
    /// Concentration multiplier
    pub concentration_multiplier: Option<f64>,
    /// Internal standard concentration
    pub internal_standard_concentration: Option<f64>,
    /// Molecule annotations
    pub annotations: Vec<Annotation>,
    /// Molecule-level chromatogram results
    pub chrom_infos: Vec<MoleculeChromInfo>,
    /// Precursors of this molecule
    pub precursors: Vec<DocPrecursor>,
}

impl DocMolecule {
    /// Whether this molecule is a peptide.
    pub fn is_peptide(&self) -> bool {
        matches!(self.kind, MoleculeKind::Peptide(_))
    }

    /// Decoy peptides; small molecules are never decoys.
    pub fn is_decoy(&self) -> bool {
        match &self.kind {
            MoleculeKind::Peptide(peptide) => peptide.decoy,
            MoleculeKind::SmallMolecule(_) => false,
        }
    }
}

/// Peptide-specific fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeptideFields {
    /// Unmodified sequence
    pub sequence: String,
    /// Canonical modified sequence; derived from the light precursor when absent
    pub modified_sequence: Option<String>,
    /// Start index in the protein
    pub start_index: Option<i32>,
    /// End index in the protein
    pub end_index: Option<i32>,
    /// Residue preceding the peptide
    pub previous_aa: Option<String>,
    /// Residue following the peptide
    pub next_aa: Option<String>,
    /// Calculated neutral mass
    pub calc_neutral_mass: Option<f64>,
    /// Missed cleavages
    pub num_missed_cleavages: Option<i32>,
    /// Library rank
    pub rank: Option<i32>,
    /// Decoy peptide
    pub decoy: bool,
    /// Explicit structural modifications
    pub structural_mods: Vec<ExplicitModification>,
    /// Explicit isotope modifications
    pub isotope_mods: Vec<ExplicitModification>,
}

/// A modification placed on a specific residue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitModification {
    /// Modification name from the catalog
    pub name: String,
    /// Zero-based residue index
    pub index_aa: i32,
    /// Mass delta
    pub mass_diff: Option<f64>,
    /// Label type for isotope modifications
    pub isotope_label: Option<String>,
}

/// Small-molecule-specific fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallMoleculeFields {
    /// Ion formula
    pub ion_formula: Option<String>,
    /// Custom ion name
    pub custom_ion_name: Option<String>,
    /// Monoisotopic mass
    pub mass_monoisotopic: Option<f64>,
    /// Average mass
    pub mass_average: Option<f64>,
    /// External molecule id (InChIKey, HMDB, ...)
    pub molecule_id: Option<String>,
}

impl SmallMoleculeFields {
    /// Identity used for target-set comparisons.
    pub fn target_key(&self) -> String {
        format!(
            "{}|{}",
            self.custom_ion_name.as_deref().unwrap_or(""),
            self.ion_formula.as_deref().unwrap_or("")
        )
    }
}

/// Molecule-level chromatogram result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoleculeChromInfo {
    /// Replicate the result belongs to
    pub replicate: String,
    /// Skyline-native sample file id
    pub file_id: String,
    /// Fraction of precursors with a peak
    pub peak_count_ratio: Option<f64>,
    /// Retention time
    pub retention_time: Option<f64>,
    /// Excluded from calibration
    pub exclude_from_calibration: bool,
    /// Annotations
    pub annotations: Vec<Annotation>,
}

/// A precursor ion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocPrecursor {
    /// Precursor m/z
    pub mz: f64,
    /// Precursor charge
    pub charge: i32,
    /// Isotope label type; "light" when absent
    pub isotope_label: Option<String>,
    /// Collision energy
    pub collision_energy: Option<f64>,
    /// Declustering potential
    pub declustering_potential: Option<f64>,
    /// Explicit collision energy
    pub explicit_collision_energy: Option<f64>,
    /// Decoy precursor
    pub decoy: bool,
    /// User note
    pub note: Option<String>,
    /// Modified sequence (peptide precursors)
    pub modified_sequence: Option<String>,
    /// Neutral mass (peptide precursors)
    pub neutral_mass: Option<f64>,
    /// Ion formula (small-molecule precursors)
    pub ion_formula: Option<String>,
    /// Custom ion name (small-molecule precursors)
    pub custom_ion_name: Option<String>,
    /// Monoisotopic mass (small-molecule precursors)
    pub mass_monoisotopic: Option<f64>,
    /// Average mass (small-molecule precursors)
    pub mass_average: Option<f64>,
    /// Precursor annotations
    pub annotations: Vec<Annotation>,
    /// Spectral library matches
    pub library_infos: Vec<LibraryInfo>,
    /// Precursor-level chromatogram results
    pub chrom_infos: Vec<PrecursorChromInfo>,
    /// Transitions of this precursor
    pub transitions: Vec<DocTransition>,
}

impl DocPrecursor {
    /// Label name with the Skyline default applied.
    pub fn label_name(&self) -> &str {
        self.isotope_label.as_deref().unwrap_or(super::LIGHT_LABEL)
    }
}

/// A spectral library match of a precursor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryInfo {
    /// Name of the library the match came from
    pub library_name: String,
    /// First library score
    pub score1: Option<f64>,
    /// Second library score
    pub score2: Option<f64>,
    /// Third library score
    pub score3: Option<f64>,
}

/// Precursor-level chromatogram result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecursorChromInfo {
    /// Replicate the result belongs to
    pub replicate: String,
    /// Skyline-native sample file id
    pub file_id: String,
    /// Optimization step
    pub optimization_step: Option<i32>,
    /// Best retention time
    pub best_retention_time: Option<f64>,
    /// Peak start
    pub min_start_time: Option<f64>,
    /// Peak end
    pub max_end_time: Option<f64>,
    /// Total area
    pub total_area: Option<f64>,
    /// Total background
    pub total_background: Option<f64>,
    /// Maximum height
    pub max_height: Option<f64>,
    /// Maximum full width at half maximum
    pub max_fwhm: Option<f64>,
    /// Average mass error (ppm)
    pub average_mass_error_ppm: Option<f64>,
    /// Number of truncated peaks
    pub num_truncated: Option<i32>,
    /// Identification state
    pub identified: Option<String>,
    /// Library dot product
    pub library_dot_product: Option<f64>,
    /// Isotope dot product
    pub isotope_dot_product: Option<f64>,
    /// mProphet q-value
    pub qvalue: Option<f64>,
    /// mProphet z-score
    pub zscore: Option<f64>,
    /// Manual integration marker
    pub user_set: Option<String>,
    /// User note
    pub note: Option<String>,
    /// Location of this precursor's chromatograms in the binary store
    pub chromatogram: Option<ChromatogramIndex>,
    /// Annotations
    pub annotations: Vec<Annotation>,
}

/// A fragment (or precursor isotope) transition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocTransition {
    /// Product m/z
    pub mz: f64,
    /// Product charge
    pub charge: Option<i32>,
    /// Fragment type ("y", "b", "precursor", "custom", ...)
    pub fragment_type: Option<String>,
    /// Fragment ordinal
    pub fragment_ordinal: Option<i32>,
    /// Neutral mass
    pub neutral_mass: Option<f64>,
    /// Total neutral loss mass
    pub neutral_loss_mass: Option<f64>,
    /// Precursor isotope index
    pub mass_index: Option<i32>,
    /// Isotope distribution rank
    pub isotope_dist_rank: Option<i32>,
    /// Isotope distribution proportion
    pub isotope_dist_proportion: Option<f64>,
    /// Decoy mass shift
    pub decoy_mass_shift: Option<i32>,
    /// Cleavage residue
    pub cleavage_aa: Option<String>,
    /// Collision energy
    pub collision_energy: Option<f64>,
    /// Declustering potential
    pub declustering_potential: Option<f64>,
    /// Whether the transition counts toward quantification; true when absent
    pub quantitative: Option<bool>,
    /// Ion formula (small-molecule transitions)
    pub ion_formula: Option<String>,
    /// Custom ion name (small-molecule transitions)
    pub custom_ion_name: Option<String>,
    /// Monoisotopic mass (small-molecule transitions)
    pub mass_monoisotopic: Option<f64>,
    /// Average mass (small-molecule transitions)
    pub mass_average: Option<f64>,
    /// Neutral losses applied to this fragment
    pub losses: Vec<TransitionLoss>,
    /// Transition annotations
    pub annotations: Vec<Annotation>,
    /// Transition-level chromatogram results
    pub chrom_infos: Vec<TransitionChromInfo>,
}

impl DocTransition {
    /// Fragment name as Skyline prints it ("y7", "precursor", ...).
    pub fn fragment_name(&self) -> String {
        let fragment_type = self.fragment_type.as_deref().unwrap_or("custom");
        match self.fragment_ordinal {
            Some(ordinal) if fragment_type != "precursor" && fragment_type != "custom" => {
                format!("{fragment_type}{ordinal}")
            }
            _ => match &self.custom_ion_name {
                Some(name) if fragment_type == "custom" => name.clone(),
                _ => fragment_type.to_string(),
            },
        }
    }
}

/// A neutral loss reference on a transition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionLoss {
    /// Structural modification declaring the loss
    pub modification: Option<String>,
    /// Index into that modification's potential-loss list
    pub loss_index: Option<usize>,
}

/// Transition-level chromatogram result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionChromInfo {
    /// Replicate the result belongs to
    pub replicate: String,
    /// Skyline-native sample file id
    pub file_id: String,
    /// Optimization step
    pub optimization_step: Option<i32>,
    /// Apex retention time
    pub retention_time: Option<f64>,
    /// Peak start
    pub start_time: Option<f64>,
    /// Peak end
    pub end_time: Option<f64>,
    /// Peak height
    pub height: Option<f64>,
    /// Peak area
    pub area: Option<f64>,
    /// Background
    pub background: Option<f64>,
    /// Full width at half maximum
    pub fwhm: Option<f64>,
    /// FWHM could not be measured properly
    pub fwhm_degenerate: bool,
    /// Peak truncated at chromatogram boundary
    pub truncated: Option<bool>,
    /// Peak rank
    pub peak_rank: Option<i32>,
    /// Mass error (ppm)
    pub mass_error_ppm: Option<f64>,
    /// Manual integration marker
    pub user_set: Option<String>,
    /// Identification state
    pub identified: Option<String>,
    /// Points across the peak
    pub points_across_peak: Option<i32>,
    /// Collisional cross section
    pub ccs: Option<f64>,
    /// Annotations
    pub annotations: Vec<Annotation>,
}

/// An optimization record not yet matched to a transition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationRecord {
    /// Modified sequence of the peptide, or custom ion name of the molecule
    pub target: String,
    /// Precursor charge
    pub precursor_charge: i32,
    /// Fragment name ("y7"); absent for precursor-level optimizations
    pub fragment_ion: Option<String>,
    /// Product charge
    pub product_charge: Option<i32>,
    /// Optimization type ("collision_energy", "declustering_potential", ...)
    pub optimization_type: String,
    /// Optimized value
    pub value: f64,
}
