use serde::{Deserialize, Serialize};

/// All document-wide settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Transition prediction, instrument and full-scan settings
    pub transition: TransitionSettings,
    /// Digestion, modification, library and quantification settings
    pub peptide: PeptideSettings,
    /// Annotation definitions and group comparisons
    pub data: DataSettings,
}

/// Transition settings of a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Mass types and optimization predictors
    pub prediction: TransitionPrediction,
    /// Instrument limits
    pub instrument: TransitionInstrument,
    /// Full-scan (MS1/DIA) filtering, when configured
    pub full_scan: Option<FullScanSettings>,
}

/// Prediction settings, including collision energy and declustering predictors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionPrediction {
    /// "Monoisotopic" or "Average"
    pub precursor_mass_type: Option<String>,
    /// "Monoisotopic" or "Average"
    pub product_mass_type: Option<String>,
    /// What optimization steps were acquired for ("collision_energy", ...)
    pub optimize_by: Option<String>,
    /// Collision energy predictor
    pub ce_predictor: Option<Predictor>,
    /// Declustering potential predictor
    pub dp_predictor: Option<Predictor>,
    /// Compensation voltage predictor
    pub cov_predictor: Option<Predictor>,
}

/// A linear instrument-optimization predictor (CE, DP, CoV)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Predictor {
    /// Predictor name as shown in Skyline
    pub name: String,
    /// Step size for optimization series
    pub step_size: Option<f64>,
    /// Number of steps on each side of the predicted value
    pub step_count: Option<i32>,
    /// Per-charge regression lines
    pub settings: Vec<PredictorSetting>,
}

/// One per-charge regression line of a [`Predictor`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorSetting {
    /// Precursor charge the line applies to
    pub charge: Option<i32>,
    /// Slope
    pub slope: Option<f64>,
    /// Intercept
    pub intercept: Option<f64>,
}

/// Instrument limits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionInstrument {
    /// Minimum m/z
    pub min_mz: Option<f64>,
    /// Maximum m/z
    pub max_mz: Option<f64>,
    /// Whether the minimum m/z is dynamic
    pub dynamic_min: bool,
    /// Method match tolerance in m/z
    pub method_match_tolerance: Option<f64>,
    /// Maximum transitions per method
    pub max_transitions: Option<i32>,
    /// Maximum inclusion list entries
    pub max_inclusions: Option<i32>,
    /// Minimum retention time
    pub min_time: Option<f64>,
    /// Maximum retention time
    pub max_time: Option<f64>,
}

/// Full-scan settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FullScanSettings {
    /// Acquisition method (DIA, DDA, ...)
    pub acquisition_method: Option<String>,
    /// Product mass analyzer
    pub product_mass_analyzer: Option<String>,
    /// Product resolution
    pub product_res: Option<f64>,
    /// m/z at which product resolution applies
    pub product_res_mz: Option<f64>,
    /// Precursor isotopes ("Count", "Percent")
    pub precursor_isotopes: Option<String>,
    /// Precursor isotope filter
    pub precursor_isotope_filter: Option<f64>,
    /// Precursor mass analyzer
    pub precursor_mass_analyzer: Option<String>,
    /// Precursor resolution
    pub precursor_res: Option<f64>,
    /// m/z at which precursor resolution applies
    pub precursor_res_mz: Option<f64>,
    /// Retention time filter type
    pub retention_time_filter_type: Option<String>,
    /// Retention time filter length in minutes
    pub retention_time_filter_length: Option<f64>,
    /// Isolation scheme for DIA acquisition
    pub isolation_scheme: Option<IsolationScheme>,
}

/// DIA isolation scheme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationScheme {
    /// Scheme name
    pub name: String,
    /// Fixed precursor filter width
    pub precursor_filter: Option<f64>,
    /// Left-hand filter width
    pub precursor_left_filter: Option<f64>,
    /// Right-hand filter width
    pub precursor_right_filter: Option<f64>,
    /// Special handling ("Multiplexed", "Overlap", ...)
    pub special_handling: Option<String>,
    /// Windows acquired per scan
    pub windows_per_scan: Option<i32>,
    /// Explicit windows
    pub windows: Vec<IsolationWindow>,
}

/// One isolation window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationWindow {
    /// Window start m/z
    pub window_start: f64,
    /// Window end m/z
    pub window_end: f64,
    /// Target m/z
    pub target: Option<f64>,
    /// Left margin
    pub margin_left: Option<f64>,
    /// Right margin
    pub margin_right: Option<f64>,
}

/// Peptide settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeptideSettings {
    /// Digestion enzyme
    pub enzyme: Option<Enzyme>,
    /// Digestion parameters
    pub digestion: Option<DigestSettings>,
    /// Modification catalog and isotope labels
    pub modifications: ModificationSettings,
    /// Spectral library settings
    pub libraries: LibrarySettings,
    /// Quantification settings
    pub quantification: Option<QuantificationSettings>,
}

/// Digestion enzyme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enzyme {
    /// Enzyme name
    pub name: String,
    /// Residues cut after/before
    pub cut: Option<String>,
    /// Residues that block cleavage
    pub no_cut: Option<String>,
    /// "C" or "N" terminal sense
    pub sense: Option<String>,
}

/// Digestion parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestSettings {
    /// Maximum missed cleavages
    pub max_missed_cleavages: Option<i32>,
    /// Exclude ragged ends
    pub exclude_ragged_ends: bool,
}

/// Modification catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModificationSettings {
    /// Structural (static and variable) modifications
    pub structural: Vec<StructuralModification>,
    /// Isotope modifications
    pub isotope: Vec<IsotopeModification>,
    /// Isotope label types; "light" is implied when absent
    pub isotope_labels: Vec<IsotopeLabel>,
    /// Maximum variable modifications per peptide
    pub max_variable_mods: Option<i32>,
    /// Maximum neutral losses per fragment
    pub max_neutral_losses: Option<i32>,
}

/// A structural modification with its potential neutral losses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralModification {
    /// Modification name
    pub name: String,
    /// Residues the modification applies to
    pub amino_acid: Option<String>,
    /// "N" or "C" terminal restriction
    pub terminus: Option<String>,
    /// Chemical formula delta
    pub formula: Option<String>,
    /// Monoisotopic mass delta
    pub mass_diff_mono: Option<f64>,
    /// Average mass delta
    pub mass_diff_avg: Option<f64>,
    /// Unimod accession
    pub unimod_id: Option<i32>,
    /// Variable modification
    pub variable: bool,
    /// Applied only where explicitly set on a peptide
    pub explicit: bool,
    /// Declared potential losses, addressed by index from transitions
    pub losses: Vec<PotentialLoss>,
}

/// A potential neutral loss of a structural modification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotentialLoss {
    /// Chemical formula of the loss
    pub formula: Option<String>,
    /// Monoisotopic mass of the loss
    pub mass_diff_mono: Option<f64>,
    /// Average mass of the loss
    pub mass_diff_avg: Option<f64>,
    /// Inclusion rule ("Library", "Always", "Never")
    pub inclusion: Option<String>,
}

/// An isotope modification bound to a label type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IsotopeModification {
    /// Modification name
    pub name: String,
    /// Residues the modification applies to
    pub amino_acid: Option<String>,
    /// "N" or "C" terminal restriction
    pub terminus: Option<String>,
    /// Chemical formula delta
    pub formula: Option<String>,
    /// Monoisotopic mass delta
    pub mass_diff_mono: Option<f64>,
    /// Average mass delta
    pub mass_diff_avg: Option<f64>,
    /// 13C label
    pub label13c: bool,
    /// 15N label
    pub label15n: bool,
    /// 18O label
    pub label18o: bool,
    /// 2H label
    pub label2h: bool,
    /// Unimod accession
    pub unimod_id: Option<i32>,
    /// Label type this modification belongs to
    pub isotope_label: String,
    /// Applied only where explicitly set on a peptide
    pub explicit: bool,
}

/// Isotope label type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IsotopeLabel {
    /// Label name ("light", "heavy", ...)
    pub name: String,
    /// Whether this label is an internal standard
    pub standard: bool,
}

/// Spectral library settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Library pick strategy
    pub pick: Option<String>,
    /// Rank type
    pub rank_type: Option<String>,
    /// Peptide count limit
    pub peptide_count: Option<i32>,
    /// Libraries currently part of the document
    pub libraries: Vec<SpectrumLibrary>,
}

/// A spectral library registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumLibrary {
    /// Library name
    pub name: String,
    /// Library type ("bibliospec", "elib", ...)
    pub library_type: String,
    /// Library file name
    pub file_name: Option<String>,
    /// Library LSID
    pub lsid: Option<String>,
    /// Library revision
    pub revision: Option<String>,
}

/// Quantification settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantificationSettings {
    /// Calibration regression fit ("linear", "none", ...)
    pub regression_fit: Option<String>,
    /// Regression weighting
    pub regression_weighting: Option<String>,
    /// Normalization method
    pub normalization_method: Option<String>,
    /// MS level used for quantification
    pub ms_level: Option<i32>,
    /// Concentration units
    pub units: Option<String>,
}

impl QuantificationSettings {
    /// Whether calibration curves are produced for this document.
    pub fn has_regression(&self) -> bool {
        self.regression_fit
            .as_deref()
            .map(|fit| !fit.is_empty() && !fit.eq_ignore_ascii_case("none"))
            .unwrap_or(false)
    }
}

/// Data settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Annotation definitions
    pub annotations: Vec<AnnotationDefinition>,
    /// Group comparison definitions
    pub group_comparisons: Vec<GroupComparison>,
}

/// Annotation definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationDefinition {
    /// Annotation name
    pub name: String,
    /// Entity kinds the annotation applies to
    pub targets: Vec<String>,
    /// Value type ("text", "true_false", "number", "value_list")
    pub annotation_type: String,
}

/// Group comparison definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupComparison {
    /// Comparison name
    pub name: String,
    /// Annotation defining the groups
    pub control_annotation: Option<String>,
    /// Control group value
    pub control_value: Option<String>,
    /// Case group value
    pub case_value: Option<String>,
    /// Annotation identifying biological replicates
    pub identity_annotation: Option<String>,
    /// Normalization method
    pub normalization_method: Option<String>,
    /// Confidence level (percent)
    pub confidence_level: Option<f64>,
    /// Compare at protein rather than peptide level
    pub per_protein: bool,
}
