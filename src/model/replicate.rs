use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::settings::Predictor;
use super::Annotation;

/// A replicate and its sample files as parsed from the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocReplicate {
    /// Replicate name, unique within the document
    pub name: String,
    /// Sample type ("unknown", "standard", "qc", "blank", ...)
    pub sample_type: Option<String>,
    /// Analyte concentration for calibration standards
    pub analyte_concentration: Option<f64>,
    /// Sample dilution factor
    pub sample_dilution_factor: Option<f64>,
    /// Batch name
    pub batch_name: Option<String>,
    /// Whether MIDAS spectra were acquired
    pub has_midas_spectra: bool,
    /// Collision energy predictor override
    pub ce_predictor: Option<Predictor>,
    /// Declustering potential predictor override
    pub dp_predictor: Option<Predictor>,
    /// Replicate annotations
    pub annotations: Vec<Annotation>,
    /// Sample files acquired for this replicate
    pub sample_files: Vec<DocSampleFile>,
}

/// A sample (raw data) file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocSampleFile {
    /// Skyline-native file id, unique within a replicate
    pub file_id: String,
    /// Path of the raw file at acquisition time
    pub file_path: String,
    /// Sample name within a multi-sample file
    pub sample_name: Option<String>,
    /// Sample id
    pub sample_id: Option<String>,
    /// Acquisition start time
    pub acquired_time: Option<NaiveDateTime>,
    /// Last modification time of the raw file
    pub modified_time: Option<NaiveDateTime>,
    /// Instrument serial number
    pub instrument_serial_number: Option<String>,
    /// Global standard area used for normalization
    pub explicit_global_standard_area: Option<f64>,
    /// Ion mobility type
    pub ion_mobility_type: Option<String>,
    /// Instrument configurations recorded in the file
    pub instrument_info: Vec<InstrumentInfo>,
}

/// One instrument configuration record of a sample file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentInfo {
    /// Instrument model
    pub model: Option<String>,
    /// Ionization type
    pub ionization_type: Option<String>,
    /// Mass analyzer
    pub analyzer: Option<String>,
    /// Detector
    pub detector: Option<String>,
}
