//! # Settings import
//!
//! Writes the document-wide settings of a run: transition prediction and
//! instrument limits, full-scan and isolation settings, the modification
//! catalog, isotope labels, spectral libraries, enzyme, quantification and
//! data settings.
//!
//! The result is a [`SettingsInfo`]: the name to id maps later stages need
//! to reference settings rows. It is built once and read-only afterwards.

pub mod modifications;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::error::{ImportError, Result};
use crate::model::{
    DataSettings, DocumentSettings, FullScanSettings, IsolationScheme, IsotopeLabel, LibrarySettings,
    ModificationSettings, PeptideSettings, Predictor, TransitionSettings, LIGHT_LABEL,
};
use crate::store::{execute_cached, insert_returning_id};

pub use modifications::StructuralModInfo;

/// Ids of the settings rows written for one run
#[derive(Debug, Clone, Default)]
pub struct SettingsInfo {
    structural_mods: HashMap<String, StructuralModInfo>,
    isotope_mods: HashMap<String, (i64, i64)>,
    labels: HashMap<String, i64>,
    label_order: Vec<i64>,
    standard_labels: Vec<i64>,
    libraries: HashMap<String, i64>,
    predictors: Vec<(Predictor, i64)>,
}

impl SettingsInfo {
    /// Structural modification by name.
    pub fn structural_mod(&self, name: &str) -> Option<&StructuralModInfo> {
        self.structural_mods.get(name)
    }

    /// Isotope modification id by name.
    pub fn isotope_mod(&self, name: &str) -> Option<i64> {
        self.isotope_mods.get(name).map(|(id, _)| *id)
    }

    /// Label an isotope modification is bound to.
    pub fn isotope_mod_label(&self, name: &str) -> Option<i64> {
        self.isotope_mods.get(name).map(|(_, label_id)| *label_id)
    }

    /// Isotope label id by name.
    pub fn label_id(&self, name: &str) -> Option<i64> {
        self.labels.get(name).copied()
    }

    /// Id of the light label, which every run has.
    pub fn light_label_id(&self) -> Option<i64> {
        self.label_id(LIGHT_LABEL)
    }

    /// Every label id of the run in declaration order.
    pub fn label_ids(&self) -> &[i64] {
        &self.label_order
    }

    /// Label ids flagged as internal standards.
    pub fn standard_label_ids(&self) -> &[i64] {
        &self.standard_labels
    }

    /// Spectral library id by name.
    pub fn library_id(&self, name: &str) -> Option<i64> {
        self.libraries.get(name).copied()
    }

    /// Id of a predictor stored with the transition settings that is equal
    /// to `predictor`.
    pub fn matching_predictor(&self, predictor: &Predictor) -> Option<i64> {
        self.predictors
            .iter()
            .find(|(stored, _)| stored == predictor)
            .map(|(_, id)| *id)
    }
}

/// Insert a predictor and its per-charge settings.
pub fn insert_predictor(conn: &Connection, predictor: &Predictor) -> Result<i64> {
    let id = insert_returning_id(
        conn,
        "INSERT INTO predictor (name, step_size, step_count) VALUES (?1, ?2, ?3)",
        params![predictor.name, predictor.step_size, predictor.step_count],
    )?;
    for setting in &predictor.settings {
        execute_cached(
            conn,
            "INSERT INTO predictor_settings (predictor_id, charge, slope, intercept) VALUES (?1, ?2, ?3, ?4)",
            params![id, setting.charge, setting.slope, setting.intercept],
        )?;
    }
    Ok(id)
}

/// Write every settings category of `settings` for `run_id`.
pub fn import_settings(conn: &Connection, run_id: i64, settings: &DocumentSettings) -> Result<SettingsInfo> {
    let mut info = SettingsInfo::default();

    import_transition_settings(conn, run_id, &settings.transition, &mut info)?;
    import_peptide_settings(conn, run_id, &settings.peptide, &mut info)?;
    import_data_settings(conn, run_id, &settings.data)?;

    log::debug!(
        "Run {}: {} structural mods, {} isotope mods, {} labels ({} standard), {} libraries",
        run_id,
        info.structural_mods.len(),
        info.isotope_mods.len(),
        info.labels.len(),
        info.standard_labels.len(),
        info.libraries.len()
    );
    Ok(info)
}

fn import_transition_settings(
    conn: &Connection,
    run_id: i64,
    settings: &TransitionSettings,
    info: &mut SettingsInfo,
) -> Result<()> {
    let prediction = &settings.prediction;
    let mut predictor_id = |predictor: &Option<Predictor>| -> Result<Option<i64>> {
        match predictor {
            Some(predictor) => {
                let id = insert_predictor(conn, predictor)?;
                info.predictors.push((predictor.clone(), id));
                Ok(Some(id))
            }
            None => Ok(None),
        }
    };
    let ce = predictor_id(&prediction.ce_predictor)?;
    let dp = predictor_id(&prediction.dp_predictor)?;
    let cov = predictor_id(&prediction.cov_predictor)?;

    execute_cached(
        conn,
        "INSERT INTO transition_prediction_settings (run_id, precursor_mass_type, product_mass_type, \
         optimize_by, ce_predictor_id, dp_predictor_id, cov_predictor_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run_id,
            prediction.precursor_mass_type,
            prediction.product_mass_type,
            prediction.optimize_by,
            ce,
            dp,
            cov
        ],
    )?;

    let instrument = &settings.instrument;
    execute_cached(
        conn,
        "INSERT INTO transition_instrument_settings (run_id, min_mz, max_mz, dynamic_min, \
         method_match_tolerance, max_transitions, max_inclusions, min_time, max_time) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            run_id,
            instrument.min_mz,
            instrument.max_mz,
            instrument.dynamic_min,
            instrument.method_match_tolerance,
            instrument.max_transitions,
            instrument.max_inclusions,
            instrument.min_time,
            instrument.max_time
        ],
    )?;

    if let Some(full_scan) = &settings.full_scan {
        import_full_scan(conn, run_id, full_scan)?;
    }
    Ok(())
}

fn import_full_scan(conn: &Connection, run_id: i64, full_scan: &FullScanSettings) -> Result<()> {
    execute_cached(
        conn,
        "INSERT INTO transition_full_scan_settings (run_id, acquisition_method, product_mass_analyzer, \
         product_res, product_res_mz, precursor_isotopes, precursor_isotope_filter, \
         precursor_mass_analyzer, precursor_res, precursor_res_mz, retention_time_filter_type, \
         retention_time_filter_length) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            run_id,
            full_scan.acquisition_method,
            full_scan.product_mass_analyzer,
            full_scan.product_res,
            full_scan.product_res_mz,
            full_scan.precursor_isotopes,
            full_scan.precursor_isotope_filter,
            full_scan.precursor_mass_analyzer,
            full_scan.precursor_res,
            full_scan.precursor_res_mz,
            full_scan.retention_time_filter_type,
            full_scan.retention_time_filter_length
        ],
    )?;

    if let Some(scheme) = &full_scan.isolation_scheme {
        import_isolation_scheme(conn, run_id, scheme)?;
    }
    Ok(())
}

fn import_isolation_scheme(conn: &Connection, run_id: i64, scheme: &IsolationScheme) -> Result<()> {
    let scheme_id = insert_returning_id(
        conn,
        "INSERT INTO isolation_scheme (run_id, name, precursor_filter, precursor_left_filter, \
         precursor_right_filter, special_handling, windows_per_scan) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run_id,
            scheme.name,
            scheme.precursor_filter,
            scheme.precursor_left_filter,
            scheme.precursor_right_filter,
            scheme.special_handling,
            scheme.windows_per_scan
        ],
    )?;

    for window in &scheme.windows {
        execute_cached(
            conn,
            "INSERT INTO isolation_window (isolation_scheme_id, window_start, window_end, target, \
             margin_left, margin_right) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                scheme_id,
                window.window_start,
                window.window_end,
                window.target,
                window.margin_left,
                window.margin_right
            ],
        )?;
    }
    Ok(())
}

fn import_peptide_settings(
    conn: &Connection,
    run_id: i64,
    settings: &PeptideSettings,
    info: &mut SettingsInfo,
) -> Result<()> {
    if let Some(enzyme) = &settings.enzyme {
        let enzyme_id = insert_returning_id(
            conn,
            "INSERT INTO enzyme (name, cut, no_cut, sense) VALUES (?1, ?2, ?3, ?4)",
            params![enzyme.name, enzyme.cut, enzyme.no_cut, enzyme.sense],
        )?;
        let digestion = settings.digestion.clone().unwrap_or_default();
        execute_cached(
            conn,
            "INSERT INTO run_enzyme (run_id, enzyme_id, max_missed_cleavages, exclude_ragged_ends) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                enzyme_id,
                digestion.max_missed_cleavages,
                digestion.exclude_ragged_ends
            ],
        )?;
    }

    import_isotope_labels(conn, run_id, &settings.modifications.isotope_labels, info)?;
    import_modifications(conn, run_id, &settings.modifications, info)?;
    import_libraries(conn, run_id, &settings.libraries, info)?;

    if let Some(quant) = &settings.quantification {
        execute_cached(
            conn,
            "INSERT INTO quantification_settings (run_id, regression_fit, regression_weighting, \
             normalization_method, ms_level, units) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                quant.regression_fit,
                quant.regression_weighting,
                quant.normalization_method,
                quant.ms_level,
                quant.units
            ],
        )?;
    }
    Ok(())
}

fn import_isotope_labels(
    conn: &Connection,
    run_id: i64,
    labels: &[IsotopeLabel],
    info: &mut SettingsInfo,
) -> Result<()> {
    let mut declared: Vec<IsotopeLabel> = Vec::with_capacity(labels.len() + 1);
    if !labels.iter().any(|label| label.name == LIGHT_LABEL) {
        declared.push(IsotopeLabel {
            name: LIGHT_LABEL.to_string(),
            standard: false,
        });
    }
    declared.extend(labels.iter().cloned());

    for label in declared {
        if info.labels.contains_key(&label.name) {
            return Err(ImportError::bad_data(format!(
                "Isotope label '{}' is declared more than once",
                label.name
            )));
        }
        let id = insert_returning_id(
            conn,
            "INSERT INTO isotope_label (run_id, name, standard) VALUES (?1, ?2, ?3)",
            params![run_id, label.name, label.standard],
        )?;
        if label.standard {
            info.standard_labels.push(id);
        }
        info.label_order.push(id);
        info.labels.insert(label.name, id);
    }
    Ok(())
}

fn import_modifications(
    conn: &Connection,
    run_id: i64,
    settings: &ModificationSettings,
    info: &mut SettingsInfo,
) -> Result<()> {
    let mut reused = 0usize;

    for modification in &settings.structural {
        let stored = match modifications::find_structural(conn, modification)? {
            Some(stored) => {
                reused += 1;
                stored
            }
            None => modifications::insert_structural(conn, modification)?,
        };
        execute_cached(
            conn,
            "INSERT OR IGNORE INTO run_structural_modification (run_id, structural_mod_id, variable, \
             explicit_mod) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, stored.id, modification.variable, modification.explicit],
        )?;
        info.structural_mods.insert(modification.name.clone(), stored);
    }

    for modification in &settings.isotope {
        let label_id = info.label_id(&modification.isotope_label).ok_or_else(|| {
            ImportError::bad_data(format!(
                "Isotope modification '{}' references unknown label '{}'",
                modification.name, modification.isotope_label
            ))
        })?;
        let mod_id = modifications::resolve_isotope(conn, modification)?;
        execute_cached(
            conn,
            "INSERT OR IGNORE INTO run_isotope_modification (run_id, isotope_mod_id, isotope_label_id, \
             explicit_mod) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, mod_id, label_id, modification.explicit],
        )?;
        info.isotope_mods.insert(modification.name.clone(), (mod_id, label_id));
    }

    execute_cached(
        conn,
        "INSERT INTO modification_settings (run_id, max_variable_mods, max_neutral_losses) VALUES (?1, ?2, ?3)",
        params![run_id, settings.max_variable_mods, settings.max_neutral_losses],
    )?;

    log::debug!(
        "Reused {} of {} structural modifications",
        reused,
        settings.structural.len()
    );
    Ok(())
}

fn import_libraries(
    conn: &Connection,
    run_id: i64,
    settings: &LibrarySettings,
    info: &mut SettingsInfo,
) -> Result<()> {
    execute_cached(
        conn,
        "INSERT INTO library_settings (run_id, pick, rank_type, peptide_count) VALUES (?1, ?2, ?3, ?4)",
        params![run_id, settings.pick, settings.rank_type, settings.peptide_count],
    )?;

    for library in &settings.libraries {
        let id = insert_returning_id(
            conn,
            "INSERT INTO spectrum_library (run_id, name, library_type, file_name, lsid, revision) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                library.name,
                library.library_type,
                library.file_name,
                library.lsid,
                library.revision
            ],
        )?;
        info.libraries.insert(library.name.clone(), id);
    }
    Ok(())
}

fn import_data_settings(conn: &Connection, run_id: i64, settings: &DataSettings) -> Result<()> {
    for annotation in &settings.annotations {
        execute_cached(
            conn,
            "INSERT INTO annotation_settings (run_id, name, targets, annotation_type) VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                annotation.name,
                annotation.targets.join(","),
                annotation.annotation_type
            ],
        )?;
    }

    for comparison in &settings.group_comparisons {
        execute_cached(
            conn,
            "INSERT INTO group_comparison_settings (run_id, name, control_annotation, control_value, \
             case_value, identity_annotation, normalization_method, confidence_level, per_protein) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                run_id,
                comparison.name,
                comparison.control_annotation,
                comparison.control_value,
                comparison.case_value,
                comparison.identity_annotation,
                comparison.normalization_method,
                comparison.confidence_level,
                comparison.per_protein
            ],
        )?;
    }
    Ok(())
}
