//! Transitions: the shared and typed rows, optimization values, neutral
//! losses and transition-level results.

use std::collections::HashSet;

use rusqlite::params;

use crate::error::{ImportError, Result};
use crate::keys::opt_step_key;
use crate::model::{DocTransition, OptimizationRecord, TransitionLoss};
use crate::store::{execute_cached, insert_returning_id, AnnotationKind};

use super::precursor::PrecursorScope;
use super::ratios::TransitionResults;
use super::GraphBuilder;

/// Identity of a fragment shared by the transitions of different labels.
pub(super) fn fragment_key(transition: &DocTransition) -> String {
    format!(
        "{}+{}|{}|{}",
        transition.fragment_name(),
        transition.charge.unwrap_or(1),
        transition.mass_index.unwrap_or(0),
        transition
            .neutral_loss_mass
            .map(|mass| format!("{mass:.4}"))
            .unwrap_or_default()
    )
}

fn optimization_matches(record: &OptimizationRecord, precursor_charge: i32, fragment: &str, product_charge: Option<i32>) -> bool {
    record.precursor_charge == precursor_charge
        && record.fragment_ion.as_deref() == Some(fragment)
        && (record.product_charge.is_none() || record.product_charge == product_charge)
}

impl GraphBuilder<'_> {
    fn insert_losses(&self, transition_id: i64, fragment: &str, losses: &[TransitionLoss]) -> Result<()> {
        for loss in losses {
            let Some(name) = &loss.modification else {
                return Err(ImportError::bad_data(format!(
                    "Neutral loss on transition {fragment} is not tied to a modification"
                )));
            };
            let modification = self.ctx.settings.structural_mod(name).ok_or_else(|| {
                ImportError::bad_data(format!(
                    "Neutral loss on transition {fragment} references unknown modification '{name}'"
                ))
            })?;
            let Some(index) = loss.loss_index else {
                return Err(ImportError::bad_data(format!(
                    "Neutral loss of '{name}' on transition {fragment} has no loss index"
                )));
            };
            let loss_id = modification.loss_ids.get(index).ok_or_else(|| {
                ImportError::bad_data(format!(
                    "Loss index {index} on transition {fragment} is out of range: '{name}' declares {} losses",
                    modification.loss_ids.len()
                ))
            })?;
            execute_cached(
                self.ctx.conn,
                "INSERT INTO transition_loss (transition_id, structural_mod_loss_id) VALUES (?1, ?2)",
                params![transition_id, loss_id],
            )?;
        }
        Ok(())
    }

    /// Insert a transition with its results.
    pub(super) fn insert_transition(
        &mut self,
        precursor: &PrecursorScope<'_>,
        transition: DocTransition,
    ) -> Result<TransitionResults> {
        let conn = self.ctx.conn;
        let fragment = transition.fragment_name();

        let transition_id = insert_returning_id(
            conn,
            "INSERT INTO general_transition (general_precursor_id, mz, charge, fragment_type, \
             fragment_ordinal, neutral_mass, neutral_loss_mass, mass_index, isotope_dist_rank, \
             isotope_dist_proportion, decoy_mass_shift, collision_energy, declustering_potential, \
             quantitative) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                precursor.id,
                transition.mz,
                transition.charge,
                transition.fragment_type,
                transition.fragment_ordinal,
                transition.neutral_mass,
                transition.neutral_loss_mass,
                transition.mass_index,
                transition.isotope_dist_rank,
                transition.isotope_dist_proportion,
                transition.decoy_mass_shift,
                transition.collision_energy,
                transition.declustering_potential,
                transition.quantitative.unwrap_or(true)
            ],
        )?;
        if precursor.molecule.peptide {
            execute_cached(
                conn,
                "INSERT INTO transition (id, cleavage_aa) VALUES (?1, ?2)",
                params![transition_id, transition.cleavage_aa],
            )?;
        } else {
            execute_cached(
                conn,
                "INSERT INTO molecule_transition (id, ion_formula, custom_ion_name, mass_monoisotopic, \
                 mass_average) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    transition_id,
                    transition.ion_formula,
                    transition.custom_ion_name,
                    transition.mass_monoisotopic,
                    transition.mass_average
                ],
            )?;
        }
        self.stats.transitions += 1;

        self.annotations
            .add(conn, AnnotationKind::Transition, transition_id, &transition.annotations)?;

        let optimizations = self.optimizations.take_matching(&precursor.molecule.target, |record| {
            optimization_matches(record, precursor.charge, &fragment, transition.charge)
        });
        for record in &optimizations {
            execute_cached(
                conn,
                "INSERT INTO transition_optimization (transition_id, optimization_type, opt_value) \
                 VALUES (?1, ?2, ?3)",
                params![transition_id, record.optimization_type, record.value],
            )?;
        }
        self.stats.optimizations += optimizations.len();

        self.insert_losses(transition_id, &fragment, &transition.losses)?;

        let mut results = TransitionResults {
            fragment: fragment_key(&transition),
            ..Default::default()
        };
        if !self.save_transition_results {
            return Ok(results);
        }

        let mut seen = HashSet::new();
        for chrom_info in &transition.chrom_infos {
            let (sample_file, sample_file_id) = self
                .ctx
                .replicates
                .resolve(&chrom_info.replicate, &chrom_info.file_id)?;
            let key = opt_step_key(&sample_file, chrom_info.optimization_step);
            let Some(precursor_result_id) = precursor.results.get(&key) else {
                return Err(ImportError::bad_data(format!(
                    "No result for precursor {} matches transition {fragment} in sample file {key}",
                    precursor.display
                )));
            };
            if !seen.insert(key.clone()) {
                return Err(ImportError::bad_data(format!(
                    "Multiple transition results found for transition {fragment} of precursor {} and sample file {key}",
                    precursor.display
                )));
            }

            let result_id = insert_returning_id(
                conn,
                "INSERT INTO transition_chrom_info (transition_id, sample_file_id, precursor_chrom_info_id, \
                 optimization_step, retention_time, start_time, end_time, height, area, background, fwhm, \
                 fwhm_degenerate, truncated, peak_rank, mass_error_ppm, user_set, identified, \
                 points_across_peak, ccs) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    transition_id,
                    sample_file_id,
                    precursor_result_id,
                    chrom_info.optimization_step,
                    chrom_info.retention_time,
                    chrom_info.start_time,
                    chrom_info.end_time,
                    chrom_info.height,
                    chrom_info.area,
                    chrom_info.background,
                    chrom_info.fwhm,
                    chrom_info.fwhm_degenerate,
                    chrom_info.truncated,
                    chrom_info.peak_rank,
                    chrom_info.mass_error_ppm,
                    chrom_info.user_set,
                    chrom_info.identified,
                    chrom_info.points_across_peak,
                    chrom_info.ccs
                ],
            )?;
            self.stats.transition_results += 1;
            self.annotations.add(
                conn,
                AnnotationKind::TransitionChromInfo,
                result_id,
                &chrom_info.annotations,
            )?;
            if chrom_info.optimization_step.is_none() {
                results.results.insert(sample_file_id, (result_id, chrom_info.area));
            }
        }
        Ok(results)
    }
}
