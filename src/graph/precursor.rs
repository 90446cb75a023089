//! Precursors: the shared and typed rows, spectral library matches and
//! precursor-level results.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::error::{ImportError, Result};
use crate::keys::{opt_step_key, OptStepKey};
use crate::model::DocPrecursor;
use crate::store::{execute_cached, insert_returning_id, AnnotationKind, CollectionType, RunStatus};

use super::molecule::MoleculeScope;
use super::ratios::PrecursorResults;
use super::GraphBuilder;

/// What transitions need to know about their precursor
#[derive(Debug)]
pub(super) struct PrecursorScope<'m> {
    /// general_precursor id
    pub id: i64,
    /// Owning molecule
    pub molecule: &'m MoleculeScope,
    /// Precursor charge
    pub charge: i32,
    /// Human-readable name for messages
    pub display: String,
    /// Precursor result id by measurement
    pub results: HashMap<OptStepKey, i64>,
}

/// Live non-decoy, non-standard library precursors with the same key.
fn count_library_precursors(
    conn: &Connection,
    collection_id: i64,
    modified_sequence: &str,
    charge: i32,
    mz: f64,
) -> Result<i64> {
    Ok(conn
        .prepare_cached(
            "SELECT COUNT(*) FROM precursor p JOIN general_precursor gp ON p.id = gp.id \
             JOIN general_molecule gm ON gp.general_molecule_id = gm.id \
             JOIN peptide_group pg ON gm.peptide_group_id = pg.id JOIN run ON pg.run_id = run.id \
             WHERE run.collection_id = ?1 AND run.status <> ?2 AND p.modified_sequence = ?3 \
             AND gp.charge = ?4 AND ROUND(gp.mz, 4) = ROUND(?5, 4) \
             AND gp.decoy = 0 AND gm.standard_type IS NULL",
        )?
        .query_row(
            params![collection_id, RunStatus::Failed.as_str(), modified_sequence, charge, mz],
            |row| row.get(0),
        )?)
}

impl GraphBuilder<'_> {
    fn insert_library_matches(&mut self, precursor_id: i64, precursor: &DocPrecursor) -> Result<()> {
        for info in &precursor.library_infos {
            let Some(library_id) = self.ctx.settings.library_id(&info.library_name) else {
                if self.warned_libraries.insert(info.library_name.clone()) {
                    log::warn!(
                        target: "targetedms::job",
                        "Library '{}' is not part of the document settings; skipping its matches",
                        info.library_name
                    );
                }
                self.stats.skipped_library_matches += 1;
                continue;
            };
            execute_cached(
                self.ctx.conn,
                "INSERT INTO precursor_lib_info (precursor_id, spectrum_library_id, score1, score2, score3) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![precursor_id, library_id, info.score1, info.score2, info.score3],
            )?;
        }
        Ok(())
    }

    /// Insert a precursor and everything below it.
    pub(super) fn insert_precursor(
        &mut self,
        molecule: &MoleculeScope,
        precursor: DocPrecursor,
    ) -> Result<PrecursorResults> {
        let conn = self.ctx.conn;
        let label_name = precursor.label_name().to_string();
        let modified_sequence = precursor
            .modified_sequence
            .clone()
            .unwrap_or_else(|| molecule.target.clone());
        let display = format!(
            "{}{} ({})",
            modified_sequence,
            "+".repeat(precursor.charge.max(0) as usize),
            label_name
        );

        let label_id = self.ctx.settings.label_id(&label_name).ok_or_else(|| {
            ImportError::bad_data(format!(
                "Precursor {display} references unknown isotope label '{label_name}'"
            ))
        })?;

        if molecule.peptide
            && self.ctx.collection.collection_type == CollectionType::PeptideLibrary
            && !precursor.decoy
            && molecule.standard_type.is_none()
            && count_library_precursors(
                conn,
                self.ctx.collection.id,
                &modified_sequence,
                precursor.charge,
                precursor.mz,
            )? > 0
        {
            return Err(ImportError::bad_data(format!(
                "Duplicate precursor {display} (m/z {:.4}): the library already contains it",
                precursor.mz
            )));
        }

        let precursor_id = insert_returning_id(
            conn,
            "INSERT INTO general_precursor (general_molecule_id, isotope_label_id, mz, charge, \
             collision_energy, declustering_potential, explicit_collision_energy, decoy, note) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                molecule.id,
                label_id,
                precursor.mz,
                precursor.charge,
                precursor.collision_energy,
                precursor.declustering_potential,
                precursor.explicit_collision_energy,
                precursor.decoy,
                precursor.note
            ],
        )?;
        if molecule.peptide {
            execute_cached(
                conn,
                "INSERT INTO precursor (id, modified_sequence, neutral_mass) VALUES (?1, ?2, ?3)",
                params![precursor_id, modified_sequence, precursor.neutral_mass],
            )?;
        } else {
            execute_cached(
                conn,
                "INSERT INTO molecule_precursor (id, ion_formula, custom_ion_name, mass_monoisotopic, \
                 mass_average) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    precursor_id,
                    precursor.ion_formula,
                    precursor.custom_ion_name,
                    precursor.mass_monoisotopic,
                    precursor.mass_average
                ],
            )?;
        }
        self.stats.precursors += 1;

        self.annotations
            .add(conn, AnnotationKind::Precursor, precursor_id, &precursor.annotations)?;
        self.insert_library_matches(precursor_id, &precursor)?;

        let mut scope = PrecursorScope {
            id: precursor_id,
            molecule,
            charge: precursor.charge,
            display,
            results: HashMap::new(),
        };
        let mut results = PrecursorResults {
            label_id,
            charge: precursor.charge,
            ..Default::default()
        };

        for chrom_info in &precursor.chrom_infos {
            let (sample_file, sample_file_id) = self
                .ctx
                .replicates
                .resolve(&chrom_info.replicate, &chrom_info.file_id)?;
            let key = opt_step_key(&sample_file, chrom_info.optimization_step);
            if scope.results.contains_key(&key) {
                return Err(ImportError::bad_data(format!(
                    "Multiple precursor results found for precursor {} and sample file {key}",
                    scope.display
                )));
            }

            let result_id = insert_returning_id(
                conn,
                "INSERT INTO precursor_chrom_info (precursor_id, sample_file_id, \
                 general_molecule_chrom_info_id, optimization_step, best_retention_time, min_start_time, \
                 max_end_time, total_area, total_background, max_height, max_fwhm, \
                 average_mass_error_ppm, num_truncated, identified, library_dot_product, \
                 isotope_dot_product, qvalue, zscore, user_set, note) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
                params![
                    precursor_id,
                    sample_file_id,
                    molecule.results.get(&sample_file),
                    chrom_info.optimization_step,
                    chrom_info.best_retention_time,
                    chrom_info.min_start_time,
                    chrom_info.max_end_time,
                    chrom_info.total_area,
                    chrom_info.total_background,
                    chrom_info.max_height,
                    chrom_info.max_fwhm,
                    chrom_info.average_mass_error_ppm,
                    chrom_info.num_truncated,
                    chrom_info.identified,
                    chrom_info.library_dot_product,
                    chrom_info.isotope_dot_product,
                    chrom_info.qvalue,
                    chrom_info.zscore,
                    chrom_info.user_set,
                    chrom_info.note
                ],
            )?;
            self.stats.precursor_results += 1;
            self.annotations.add(
                conn,
                AnnotationKind::PrecursorChromInfo,
                result_id,
                &chrom_info.annotations,
            )?;

            if let (Some(scratch), Some(index)) = (self.scratch.as_mut(), &chrom_info.chromatogram) {
                scratch.stage(conn, result_id, &index.to_bytes()?)?;
            }
            if chrom_info.optimization_step.is_none() {
                results
                    .results
                    .insert(sample_file_id, (result_id, chrom_info.total_area));
            }
            scope.results.insert(key, result_id);
        }

        for transition in precursor.transitions {
            let transition_results = self.insert_transition(&scope, transition)?;
            results.transitions.push(transition_results);
        }
        Ok(results)
    }
}
