//! Molecules: the shared row, the peptide or small-molecule row, explicit
//! modifications and molecule-level results.

use std::collections::HashMap;

use rusqlite::params;

use crate::error::{ImportError, Result};
use crate::keys::SampleFileKey;
use crate::model::{DocMolecule, DocPrecursor, MoleculeKind, PeptideFields, LIGHT_LABEL};
use crate::store::{execute_cached, insert_returning_id, AnnotationKind};

use super::ratios::{self, MoleculeResults};
use super::GraphBuilder;

/// What precursors need to know about their molecule
#[derive(Debug)]
pub(super) struct MoleculeScope {
    /// general_molecule id
    pub id: i64,
    /// Peptide rather than small molecule
    pub peptide: bool,
    /// Modified sequence of a peptide, custom ion name of a small molecule
    pub target: String,
    /// Standard type, if the molecule is a standard
    pub standard_type: Option<String>,
    /// Molecule result id by sample file
    pub results: HashMap<SampleFileKey, i64>,
}

/// The peptide's modified sequence, taken from its light precursor when
/// the peptide does not carry one.
pub(super) fn peptide_modified_sequence(peptide: &PeptideFields, precursors: &[DocPrecursor]) -> String {
    if let Some(sequence) = &peptide.modified_sequence {
        return sequence.clone();
    }
    precursors
        .iter()
        .find(|p| p.label_name() == LIGHT_LABEL && p.modified_sequence.is_some())
        .or_else(|| precursors.iter().find(|p| p.modified_sequence.is_some()))
        .and_then(|p| p.modified_sequence.clone())
        .unwrap_or_else(|| peptide.sequence.clone())
}

impl GraphBuilder<'_> {
    fn insert_peptide(&mut self, molecule_id: i64, peptide: &PeptideFields, modified_sequence: &str) -> Result<()> {
        execute_cached(
            self.ctx.conn,
            "INSERT INTO peptide (id, sequence, peptide_modified_sequence, start_index, end_index, \
             previous_aa, next_aa, calc_neutral_mass, num_missed_cleavages, rank, decoy) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                molecule_id,
                peptide.sequence,
                modified_sequence,
                peptide.start_index,
                peptide.end_index,
                peptide.previous_aa,
                peptide.next_aa,
                peptide.calc_neutral_mass,
                peptide.num_missed_cleavages,
                peptide.rank,
                peptide.decoy
            ],
        )?;

        for modification in &peptide.structural_mods {
            let stored = self.ctx.settings.structural_mod(&modification.name).ok_or_else(|| {
                ImportError::bad_data(format!(
                    "Peptide {modified_sequence} uses structural modification '{}' which is not in the document settings",
                    modification.name
                ))
            })?;
            execute_cached(
                self.ctx.conn,
                "INSERT INTO peptide_structural_modification (peptide_id, structural_mod_id, index_aa, mass_diff) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![molecule_id, stored.id, modification.index_aa, modification.mass_diff],
            )?;
        }

        for modification in &peptide.isotope_mods {
            let unknown = || {
                ImportError::bad_data(format!(
                    "Peptide {modified_sequence} uses isotope modification '{}' which is not in the document settings",
                    modification.name
                ))
            };
            let mod_id = self.ctx.settings.isotope_mod(&modification.name).ok_or_else(unknown)?;
            let label_id = match &modification.isotope_label {
                Some(label) => self.ctx.settings.label_id(label).ok_or_else(|| {
                    ImportError::bad_data(format!(
                        "Peptide {modified_sequence} uses unknown isotope label '{label}'"
                    ))
                })?,
                None => self
                    .ctx
                    .settings
                    .isotope_mod_label(&modification.name)
                    .ok_or_else(unknown)?,
            };
            execute_cached(
                self.ctx.conn,
                "INSERT INTO peptide_isotope_modification (peptide_id, isotope_mod_id, isotope_label_id, \
                 index_aa, mass_diff) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![molecule_id, mod_id, label_id, modification.index_aa, modification.mass_diff],
            )?;
        }
        Ok(())
    }

    /// Insert a molecule and everything below it.
    pub(super) fn insert_molecule(&mut self, group_id: i64, molecule: DocMolecule) -> Result<()> {
        let conn = self.ctx.conn;
        let molecule_id = insert_returning_id(
            conn,
            "INSERT INTO general_molecule (peptide_group_id, rt_calculator_score, predicted_rt, \
             avg_measured_rt, explicit_rt, note, standard_type, concentration_multiplier, \
             internal_standard_concentration) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                group_id,
                molecule.rt_calculator_score,
                molecule.predicted_rt,
                molecule.avg_measured_rt,
                molecule.explicit_rt,
                molecule.note,
                molecule.standard_type,
                molecule.concentration_multiplier,
                molecule.internal_standard_concentration
            ],
        )?;

        let (peptide, target) = match &molecule.kind {
            MoleculeKind::Peptide(peptide) => {
                let modified_sequence = peptide_modified_sequence(peptide, &molecule.precursors);
                self.insert_peptide(molecule_id, peptide, &modified_sequence)?;
                self.stats.peptides += 1;
                self.stats.targets.insert(modified_sequence.clone());
                (true, modified_sequence)
            }
            MoleculeKind::SmallMolecule(fields) => {
                execute_cached(
                    conn,
                    "INSERT INTO molecule (id, ion_formula, custom_ion_name, mass_monoisotopic, \
                     mass_average, molecule_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        molecule_id,
                        fields.ion_formula,
                        fields.custom_ion_name,
                        fields.mass_monoisotopic,
                        fields.mass_average,
                        fields.molecule_id
                    ],
                )?;
                self.stats.small_molecules += 1;
                self.stats.targets.insert(fields.target_key());
                let target = fields
                    .custom_ion_name
                    .clone()
                    .or_else(|| fields.ion_formula.clone())
                    .unwrap_or_default();
                (false, target)
            }
        };

        self.annotations
            .add(conn, AnnotationKind::GeneralMolecule, molecule_id, &molecule.annotations)?;

        let mut scope = MoleculeScope {
            id: molecule_id,
            peptide,
            target,
            standard_type: molecule.standard_type.clone(),
            results: HashMap::new(),
        };
        let mut results = MoleculeResults::default();

        for chrom_info in &molecule.chrom_infos {
            let (key, sample_file_id) = self
                .ctx
                .replicates
                .resolve(&chrom_info.replicate, &chrom_info.file_id)?;
            if scope.results.contains_key(&key) {
                return Err(ImportError::bad_data(format!(
                    "Multiple molecule results found for {} and sample file {key}",
                    scope.target
                )));
            }
            let result_id = insert_returning_id(
                conn,
                "INSERT INTO general_molecule_chrom_info (general_molecule_id, sample_file_id, \
                 peak_count_ratio, retention_time, exclude_from_calibration) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    molecule_id,
                    sample_file_id,
                    chrom_info.peak_count_ratio,
                    chrom_info.retention_time,
                    chrom_info.exclude_from_calibration
                ],
            )?;
            self.stats.molecule_results += 1;
            self.annotations.add(
                conn,
                AnnotationKind::GeneralMoleculeChromInfo,
                result_id,
                &chrom_info.annotations,
            )?;
            scope.results.insert(key, result_id);
            results.results.insert(sample_file_id, result_id);
        }

        for precursor in molecule.precursors {
            let precursor_results = self.insert_precursor(&scope, precursor)?;
            results.precursors.push(precursor_results);
        }

        let standards = self.ctx.settings.standard_label_ids();
        if !standards.is_empty() {
            let area_ratios = ratios::compute(&results, self.ctx.settings.label_ids(), standards);
            ratios::insert(conn, &area_ratios)?;
            self.stats.area_ratios += area_ratios.len();
        }
        Ok(())
    }
}
