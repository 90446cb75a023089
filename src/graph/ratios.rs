//! Peak area ratios between isotope labels.
//!
//! For every label that is not an internal standard, areas are divided by
//! those of each internal-standard label, per sample file, at transition,
//! precursor and peptide level. A transition pairs with the transition of
//! the same fragment in the standard precursor of the same charge.
//! Precursor and peptide ratios divide the summed areas of the paired
//! transitions; a precursor without transition results falls back to its
//! total area. Ratios with a missing area or a zero denominator are omitted.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::store::execute_cached;

/// Results of one transition that take part in ratios, by sample file id
#[derive(Debug, Clone, Default)]
pub struct TransitionResults {
    /// Fragment identity shared by light and heavy transitions
    pub fragment: String,
    /// Sample file id → (transition result id, area)
    pub results: HashMap<i64, (i64, Option<f64>)>,
}

/// Results of one precursor and its transitions
#[derive(Debug, Clone, Default)]
pub struct PrecursorResults {
    /// Isotope label id
    pub label_id: i64,
    /// Precursor charge
    pub charge: i32,
    /// Sample file id → (precursor result id, total area)
    pub results: HashMap<i64, (i64, Option<f64>)>,
    /// Transitions of the precursor
    pub transitions: Vec<TransitionResults>,
}

/// Results of one molecule and its precursors
#[derive(Debug, Clone, Default)]
pub struct MoleculeResults {
    /// Sample file id → molecule result id
    pub results: HashMap<i64, i64>,
    /// Precursors of the molecule
    pub precursors: Vec<PrecursorResults>,
}

/// A computed ratio between two result rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRatio {
    /// Numerator result row
    pub result_id: i64,
    /// Denominator result row; the molecule result for peptide ratios
    pub standard_result_id: i64,
    /// Numerator label
    pub label_id: i64,
    /// Denominator label
    pub standard_label_id: i64,
    /// Ratio value
    pub ratio: f64,
}

/// Every ratio computed for one molecule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaRatios {
    /// Transition level
    pub transitions: Vec<AreaRatio>,
    /// Precursor level
    pub precursors: Vec<AreaRatio>,
    /// Peptide level; `result_id` and `standard_result_id` are the same
    /// molecule result
    pub peptides: Vec<AreaRatio>,
}

impl AreaRatios {
    /// Total ratios across levels.
    pub fn len(&self) -> usize {
        self.transitions.len() + self.precursors.len() + self.peptides.len()
    }

    /// Whether no ratio could be computed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !numerator.is_finite() || !denominator.is_finite() {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Compute the ratios of one molecule.
pub fn compute(molecule: &MoleculeResults, labels: &[i64], standards: &[i64]) -> AreaRatios {
    let mut out = AreaRatios::default();

    for &standard in standards {
        for &label in labels.iter().filter(|l| **l != standard) {
            // sample file → (numerator sum, denominator sum)
            let mut molecule_sums: HashMap<i64, (f64, f64)> = HashMap::new();

            for precursor in molecule.precursors.iter().filter(|p| p.label_id == label) {
                let Some(standard_precursor) = molecule
                    .precursors
                    .iter()
                    .find(|p| p.label_id == standard && p.charge == precursor.charge)
                else {
                    continue;
                };

                let mut precursor_sums: HashMap<i64, (f64, f64)> = HashMap::new();
                for transition in &precursor.transitions {
                    let Some(standard_transition) = standard_precursor
                        .transitions
                        .iter()
                        .find(|t| t.fragment == transition.fragment)
                    else {
                        continue;
                    };

                    for (sample_file, (result_id, area)) in &transition.results {
                        let Some((standard_id, standard_area)) = standard_transition.results.get(sample_file) else {
                            continue;
                        };
                        let (Some(area), Some(standard_area)) = (area, standard_area) else {
                            continue;
                        };
                        let sums = precursor_sums.entry(*sample_file).or_insert((0.0, 0.0));
                        sums.0 += area;
                        sums.1 += standard_area;
                        if let Some(value) = ratio(*area, *standard_area) {
                            out.transitions.push(AreaRatio {
                                result_id: *result_id,
                                standard_result_id: *standard_id,
                                label_id: label,
                                standard_label_id: standard,
                                ratio: value,
                            });
                        }
                    }
                }

                for (sample_file, (result_id, total_area)) in &precursor.results {
                    let Some((standard_id, standard_total)) = standard_precursor.results.get(sample_file) else {
                        continue;
                    };
                    let sums = match precursor_sums.get(sample_file) {
                        Some(sums) => Some(*sums),
                        None => match (total_area, standard_total) {
                            (Some(a), Some(b)) => Some((*a, *b)),
                            _ => None,
                        },
                    };
                    let Some((numerator, denominator)) = sums else {
                        continue;
                    };
                    let molecule_sum = molecule_sums.entry(*sample_file).or_insert((0.0, 0.0));
                    molecule_sum.0 += numerator;
                    molecule_sum.1 += denominator;
                    if let Some(value) = ratio(numerator, denominator) {
                        out.precursors.push(AreaRatio {
                            result_id: *result_id,
                            standard_result_id: *standard_id,
                            label_id: label,
                            standard_label_id: standard,
                            ratio: value,
                        });
                    }
                }
            }

            let mut sample_files: Vec<_> = molecule_sums.into_iter().collect();
            sample_files.sort_by_key(|(sample_file, _)| *sample_file);
            for (sample_file, (numerator, denominator)) in sample_files {
                let Some(molecule_result) = molecule.results.get(&sample_file) else {
                    continue;
                };
                if let Some(value) = ratio(numerator, denominator) {
                    out.peptides.push(AreaRatio {
                        result_id: *molecule_result,
                        standard_result_id: *molecule_result,
                        label_id: label,
                        standard_label_id: standard,
                        ratio: value,
                    });
                }
            }
        }
    }
    out
}

/// Write the ratios of one molecule.
pub fn insert(conn: &Connection, ratios: &AreaRatios) -> Result<()> {
    for r in &ratios.transitions {
        execute_cached(
            conn,
            "INSERT INTO transition_area_ratio (transition_chrom_info_id, transition_chrom_info_std_id, \
             isotope_label_id, isotope_label_std_id, area_ratio) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![r.result_id, r.standard_result_id, r.label_id, r.standard_label_id, r.ratio],
        )?;
    }
    for r in &ratios.precursors {
        execute_cached(
            conn,
            "INSERT INTO precursor_area_ratio (precursor_chrom_info_id, precursor_chrom_info_std_id, \
             isotope_label_id, isotope_label_std_id, area_ratio) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![r.result_id, r.standard_result_id, r.label_id, r.standard_label_id, r.ratio],
        )?;
    }
    for r in &ratios.peptides {
        execute_cached(
            conn,
            "INSERT INTO peptide_area_ratio (general_molecule_chrom_info_id, isotope_label_id, \
             isotope_label_std_id, area_ratio) VALUES (?1, ?2, ?3, ?4)",
            params![r.result_id, r.label_id, r.standard_label_id, r.ratio],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIGHT: i64 = 1;
    const HEAVY: i64 = 2;
    const FILE: i64 = 100;

    fn transition(fragment: &str, result_id: i64, area: Option<f64>) -> TransitionResults {
        TransitionResults {
            fragment: fragment.to_string(),
            results: HashMap::from([(FILE, (result_id, area))]),
        }
    }

    fn precursor(label_id: i64, result_id: i64, transitions: Vec<TransitionResults>) -> PrecursorResults {
        PrecursorResults {
            label_id,
            charge: 2,
            results: HashMap::from([(FILE, (result_id, Some(1.0)))]),
            transitions,
        }
    }

    #[test]
    fn test_ratios_at_every_level() {
        let molecule = MoleculeResults {
            results: HashMap::from([(FILE, 50)]),
            precursors: vec![
                precursor(
                    LIGHT,
                    10,
                    vec![transition("y5+1", 20, Some(100.0)), transition("y6+1", 21, Some(300.0))],
                ),
                precursor(
                    HEAVY,
                    11,
                    vec![transition("y5+1", 30, Some(200.0)), transition("y6+1", 31, Some(200.0))],
                ),
            ],
        };

        let ratios = compute(&molecule, &[LIGHT, HEAVY], &[HEAVY]);
        assert_eq!(ratios.transitions.len(), 2);
        let y5 = ratios.transitions.iter().find(|r| r.result_id == 20).unwrap();
        assert_eq!(y5.standard_result_id, 30);
        assert!((y5.ratio - 0.5).abs() < 1e-12);

        assert_eq!(ratios.precursors.len(), 1);
        assert_eq!(ratios.precursors[0].result_id, 10);
        assert_eq!(ratios.precursors[0].standard_result_id, 11);
        assert!((ratios.precursors[0].ratio - 1.0).abs() < 1e-12);

        assert_eq!(ratios.peptides.len(), 1);
        assert_eq!(ratios.peptides[0].result_id, 50);
        assert_eq!(ratios.peptides[0].label_id, LIGHT);
        assert_eq!(ratios.peptides[0].standard_label_id, HEAVY);
    }

    #[test]
    fn test_uncomputable_ratios_omitted() {
        let molecule = MoleculeResults {
            results: HashMap::from([(FILE, 50)]),
            precursors: vec![
                precursor(LIGHT, 10, vec![transition("y5+1", 20, Some(100.0))]),
                precursor(HEAVY, 11, vec![transition("y5+1", 30, Some(0.0))]),
            ],
        };
        let ratios = compute(&molecule, &[LIGHT, HEAVY], &[HEAVY]);
        assert!(ratios.is_empty());

        // No standard label declared
        assert!(compute(&molecule, &[LIGHT, HEAVY], &[]).is_empty());
    }

    #[test]
    fn test_precursor_total_area_fallback() {
        let mut light = precursor(LIGHT, 10, vec![]);
        light.results.insert(FILE, (10, Some(30.0)));
        let mut heavy = precursor(HEAVY, 11, vec![]);
        heavy.results.insert(FILE, (11, Some(60.0)));

        let molecule = MoleculeResults {
            results: HashMap::new(),
            precursors: vec![light, heavy],
        };
        let ratios = compute(&molecule, &[LIGHT, HEAVY], &[HEAVY]);
        assert!(ratios.transitions.is_empty());
        assert_eq!(ratios.precursors.len(), 1);
        assert!((ratios.precursors[0].ratio - 0.5).abs() < 1e-12);
        // No molecule result to attach a peptide ratio to
        assert!(ratios.peptides.is_empty());
    }
}
