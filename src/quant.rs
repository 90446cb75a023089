//! Quantification output.
//!
//! Fold changes and calibration curves are computed by an external
//! [`Quantifier`] from the rows the import just wrote. The importer only
//! persists what it returns.

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::model::{GroupComparison, QuantificationSettings};
use crate::store::execute_cached;

/// One fold change of a group comparison
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldChangeRow {
    /// Group comparison name
    pub group_comparison: String,
    /// Isotope label the comparison was made on
    pub label_name: Option<String>,
    /// Protein the row summarizes, for per-protein comparisons
    pub peptide_group_id: Option<i64>,
    /// Molecule the row summarizes
    pub general_molecule_id: Option<i64>,
    /// Replicates that contributed
    pub replicate_count: Option<i32>,
    /// log2 of the fold change
    pub log2_fold_change: Option<f64>,
    /// Multiple-testing adjusted p-value
    pub adjusted_p_value: Option<f64>,
    /// Standard error of the estimate
    pub standard_error: Option<f64>,
    /// Degrees of freedom of the test
    pub degrees_of_freedom: Option<i32>,
}

/// A fitted calibration curve of one molecule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationCurveRow {
    /// Molecule the curve belongs to
    pub general_molecule_id: i64,
    /// Linear coefficient
    pub slope: Option<f64>,
    /// Intercept
    pub intercept: Option<f64>,
    /// Quadratic coefficient, for quadratic fits
    pub quadratic_coefficient: Option<f64>,
    /// Points used in the fit
    pub point_count: Option<i32>,
    /// Goodness of fit
    pub r_squared: Option<f64>,
    /// Why the curve could not be fitted
    pub error_message: Option<String>,
}

/// Computes quantification results for an imported run.
///
/// Implementations read the run's rows through `conn`, which is inside the
/// import transaction.
pub trait Quantifier: Send + Sync {
    /// Fold changes for the document's group comparisons.
    fn fold_changes(
        &self,
        conn: &Connection,
        run_id: i64,
        comparisons: &[GroupComparison],
    ) -> Result<Vec<FoldChangeRow>>;

    /// Calibration curves for the run's molecules.
    fn calibration_curves(
        &self,
        conn: &Connection,
        run_id: i64,
        settings: &QuantificationSettings,
    ) -> Result<Vec<CalibrationCurveRow>>;
}

/// Produces no quantification output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuantification;

impl Quantifier for NoQuantification {
    fn fold_changes(&self, _: &Connection, _: i64, _: &[GroupComparison]) -> Result<Vec<FoldChangeRow>> {
        Ok(Vec::new())
    }

    fn calibration_curves(
        &self,
        _: &Connection,
        _: i64,
        _: &QuantificationSettings,
    ) -> Result<Vec<CalibrationCurveRow>> {
        Ok(Vec::new())
    }
}

/// Store fold changes for a run.
pub fn insert_fold_changes(conn: &Connection, run_id: i64, rows: &[FoldChangeRow]) -> Result<usize> {
    for row in rows {
        execute_cached(
            conn,
            "INSERT INTO fold_change (run_id, group_comparison, label_name, peptide_group_id, \
             general_molecule_id, replicate_count, log2_fold_change, adjusted_p_value, standard_error, \
             degrees_of_freedom) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id,
                row.group_comparison,
                row.label_name,
                row.peptide_group_id,
                row.general_molecule_id,
                row.replicate_count,
                row.log2_fold_change,
                row.adjusted_p_value,
                row.standard_error,
                row.degrees_of_freedom
            ],
        )?;
    }
    Ok(rows.len())
}

/// Store calibration curves for a run.
pub fn insert_calibration_curves(conn: &Connection, run_id: i64, rows: &[CalibrationCurveRow]) -> Result<usize> {
    for row in rows {
        execute_cached(
            conn,
            "INSERT INTO calibration_curve (run_id, general_molecule_id, slope, intercept, \
             quadratic_coefficient, point_count, r_squared, error_message) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                row.general_molecule_id,
                row.slope,
                row.intercept,
                row.quadratic_coefficient,
                row.point_count,
                row.r_squared,
                row.error_message
            ],
        )?;
    }
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{collections, count_rows, runs, CollectionType, Database};

    #[test]
    fn test_no_quantification_is_empty() {
        let db = Database::open_in_memory().unwrap();
        let quantifier = NoQuantification;
        assert!(quantifier
            .fold_changes(db.connection(), 1, &[GroupComparison::default()])
            .unwrap()
            .is_empty());
        assert!(quantifier
            .calibration_curves(db.connection(), 1, &QuantificationSettings::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_insert_fold_changes() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let collection = collections::find_or_create(conn, "c", CollectionType::Experiment).unwrap();
        let run_id = runs::create(conn, collection.id, "doc.json").unwrap();

        let rows = vec![
            FoldChangeRow {
                group_comparison: "Treated vs Control".to_string(),
                log2_fold_change: Some(1.5),
                adjusted_p_value: Some(0.01),
                ..Default::default()
            },
            FoldChangeRow {
                group_comparison: "Treated vs Control".to_string(),
                log2_fold_change: Some(-0.3),
                ..Default::default()
            },
        ];
        assert_eq!(insert_fold_changes(conn, run_id, &rows).unwrap(), 2);
        assert_eq!(count_rows(conn, "fold_change").unwrap(), 2);
    }

    #[test]
    fn test_calibration_curve_needs_molecule() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let collection = collections::find_or_create(conn, "c", CollectionType::Experiment).unwrap();
        let run_id = runs::create(conn, collection.id, "doc.json").unwrap();

        let rows = vec![CalibrationCurveRow {
            general_molecule_id: 999,
            slope: Some(1.0),
            ..Default::default()
        }];
        assert!(insert_calibration_curves(conn, run_id, &rows).is_err());
    }
}
