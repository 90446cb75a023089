//! # iRT calibration
//!
//! Reconciles a document's iRT peptides with the scale already stored for
//! its collection.
//!
//! A scale holds two kinds of entries: *standards*, the reference peptides
//! that define the coordinate system and never change once written, and
//! *library* peptides whose value is a running average over every import
//! that observed them. Imported values are first mapped onto the stored
//! scale with a regression fitted on the peptides both sides share.

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ImportError, Result};
use crate::model::IrtPeptide;
use crate::store::{execute_cached, insert_returning_id, runs, Collection};

/// Linear map from imported iRT values onto a stored scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrtRegression {
    /// Slope
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
}

impl IrtRegression {
    /// Pure offset through one shared point.
    pub fn offset(imported: f64, stored: f64) -> Self {
        Self {
            slope: 1.0,
            intercept: stored - imported,
        }
    }

    /// Least-squares line through `(imported, stored)` pairs.
    ///
    /// Returns `None` for fewer than two points or when the imported values
    /// do not vary.
    pub fn least_squares(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (x, y) in points {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }
        if sxx.abs() < f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Map an imported value onto the stored scale.
    pub fn apply(&self, value: f64) -> f64 {
        self.slope * value + self.intercept
    }
}

/// What a reconciliation did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrtOutcome {
    /// Scale the run is attached to
    pub scale_id: i64,
    /// Whether the scale was created by this import
    pub new_scale: bool,
    /// Entries inserted
    pub inserted: usize,
    /// Library entries re-averaged
    pub updated: usize,
    /// Imported standards left untouched
    pub skipped_standards: usize,
    /// Regression applied to the imported values, if merged
    pub regression: Option<IrtRegression>,
}

impl fmt::Display for IrtOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iRT scale {}{}: {} inserted, {} updated, {} standards skipped",
            self.scale_id,
            if self.new_scale { " (new)" } else { "" },
            self.inserted,
            self.updated,
            self.skipped_standards
        )?;
        if let Some(regression) = &self.regression {
            write!(
                f,
                ", slope {:.4} intercept {:.4}",
                regression.slope, regression.intercept
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredIrtPeptide {
    id: i64,
    modified_sequence: String,
    irt_standard: bool,
    irt_value: f64,
    import_count: i64,
}

#[derive(Debug)]
struct LibraryEntry {
    id: Option<i64>,
    value: f64,
    count: i64,
    time_source: Option<i32>,
    dirty: bool,
}

fn latest_scale(conn: &Connection, collection_id: i64) -> Result<Option<i64>> {
    Ok(conn
        .prepare_cached("SELECT id FROM irt_scale WHERE collection_id = ?1 ORDER BY id DESC LIMIT 1")?
        .query_row([collection_id], |row| row.get(0))
        .optional()?)
}

fn stored_peptides(conn: &Connection, scale_id: i64) -> Result<Vec<StoredIrtPeptide>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, modified_sequence, irt_standard, irt_value, import_count FROM irt_peptide \
         WHERE irt_scale_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([scale_id], |row| {
        Ok(StoredIrtPeptide {
            id: row.get(0)?,
            modified_sequence: row.get(1)?,
            irt_standard: row.get(2)?,
            irt_value: row.get(3)?,
            import_count: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

fn insert_peptide(
    conn: &Connection,
    scale_id: i64,
    sequence: &str,
    standard: bool,
    value: f64,
    count: i64,
    time_source: Option<i32>,
) -> Result<i64> {
    insert_returning_id(
        conn,
        "INSERT INTO irt_peptide (irt_scale_id, modified_sequence, irt_standard, irt_value, \
         import_count, time_source) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![scale_id, sequence, standard, value, count, time_source],
    )
}

/// Fit the map from imported values onto the stored scale.
fn fit_regression(
    standards: &[StoredIrtPeptide],
    library: &HashMap<String, LibraryEntry>,
    imported: &[IrtPeptide],
    min_library_anchors: usize,
) -> Result<IrtRegression> {
    let imported_values: HashMap<&str, f64> = imported
        .iter()
        .map(|p| (p.modified_sequence.as_str(), p.irt_value))
        .collect();

    let standard_points: Vec<(f64, f64)> = standards
        .iter()
        .filter_map(|s| {
            imported_values
                .get(s.modified_sequence.as_str())
                .map(|x| (*x, s.irt_value))
        })
        .collect();

    let regression = match standard_points.len() {
        0 => {
            let library_points: Vec<(f64, f64)> = library
                .iter()
                .filter_map(|(sequence, entry)| {
                    imported_values
                        .get(sequence.as_str())
                        .map(|x| (*x, entry.value))
                })
                .collect();
            if library_points.len() >= min_library_anchors.max(2) {
                IrtRegression::least_squares(&library_points)
            } else {
                None
            }
        }
        1 => Some(IrtRegression::offset(standard_points[0].0, standard_points[0].1)),
        _ => IrtRegression::least_squares(&standard_points),
    };

    regression.ok_or_else(|| {
        let listing: Vec<String> = standards
            .iter()
            .map(|s| match imported_values.get(s.modified_sequence.as_str()) {
                Some(value) => format!("{} ({}; imported {})", s.modified_sequence, s.irt_value, value),
                None => format!("{} ({}; not in document)", s.modified_sequence, s.irt_value),
            })
            .collect();
        ImportError::bad_data(format!(
            "Unable to calibrate iRT values against the existing scale: the document shares \
             {} standard peptides with it. Standards: {}",
            standard_points.len(),
            if listing.is_empty() {
                "none".to_string()
            } else {
                listing.join(", ")
            }
        ))
    })
}

/// Reconcile `imported` with the collection's scale and attach the run to it.
///
/// Returns `None` when the document has no iRT peptides.
pub fn reconcile(
    conn: &Connection,
    run_id: i64,
    collection: &Collection,
    imported: &mut [IrtPeptide],
    min_library_anchors: usize,
) -> Result<Option<IrtOutcome>> {
    if imported.is_empty() {
        return Ok(None);
    }

    let existing = if collection.collection_type.creates_scale_per_run() {
        None
    } else {
        latest_scale(conn, collection.id)?
    };

    let outcome = match existing {
        None => create_scale(conn, collection.id, imported)?,
        Some(scale_id) => merge_into(conn, scale_id, imported, min_library_anchors)?,
    };
    runs::set_irt_scale(conn, run_id, outcome.scale_id)?;

    log::info!(target: "targetedms::job", "{}", outcome);
    Ok(Some(outcome))
}

fn create_scale(conn: &Connection, collection_id: i64, imported: &[IrtPeptide]) -> Result<IrtOutcome> {
    let scale_id = insert_returning_id(
        conn,
        "INSERT INTO irt_scale (collection_id, created) VALUES (?1, ?2)",
        params![collection_id, Utc::now().to_rfc3339()],
    )?;
    for peptide in imported {
        insert_peptide(
            conn,
            scale_id,
            &peptide.modified_sequence,
            peptide.irt_standard,
            peptide.irt_value,
            1,
            peptide.time_source,
        )?;
    }
    Ok(IrtOutcome {
        scale_id,
        new_scale: true,
        inserted: imported.len(),
        ..Default::default()
    })
}

fn merge_into(
    conn: &Connection,
    scale_id: i64,
    imported: &mut [IrtPeptide],
    min_library_anchors: usize,
) -> Result<IrtOutcome> {
    let (standards, stored_library): (Vec<_>, Vec<_>) = stored_peptides(conn, scale_id)?
        .into_iter()
        .partition(|p| p.irt_standard);

    let mut library: HashMap<String, LibraryEntry> = stored_library
        .into_iter()
        .map(|p| {
            (
                p.modified_sequence,
                LibraryEntry {
                    id: Some(p.id),
                    value: p.irt_value,
                    count: p.import_count,
                    time_source: None,
                    dirty: false,
                },
            )
        })
        .collect();

    let regression = fit_regression(&standards, &library, imported, min_library_anchors)?;
    for peptide in imported.iter_mut() {
        peptide.irt_value = regression.apply(peptide.irt_value);
    }

    let mut outcome = IrtOutcome {
        scale_id,
        regression: Some(regression),
        ..Default::default()
    };
    let mut new_order: Vec<String> = Vec::new();

    for peptide in imported.iter() {
        if standards
            .iter()
            .any(|s| s.modified_sequence == peptide.modified_sequence)
        {
            outcome.skipped_standards += 1;
            continue;
        }
        match library.get_mut(&peptide.modified_sequence) {
            Some(entry) => {
                entry.value = (entry.value * entry.count as f64 + peptide.irt_value) / (entry.count + 1) as f64;
                entry.count += 1;
                entry.dirty = true;
            }
            None => {
                new_order.push(peptide.modified_sequence.clone());
                library.insert(
                    peptide.modified_sequence.clone(),
                    LibraryEntry {
                        id: None,
                        value: peptide.irt_value,
                        count: 1,
                        time_source: peptide.time_source,
                        dirty: true,
                    },
                );
            }
        }
    }

    for (sequence, entry) in &library {
        if let (Some(id), true) = (entry.id, entry.dirty) {
            execute_cached(
                conn,
                "UPDATE irt_peptide SET irt_value = ?1, import_count = ?2 WHERE id = ?3",
                params![entry.value, entry.count, id],
            )?;
            outcome.updated += 1;
            log::trace!("iRT {} re-averaged to {:.3}", sequence, entry.value);
        }
    }
    for sequence in &new_order {
        if let Some(entry) = library.get(sequence) {
            insert_peptide(conn, scale_id, sequence, false, entry.value, entry.count, entry.time_source)?;
            outcome.inserted += 1;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::{collections, CollectionType, Database};

    fn peptide(sequence: &str, value: f64, standard: bool) -> IrtPeptide {
        IrtPeptide {
            modified_sequence: sequence.to_string(),
            irt_value: value,
            irt_standard: standard,
            time_source: None,
        }
    }

    fn stored(conn: &Connection, sequence: &str) -> (f64, i64, bool) {
        conn.query_row(
            "SELECT irt_value, import_count, irt_standard FROM irt_peptide WHERE modified_sequence = ?1",
            [sequence],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap()
    }

    fn library_run(conn: &Connection) -> (Collection, i64) {
        let collection = collections::find_or_create(conn, "lib", CollectionType::PeptideLibrary).unwrap();
        let run_id = runs::create(conn, collection.id, "doc.json").unwrap();
        (collection, run_id)
    }

    #[test]
    fn test_regression_fits() {
        let offset = IrtRegression::offset(10.0, 12.5);
        assert_eq!(offset.apply(20.0), 22.5);

        let line = IrtRegression::least_squares(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);

        assert!(IrtRegression::least_squares(&[(1.0, 1.0)]).is_none());
        assert!(IrtRegression::least_squares(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
    }

    #[test]
    fn test_no_peptides_no_scale() {
        let db = Database::open_in_memory().unwrap();
        let (collection, run_id) = library_run(db.connection());
        assert!(reconcile(db.connection(), run_id, &collection, &mut [], 3)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_library_entry_reaveraged() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();

        let (collection, first_run) = library_run(conn);
        let mut first = vec![peptide("S", 10.0, true), peptide("L", 20.0, false)];
        let outcome = reconcile(conn, first_run, &collection, &mut first, 3).unwrap().unwrap();
        assert!(outcome.new_scale);
        assert_eq!(outcome.inserted, 2);

        let second_run = runs::create(conn, collection.id, "doc2.json").unwrap();
        let mut second = vec![peptide("S", 10.0, false), peptide("L", 22.0, false)];
        let outcome = reconcile(conn, second_run, &collection, &mut second, 3).unwrap().unwrap();
        assert!(!outcome.new_scale);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.skipped_standards, 1);

        assert_eq!(stored(conn, "S"), (10.0, 1, true));
        let (value, count, standard) = stored(conn, "L");
        assert!((value - 21.0).abs() < 1e-9);
        assert_eq!(count, 2);
        assert!(!standard);
    }

    #[test]
    fn test_imported_values_mapped_onto_scale() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();

        let (collection, first_run) = library_run(conn);
        let mut first = vec![peptide("S1", 0.0, true), peptide("S2", 100.0, true)];
        reconcile(conn, first_run, &collection, &mut first, 3).unwrap();

        // Imported on a scale twice as wide, shifted by 10
        let second_run = runs::create(conn, collection.id, "doc2.json").unwrap();
        let mut second = vec![
            peptide("S1", 10.0, true),
            peptide("S2", 210.0, true),
            peptide("NEW", 110.0, true),
        ];
        let outcome = reconcile(conn, second_run, &collection, &mut second, 3).unwrap().unwrap();
        assert_eq!(outcome.inserted, 1);

        let (value, count, standard) = stored(conn, "NEW");
        assert!((value - 50.0).abs() < 1e-9);
        assert_eq!(count, 1);
        assert!(!standard, "merged peptides are never standards");
    }

    #[test]
    fn test_no_overlap_fails_with_listing() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();

        let (collection, first_run) = library_run(conn);
        let mut first = vec![peptide("STANDARD", 10.0, true)];
        reconcile(conn, first_run, &collection, &mut first, 3).unwrap();

        let second_run = runs::create(conn, collection.id, "doc2.json").unwrap();
        let mut second = vec![peptide("OTHER", 5.0, false)];
        let err = reconcile(conn, second_run, &collection, &mut second, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadData);
        assert!(err.to_string().contains("STANDARD (10; not in document)"));
    }

    #[test]
    fn test_qc_collection_scale_per_run() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let collection = collections::find_or_create(conn, "qc", CollectionType::QualityControl).unwrap();

        let mut scales = Vec::new();
        for file in ["a.json", "b.json"] {
            let run_id = runs::create(conn, collection.id, file).unwrap();
            let mut peptides = vec![peptide("S", 10.0, true)];
            let outcome = reconcile(conn, run_id, &collection, &mut peptides, 3).unwrap().unwrap();
            assert!(outcome.new_scale);
            scales.push(outcome.scale_id);
        }
        assert_ne!(scales[0], scales[1]);
    }
}
