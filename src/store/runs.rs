use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ImportError, Result};
use crate::model::{DocumentCounts, DocumentInfo};

use super::{execute_cached, insert_returning_id, RunRepresentativeState};

/// Import status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Import in progress (or never finished)
    Running,
    /// Import committed
    Success,
    /// Import rolled back
    Failed,
}

impl RunStatus {
    /// Stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "Running",
            RunStatus::Success => "Success",
            RunStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Running" => Ok(RunStatus::Running),
            "Success" => Ok(RunStatus::Success),
            "Failed" => Ok(RunStatus::Failed),
            other => Err(ImportError::Parse(format!("unknown run status '{other}'"))),
        }
    }
}

/// A stored run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Row id
    pub id: i64,
    /// Owning collection
    pub collection_id: i64,
    /// Source document path
    pub file_name: String,
    /// Import status
    pub status: RunStatus,
    /// Failure or completion message
    pub status_message: Option<String>,
    /// Document GUID
    pub document_guid: Option<String>,
    /// Size of the source document in bytes
    pub document_size: Option<i64>,
    /// Entity totals, present only after a successful import
    pub counts: Option<RunCounts>,
}

/// Summary counts written when an import succeeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Peptide groups
    pub peptide_groups: i64,
    /// Peptides
    pub peptides: i64,
    /// Small molecules
    pub small_molecules: i64,
    /// Precursors
    pub precursors: i64,
    /// Transitions
    pub transitions: i64,
    /// Replicates
    pub replicates: i64,
    /// Calibration curves
    pub calibration_curves: i64,
}

impl From<&DocumentCounts> for RunCounts {
    fn from(counts: &DocumentCounts) -> Self {
        Self {
            peptide_groups: counts.peptide_groups as i64,
            peptides: counts.peptides as i64,
            small_molecules: counts.small_molecules as i64,
            precursors: counts.precursors as i64,
            transitions: counts.transitions as i64,
            replicates: counts.replicates as i64,
            calibration_curves: counts.calibration_curves as i64,
        }
    }
}

/// Insert a new run in the Running state.
pub fn create(conn: &Connection, collection_id: i64, file_name: &str) -> Result<i64> {
    insert_returning_id(
        conn,
        "INSERT INTO run (collection_id, file_name, status, created) VALUES (?1, ?2, ?3, ?4)",
        params![
            collection_id,
            file_name,
            RunStatus::Running.as_str(),
            Utc::now().to_rfc3339()
        ],
    )
}

/// The most recent run of `file_name` in a collection that has not failed.
pub fn find_active(conn: &Connection, collection_id: i64, file_name: &str) -> Result<Option<i64>> {
    Ok(conn
        .prepare_cached(
            "SELECT id FROM run WHERE collection_id = ?1 AND file_name = ?2 AND status <> ?3 \
             ORDER BY id DESC LIMIT 1",
        )?
        .query_row(
            params![collection_id, file_name, RunStatus::Failed.as_str()],
            |row| row.get(0),
        )
        .optional()?)
}

/// Load a run.
pub fn get(conn: &Connection, id: i64) -> Result<Option<RunRecord>> {
    let row = conn
        .prepare_cached(
            "SELECT id, collection_id, file_name, status, status_message, document_guid, document_size, \
             peptide_group_count, peptide_count, small_molecule_count, precursor_count, \
             transition_count, replicate_count, calibration_curve_count FROM run WHERE id = ?1",
        )?
        .query_row([id], |row| {
            let peptide_groups: Option<i64> = row.get(7)?;
            let counts = match peptide_groups {
                Some(peptide_groups) => Some(RunCounts {
                    peptide_groups,
                    peptides: row.get(8)?,
                    small_molecules: row.get(9)?,
                    precursors: row.get(10)?,
                    transitions: row.get(11)?,
                    replicates: row.get(12)?,
                    calibration_curves: row.get(13)?,
                }),
                None => None,
            };
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<i64>>(6)?,
                counts,
            ))
        })
        .optional()?;

    row.map(
        |(id, collection_id, file_name, status, status_message, document_guid, document_size, counts)| {
            Ok(RunRecord {
                id,
                collection_id,
                file_name,
                status: status.parse()?,
                status_message,
                document_guid,
                document_size,
                counts,
            })
        },
    )
    .transpose()
}

/// Set the status and message of a run.
pub fn set_status(conn: &Connection, id: i64, status: RunStatus, message: Option<&str>) -> Result<()> {
    execute_cached(
        conn,
        "UPDATE run SET status = ?1, status_message = ?2, modified = ?3 WHERE id = ?4",
        params![status.as_str(), message, Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

/// Record the document GUID, versions and size.
pub fn set_document_stamp(conn: &Connection, id: i64, info: &DocumentInfo, size: Option<i64>) -> Result<()> {
    execute_cached(
        conn,
        "UPDATE run SET document_guid = ?1, format_version = ?2, software_version = ?3, \
         document_size = ?4 WHERE id = ?5",
        params![
            info.guid,
            info.format_version,
            info.software_version,
            size,
            id
        ],
    )?;
    Ok(())
}

/// Attach the run to its iRT scale.
pub fn set_irt_scale(conn: &Connection, id: i64, scale_id: i64) -> Result<()> {
    execute_cached(conn, "UPDATE run SET irt_scale_id = ?1 WHERE id = ?2", params![scale_id, id])?;
    Ok(())
}

/// Record which kind of representative data the run contributes.
pub fn set_representative_state(conn: &Connection, id: i64, state: RunRepresentativeState) -> Result<()> {
    execute_cached(
        conn,
        "UPDATE run SET representative_data_state = ?1 WHERE id = ?2",
        params![state as i64, id],
    )?;
    Ok(())
}

/// Write the summary counts.
pub fn set_counts(conn: &Connection, id: i64, counts: &RunCounts) -> Result<()> {
    execute_cached(
        conn,
        "UPDATE run SET peptide_group_count = ?1, peptide_count = ?2, small_molecule_count = ?3, \
         precursor_count = ?4, transition_count = ?5, replicate_count = ?6, \
         calibration_curve_count = ?7 WHERE id = ?8",
        params![
            counts.peptide_groups,
            counts.peptides,
            counts.small_molecules,
            counts.precursors,
            counts.transitions,
            counts.replicates,
            counts.calibration_curves,
            id
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{collections, CollectionType, Database};

    #[test]
    fn test_run_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let collection = collections::find_or_create(conn, "c", CollectionType::Experiment).unwrap();

        let id = create(conn, collection.id, "doc.json").unwrap();
        let run = get(conn, id).unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.counts.is_none());
        assert_eq!(find_active(conn, collection.id, "doc.json").unwrap(), Some(id));

        let counts = RunCounts {
            peptide_groups: 2,
            peptides: 3,
            ..Default::default()
        };
        set_counts(conn, id, &counts).unwrap();
        set_status(conn, id, RunStatus::Success, None).unwrap();
        let run = get(conn, id).unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Success);
        assert_eq!(run.counts, Some(counts));
    }

    #[test]
    fn test_failed_runs_are_not_active() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let collection = collections::find_or_create(conn, "c", CollectionType::Experiment).unwrap();

        let id = create(conn, collection.id, "doc.json").unwrap();
        set_status(conn, id, RunStatus::Failed, Some("boom")).unwrap();
        assert_eq!(find_active(conn, collection.id, "doc.json").unwrap(), None);
        assert_eq!(
            get(conn, id).unwrap().unwrap().status_message.as_deref(),
            Some("boom")
        );
    }
}
