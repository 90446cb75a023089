//! Staging table for chromatogram indexes.
//!
//! When transition-level results are not stored, each precursor result
//! carries an index into the binary chromatogram store instead. The indexes
//! are staged here during the import and copied onto the precursor results
//! in one statement at the end.

use rusqlite::{params, Connection};

use crate::error::Result;

const TABLE: &str = "precursor_chrom_index_scratch";

const CREATE_SQL: &str = "CREATE TEMP TABLE precursor_chrom_index_scratch (
    precursor_chrom_info_id INTEGER PRIMARY KEY,
    chromatogram_index BLOB NOT NULL
)";

const INSERT_SQL: &str = "INSERT INTO temp.precursor_chrom_index_scratch \
    (precursor_chrom_info_id, chromatogram_index) VALUES (?1, ?2)";

const BACKFILL_SQL: &str = "UPDATE precursor_chrom_info SET chromatogram_index = (
    SELECT s.chromatogram_index FROM temp.precursor_chrom_index_scratch s
    WHERE s.precursor_chrom_info_id = precursor_chrom_info.id
) WHERE id IN (SELECT precursor_chrom_info_id FROM temp.precursor_chrom_index_scratch)";

/// Handle to the staging table of the current import.
///
/// The table is created inside the import transaction, so a rollback
/// removes it; the success path drops it in [`ChromIndexScratch::backfill`].
#[derive(Debug)]
pub(crate) struct ChromIndexScratch {
    staged: usize,
}

impl ChromIndexScratch {
    pub(crate) fn create(conn: &Connection) -> Result<Self> {
        conn.execute(CREATE_SQL, [])?;
        Ok(Self { staged: 0 })
    }

    pub(crate) fn stage(&mut self, conn: &Connection, precursor_chrom_info_id: i64, index: &[u8]) -> Result<()> {
        conn.prepare_cached(INSERT_SQL)?
            .execute(params![precursor_chrom_info_id, index])?;
        self.staged += 1;
        Ok(())
    }

    /// Copy staged indexes onto their precursor results and drop the table.
    pub(crate) fn backfill(self, conn: &Connection) -> Result<usize> {
        let updated = conn.execute(BACKFILL_SQL, [])?;
        // Cached statements against the table must not outlive it
        conn.flush_prepared_statement_cache();
        conn.execute_batch(&format!("DROP TABLE temp.{TABLE}"))?;
        log::debug!(
            "Backfilled {} of {} staged chromatogram indexes",
            updated,
            self.staged
        );
        Ok(updated)
    }
}

/// Whether the staging table currently exists on this connection.
pub(crate) fn exists(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_temp_master WHERE type = 'table' AND name = ?1",
        [TABLE],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    #[test]
    fn test_scratch_rolled_back_with_transaction() {
        let mut db = Database::open_in_memory().unwrap();
        {
            let tx = db.connection_mut().transaction().unwrap();
            let mut scratch = ChromIndexScratch::create(&tx).unwrap();
            scratch.stage(&tx, 1, &[1, 2, 3]).unwrap();
            assert!(exists(&tx).unwrap());
            // dropped without commit
        }
        assert!(!exists(db.connection()).unwrap());
    }

    #[test]
    fn test_backfill_drops_table() {
        let mut db = Database::open_in_memory().unwrap();
        let tx = db.connection_mut().transaction().unwrap();
        let scratch = ChromIndexScratch::create(&tx).unwrap();
        assert_eq!(scratch.backfill(&tx).unwrap(), 0);
        assert!(!exists(&tx).unwrap());
        tx.commit().unwrap();
    }
}
