//! Modification catalog import.
//!
//! Structural and isotope modifications are shared across runs: a
//! document's modification reuses an existing row when every value matches,
//! including (for structural modifications) the full potential-loss list.

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::model::{IsotopeModification, PotentialLoss, StructuralModification};
use crate::store::insert_returning_id;

/// Stored id of a structural modification and its losses in declared order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralModInfo {
    /// structural_modification row id
    pub id: i64,
    /// structural_mod_loss row ids, indexed by loss index
    pub loss_ids: Vec<i64>,
}

fn stored_losses(conn: &Connection, mod_id: i64) -> Result<Vec<(i64, PotentialLoss)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, formula, mass_diff_mono, mass_diff_avg, inclusion FROM structural_mod_loss \
         WHERE structural_mod_id = ?1 ORDER BY loss_index",
    )?;
    let rows = stmt.query_map([mod_id], |row| {
        Ok((
            row.get(0)?,
            PotentialLoss {
                formula: row.get(1)?,
                mass_diff_mono: row.get(2)?,
                mass_diff_avg: row.get(3)?,
                inclusion: row.get(4)?,
            },
        ))
    })?;

    let mut losses = Vec::new();
    for row in rows {
        losses.push(row?);
    }
    Ok(losses)
}

/// Find a stored structural modification equal to `modification`.
pub fn find_structural(conn: &Connection, modification: &StructuralModification) -> Result<Option<StructuralModInfo>> {
    let candidates: Vec<i64> = {
        let mut stmt = conn.prepare_cached(
            "SELECT id FROM structural_modification WHERE name = ?1 AND amino_acid IS ?2 \
             AND terminus IS ?3 AND formula IS ?4 AND mass_diff_mono IS ?5 \
             AND mass_diff_avg IS ?6 AND unimod_id IS ?7 ORDER BY id",
        )?;
        let rows = stmt.query_map(
            params![
                modification.name,
                modification.amino_acid,
                modification.terminus,
                modification.formula,
                modification.mass_diff_mono,
                modification.mass_diff_avg,
                modification.unimod_id
            ],
            |row| row.get(0),
        )?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    for id in candidates {
        let losses = stored_losses(conn, id)?;
        let same_losses = losses.len() == modification.losses.len()
            && losses
                .iter()
                .zip(&modification.losses)
                .all(|((_, stored), declared)| stored == declared);
        if same_losses {
            return Ok(Some(StructuralModInfo {
                id,
                loss_ids: losses.into_iter().map(|(loss_id, _)| loss_id).collect(),
            }));
        }
    }
    Ok(None)
}

/// Insert a structural modification and its losses.
pub fn insert_structural(conn: &Connection, modification: &StructuralModification) -> Result<StructuralModInfo> {
    let id = insert_returning_id(
        conn,
        "INSERT INTO structural_modification (name, amino_acid, terminus, formula, mass_diff_mono, \
         mass_diff_avg, unimod_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            modification.name,
            modification.amino_acid,
            modification.terminus,
            modification.formula,
            modification.mass_diff_mono,
            modification.mass_diff_avg,
            modification.unimod_id
        ],
    )?;

    let mut loss_ids = Vec::with_capacity(modification.losses.len());
    for (index, loss) in modification.losses.iter().enumerate() {
        loss_ids.push(insert_returning_id(
            conn,
            "INSERT INTO structural_mod_loss (structural_mod_id, loss_index, formula, mass_diff_mono, \
             mass_diff_avg, inclusion) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                index as i64,
                loss.formula,
                loss.mass_diff_mono,
                loss.mass_diff_avg,
                loss.inclusion
            ],
        )?);
    }

    Ok(StructuralModInfo { id, loss_ids })
}

/// Reuse or insert an isotope modification.
pub fn resolve_isotope(conn: &Connection, modification: &IsotopeModification) -> Result<i64> {
    let existing: Option<i64> = {
        let mut stmt = conn.prepare_cached(
            "SELECT id FROM isotope_modification WHERE name = ?1 AND amino_acid IS ?2 \
             AND terminus IS ?3 AND formula IS ?4 AND mass_diff_mono IS ?5 AND mass_diff_avg IS ?6 \
             AND label13c = ?7 AND label15n = ?8 AND label18o = ?9 AND label2h = ?10 \
             AND unimod_id IS ?11 ORDER BY id LIMIT 1",
        )?;
        let mut rows = stmt.query(params![
            modification.name,
            modification.amino_acid,
            modification.terminus,
            modification.formula,
            modification.mass_diff_mono,
            modification.mass_diff_avg,
            modification.label13c,
            modification.label15n,
            modification.label18o,
            modification.label2h,
            modification.unimod_id
        ])?;
        match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        }
    };

    if let Some(id) = existing {
        return Ok(id);
    }

    insert_returning_id(
        conn,
        "INSERT INTO isotope_modification (name, amino_acid, terminus, formula, mass_diff_mono, \
         mass_diff_avg, label13c, label15n, label18o, label2h, unimod_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            modification.name,
            modification.amino_acid,
            modification.terminus,
            modification.formula,
            modification.mass_diff_mono,
            modification.mass_diff_avg,
            modification.label13c,
            modification.label15n,
            modification.label18o,
            modification.label2h,
            modification.unimod_id
        ],
    )
}
