//! QC collection target consistency.
//!
//! Every document imported into a QC collection must target the same
//! peptides and small molecules. The targets of the collection are read
//! before the new document writes any entity rows.

use std::collections::BTreeSet;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{ImportError, Result};
use crate::store::RunStatus;

/// Names listed per side in a mismatch message
const MAX_LISTED: usize = 10;

/// Targets of the latest successful run in the collection, other than
/// `run_id`. `None` when the collection has no such run.
pub(crate) fn collection_targets(conn: &Connection, collection_id: i64, run_id: i64) -> Result<Option<BTreeSet<String>>> {
    let previous: Option<i64> = conn
        .prepare_cached(
            "SELECT id FROM run WHERE collection_id = ?1 AND id <> ?2 AND status = ?3 \
             ORDER BY id DESC LIMIT 1",
        )?
        .query_row(
            rusqlite::params![collection_id, run_id, RunStatus::Success.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    let Some(previous) = previous else {
        return Ok(None);
    };

    let mut targets = BTreeSet::new();
    let mut peptides = conn.prepare_cached(
        "SELECT p.peptide_modified_sequence FROM peptide p JOIN general_molecule gm ON p.id = gm.id \
         JOIN peptide_group pg ON gm.peptide_group_id = pg.id WHERE pg.run_id = ?1",
    )?;
    for sequence in peptides.query_map([previous], |row| row.get::<_, String>(0))? {
        targets.insert(sequence?);
    }
    let mut molecules = conn.prepare_cached(
        "SELECT COALESCE(m.custom_ion_name, '') || '|' || COALESCE(m.ion_formula, '') \
         FROM molecule m JOIN general_molecule gm ON m.id = gm.id \
         JOIN peptide_group pg ON gm.peptide_group_id = pg.id WHERE pg.run_id = ?1",
    )?;
    for key in molecules.query_map([previous], |row| row.get::<_, String>(0))? {
        targets.insert(key?);
    }
    Ok(Some(targets))
}

fn listing<'a>(names: impl Iterator<Item = &'a String>) -> String {
    let names: Vec<&str> = names.map(String::as_str).collect();
    let mut text = names.iter().take(MAX_LISTED).copied().collect::<Vec<_>>().join(", ");
    if names.len() > MAX_LISTED {
        text.push_str(&format!(" and {} more", names.len() - MAX_LISTED));
    }
    text
}

/// Fail unless the document targets exactly what the collection does.
pub(crate) fn check_targets(existing: &BTreeSet<String>, imported: &BTreeSet<String>) -> Result<()> {
    if existing == imported {
        return Ok(());
    }
    let mut message = String::from(
        "QC collections require every document to contain the same peptides and molecules.",
    );
    let missing: Vec<_> = existing.difference(imported).collect();
    if !missing.is_empty() {
        message.push_str(&format!(" Missing from this document: {}.", listing(missing.into_iter())));
    }
    let added: Vec<_> = imported.difference(existing).collect();
    if !added.is_empty() {
        message.push_str(&format!(" Not in the collection: {}.", listing(added.into_iter())));
    }
    Err(ImportError::bad_data(message))
}
