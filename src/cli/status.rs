use anyhow::{Context, Result};
use std::path::PathBuf;

use targetedms_import::store::{collections, runs, Database};

/// Print the status of a run
pub fn run(db: PathBuf, run_id: i64) -> Result<()> {
    if !db.exists() {
        anyhow::bail!("Database does not exist: {}", db.display());
    }
    let db = Database::open(&db).with_context(|| format!("Failed to open database {}", db.display()))?;
    let conn = db.connection();

    let Some(run) = runs::get(conn, run_id)? else {
        anyhow::bail!("No run with id {run_id}");
    };
    let collection = collections::get(conn, run.collection_id)?
        .with_context(|| format!("Collection {} of run {} is missing", run.collection_id, run_id))?;

    println!("Run {}", run.id);
    println!("=======");
    println!("Document: {}", run.file_name);
    println!("Collection: {} ({})", collection.name, collection.collection_type);
    println!("Status: {}", run.status);
    if let Some(message) = &run.status_message {
        println!("Message: {message}");
    }
    if let Some(guid) = &run.document_guid {
        println!("Document GUID: {guid}");
    }
    if let Some(size) = run.document_size {
        println!("Document size: {size} bytes");
    }
    if let Some(counts) = &run.counts {
        println!();
        println!("Counts:");
        println!("  Peptide groups: {}", counts.peptide_groups);
        println!("  Peptides: {}", counts.peptides);
        println!("  Small molecules: {}", counts.small_molecules);
        println!("  Precursors: {}", counts.precursors);
        println!("  Transitions: {}", counts.transitions);
        println!("  Replicates: {}", counts.replicates);
        println!("  Calibration curves: {}", counts.calibration_curves);
    }
    Ok(())
}
