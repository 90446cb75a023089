use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use targetedms_import::config::Config;
use targetedms_import::importer::{ImportDescriptor, Importer};
use targetedms_import::progress::JobStatus;
use targetedms_import::store::{CollectionType, Database};

fn open(db: &PathBuf) -> Result<Database> {
    Database::open(db).with_context(|| format!("Failed to open database {}", db.display()))
}

/// Create the run for a document
pub fn prepare(
    db: PathBuf,
    document: PathBuf,
    collection: String,
    collection_type: CollectionType,
    config: Config,
) -> Result<()> {
    let db = open(&db)?;
    let importer = Importer::new(config.import);
    let prepared = importer
        .prepare(&db, &ImportDescriptor::new(collection, collection_type, &document))
        .with_context(|| format!("Failed to prepare {}", document.display()))?;

    if prepared.already_imported {
        println!("{} is already imported as run {}", document.display(), prepared.run_id);
    } else {
        println!("Created run {} for {}", prepared.run_id, document.display());
    }
    Ok(())
}

/// Import a document, preparing its run unless one is given
pub fn run(
    db: PathBuf,
    document: PathBuf,
    collection: String,
    collection_type: CollectionType,
    run_id: Option<i64>,
    config: Config,
) -> Result<()> {
    let mut db = open(&db)?;
    let importer = Importer::new(config.import);

    let run_id = match run_id {
        Some(run_id) => run_id,
        None => {
            let prepared = importer
                .prepare(&db, &ImportDescriptor::new(collection, collection_type, &document))
                .with_context(|| format!("Failed to prepare {}", document.display()))?;
            if prepared.already_imported {
                println!("{} is already imported as run {}", document.display(), prepared.run_id);
                return Ok(());
            }
            prepared.run_id
        }
    };

    info!("Importing {} into run {}", document.display(), run_id);
    let status = JobStatus::new();
    let summary = importer
        .import(&mut db, run_id, &status)
        .with_context(|| format!("Failed to import {}", document.display()))?;

    println!("{summary}");
    Ok(())
}
