use anyhow::{Context, Result};
use std::path::PathBuf;

use targetedms_import::store::{schema, Database};

/// Create a database file with the schema in place
pub fn run(db: PathBuf) -> Result<()> {
    let existed = db.exists();
    Database::open(&db).with_context(|| format!("Failed to open database {}", db.display()))?;

    if existed {
        println!("Schema up to date in {} (version {})", db.display(), schema::SCHEMA_VERSION);
    } else {
        println!("Created {} (schema version {})", db.display(), schema::SCHEMA_VERSION);
    }
    Ok(())
}
