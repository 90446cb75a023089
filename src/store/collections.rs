use std::fmt;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ImportError, Result};

use super::{execute_cached, insert_returning_id};

/// How a collection treats the documents imported into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionType {
    /// Independent experiments; no cross-run rules
    Experiment,
    /// Chromatogram library keyed by peptide precursors
    PeptideLibrary,
    /// Chromatogram library keyed by proteins
    ProteinLibrary,
    /// Instrument QC monitoring; every import targets the same molecules
    QualityControl,
}

impl CollectionType {
    /// Stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionType::Experiment => "experiment",
            CollectionType::PeptideLibrary => "peptide_library",
            CollectionType::ProteinLibrary => "protein_library",
            CollectionType::QualityControl => "qc",
        }
    }

    /// Library collections share one iRT scale and enforce uniqueness.
    pub fn is_library(self) -> bool {
        matches!(
            self,
            CollectionType::PeptideLibrary | CollectionType::ProteinLibrary
        )
    }

    /// Whether every import gets a fresh iRT scale.
    pub fn creates_scale_per_run(self) -> bool {
        !self.is_library()
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionType {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "experiment" => Ok(CollectionType::Experiment),
            "peptide_library" => Ok(CollectionType::PeptideLibrary),
            "protein_library" => Ok(CollectionType::ProteinLibrary),
            "qc" => Ok(CollectionType::QualityControl),
            other => Err(ImportError::Parse(format!("unknown collection type '{other}'"))),
        }
    }
}

/// A stored collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Row id
    pub id: i64,
    /// Unique name
    pub name: String,
    /// Collection type
    pub collection_type: CollectionType,
    /// Library revision, bumped by each successful library import
    pub library_revision: i64,
}

fn read_collection(conn: &Connection, sql: &str, key: &dyn rusqlite::ToSql) -> Result<Option<Collection>> {
    let row = conn
        .prepare_cached(sql)?
        .query_row([key], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .optional()?;

    row.map(|(id, name, collection_type, library_revision)| {
        Ok(Collection {
            id,
            name,
            collection_type: collection_type.parse()?,
            library_revision,
        })
    })
    .transpose()
}

/// Look a collection up by id.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Collection>> {
    read_collection(
        conn,
        "SELECT id, name, collection_type, library_revision FROM collection WHERE id = ?1",
        &id,
    )
}

/// Look a collection up by name.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Collection>> {
    read_collection(
        conn,
        "SELECT id, name, collection_type, library_revision FROM collection WHERE name = ?1",
        &name,
    )
}

/// Find the named collection, creating it with `collection_type` if needed.
///
/// An existing collection of a different type is an error.
pub fn find_or_create(conn: &Connection, name: &str, collection_type: CollectionType) -> Result<Collection> {
    if let Some(existing) = find_by_name(conn, name)? {
        if existing.collection_type != collection_type {
            return Err(ImportError::bad_data(format!(
                "Collection '{}' is a {} collection, not {}",
                name, existing.collection_type, collection_type
            )));
        }
        return Ok(existing);
    }

    let id = insert_returning_id(
        conn,
        "INSERT INTO collection (name, collection_type) VALUES (?1, ?2)",
        params![name, collection_type.as_str()],
    )?;
    Ok(Collection {
        id,
        name: name.to_string(),
        collection_type,
        library_revision: 0,
    })
}

/// Increment the library revision of a collection.
pub fn bump_library_revision(conn: &Connection, id: i64) -> Result<()> {
    execute_cached(
        conn,
        "UPDATE collection SET library_revision = library_revision + 1 WHERE id = ?1",
        [id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    #[test]
    fn test_collection_type_names() {
        for t in [
            CollectionType::Experiment,
            CollectionType::PeptideLibrary,
            CollectionType::ProteinLibrary,
            CollectionType::QualityControl,
        ] {
            assert_eq!(t.as_str().parse::<CollectionType>().unwrap(), t);
        }
        assert!("folder".parse::<CollectionType>().is_err());
        assert!(CollectionType::ProteinLibrary.is_library());
        assert!(CollectionType::QualityControl.creates_scale_per_run());
    }

    #[test]
    fn test_find_or_create() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let created = find_or_create(conn, "lib", CollectionType::PeptideLibrary).unwrap();
        let found = find_or_create(conn, "lib", CollectionType::PeptideLibrary).unwrap();
        assert_eq!(created, found);
        assert!(find_or_create(conn, "lib", CollectionType::Experiment).is_err());

        bump_library_revision(conn, created.id).unwrap();
        assert_eq!(get(conn, created.id).unwrap().unwrap().library_revision, 1);
    }
}
