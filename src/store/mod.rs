//! # Relational store
//!
//! SQLite-backed persistence for imported documents. Rows are inserted
//! through cached prepared statements: each row kind prepares its `INSERT`
//! once per connection and reuses it for every row.
//!
//! All import writes happen inside one transaction owned by the
//! [`crate::importer`]; functions here take a plain [`Connection`] so they
//! work both on a connection and on a transaction (which derefs to one).

pub mod annotations;
pub mod collections;
pub mod runs;
pub mod schema;
pub(crate) mod scratch;

use std::path::Path;

use rusqlite::{Connection, Params};

use crate::error::Result;

pub use annotations::{AnnotationBatch, AnnotationKind};
pub use collections::{Collection, CollectionType};
pub use runs::{RunRecord, RunStatus};

/// Prepared statements kept per connection; one per row kind plus lookups.
const STATEMENT_CACHE_CAPACITY: usize = 128;

/// Whether a row is the live version of its data in a library collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentativeDataState {
    /// Not the live version
    NotRepresentative = 0,
    /// The live version
    Representative = 1,
}

/// Which kind of representative data a run contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRepresentativeState {
    /// The run is not part of a library
    NotRepresentative = 0,
    /// The run contributes representative proteins
    RepresentativeProtein = 1,
    /// The run contributes representative peptides
    RepresentativePeptide = 2,
}

/// An open database with the schema in place
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        schema::create(&conn)?;
        Ok(Self { conn })
    }

    /// Shared access to the connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Exclusive access, needed to open transactions.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

/// Insert one row with a cached statement and return its assigned id.
pub(crate) fn insert_returning_id<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<i64> {
    let mut stmt = conn.prepare_cached(sql)?;
    stmt.execute(params)?;
    Ok(conn.last_insert_rowid())
}

/// Run a statement that does not return an id, with a cached statement.
pub(crate) fn execute_cached<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<usize> {
    let mut stmt = conn.prepare_cached(sql)?;
    Ok(stmt.execute(params)?)
}

/// Number of rows in `table`.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_creates_schema() {
        let db = Database::open_in_memory().unwrap();
        for table in schema::ENTITY_TABLES {
            assert_eq!(count_rows(db.connection(), table).unwrap(), 0);
        }
        let version: i64 = db
            .connection()
            .query_row("SELECT version FROM schema_info", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_schema_creation_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        schema::create(db.connection()).unwrap();
        assert_eq!(count_rows(db.connection(), "schema_info").unwrap(), 1);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::open_in_memory().unwrap();
        let result = insert_returning_id(
            db.connection(),
            "INSERT INTO general_molecule (peptide_group_id) VALUES (?1)",
            [42i64],
        );
        assert!(result.is_err());
    }
}
