//! Batched annotation inserts.
//!
//! Every annotated entity kind has its own table with the same
//! `(parent, name, value)` shape. [`AnnotationKind`] routes a row to its
//! table; [`AnnotationBatch`] buffers rows per kind and writes them through
//! one cached statement per kind.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::model::Annotation;

/// Entity kinds that carry annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Protein / molecule list
    PeptideGroup,
    /// Peptide or small molecule
    GeneralMolecule,
    /// Precursor
    Precursor,
    /// Transition
    Transition,
    /// Replicate
    Replicate,
    /// Molecule-level chromatogram result
    GeneralMoleculeChromInfo,
    /// Precursor-level chromatogram result
    PrecursorChromInfo,
    /// Transition-level chromatogram result
    TransitionChromInfo,
}

/// Destination table and parent column of an annotation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationTarget {
    /// Annotation table
    pub table: &'static str,
    /// Column referencing the annotated row
    pub parent_column: &'static str,
    /// Insert statement for this table
    pub insert_sql: &'static str,
}

impl AnnotationKind {
    /// Every annotation kind.
    pub const ALL: [AnnotationKind; 8] = [
        AnnotationKind::PeptideGroup,
        AnnotationKind::GeneralMolecule,
        AnnotationKind::Precursor,
        AnnotationKind::Transition,
        AnnotationKind::Replicate,
        AnnotationKind::GeneralMoleculeChromInfo,
        AnnotationKind::PrecursorChromInfo,
        AnnotationKind::TransitionChromInfo,
    ];

    /// Where rows of this kind are written.
    pub fn target(self) -> AnnotationTarget {
        match self {
            AnnotationKind::PeptideGroup => AnnotationTarget {
                table: "peptide_group_annotation",
                parent_column: "peptide_group_id",
                insert_sql: "INSERT INTO peptide_group_annotation (peptide_group_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::GeneralMolecule => AnnotationTarget {
                table: "general_molecule_annotation",
                parent_column: "general_molecule_id",
                insert_sql: "INSERT INTO general_molecule_annotation (general_molecule_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::Precursor => AnnotationTarget {
                table: "precursor_annotation",
                parent_column: "precursor_id",
                insert_sql: "INSERT INTO precursor_annotation (precursor_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::Transition => AnnotationTarget {
                table: "transition_annotation",
                parent_column: "transition_id",
                insert_sql: "INSERT INTO transition_annotation (transition_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::Replicate => AnnotationTarget {
                table: "replicate_annotation",
                parent_column: "replicate_id",
                insert_sql: "INSERT INTO replicate_annotation (replicate_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::GeneralMoleculeChromInfo => AnnotationTarget {
                table: "general_molecule_chrom_info_annotation",
                parent_column: "general_molecule_chrom_info_id",
                insert_sql: "INSERT INTO general_molecule_chrom_info_annotation (general_molecule_chrom_info_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::PrecursorChromInfo => AnnotationTarget {
                table: "precursor_chrom_info_annotation",
                parent_column: "precursor_chrom_info_id",
                insert_sql: "INSERT INTO precursor_chrom_info_annotation (precursor_chrom_info_id, name, value) VALUES (?1, ?2, ?3)",
            },
            AnnotationKind::TransitionChromInfo => AnnotationTarget {
                table: "transition_chrom_info_annotation",
                parent_column: "transition_chrom_info_id",
                insert_sql: "INSERT INTO transition_chrom_info_annotation (transition_chrom_info_id, name, value) VALUES (?1, ?2, ?3)",
            },
        }
    }
}

#[derive(Debug)]
struct PendingAnnotation {
    parent_id: i64,
    name: String,
    value: Option<String>,
}

/// Buffers annotation rows and writes them in batches
#[derive(Debug)]
pub struct AnnotationBatch {
    batch_size: usize,
    pending: HashMap<AnnotationKind, Vec<PendingAnnotation>>,
    inserted: usize,
}

impl AnnotationBatch {
    /// Create a batch that flushes a kind once `batch_size` rows are pending.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: HashMap::new(),
            inserted: 0,
        }
    }

    /// Queue annotations for one parent row.
    ///
    /// The parent row must already exist; rows may be written immediately
    /// when the kind's buffer is full.
    pub fn add(
        &mut self,
        conn: &Connection,
        kind: AnnotationKind,
        parent_id: i64,
        annotations: &[Annotation],
    ) -> Result<()> {
        if annotations.is_empty() {
            return Ok(());
        }

        let buffer = self.pending.entry(kind).or_default();
        buffer.extend(annotations.iter().map(|a| PendingAnnotation {
            parent_id,
            name: a.name.clone(),
            value: a.value.clone(),
        }));

        if buffer.len() >= self.batch_size {
            self.flush_kind(conn, kind)?;
        }
        Ok(())
    }

    fn flush_kind(&mut self, conn: &Connection, kind: AnnotationKind) -> Result<()> {
        let Some(rows) = self.pending.get_mut(&kind) else {
            return Ok(());
        };
        if rows.is_empty() {
            return Ok(());
        }

        let mut stmt = conn.prepare_cached(kind.target().insert_sql)?;
        for row in rows.drain(..) {
            stmt.execute(params![row.parent_id, row.name, row.value])?;
            self.inserted += 1;
        }
        Ok(())
    }

    /// Write every pending row.
    pub fn flush(&mut self, conn: &Connection) -> Result<()> {
        for kind in AnnotationKind::ALL {
            self.flush_kind(conn, kind)?;
        }
        Ok(())
    }

    /// Rows pending across all kinds.
    pub fn pending(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Rows written so far.
    pub fn inserted(&self) -> usize {
        self.inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{count_rows, Database};

    #[test]
    fn test_every_kind_routes_to_a_table() {
        let db = Database::open_in_memory().unwrap();
        for kind in AnnotationKind::ALL {
            let target = kind.target();
            assert!(target.insert_sql.contains(target.table));
            assert!(target.insert_sql.contains(target.parent_column));
            // Table exists and the statement prepares
            db.connection().prepare(target.insert_sql).unwrap();
        }
    }

    #[test]
    fn test_batch_flushes_at_size() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        conn.execute_batch(
            "INSERT INTO collection (id, name, collection_type) VALUES (1, 'c', 'experiment');
             INSERT INTO run (id, collection_id, file_name, status, created) VALUES (1, 1, 'f', 'Running', 'now');
             INSERT INTO peptide_group (id, run_id, label, decoy) VALUES (1, 1, 'P1', 0);",
        )
        .unwrap();

        let mut batch = AnnotationBatch::new(3);
        let annotations = vec![Annotation::new("a", "1"), Annotation::new("b", "2")];
        batch.add(conn, AnnotationKind::PeptideGroup, 1, &annotations).unwrap();
        assert_eq!(batch.pending(), 2);
        assert_eq!(count_rows(conn, "peptide_group_annotation").unwrap(), 0);

        batch.add(conn, AnnotationKind::PeptideGroup, 1, &annotations).unwrap();
        assert_eq!(batch.pending(), 0);
        assert_eq!(count_rows(conn, "peptide_group_annotation").unwrap(), 4);

        batch.add(conn, AnnotationKind::PeptideGroup, 1, &annotations[..1]).unwrap();
        batch.flush(conn).unwrap();
        assert_eq!(batch.inserted(), 5);
        assert_eq!(count_rows(conn, "peptide_group_annotation").unwrap(), 5);
    }
}
