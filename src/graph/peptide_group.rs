//! Peptide groups: protein identity, library uniqueness and the group row.

use std::collections::HashSet;

use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ImportError, Result};
use crate::model::{DocPeptideGroup, MoleculeKind};
use crate::store::{insert_returning_id, AnnotationKind, CollectionType, RunStatus};

use super::GraphBuilder;

/// Structured identifiers recovered from a protein label and description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProteinIdentifiers {
    /// Accession ("P02768")
    pub accession: Option<String>,
    /// Preferred (entry) name ("ALBU_HUMAN")
    pub preferred_name: Option<String>,
    /// Gene name
    pub gene: Option<String>,
    /// Organism
    pub species: Option<String>,
}

/// Compiled patterns for [`ProteinIdentifiers`]
#[derive(Debug, Clone)]
pub struct IdentifierParser {
    pipe_block: Regex,
    species: Regex,
    gene: Regex,
}

impl IdentifierParser {
    /// Compile the patterns.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ImportError::Parse(format!("invalid pattern {pattern}: {e}")))
        };
        Ok(Self {
            pipe_block: compile(r"^[A-Za-z]{2,3}\|([^|\s]+)\|([^|\s]*)")?,
            species: compile(r"\bOS=(.+?)(?:\s+[A-Z]{2}=|$)")?,
            gene: compile(r"\bGN=(\S+)")?,
        })
    }

    /// Extract identifiers from a `db|ACCESSION|ENTRY_NAME` block and
    /// `OS=`/`GN=` tokens of the description.
    ///
    /// The block is read from the label, or from the start of the
    /// description when the label carries none.
    pub fn parse(&self, label: &str, description: Option<&str>) -> ProteinIdentifiers {
        let mut ids = ProteinIdentifiers::default();

        let block = self.pipe_block.captures(label).or_else(|| {
            description.and_then(|d| self.pipe_block.captures(d.trim().trim_start_matches('>')))
        });
        if let Some(caps) = block {
            ids.accession = caps.get(1).map(|m| m.as_str().to_string());
            ids.preferred_name = caps
                .get(2)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }

        if let Some(description) = description {
            ids.species = self
                .species
                .captures(description)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string());
            ids.gene = self
                .gene
                .captures(description)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
        }
        ids
    }
}

/// Truncate to at most `max_len` characters.
pub fn truncate_label(label: &str, max_len: usize) -> String {
    match label.char_indices().nth(max_len) {
        Some((end, _)) => label[..end].to_string(),
        None => label.to_string(),
    }
}

/// Find or insert a protein sequence.
fn protein_sequence_id(conn: &Connection, sequence: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .prepare_cached("SELECT id FROM protein_sequence WHERE sequence = ?1")?
        .query_row([sequence], |row| row.get(0))
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => insert_returning_id(
            conn,
            "INSERT INTO protein_sequence (sequence, length) VALUES (?1, ?2)",
            params![sequence, sequence.chars().count() as i64],
        ),
    }
}

/// Peptide groups of live runs in the collection matching `column = value`.
fn count_in_collection(conn: &Connection, collection_id: i64, column: &str, value: &dyn rusqlite::ToSql) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM peptide_group pg JOIN run ON pg.run_id = run.id \
         WHERE run.collection_id = ?1 AND run.status <> ?2 AND pg.{column} = ?3"
    );
    Ok(conn
        .prepare_cached(&sql)?
        .query_row(params![collection_id, RunStatus::Failed.as_str(), value], |row| row.get(0))?)
}

impl GraphBuilder<'_> {
    fn check_protein_library(&self, group: &DocPeptideGroup, label: &str, sequence_id: Option<i64>) -> Result<()> {
        let collection_id = self.ctx.collection.id;

        if let Some(sequence_id) = sequence_id {
            if count_in_collection(self.ctx.conn, collection_id, "sequence_id", &sequence_id)? > 0 {
                return Err(ImportError::bad_data(format!(
                    "Duplicate protein: the sequence of '{label}' is already part of the library"
                )));
            }
        }
        if count_in_collection(self.ctx.conn, collection_id, "label", &label)? > 0 {
            return Err(ImportError::bad_data(format!(
                "Duplicate protein: '{label}' is already part of the library"
            )));
        }

        let mut peptides = HashSet::new();
        for molecule in &group.molecules {
            if let MoleculeKind::Peptide(peptide) = &molecule.kind {
                let key = peptide
                    .modified_sequence
                    .clone()
                    .unwrap_or_else(|| peptide.sequence.clone());
                if !peptides.insert(key.clone()) {
                    return Err(ImportError::bad_data(format!(
                        "Duplicate peptide {key} in protein '{label}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Insert a peptide group and everything below it.
    pub(super) fn insert_group(&mut self, group: DocPeptideGroup) -> Result<()> {
        let ids = match &group.sequence {
            Some(_) => self.identifiers.parse(&group.label, group.description.as_deref()),
            None => ProteinIdentifiers::default(),
        };
        let label = truncate_label(&group.label, self.ctx.config.label_max_len);
        let sequence_id = match group.sequence.as_deref().filter(|s| !s.is_empty()) {
            Some(sequence) => Some(protein_sequence_id(self.ctx.conn, sequence)?),
            None => None,
        };

        if self.ctx.collection.collection_type == CollectionType::ProteinLibrary {
            self.check_protein_library(&group, &label, sequence_id)?;
        }

        let group_id = insert_returning_id(
            self.ctx.conn,
            "INSERT INTO peptide_group (run_id, label, description, sequence_id, accession, \
             preferred_name, gene, species, decoy, note, alt_description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                self.ctx.run_id,
                label,
                group.description,
                sequence_id,
                ids.accession,
                ids.preferred_name,
                ids.gene,
                ids.species,
                group.decoy,
                group.note,
                group.alt_description
            ],
        )?;
        self.stats.peptide_groups += 1;
        self.annotations
            .add(self.ctx.conn, AnnotationKind::PeptideGroup, group_id, &group.annotations)?;

        for molecule in group.molecules {
            self.insert_molecule(group_id, molecule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniprot_identifiers() {
        let parser = IdentifierParser::new().unwrap();
        let ids = parser.parse(
            "sp|P02768|ALBU_HUMAN",
            Some("Serum albumin OS=Homo sapiens OX=9606 GN=ALB PE=1 SV=2"),
        );
        assert_eq!(ids.accession.as_deref(), Some("P02768"));
        assert_eq!(ids.preferred_name.as_deref(), Some("ALBU_HUMAN"));
        assert_eq!(ids.species.as_deref(), Some("Homo sapiens"));
        assert_eq!(ids.gene.as_deref(), Some("ALB"));
    }

    #[test]
    fn test_identifiers_from_description_block() {
        let parser = IdentifierParser::new().unwrap();
        let ids = parser.parse(
            "ALBU",
            Some(">sp|P02768|ALBU_HUMAN Serum albumin OS=Homo sapiens GN=ALB"),
        );
        assert_eq!(ids.accession.as_deref(), Some("P02768"));
        assert_eq!(ids.preferred_name.as_deref(), Some("ALBU_HUMAN"));
        assert_eq!(ids.species.as_deref(), Some("Homo sapiens"));
        assert_eq!(ids.gene.as_deref(), Some("ALB"));
    }

    #[test]
    fn test_plain_label_has_no_identifiers() {
        let parser = IdentifierParser::new().unwrap();
        let ids = parser.parse("YAL005C", Some("SSA1 heat shock protein"));
        assert_eq!(ids, ProteinIdentifiers::default());
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("abcdef", 3), "abc");
        assert_eq!(truncate_label("abc", 3), "abc");
        assert_eq!(truncate_label("αβγδ", 2), "αβ");
    }
}
