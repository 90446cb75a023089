use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::model::{
    DocPeptideGroup, DocReplicate, DocumentCounts, DocumentInfo, DocumentSettings, IrtPeptide,
    MoleculeKind, OptimizationRecord,
};

use super::{DocumentFormat, DocumentSource};

/// A fully materialized parsed document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedDocument {
    /// GUID and version stamp
    pub info: DocumentInfo,
    /// Document-wide settings
    pub settings: DocumentSettings,
    /// Replicates in document order
    pub replicates: Vec<DocReplicate>,
    /// iRT scale peptides
    pub irt_peptides: Vec<IrtPeptide>,
    /// Optimization records not yet matched to transitions
    pub optimizations: Vec<OptimizationRecord>,
    /// Peptide groups in document order
    pub groups: Vec<DocPeptideGroup>,
}

impl ParsedDocument {
    /// Count every entity kind in the document.
    pub fn compute_counts(&self) -> DocumentCounts {
        let mut counts = DocumentCounts {
            peptide_groups: self.groups.len(),
            replicates: self.replicates.len(),
            group_comparisons: self.settings.data.group_comparisons.len(),
            ..Default::default()
        };

        for molecule in self.groups.iter().flat_map(|g| g.molecules.iter()) {
            match molecule.kind {
                MoleculeKind::Peptide(_) => counts.peptides += 1,
                MoleculeKind::SmallMolecule(_) => counts.small_molecules += 1,
            }
            counts.precursors += molecule.precursors.len();
            counts.transitions += molecule
                .precursors
                .iter()
                .map(|p| p.transitions.len())
                .sum::<usize>();
        }

        let has_regression = self
            .settings
            .peptide
            .quantification
            .as_ref()
            .map(|q| q.has_regression())
            .unwrap_or(false);
        if has_regression {
            counts.calibration_curves = counts.peptides + counts.small_molecules;
        }

        counts
    }

    /// Number of transition-level chromatogram results.
    pub fn transition_chrom_info_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.molecules.iter())
            .flat_map(|m| m.precursors.iter())
            .flat_map(|p| p.transitions.iter())
            .map(|t| t.chrom_infos.len())
            .sum()
    }
}

/// [`DocumentSource`] over a [`ParsedDocument`]
#[derive(Debug)]
pub struct ParsedDocumentSource {
    document: ParsedDocument,
    counts: DocumentCounts,
    transition_chrom_infos: usize,
    save_transition_chrom_info: bool,
    cursor: usize,
}

impl ParsedDocumentSource {
    /// Wrap a parsed document, deciding transition-result storage against
    /// `ceiling`.
    pub fn new(document: ParsedDocument, ceiling: usize) -> Self {
        let counts = document.compute_counts();
        let transition_chrom_infos = document.transition_chrom_info_count();
        let save_transition_chrom_info = transition_chrom_infos <= ceiling;
        if !save_transition_chrom_info {
            debug!(
                "{} transition results exceed the ceiling of {}; storing chromatogram indexes only",
                transition_chrom_infos, ceiling
            );
        }

        Self {
            document,
            counts,
            transition_chrom_infos,
            save_transition_chrom_info,
            cursor: 0,
        }
    }
}

impl DocumentSource for ParsedDocumentSource {
    fn info(&self) -> &DocumentInfo {
        &self.document.info
    }

    fn counts(&self) -> &DocumentCounts {
        &self.counts
    }

    fn settings(&self) -> &DocumentSettings {
        &self.document.settings
    }

    fn replicates(&self) -> &[DocReplicate] {
        &self.document.replicates
    }

    fn irt_peptides(&self) -> &[IrtPeptide] {
        &self.document.irt_peptides
    }

    fn save_transition_chrom_info(&self) -> bool {
        self.save_transition_chrom_info
    }

    fn transition_chrom_info_count(&self) -> usize {
        self.transition_chrom_infos
    }

    fn take_optimizations(&mut self) -> Vec<OptimizationRecord> {
        std::mem::take(&mut self.document.optimizations)
    }

    fn next_group(&mut self) -> Result<Option<DocPeptideGroup>> {
        let group = self.document.groups.get(self.cursor).cloned();
        if group.is_some() {
            self.cursor += 1;
        }
        Ok(group)
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}

/// Opens JSON-serialized [`ParsedDocument`] files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentFormat;

impl DocumentFormat for JsonDocumentFormat {
    fn open(&self, path: &Path, config: &ImportConfig) -> Result<Box<dyn DocumentSource>> {
        if !path.exists() {
            return Err(ImportError::Missing(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let document: ParsedDocument = serde_json::from_reader(reader)?;
        Ok(Box::new(ParsedDocumentSource::new(
            document,
            config.transition_chrom_info_ceiling,
        )))
    }
}
