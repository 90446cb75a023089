//! # Replicates and sample files
//!
//! Inserts the document's replicates, their annotations and QC exclusions,
//! the instruments their sample files were acquired on, and the sample
//! files themselves. The returned [`ReplicateInfo`] resolves the
//! `(replicate, file id)` keys chromatogram results carry.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ImportError, Result};
use crate::keys::{sample_file_key, SampleFileKey};
use crate::model::{DocReplicate, DocSampleFile, InstrumentInfo, Predictor};
use crate::settings::{insert_predictor, SettingsInfo};
use crate::store::{execute_cached, insert_returning_id, AnnotationBatch, AnnotationKind, Collection, CollectionType};

/// Replicate annotation that excludes a replicate from QC metrics
pub const IGNORE_IN_QC: &str = "ignore_in_QC";

/// Storage format of acquisition and modification times
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Ids of the replicates and sample files written for one run
#[derive(Debug, Clone, Default)]
pub struct ReplicateInfo {
    replicates: HashMap<String, i64>,
    sample_files: HashMap<SampleFileKey, i64>,
    superseded: Vec<i64>,
}

impl ReplicateInfo {
    /// Sample file id of a chromatogram result, failing when the document
    /// does not declare that sample file.
    pub fn resolve(&self, replicate: &str, file_id: &str) -> Result<(SampleFileKey, i64)> {
        let key = sample_file_key(replicate, file_id);
        match self.sample_files.get(&key) {
            Some(id) => Ok((key, *id)),
            None => Err(ImportError::bad_data(format!(
                "Unable to find sample file for key {key} (replicate '{replicate}', file id '{file_id}')"
            ))),
        }
    }

    /// Replicates written.
    pub fn replicate_count(&self) -> usize {
        self.replicates.len()
    }

    /// Sample files written.
    pub fn sample_file_count(&self) -> usize {
        self.sample_files.len()
    }

    /// Earlier sample files of the collection superseded by this import.
    pub fn superseded_sample_files(&self) -> &[i64] {
        &self.superseded
    }
}

/// One instrument row: every configuration of a sample file merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
struct CombinedInstrument {
    model: Option<String>,
    ionization_type: Option<String>,
    analyzer: Option<String>,
    detector: Option<String>,
}

fn union_joined<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values.flatten() {
        let value = value.trim();
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    if seen.is_empty() {
        None
    } else {
        Some(seen.join(","))
    }
}

impl CombinedInstrument {
    fn from_infos(infos: &[InstrumentInfo]) -> Option<Self> {
        let combined = Self {
            model: union_joined(infos.iter().map(|i| i.model.as_deref())),
            ionization_type: union_joined(infos.iter().map(|i| i.ionization_type.as_deref())),
            analyzer: union_joined(infos.iter().map(|i| i.analyzer.as_deref())),
            detector: union_joined(infos.iter().map(|i| i.detector.as_deref())),
        };
        if combined == Self::default() {
            None
        } else {
            Some(combined)
        }
    }
}

struct ReplicateImporter<'a> {
    conn: &'a Connection,
    run_id: i64,
    collection: &'a Collection,
    settings: &'a SettingsInfo,
    instruments: HashMap<CombinedInstrument, i64>,
    info: ReplicateInfo,
}

/// Write the replicates of a document.
pub fn import_replicates(
    conn: &Connection,
    run_id: i64,
    collection: &Collection,
    replicates: &[DocReplicate],
    settings: &SettingsInfo,
    annotations: &mut AnnotationBatch,
) -> Result<ReplicateInfo> {
    let mut importer = ReplicateImporter {
        conn,
        run_id,
        collection,
        settings,
        instruments: HashMap::new(),
        info: ReplicateInfo::default(),
    };

    for replicate in replicates {
        importer.import_replicate(replicate, annotations)?;
    }

    log::debug!(
        "Run {}: {} replicates, {} sample files, {} instruments, {} superseded sample files",
        run_id,
        importer.info.replicate_count(),
        importer.info.sample_file_count(),
        importer.instruments.len(),
        importer.info.superseded.len()
    );
    Ok(importer.info)
}

impl ReplicateImporter<'_> {
    fn predictor_id(&self, predictor: &Option<Predictor>) -> Result<Option<i64>> {
        match predictor {
            None => Ok(None),
            Some(predictor) => match self.settings.matching_predictor(predictor) {
                Some(id) => Ok(Some(id)),
                None => insert_predictor(self.conn, predictor).map(Some),
            },
        }
    }

    fn import_replicate(&mut self, replicate: &DocReplicate, annotations: &mut AnnotationBatch) -> Result<()> {
        if self.info.replicates.contains_key(&replicate.name) {
            return Err(ImportError::bad_data(format!(
                "Duplicate replicate name '{}'",
                replicate.name
            )));
        }

        let ce = self.predictor_id(&replicate.ce_predictor)?;
        let dp = self.predictor_id(&replicate.dp_predictor)?;
        let replicate_id = insert_returning_id(
            self.conn,
            "INSERT INTO replicate (run_id, name, sample_type, analyte_concentration, \
             sample_dilution_factor, batch_name, has_midas_spectra, ce_predictor_id, dp_predictor_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                self.run_id,
                replicate.name,
                replicate.sample_type,
                replicate.analyte_concentration,
                replicate.sample_dilution_factor,
                replicate.batch_name,
                replicate.has_midas_spectra,
                ce,
                dp
            ],
        )?;
        self.info.replicates.insert(replicate.name.clone(), replicate_id);

        annotations.add(self.conn, AnnotationKind::Replicate, replicate_id, &replicate.annotations)?;
        self.apply_qc_exclusions(replicate, replicate_id)?;

        for sample_file in &replicate.sample_files {
            self.import_sample_file(replicate, replicate_id, sample_file)?;
        }
        Ok(())
    }

    /// Carry over exclusions of same-named replicates, or create one from
    /// the `ignore_in_QC` annotation when there are none.
    fn apply_qc_exclusions(&self, replicate: &DocReplicate, replicate_id: i64) -> Result<()> {
        let ignore = replicate
            .annotations
            .iter()
            .find(|a| a.name == IGNORE_IN_QC)
            .map(|a| {
                a.value
                    .as_deref()
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false)
            });

        let existing: Vec<Option<i64>> = {
            let mut stmt = self.conn.prepare_cached(
                "SELECT DISTINCT e.metric_id FROM qc_metric_exclusion e \
                 JOIN replicate r ON e.replicate_id = r.id JOIN run ON r.run_id = run.id \
                 WHERE run.collection_id = ?1 AND r.name = ?2 AND r.run_id <> ?3 ORDER BY e.metric_id",
            )?;
            let rows = stmt.query_map(
                params![self.collection.id, replicate.name, self.run_id],
                |row| row.get(0),
            )?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        if existing.is_empty() {
            if ignore == Some(true) {
                execute_cached(
                    self.conn,
                    "INSERT INTO qc_metric_exclusion (replicate_id, metric_id) VALUES (?1, NULL)",
                    [replicate_id],
                )?;
            }
            return Ok(());
        }

        for metric_id in &existing {
            execute_cached(
                self.conn,
                "INSERT INTO qc_metric_exclusion (replicate_id, metric_id) VALUES (?1, ?2)",
                params![replicate_id, metric_id],
            )?;
        }

        let excluded_entirely = existing.iter().any(Option::is_none);
        if let Some(ignore) = ignore {
            if ignore != excluded_entirely {
                log::warn!(
                    target: "targetedms::job",
                    "Replicate '{}' has {}={} but the collection's existing exclusions say otherwise; keeping the existing exclusions",
                    replicate.name,
                    IGNORE_IN_QC,
                    ignore
                );
            }
        }
        Ok(())
    }

    fn instrument_id(&mut self, infos: &[InstrumentInfo]) -> Result<Option<i64>> {
        let Some(combined) = CombinedInstrument::from_infos(infos) else {
            return Ok(None);
        };
        if let Some(id) = self.instruments.get(&combined) {
            return Ok(Some(*id));
        }

        let id = insert_returning_id(
            self.conn,
            "INSERT INTO instrument (run_id, model, ionization_type, analyzer, detector) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.run_id,
                combined.model,
                combined.ionization_type,
                combined.analyzer,
                combined.detector
            ],
        )?;
        self.instruments.insert(combined, id);
        Ok(Some(id))
    }

    fn import_sample_file(
        &mut self,
        replicate: &DocReplicate,
        replicate_id: i64,
        sample_file: &DocSampleFile,
    ) -> Result<()> {
        let key = sample_file_key(&replicate.name, &sample_file.file_id);
        if self.info.sample_files.contains_key(&key) {
            return Err(ImportError::bad_data(format!(
                "Duplicate sample file {key}: replicate '{}' already has a sample file with id '{}'",
                replicate.name, sample_file.file_id
            )));
        }

        let instrument_id = self.instrument_id(&sample_file.instrument_info)?;
        let acquired = sample_file
            .acquired_time
            .map(|t| t.format(TIME_FORMAT).to_string());
        let modified = sample_file
            .modified_time
            .map(|t| t.format(TIME_FORMAT).to_string());

        if self.collection.collection_type == CollectionType::QualityControl {
            self.queue_superseded(&sample_file.file_path, acquired.as_deref())?;
        }

        let id = insert_returning_id(
            self.conn,
            "INSERT INTO sample_file (replicate_id, skyline_id, file_path, sample_name, sample_id, \
             acquired_time, modified_time, instrument_id, instrument_serial_number, \
             explicit_global_standard_area, ion_mobility_type) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                replicate_id,
                sample_file.file_id,
                sample_file.file_path,
                sample_file.sample_name,
                sample_file.sample_id,
                acquired,
                modified,
                instrument_id,
                sample_file.instrument_serial_number,
                sample_file.explicit_global_standard_area,
                sample_file.ion_mobility_type
            ],
        )?;
        self.info.sample_files.insert(key, id);
        Ok(())
    }

    /// Queue earlier sample files of the collection with the same path and
    /// acquisition time. They are deleted only once this run is complete.
    fn queue_superseded(&mut self, file_path: &str, acquired: Option<&str>) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT sf.id FROM sample_file sf JOIN replicate r ON sf.replicate_id = r.id \
             JOIN run ON r.run_id = run.id \
             WHERE run.collection_id = ?1 AND run.id <> ?2 AND sf.file_path = ?3 AND sf.acquired_time IS ?4",
        )?;
        let rows = stmt.query_map(
            params![self.collection.id, self.run_id, file_path, acquired],
            |row| row.get::<_, i64>(0),
        )?;
        for id in rows {
            let id = id?;
            if !self.info.superseded.contains(&id) {
                self.info.superseded.push(id);
            }
        }
        Ok(())
    }
}

/// Delete superseded sample files with their results, then any replicate
/// left without sample files.
pub fn delete_sample_files(conn: &Connection, ids: &[i64]) -> Result<usize> {
    let mut deleted = 0;
    for id in ids {
        let replicate_id: Option<i64> = conn
            .prepare_cached("SELECT replicate_id FROM sample_file WHERE id = ?1")?
            .query_row([id], |row| row.get(0))
            .optional()?;
        let Some(replicate_id) = replicate_id else {
            continue;
        };

        deleted += execute_cached(conn, "DELETE FROM sample_file WHERE id = ?1", [id])?;
        execute_cached(
            conn,
            "DELETE FROM replicate WHERE id = ?1 AND NOT EXISTS \
             (SELECT 1 FROM sample_file WHERE replicate_id = ?1)",
            [replicate_id],
        )?;
    }
    Ok(deleted)
}
