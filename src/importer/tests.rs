use super::*;
use crate::error::ErrorKind;
use crate::model::{
    DocMolecule, DocPeptideGroup, DocPrecursor, DocReplicate, DocSampleFile, DocTransition,
    MoleculeChromInfo, MoleculeKind, PeptideFields, PrecursorChromInfo, TransitionChromInfo,
};
use crate::progress::JobStatus;
use crate::source::ParsedDocument;
use crate::store::count_rows;
use tempfile::{tempdir, TempDir};

fn document(sequences: &[&str]) -> ParsedDocument {
    let molecules = sequences
        .iter()
        .map(|sequence| DocMolecule {
            kind: MoleculeKind::Peptide(PeptideFields {
                sequence: sequence.to_string(),
                ..Default::default()
            }),
            chrom_infos: vec![MoleculeChromInfo {
                replicate: "R1".to_string(),
                file_id: "f0".to_string(),
                ..Default::default()
            }],
            precursors: vec![DocPrecursor {
                mz: 500.0 + sequence.len() as f64,
                charge: 2,
                chrom_infos: vec![PrecursorChromInfo {
                    replicate: "R1".to_string(),
                    file_id: "f0".to_string(),
                    total_area: Some(1000.0),
                    ..Default::default()
                }],
                transitions: vec![DocTransition {
                    mz: 600.0,
                    fragment_type: Some("y".to_string()),
                    fragment_ordinal: Some(4),
                    chrom_infos: vec![TransitionChromInfo {
                        replicate: "R1".to_string(),
                        file_id: "f0".to_string(),
                        area: Some(1000.0),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        })
        .collect();

    ParsedDocument {
        replicates: vec![DocReplicate {
            name: "R1".to_string(),
            sample_files: vec![DocSampleFile {
                file_id: "f0".to_string(),
                file_path: "/raw/r1.raw".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }],
        groups: vec![DocPeptideGroup {
            label: "sp|P02768|ALBU_HUMAN".to_string(),
            sequence: Some("MKWVTFISLLLLFSSAYSR".to_string()),
            molecules,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn write_document(dir: &TempDir, name: &str, document: &ParsedDocument) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(document).unwrap()).unwrap();
    path
}

#[test]
fn test_locks_are_shared_per_collection() {
    let locks = CollectionLocks::new();
    let clone = locks.clone();
    assert!(Arc::ptr_eq(&locks.lock_for(1), &clone.lock_for(1)));
    assert!(!Arc::ptr_eq(&locks.lock_for(1), &locks.lock_for(2)));
}

#[test]
fn test_prepare_detects_existing_run() {
    let db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let descriptor = ImportDescriptor::new("c", CollectionType::Experiment, "/data/doc.json");

    let first = importer.prepare(&db, &descriptor).unwrap();
    assert!(!first.already_imported);
    let second = importer.prepare(&db, &descriptor).unwrap();
    assert!(second.already_imported);
    assert_eq!(second.run_id, first.run_id);

    runs::set_status(db.connection(), first.run_id, RunStatus::Failed, Some("boom")).unwrap();
    let third = importer.prepare(&db, &descriptor).unwrap();
    assert!(!third.already_imported);
    assert_ne!(third.run_id, first.run_id);
}

#[test]
fn test_import_success() {
    let dir = tempdir().unwrap();
    let path = write_document(&dir, "doc.json", &document(&["PEPTIDEK", "ELVISK"]));
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());

    let prepared = importer
        .prepare(&db, &ImportDescriptor::new("c", CollectionType::Experiment, &path))
        .unwrap();
    let status = JobStatus::new();
    let summary = importer.import(&mut db, prepared.run_id, &status).unwrap();

    assert_eq!(summary.status, RunStatus::Success);
    assert_eq!(summary.counts.peptides, 2);
    assert_eq!(summary.graph.transition_results, 2);
    assert_eq!(status.percent(), 100);

    let run = runs::get(db.connection(), prepared.run_id).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Success);
    assert_eq!(run.counts, Some(summary.counts));
    // Documents without a GUID get one
    assert!(run.document_guid.is_some());
    assert!(summary.to_string().contains("2 peptides"));
}

#[test]
fn test_missing_document_marks_run_failed() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let prepared = importer
        .prepare(
            &db,
            &ImportDescriptor::new("c", CollectionType::Experiment, dir.path().join("gone.json")),
        )
        .unwrap();

    let err = importer
        .import(&mut db, prepared.run_id, &JobStatus::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Missing);
    let run = runs::get(db.connection(), prepared.run_id).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.status_message.unwrap().contains("gone.json"));
}

#[test]
fn test_cancelled_import_rolls_back() {
    let dir = tempdir().unwrap();
    let path = write_document(&dir, "doc.json", &document(&["PEPTIDEK"]));
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let prepared = importer
        .prepare(&db, &ImportDescriptor::new("c", CollectionType::Experiment, &path))
        .unwrap();

    let status = JobStatus::new();
    status.cancel_handle().cancel();
    let err = importer.import(&mut db, prepared.run_id, &status).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    let conn = db.connection();
    assert_eq!(count_rows(conn, "peptide_group").unwrap(), 0);
    assert_eq!(count_rows(conn, "replicate").unwrap(), 0);
    assert_eq!(
        runs::get(conn, prepared.run_id).unwrap().unwrap().status,
        RunStatus::Failed
    );
}

#[test]
fn test_finished_run_is_not_reimported() {
    let dir = tempdir().unwrap();
    let path = write_document(&dir, "doc.json", &document(&["PEPTIDEK"]));
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let prepared = importer
        .prepare(&db, &ImportDescriptor::new("c", CollectionType::Experiment, &path))
        .unwrap();
    importer.import(&mut db, prepared.run_id, &JobStatus::new()).unwrap();

    let err = importer
        .import(&mut db, prepared.run_id, &JobStatus::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    // The committed run keeps its status
    assert_eq!(
        runs::get(db.connection(), prepared.run_id).unwrap().unwrap().status,
        RunStatus::Success
    );
}

#[test]
fn test_library_bookkeeping() {
    let dir = tempdir().unwrap();
    let path = write_document(&dir, "doc.json", &document(&["PEPTIDEK"]));
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let prepared = importer
        .prepare(&db, &ImportDescriptor::new("lib", CollectionType::ProteinLibrary, &path))
        .unwrap();
    importer.import(&mut db, prepared.run_id, &JobStatus::new()).unwrap();

    let conn = db.connection();
    let state: i64 = conn
        .query_row("SELECT representative_data_state FROM peptide_group", [], |row| row.get(0))
        .unwrap();
    assert_eq!(state, RepresentativeDataState::Representative as i64);
    let run_state: i64 = conn
        .query_row(
            "SELECT representative_data_state FROM run WHERE id = ?1",
            [prepared.run_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(run_state, RunRepresentativeState::RepresentativeProtein as i64);
    assert_eq!(
        collections::find_by_name(conn, "lib").unwrap().unwrap().library_revision,
        1
    );
}

#[test]
fn test_qc_target_mismatch() {
    let dir = tempdir().unwrap();
    let first = write_document(&dir, "first.json", &document(&["PEPTIDEK", "ELVISK"]));
    let second = write_document(&dir, "second.json", &document(&["PEPTIDEK"]));
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());

    let run = importer
        .prepare(&db, &ImportDescriptor::new("qc", CollectionType::QualityControl, &first))
        .unwrap();
    importer.import(&mut db, run.run_id, &JobStatus::new()).unwrap();

    let run = importer
        .prepare(&db, &ImportDescriptor::new("qc", CollectionType::QualityControl, &second))
        .unwrap();
    let err = importer.import(&mut db, run.run_id, &JobStatus::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert!(err.to_string().contains("Missing from this document: ELVISK."));
}

#[test]
fn test_failure_level_follows_reportability() {
    assert_eq!(failure_level(&ImportError::bad_data("Duplicate protein")), Level::Warn);
    assert_eq!(failure_level(&ImportError::Cancelled), Level::Warn);
    assert_eq!(failure_level(&ImportError::Missing(PathBuf::from("gone.json"))), Level::Error);
    assert_eq!(
        failure_level(&ImportError::Parse("unexpected token".to_string())),
        Level::Error
    );
}
