//! End-to-end imports of JSON documents into an in-memory database.

use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::{tempdir, TempDir};

use targetedms_import::model::{
    ChromatogramIndex, DocMolecule, DocPeptideGroup, DocPrecursor, DocReplicate, DocSampleFile,
    DocTransition, IrtPeptide, MoleculeChromInfo, MoleculeKind, PeptideFields, PrecursorChromInfo,
    SmallMoleculeFields, TransitionChromInfo,
};
use targetedms_import::prelude::*;
use targetedms_import::store::{count_rows, runs, schema};

fn transition(ordinal: i32, area: f64) -> DocTransition {
    DocTransition {
        mz: 300.0 + ordinal as f64 * 110.0,
        charge: Some(1),
        fragment_type: Some("y".to_string()),
        fragment_ordinal: Some(ordinal),
        chrom_infos: vec![TransitionChromInfo {
            replicate: "R1".to_string(),
            file_id: "f0".to_string(),
            area: Some(area),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn precursor(mz: f64, chromatogram_offset: i64) -> DocPrecursor {
    DocPrecursor {
        mz,
        charge: 2,
        chrom_infos: vec![PrecursorChromInfo {
            replicate: "R1".to_string(),
            file_id: "f0".to_string(),
            total_area: Some(3000.0),
            chromatogram: Some(ChromatogramIndex {
                offset: chromatogram_offset,
                compressed_size: 300,
                uncompressed_size: 1200,
                num_points: 60,
                num_transitions: 2,
                format: 1,
            }),
            ..Default::default()
        }],
        transitions: vec![transition(4, 1000.0), transition(5, 2000.0)],
        ..Default::default()
    }
}

fn peptide(sequence: &str, mz: f64) -> DocMolecule {
    DocMolecule {
        kind: MoleculeKind::Peptide(PeptideFields {
            sequence: sequence.to_string(),
            ..Default::default()
        }),
        chrom_infos: vec![MoleculeChromInfo {
            replicate: "R1".to_string(),
            file_id: "f0".to_string(),
            retention_time: Some(18.2),
            ..Default::default()
        }],
        precursors: vec![precursor(mz, (mz * 1000.0).round() as i64)],
        ..Default::default()
    }
}

fn small_molecule(name: &str, formula: &str) -> DocMolecule {
    DocMolecule {
        kind: MoleculeKind::SmallMolecule(SmallMoleculeFields {
            custom_ion_name: Some(name.to_string()),
            ion_formula: Some(formula.to_string()),
            ..Default::default()
        }),
        precursors: vec![DocPrecursor {
            custom_ion_name: Some(name.to_string()),
            ..precursor(195.09, 42)
        }],
        ..Default::default()
    }
}

fn replicate() -> DocReplicate {
    DocReplicate {
        name: "R1".to_string(),
        sample_files: vec![DocSampleFile {
            file_id: "f0".to_string(),
            file_path: "/raw/r1.raw".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn protein(label: &str, sequence: &str, molecules: Vec<DocMolecule>) -> DocPeptideGroup {
    DocPeptideGroup {
        label: label.to_string(),
        sequence: Some(sequence.to_string()),
        molecules,
        ..Default::default()
    }
}

fn document(groups: Vec<DocPeptideGroup>) -> ParsedDocument {
    ParsedDocument {
        replicates: vec![replicate()],
        groups,
        ..Default::default()
    }
}

fn write(dir: &TempDir, name: &str, document: &ParsedDocument) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_vec(document).unwrap()).unwrap();
    path
}

fn import(
    db: &mut Database,
    importer: &Importer,
    collection: &str,
    collection_type: CollectionType,
    path: &PathBuf,
) -> (i64, Result<RunSummary, ImportError>) {
    let prepared = importer
        .prepare(db, &ImportDescriptor::new(collection, collection_type, path))
        .unwrap();
    assert!(!prepared.already_imported);
    let result = importer.import(db, prepared.run_id, &JobStatus::new());
    (prepared.run_id, result)
}

fn entity_counts(db: &Database) -> Vec<i64> {
    schema::ENTITY_TABLES
        .iter()
        .map(|table| count_rows(db.connection(), table).unwrap())
        .collect()
}

#[test]
fn test_counts_match_document() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "doc.json",
        &document(vec![
            protein(
                "sp|P02768|ALBU_HUMAN",
                "MKWVTFISLLFLFSSAYSRGVFRR",
                vec![peptide("LVNEVTEFAK", 575.31), peptide("AEFAEVSK", 440.72)],
            ),
            protein("Metabolites", "", vec![small_molecule("caffeine", "C8H10N4O2")]),
        ]),
    );
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());

    let (run_id, result) = import(&mut db, &importer, "exp", CollectionType::Experiment, &path);
    let summary = result.unwrap();

    let conn = db.connection();
    assert_eq!(count_rows(conn, "peptide_group").unwrap(), summary.counts.peptide_groups);
    assert_eq!(count_rows(conn, "peptide").unwrap(), summary.counts.peptides);
    assert_eq!(count_rows(conn, "molecule").unwrap(), summary.counts.small_molecules);
    assert_eq!(count_rows(conn, "general_precursor").unwrap(), summary.counts.precursors);
    assert_eq!(count_rows(conn, "general_transition").unwrap(), summary.counts.transitions);
    assert_eq!(count_rows(conn, "replicate").unwrap(), summary.counts.replicates);
    assert_eq!(summary.counts.peptides, 2);
    assert_eq!(summary.counts.small_molecules, 1);
    assert_eq!(summary.counts.transitions, 6);

    let run = runs::get(conn, run_id).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Success);
    assert_eq!(run.counts, Some(summary.counts));
}

#[test]
fn test_failed_import_leaves_no_rows() {
    let dir = tempdir().unwrap();
    let good = write(
        &dir,
        "good.json",
        &document(vec![protein("P1", "MKWVT", vec![peptide("LVNEVTEFAK", 575.31)])]),
    );

    let mut broken_molecule = peptide("AEFAEVSK", 440.72);
    broken_molecule.precursors[0].chrom_infos[0].file_id = "f9".to_string();
    let bad = write(
        &dir,
        "bad.json",
        &document(vec![
            protein("P1", "MKWVT", vec![peptide("LVNEVTEFAK", 575.31)]),
            protein("P2", "MAAAK", vec![broken_molecule]),
        ]),
    );

    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    import(&mut db, &importer, "exp", CollectionType::Experiment, &good).1.unwrap();
    let before = entity_counts(&db);

    let (run_id, result) = import(&mut db, &importer, "exp", CollectionType::Experiment, &bad);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert!(err.to_string().contains("Unable to find sample file"));

    assert_eq!(entity_counts(&db), before);
    let run = runs::get(db.connection(), run_id).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.counts.is_none());
}

#[test]
fn test_duplicate_sample_file_rejected() {
    let dir = tempdir().unwrap();
    let mut doc = document(vec![protein("P1", "MKWVT", vec![peptide("LVNEVTEFAK", 575.31)])]);
    let duplicate = doc.replicates[0].sample_files[0].clone();
    doc.replicates[0].sample_files.push(DocSampleFile {
        file_path: "/raw/r1-copy.raw".to_string(),
        ..duplicate
    });
    let path = write(&dir, "doc.json", &doc);

    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let (run_id, result) = import(&mut db, &importer, "exp", CollectionType::Experiment, &path);

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert!(err.to_string().contains("Duplicate sample file"));
    assert_eq!(count_rows(db.connection(), "sample_file").unwrap(), 0);
    assert_eq!(
        runs::get(db.connection(), run_id).unwrap().unwrap().status,
        RunStatus::Failed
    );
}

#[test]
fn test_irt_values_merge_into_library_scale() {
    let irt = |sequence: &str, value: f64, standard: bool| IrtPeptide {
        modified_sequence: sequence.to_string(),
        irt_value: value,
        irt_standard: standard,
        time_source: None,
    };
    let dir = tempdir().unwrap();
    let mut first = document(vec![protein("P1", "MKWVT", vec![peptide("LVNEVTEFAK", 575.31)])]);
    first.irt_peptides = vec![irt("STANDARDK", 10.0, true), irt("LIBRARYK", 20.0, false)];
    let mut second = document(vec![protein("P2", "MAAAK", vec![peptide("AEFAEVSK", 440.72)])]);
    second.irt_peptides = vec![irt("STANDARDK", 10.0, true), irt("LIBRARYK", 22.0, false)];
    let first = write(&dir, "first.json", &first);
    let second = write(&dir, "second.json", &second);

    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    import(&mut db, &importer, "lib", CollectionType::PeptideLibrary, &first).1.unwrap();
    let summary = import(&mut db, &importer, "lib", CollectionType::PeptideLibrary, &second)
        .1
        .unwrap();

    let outcome = summary.irt.unwrap();
    assert!(!outcome.new_scale);
    assert_eq!(outcome.updated, 1);

    let conn = db.connection();
    let (value, count): (f64, i64) = conn
        .query_row(
            "SELECT irt_value, import_count FROM irt_peptide WHERE modified_sequence = 'LIBRARYK'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert!((value - 21.0).abs() < 1e-9);
    assert_eq!(count, 2);
    let standard: f64 = conn
        .query_row(
            "SELECT irt_value FROM irt_peptide WHERE modified_sequence = 'STANDARDK'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(standard, 10.0);
    assert_eq!(count_rows(conn, "irt_scale").unwrap(), 1);
}

#[test]
fn test_protein_library_rejects_duplicate_protein() {
    let dir = tempdir().unwrap();
    let first = write(
        &dir,
        "first.json",
        &document(vec![protein("sp|P02768|ALBU_HUMAN", "MKWVTFISLL", vec![peptide("LVNEVTEFAK", 575.31)])]),
    );
    let second = write(
        &dir,
        "second.json",
        &document(vec![protein("ALBUMIN", "MKWVTFISLL", vec![peptide("AEFAEVSK", 440.72)])]),
    );

    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    import(&mut db, &importer, "proteins", CollectionType::ProteinLibrary, &first).1.unwrap();
    let groups_before = count_rows(db.connection(), "peptide_group").unwrap();

    let (run_id, result) = import(&mut db, &importer, "proteins", CollectionType::ProteinLibrary, &second);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert!(err.to_string().contains("Duplicate protein"));

    let conn = db.connection();
    assert_eq!(runs::get(conn, run_id).unwrap().unwrap().status, RunStatus::Failed);
    assert_eq!(count_rows(conn, "peptide_group").unwrap(), groups_before);
    // A failed import does not advance the library
    let revision = targetedms_import::store::collections::find_by_name(conn, "proteins")
        .unwrap()
        .unwrap()
        .library_revision;
    assert_eq!(revision, 1);
}

/// Records every published percentage
#[derive(Default)]
struct RecordingStatus(Mutex<Vec<u32>>);

impl StatusSink for RecordingStatus {
    fn publish(&self, percent: u32, _message: &str) -> Result<(), ImportError> {
        self.0.lock().unwrap().push(percent);
        Ok(())
    }
}

#[test]
fn test_progress_reaches_100_without_quantification() {
    let dir = tempdir().unwrap();
    let groups = (0..7)
        .map(|i| {
            protein(
                &format!("P{i}"),
                "MKWVT",
                vec![peptide(&format!("PEPTIDE{i}K"), 500.0 + i as f64)],
            )
        })
        .collect();
    let path = write(&dir, "doc.json", &document(groups));

    for collection_type in [CollectionType::Experiment, CollectionType::QualityControl] {
        let mut db = Database::open_in_memory().unwrap();
        let importer = Importer::new(ImportConfig::default());
        let prepared = importer
            .prepare(&db, &ImportDescriptor::new("c", collection_type, &path))
            .unwrap();
        let status = RecordingStatus::default();
        importer.import(&mut db, prepared.run_id, &status).unwrap();

        let published = status.0.lock().unwrap().clone();
        assert!(published.windows(2).all(|w| w[0] < w[1]), "{published:?}");
        assert_eq!(published.last(), Some(&100));
        // Everything before completion fits in the phase weights
        let before_complete = published[published.len() - 2];
        assert_eq!(before_complete, targetedms_import::progress::TOTAL_WEIGHT);
    }
}

fn scratch_table_exists(db: &Database) -> bool {
    let count: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_temp_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}

#[test]
fn test_transition_results_suppressed_above_ceiling() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "doc.json",
        &document(vec![protein(
            "P1",
            "MKWVT",
            vec![peptide("LVNEVTEFAK", 575.31), peptide("AEFAEVSK", 440.72)],
        )]),
    );

    // 4 transition results in the document
    let config = ImportConfig {
        transition_chrom_info_ceiling: 3,
        ..Default::default()
    };
    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(config);
    let summary = import(&mut db, &importer, "exp", CollectionType::Experiment, &path)
        .1
        .unwrap();
    assert_eq!(summary.graph.chromatogram_indexes, 2);

    let conn = db.connection();
    assert_eq!(count_rows(conn, "transition_chrom_info").unwrap(), 0);
    let unindexed: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM precursor_chrom_info WHERE chromatogram_index IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(unindexed, 0);
    let blob: Vec<u8> = conn
        .query_row(
            "SELECT chromatogram_index FROM precursor_chrom_info ORDER BY id LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(ChromatogramIndex::from_bytes(&blob).unwrap().offset, 575_310);
    assert!(!scratch_table_exists(&db));
}

#[test]
fn test_transition_results_kept_below_ceiling() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "doc.json",
        &document(vec![protein(
            "P1",
            "MKWVT",
            vec![peptide("LVNEVTEFAK", 575.31), peptide("AEFAEVSK", 440.72)],
        )]),
    );

    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    let summary = import(&mut db, &importer, "exp", CollectionType::Experiment, &path)
        .1
        .unwrap();
    assert_eq!(summary.graph.chromatogram_indexes, 0);

    let conn = db.connection();
    assert_eq!(count_rows(conn, "transition_chrom_info").unwrap(), 4);
    let indexed: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM precursor_chrom_info WHERE chromatogram_index IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexed, 0);
    assert!(!scratch_table_exists(&db));
}

#[test]
fn test_qc_reimport_supersedes_sample_file() {
    let dir = tempdir().unwrap();
    let doc = document(vec![protein("P1", "MKWVT", vec![peptide("LVNEVTEFAK", 575.31)])]);
    let first = write(&dir, "first.json", &doc);
    let second = write(&dir, "second.json", &doc);

    let mut db = Database::open_in_memory().unwrap();
    let importer = Importer::new(ImportConfig::default());
    import(&mut db, &importer, "qc", CollectionType::QualityControl, &first).1.unwrap();
    let summary = import(&mut db, &importer, "qc", CollectionType::QualityControl, &second)
        .1
        .unwrap();

    assert_eq!(summary.superseded_sample_files, 1);
    let conn = db.connection();
    assert_eq!(count_rows(conn, "sample_file").unwrap(), 1);
    assert_eq!(count_rows(conn, "replicate").unwrap(), 1);
    // Results of the replaced sample file went with it
    assert_eq!(count_rows(conn, "precursor_chrom_info").unwrap(), 1);
}
