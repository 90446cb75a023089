use super::*;
use crate::error::ErrorKind;
use crate::model::{
    IsotopeModification, PotentialLoss, PredictorSetting, SpectrumLibrary, StructuralModification,
};
use crate::store::{collections, count_rows, runs, CollectionType, Database};

fn new_run(conn: &Connection) -> i64 {
    let collection = collections::find_or_create(conn, "c", CollectionType::Experiment).unwrap();
    runs::create(conn, collection.id, "doc.json").unwrap()
}

fn phospho(losses: Vec<PotentialLoss>) -> StructuralModification {
    StructuralModification {
        name: "Phospho (ST)".to_string(),
        amino_acid: Some("S, T".to_string()),
        formula: Some("HO3P".to_string()),
        mass_diff_mono: Some(79.966331),
        unimod_id: Some(21),
        variable: true,
        losses,
        ..Default::default()
    }
}

fn h3po4() -> PotentialLoss {
    PotentialLoss {
        formula: Some("H3O4P".to_string()),
        mass_diff_mono: Some(97.976896),
        ..Default::default()
    }
}

fn settings_with(structural: Vec<StructuralModification>) -> DocumentSettings {
    let mut settings = DocumentSettings::default();
    settings.peptide.modifications.structural = structural;
    settings
}

#[test]
fn test_light_label_is_implied() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    let run_id = new_run(conn);

    let mut settings = DocumentSettings::default();
    settings.peptide.modifications.isotope_labels = vec![IsotopeLabel {
        name: "heavy".to_string(),
        standard: true,
    }];
    let info = import_settings(conn, run_id, &settings).unwrap();

    let light = info.light_label_id().unwrap();
    let heavy = info.label_id("heavy").unwrap();
    assert_eq!(info.label_ids(), &[light, heavy]);
    assert_eq!(info.standard_label_ids(), &[heavy]);
}

#[test]
fn test_structural_mod_reused_on_exact_match() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    let settings = settings_with(vec![phospho(vec![h3po4()])]);
    let first = import_settings(conn, new_run(conn), &settings).unwrap();
    let second = import_settings(conn, new_run(conn), &settings).unwrap();

    let a = first.structural_mod("Phospho (ST)").unwrap();
    let b = second.structural_mod("Phospho (ST)").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.loss_ids.len(), 1);
    assert_eq!(count_rows(conn, "structural_modification").unwrap(), 1);
    assert_eq!(count_rows(conn, "run_structural_modification").unwrap(), 2);
}

#[test]
fn test_structural_mod_with_different_losses_is_new() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    let first = import_settings(conn, new_run(conn), &settings_with(vec![phospho(vec![h3po4()])])).unwrap();
    let second = import_settings(conn, new_run(conn), &settings_with(vec![phospho(vec![])])).unwrap();

    assert_ne!(
        first.structural_mod("Phospho (ST)").unwrap().id,
        second.structural_mod("Phospho (ST)").unwrap().id
    );
    assert_eq!(count_rows(conn, "structural_modification").unwrap(), 2);
    assert_eq!(count_rows(conn, "structural_mod_loss").unwrap(), 1);
}

#[test]
fn test_isotope_mod_reused_and_bound_to_label() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    let mut settings = DocumentSettings::default();
    settings.peptide.modifications.isotope_labels = vec![IsotopeLabel {
        name: "heavy".to_string(),
        standard: true,
    }];
    settings.peptide.modifications.isotope = vec![IsotopeModification {
        name: "Label:13C(6)15N(2) (C-term K)".to_string(),
        amino_acid: Some("K".to_string()),
        terminus: Some("C".to_string()),
        label13c: true,
        label15n: true,
        isotope_label: "heavy".to_string(),
        ..Default::default()
    }];

    let first = import_settings(conn, new_run(conn), &settings).unwrap();
    let second = import_settings(conn, new_run(conn), &settings).unwrap();
    assert_eq!(
        first.isotope_mod("Label:13C(6)15N(2) (C-term K)"),
        second.isotope_mod("Label:13C(6)15N(2) (C-term K)")
    );
    assert_eq!(count_rows(conn, "isotope_modification").unwrap(), 1);
    assert_eq!(count_rows(conn, "run_isotope_modification").unwrap(), 2);
}

#[test]
fn test_isotope_mod_with_unknown_label() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    let mut settings = DocumentSettings::default();
    settings.peptide.modifications.isotope = vec![IsotopeModification {
        name: "Label:15N".to_string(),
        isotope_label: "medium".to_string(),
        ..Default::default()
    }];
    let err = import_settings(conn, new_run(conn), &settings).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert!(err.to_string().contains("medium"));
}

#[test]
fn test_predictors_and_optional_sections() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    let ce = Predictor {
        name: "Thermo TSQ Vantage".to_string(),
        step_size: Some(1.0),
        step_count: Some(5),
        settings: vec![
            PredictorSetting {
                charge: Some(2),
                slope: Some(0.03),
                intercept: Some(2.905),
            },
            PredictorSetting {
                charge: Some(3),
                slope: Some(0.038),
                intercept: Some(2.281),
            },
        ],
    };
    let mut settings = DocumentSettings::default();
    settings.transition.prediction.ce_predictor = Some(ce.clone());
    settings.peptide.libraries.libraries = vec![SpectrumLibrary {
        name: "Yeast".to_string(),
        library_type: "bibliospec".to_string(),
        ..Default::default()
    }];

    let info = import_settings(conn, new_run(conn), &settings).unwrap();
    assert!(info.matching_predictor(&ce).is_some());
    let mut other = ce.clone();
    other.step_count = Some(3);
    assert!(info.matching_predictor(&other).is_none());
    assert!(info.library_id("Yeast").is_some());

    assert_eq!(count_rows(conn, "predictor_settings").unwrap(), 2);
    assert_eq!(count_rows(conn, "transition_full_scan_settings").unwrap(), 0);
    assert_eq!(count_rows(conn, "isolation_scheme").unwrap(), 0);
    assert_eq!(count_rows(conn, "run_enzyme").unwrap(), 0);
}
