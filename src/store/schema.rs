//! Table definitions.
//!
//! Every entity row carries a foreign key to its parent and, transitively,
//! to its run. Chromatogram results cascade from their sample file so a
//! superseded QC sample file takes its results with it.

use rusqlite::Connection;

/// Schema version stored in `schema_info`
pub const SCHEMA_VERSION: i64 = 1;

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_info (version INTEGER NOT NULL);

CREATE TABLE IF NOT EXISTS collection (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    collection_type TEXT NOT NULL,
    library_revision INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS irt_scale (
    id INTEGER PRIMARY KEY,
    collection_id INTEGER NOT NULL REFERENCES collection(id),
    created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS run (
    id INTEGER PRIMARY KEY,
    collection_id INTEGER NOT NULL REFERENCES collection(id),
    file_name TEXT NOT NULL,
    status TEXT NOT NULL,
    status_message TEXT,
    created TEXT NOT NULL,
    modified TEXT,
    document_guid TEXT,
    format_version TEXT,
    software_version TEXT,
    document_size INTEGER,
    irt_scale_id INTEGER REFERENCES irt_scale(id),
    representative_data_state INTEGER NOT NULL DEFAULT 0,
    peptide_group_count INTEGER,
    peptide_count INTEGER,
    small_molecule_count INTEGER,
    precursor_count INTEGER,
    transition_count INTEGER,
    replicate_count INTEGER,
    calibration_curve_count INTEGER
);
CREATE INDEX IF NOT EXISTS idx_run_collection_file ON run(collection_id, file_name);

CREATE TABLE IF NOT EXISTS irt_peptide (
    id INTEGER PRIMARY KEY,
    irt_scale_id INTEGER NOT NULL REFERENCES irt_scale(id),
    modified_sequence TEXT NOT NULL,
    irt_standard INTEGER NOT NULL,
    irt_value REAL NOT NULL,
    import_count INTEGER NOT NULL,
    time_source INTEGER
);

-- Transition settings
CREATE TABLE IF NOT EXISTS predictor (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    step_size REAL,
    step_count INTEGER
);
CREATE TABLE IF NOT EXISTS predictor_settings (
    id INTEGER PRIMARY KEY,
    predictor_id INTEGER NOT NULL REFERENCES predictor(id),
    charge INTEGER,
    slope REAL,
    intercept REAL
);
CREATE TABLE IF NOT EXISTS transition_prediction_settings (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    precursor_mass_type TEXT,
    product_mass_type TEXT,
    optimize_by TEXT,
    ce_predictor_id INTEGER REFERENCES predictor(id),
    dp_predictor_id INTEGER REFERENCES predictor(id),
    cov_predictor_id INTEGER REFERENCES predictor(id)
);
CREATE TABLE IF NOT EXISTS transition_instrument_settings (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    min_mz REAL,
    max_mz REAL,
    dynamic_min INTEGER NOT NULL,
    method_match_tolerance REAL,
    max_transitions INTEGER,
    max_inclusions INTEGER,
    min_time REAL,
    max_time REAL
);
CREATE TABLE IF NOT EXISTS transition_full_scan_settings (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    acquisition_method TEXT,
    product_mass_analyzer TEXT,
    product_res REAL,
    product_res_mz REAL,
    precursor_isotopes TEXT,
    precursor_isotope_filter REAL,
    precursor_mass_analyzer TEXT,
    precursor_res REAL,
    precursor_res_mz REAL,
    retention_time_filter_type TEXT,
    retention_time_filter_length REAL
);
CREATE TABLE IF NOT EXISTS isolation_scheme (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    name TEXT NOT NULL,
    precursor_filter REAL,
    precursor_left_filter REAL,
    precursor_right_filter REAL,
    special_handling TEXT,
    windows_per_scan INTEGER
);
CREATE TABLE IF NOT EXISTS isolation_window (
    id INTEGER PRIMARY KEY,
    isolation_scheme_id INTEGER NOT NULL REFERENCES isolation_scheme(id),
    window_start REAL NOT NULL,
    window_end REAL NOT NULL,
    target REAL,
    margin_left REAL,
    margin_right REAL
);

-- Peptide settings
CREATE TABLE IF NOT EXISTS structural_modification (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    amino_acid TEXT,
    terminus TEXT,
    formula TEXT,
    mass_diff_mono REAL,
    mass_diff_avg REAL,
    unimod_id INTEGER
);
CREATE TABLE IF NOT EXISTS structural_mod_loss (
    id INTEGER PRIMARY KEY,
    structural_mod_id INTEGER NOT NULL REFERENCES structural_modification(id),
    loss_index INTEGER NOT NULL,
    formula TEXT,
    mass_diff_mono REAL,
    mass_diff_avg REAL,
    inclusion TEXT
);
CREATE TABLE IF NOT EXISTS run_structural_modification (
    run_id INTEGER NOT NULL REFERENCES run(id),
    structural_mod_id INTEGER NOT NULL REFERENCES structural_modification(id),
    variable INTEGER NOT NULL,
    explicit_mod INTEGER NOT NULL,
    PRIMARY KEY (run_id, structural_mod_id)
);
CREATE TABLE IF NOT EXISTS isotope_modification (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    amino_acid TEXT,
    terminus TEXT,
    formula TEXT,
    mass_diff_mono REAL,
    mass_diff_avg REAL,
    label13c INTEGER NOT NULL,
    label15n INTEGER NOT NULL,
    label18o INTEGER NOT NULL,
    label2h INTEGER NOT NULL,
    unimod_id INTEGER
);
CREATE TABLE IF NOT EXISTS isotope_label (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    name TEXT NOT NULL,
    standard INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS run_isotope_modification (
    run_id INTEGER NOT NULL REFERENCES run(id),
    isotope_mod_id INTEGER NOT NULL REFERENCES isotope_modification(id),
    isotope_label_id INTEGER NOT NULL REFERENCES isotope_label(id),
    explicit_mod INTEGER NOT NULL,
    PRIMARY KEY (run_id, isotope_mod_id, isotope_label_id)
);
CREATE TABLE IF NOT EXISTS modification_settings (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    max_variable_mods INTEGER,
    max_neutral_losses INTEGER
);
CREATE TABLE IF NOT EXISTS enzyme (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    cut TEXT,
    no_cut TEXT,
    sense TEXT
);
CREATE TABLE IF NOT EXISTS run_enzyme (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    enzyme_id INTEGER NOT NULL REFERENCES enzyme(id),
    max_missed_cleavages INTEGER,
    exclude_ragged_ends INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS library_settings (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    pick TEXT,
    rank_type TEXT,
    peptide_count INTEGER
);
CREATE TABLE IF NOT EXISTS spectrum_library (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    name TEXT NOT NULL,
    library_type TEXT NOT NULL,
    file_name TEXT,
    lsid TEXT,
    revision TEXT
);
CREATE TABLE IF NOT EXISTS quantification_settings (
    run_id INTEGER PRIMARY KEY REFERENCES run(id),
    regression_fit TEXT,
    regression_weighting TEXT,
    normalization_method TEXT,
    ms_level INTEGER,
    units TEXT
);

-- Data settings
CREATE TABLE IF NOT EXISTS annotation_settings (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    name TEXT NOT NULL,
    targets TEXT,
    annotation_type TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS group_comparison_settings (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    name TEXT NOT NULL,
    control_annotation TEXT,
    control_value TEXT,
    case_value TEXT,
    identity_annotation TEXT,
    normalization_method TEXT,
    confidence_level REAL,
    per_protein INTEGER NOT NULL
);

-- Replicates and sample files
CREATE TABLE IF NOT EXISTS replicate (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    name TEXT NOT NULL,
    sample_type TEXT,
    analyte_concentration REAL,
    sample_dilution_factor REAL,
    batch_name TEXT,
    has_midas_spectra INTEGER NOT NULL,
    ce_predictor_id INTEGER REFERENCES predictor(id),
    dp_predictor_id INTEGER REFERENCES predictor(id)
);
CREATE INDEX IF NOT EXISTS idx_replicate_run ON replicate(run_id);
CREATE TABLE IF NOT EXISTS replicate_annotation (
    id INTEGER PRIMARY KEY,
    replicate_id INTEGER NOT NULL REFERENCES replicate(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS qc_metric_exclusion (
    id INTEGER PRIMARY KEY,
    replicate_id INTEGER NOT NULL REFERENCES replicate(id) ON DELETE CASCADE,
    metric_id INTEGER
);
CREATE TABLE IF NOT EXISTS instrument (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    model TEXT,
    ionization_type TEXT,
    analyzer TEXT,
    detector TEXT
);
CREATE TABLE IF NOT EXISTS sample_file (
    id INTEGER PRIMARY KEY,
    replicate_id INTEGER NOT NULL REFERENCES replicate(id) ON DELETE CASCADE,
    skyline_id TEXT NOT NULL,
    file_path TEXT NOT NULL,
    sample_name TEXT,
    sample_id TEXT,
    acquired_time TEXT,
    modified_time TEXT,
    instrument_id INTEGER REFERENCES instrument(id),
    instrument_serial_number TEXT,
    explicit_global_standard_area REAL,
    ion_mobility_type TEXT
);
CREATE INDEX IF NOT EXISTS idx_sample_file_fingerprint ON sample_file(file_path, acquired_time);

-- Entity graph
CREATE TABLE IF NOT EXISTS protein_sequence (
    id INTEGER PRIMARY KEY,
    sequence TEXT NOT NULL UNIQUE,
    length INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS peptide_group (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    label TEXT NOT NULL,
    description TEXT,
    sequence_id INTEGER REFERENCES protein_sequence(id),
    accession TEXT,
    preferred_name TEXT,
    gene TEXT,
    species TEXT,
    decoy INTEGER NOT NULL,
    note TEXT,
    alt_description TEXT,
    representative_data_state INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_peptide_group_run ON peptide_group(run_id);
CREATE INDEX IF NOT EXISTS idx_peptide_group_sequence ON peptide_group(sequence_id);
CREATE INDEX IF NOT EXISTS idx_peptide_group_label ON peptide_group(label);

CREATE TABLE IF NOT EXISTS general_molecule (
    id INTEGER PRIMARY KEY,
    peptide_group_id INTEGER NOT NULL REFERENCES peptide_group(id),
    rt_calculator_score REAL,
    predicted_rt REAL,
    avg_measured_rt REAL,
    explicit_rt REAL,
    note TEXT,
    standard_type TEXT,
    concentration_multiplier REAL,
    internal_standard_concentration REAL
);
CREATE TABLE IF NOT EXISTS peptide (
    id INTEGER PRIMARY KEY REFERENCES general_molecule(id),
    sequence TEXT NOT NULL,
    peptide_modified_sequence TEXT NOT NULL,
    start_index INTEGER,
    end_index INTEGER,
    previous_aa TEXT,
    next_aa TEXT,
    calc_neutral_mass REAL,
    num_missed_cleavages INTEGER,
    rank INTEGER,
    decoy INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS molecule (
    id INTEGER PRIMARY KEY REFERENCES general_molecule(id),
    ion_formula TEXT,
    custom_ion_name TEXT,
    mass_monoisotopic REAL,
    mass_average REAL,
    molecule_id TEXT
);
CREATE TABLE IF NOT EXISTS peptide_structural_modification (
    id INTEGER PRIMARY KEY,
    peptide_id INTEGER NOT NULL REFERENCES peptide(id),
    structural_mod_id INTEGER NOT NULL REFERENCES structural_modification(id),
    index_aa INTEGER NOT NULL,
    mass_diff REAL
);
CREATE TABLE IF NOT EXISTS peptide_isotope_modification (
    id INTEGER PRIMARY KEY,
    peptide_id INTEGER NOT NULL REFERENCES peptide(id),
    isotope_mod_id INTEGER NOT NULL REFERENCES isotope_modification(id),
    isotope_label_id INTEGER NOT NULL REFERENCES isotope_label(id),
    index_aa INTEGER NOT NULL,
    mass_diff REAL
);

CREATE TABLE IF NOT EXISTS general_precursor (
    id INTEGER PRIMARY KEY,
    general_molecule_id INTEGER NOT NULL REFERENCES general_molecule(id),
    isotope_label_id INTEGER NOT NULL REFERENCES isotope_label(id),
    mz REAL NOT NULL,
    charge INTEGER NOT NULL,
    collision_energy REAL,
    declustering_potential REAL,
    explicit_collision_energy REAL,
    decoy INTEGER NOT NULL,
    note TEXT,
    representative_data_state INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS precursor (
    id INTEGER PRIMARY KEY REFERENCES general_precursor(id),
    modified_sequence TEXT NOT NULL,
    neutral_mass REAL
);
CREATE INDEX IF NOT EXISTS idx_precursor_modified_sequence ON precursor(modified_sequence);
CREATE TABLE IF NOT EXISTS molecule_precursor (
    id INTEGER PRIMARY KEY REFERENCES general_precursor(id),
    ion_formula TEXT,
    custom_ion_name TEXT,
    mass_monoisotopic REAL,
    mass_average REAL
);
CREATE TABLE IF NOT EXISTS precursor_lib_info (
    id INTEGER PRIMARY KEY,
    precursor_id INTEGER NOT NULL REFERENCES general_precursor(id),
    spectrum_library_id INTEGER NOT NULL REFERENCES spectrum_library(id),
    score1 REAL,
    score2 REAL,
    score3 REAL
);

CREATE TABLE IF NOT EXISTS general_transition (
    id INTEGER PRIMARY KEY,
    general_precursor_id INTEGER NOT NULL REFERENCES general_precursor(id),
    mz REAL NOT NULL,
    charge INTEGER,
    fragment_type TEXT,
    fragment_ordinal INTEGER,
    neutral_mass REAL,
    neutral_loss_mass REAL,
    mass_index INTEGER,
    isotope_dist_rank INTEGER,
    isotope_dist_proportion REAL,
    decoy_mass_shift INTEGER,
    collision_energy REAL,
    declustering_potential REAL,
    quantitative INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS transition (
    id INTEGER PRIMARY KEY REFERENCES general_transition(id),
    cleavage_aa TEXT
);
CREATE TABLE IF NOT EXISTS molecule_transition (
    id INTEGER PRIMARY KEY REFERENCES general_transition(id),
    ion_formula TEXT,
    custom_ion_name TEXT,
    mass_monoisotopic REAL,
    mass_average REAL
);
CREATE TABLE IF NOT EXISTS transition_optimization (
    id INTEGER PRIMARY KEY,
    transition_id INTEGER NOT NULL REFERENCES general_transition(id),
    optimization_type TEXT NOT NULL,
    opt_value REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS transition_loss (
    id INTEGER PRIMARY KEY,
    transition_id INTEGER NOT NULL REFERENCES general_transition(id),
    structural_mod_loss_id INTEGER NOT NULL REFERENCES structural_mod_loss(id)
);

-- Chromatogram results
CREATE TABLE IF NOT EXISTS general_molecule_chrom_info (
    id INTEGER PRIMARY KEY,
    general_molecule_id INTEGER NOT NULL REFERENCES general_molecule(id),
    sample_file_id INTEGER NOT NULL REFERENCES sample_file(id) ON DELETE CASCADE,
    peak_count_ratio REAL,
    retention_time REAL,
    exclude_from_calibration INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS precursor_chrom_info (
    id INTEGER PRIMARY KEY,
    precursor_id INTEGER NOT NULL REFERENCES general_precursor(id),
    sample_file_id INTEGER NOT NULL REFERENCES sample_file(id) ON DELETE CASCADE,
    general_molecule_chrom_info_id INTEGER REFERENCES general_molecule_chrom_info(id) ON DELETE CASCADE,
    optimization_step INTEGER,
    best_retention_time REAL,
    min_start_time REAL,
    max_end_time REAL,
    total_area REAL,
    total_background REAL,
    max_height REAL,
    max_fwhm REAL,
    average_mass_error_ppm REAL,
    num_truncated INTEGER,
    identified TEXT,
    library_dot_product REAL,
    isotope_dot_product REAL,
    qvalue REAL,
    zscore REAL,
    user_set TEXT,
    note TEXT,
    chromatogram_index BLOB
);
CREATE INDEX IF NOT EXISTS idx_precursor_chrom_info_precursor ON precursor_chrom_info(precursor_id);
CREATE TABLE IF NOT EXISTS transition_chrom_info (
    id INTEGER PRIMARY KEY,
    transition_id INTEGER NOT NULL REFERENCES general_transition(id),
    sample_file_id INTEGER NOT NULL REFERENCES sample_file(id) ON DELETE CASCADE,
    precursor_chrom_info_id INTEGER NOT NULL REFERENCES precursor_chrom_info(id) ON DELETE CASCADE,
    optimization_step INTEGER,
    retention_time REAL,
    start_time REAL,
    end_time REAL,
    height REAL,
    area REAL,
    background REAL,
    fwhm REAL,
    fwhm_degenerate INTEGER NOT NULL,
    truncated INTEGER,
    peak_rank INTEGER,
    mass_error_ppm REAL,
    user_set TEXT,
    identified TEXT,
    points_across_peak INTEGER,
    ccs REAL
);

-- Peak area ratios
CREATE TABLE IF NOT EXISTS peptide_area_ratio (
    id INTEGER PRIMARY KEY,
    general_molecule_chrom_info_id INTEGER NOT NULL REFERENCES general_molecule_chrom_info(id) ON DELETE CASCADE,
    isotope_label_id INTEGER NOT NULL REFERENCES isotope_label(id),
    isotope_label_std_id INTEGER NOT NULL REFERENCES isotope_label(id),
    area_ratio REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS precursor_area_ratio (
    id INTEGER PRIMARY KEY,
    precursor_chrom_info_id INTEGER NOT NULL REFERENCES precursor_chrom_info(id) ON DELETE CASCADE,
    precursor_chrom_info_std_id INTEGER NOT NULL REFERENCES precursor_chrom_info(id) ON DELETE CASCADE,
    isotope_label_id INTEGER NOT NULL REFERENCES isotope_label(id),
    isotope_label_std_id INTEGER NOT NULL REFERENCES isotope_label(id),
    area_ratio REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS transition_area_ratio (
    id INTEGER PRIMARY KEY,
    transition_chrom_info_id INTEGER NOT NULL REFERENCES transition_chrom_info(id) ON DELETE CASCADE,
    transition_chrom_info_std_id INTEGER NOT NULL REFERENCES transition_chrom_info(id) ON DELETE CASCADE,
    isotope_label_id INTEGER NOT NULL REFERENCES isotope_label(id),
    isotope_label_std_id INTEGER NOT NULL REFERENCES isotope_label(id),
    area_ratio REAL NOT NULL
);

-- Entity annotations
CREATE TABLE IF NOT EXISTS peptide_group_annotation (
    id INTEGER PRIMARY KEY,
    peptide_group_id INTEGER NOT NULL REFERENCES peptide_group(id),
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS general_molecule_annotation (
    id INTEGER PRIMARY KEY,
    general_molecule_id INTEGER NOT NULL REFERENCES general_molecule(id),
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS precursor_annotation (
    id INTEGER PRIMARY KEY,
    precursor_id INTEGER NOT NULL REFERENCES general_precursor(id),
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS transition_annotation (
    id INTEGER PRIMARY KEY,
    transition_id INTEGER NOT NULL REFERENCES general_transition(id),
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS general_molecule_chrom_info_annotation (
    id INTEGER PRIMARY KEY,
    general_molecule_chrom_info_id INTEGER NOT NULL REFERENCES general_molecule_chrom_info(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS precursor_chrom_info_annotation (
    id INTEGER PRIMARY KEY,
    precursor_chrom_info_id INTEGER NOT NULL REFERENCES precursor_chrom_info(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS transition_chrom_info_annotation (
    id INTEGER PRIMARY KEY,
    transition_chrom_info_id INTEGER NOT NULL REFERENCES transition_chrom_info(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT
);

-- Quantification output
CREATE TABLE IF NOT EXISTS fold_change (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    group_comparison TEXT NOT NULL,
    label_name TEXT,
    peptide_group_id INTEGER REFERENCES peptide_group(id),
    general_molecule_id INTEGER REFERENCES general_molecule(id),
    replicate_count INTEGER,
    log2_fold_change REAL,
    adjusted_p_value REAL,
    standard_error REAL,
    degrees_of_freedom INTEGER
);
CREATE TABLE IF NOT EXISTS calibration_curve (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES run(id),
    general_molecule_id INTEGER NOT NULL REFERENCES general_molecule(id),
    slope REAL,
    intercept REAL,
    quadratic_coefficient REAL,
    point_count INTEGER,
    r_squared REAL,
    error_message TEXT
);
"#;

/// Create every table that does not exist yet.
pub fn create(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(DDL)?;
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM schema_info", [], |row| row.get(0))?;
    if existing == 0 {
        conn.execute("INSERT INTO schema_info (version) VALUES (?1)", [SCHEMA_VERSION])?;
    }
    Ok(())
}

/// Tables holding rows of one run, for row-count checks.
pub const ENTITY_TABLES: &[&str] = &[
    "peptide_group",
    "general_molecule",
    "peptide",
    "molecule",
    "general_precursor",
    "precursor",
    "molecule_precursor",
    "general_transition",
    "transition",
    "molecule_transition",
    "replicate",
    "sample_file",
    "general_molecule_chrom_info",
    "precursor_chrom_info",
    "transition_chrom_info",
];
