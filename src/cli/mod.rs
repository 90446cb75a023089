use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use targetedms_import::config::Config;
use targetedms_import::store::CollectionType;

mod import;
mod init;
mod status;

/// tms-import - load parsed Skyline documents into a relational store
#[derive(Parser)]
#[command(name = "tms-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load import settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Collection type of the import target.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CollectionTypeArg {
    /// Plain experiment
    #[default]
    Experiment,
    /// Chromatogram library of peptides
    PeptideLibrary,
    /// Chromatogram library of proteins
    ProteinLibrary,
    /// QC monitoring
    Qc,
}

impl From<CollectionTypeArg> for CollectionType {
    fn from(arg: CollectionTypeArg) -> Self {
        match arg {
            CollectionTypeArg::Experiment => CollectionType::Experiment,
            CollectionTypeArg::PeptideLibrary => CollectionType::PeptideLibrary,
            CollectionTypeArg::ProteinLibrary => CollectionType::ProteinLibrary,
            CollectionTypeArg::Qc => CollectionType::QualityControl,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a database with the schema in place
    Init {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,
    },

    /// Create the run for a document without importing it
    Prepare {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Parsed document (JSON)
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Target collection name
        #[arg(short = 'c', long)]
        collection: String,

        /// Collection type, used when the collection is created
        #[arg(short = 't', long = "type", default_value = "experiment", value_enum)]
        collection_type: CollectionTypeArg,
    },

    /// Import a document, creating its run if needed
    Import {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Parsed document (JSON)
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Target collection name
        #[arg(short = 'c', long)]
        collection: String,

        /// Collection type, used when the collection is created
        #[arg(short = 't', long = "type", default_value = "experiment", value_enum)]
        collection_type: CollectionTypeArg,

        /// Import into an existing run instead of preparing one
        #[arg(long, value_name = "RUN_ID")]
        run: Option<i64>,
    },

    /// Show the status of a run
    Status {
        /// Database file
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Run id
        #[arg(value_name = "RUN_ID")]
        run_id: i64,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Init { db } => init::run(db),
        Commands::Prepare {
            db,
            document,
            collection,
            collection_type,
        } => import::prepare(db, document, collection, collection_type.into(), config),
        Commands::Import {
            db,
            document,
            collection,
            collection_type,
            run,
        } => import::run(db, document, collection, collection_type.into(), run, config),
        Commands::Status { db, run_id } => status::run(db, run_id),
    }
}
