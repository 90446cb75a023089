//! # tms-import
//!
//! Command-line front end for importing parsed Skyline documents.
//!
//! ## Usage
//!
//! ```bash
//! # Create an empty database
//! tms-import init targetedms.db
//!
//! # Import a document into a QC collection
//! tms-import import targetedms.db run42.json --collection "Plasma QC" --type qc
//!
//! # Inspect a run
//! tms-import status targetedms.db 7
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
