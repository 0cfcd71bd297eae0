//! # echocal
//!
//! Command-line front end for echosounder conversion and calibration.
//!
//! ```bash
//! # List supported instruments
//! echocal models
//!
//! # Dry-run the checks for an AZFP file
//! echocal check 17082117.01A --model AZFP --xml 17041823.XML
//!
//! # Calibrate a decoded record to Sv and write a Parquet container
//! echocal convert 17082117.01A 17082117.json --model AZFP --xml 17041823.XML \
//!     --config azfp.toml -o 17082117.echocal
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
