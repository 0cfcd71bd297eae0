use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use echocal::convert::ConversionJob;
use echocal::modes::{EncodeMode, WaveformMode};
use echocal::store::Engine;

mod check;
mod config;
mod convert;
mod models;

use config::Config;

/// echocal - echosounder conversion and calibration
#[derive(Parser)]
#[command(name = "echocal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Instrument and raw-file options shared by `check` and `convert`
#[derive(Args, Debug)]
pub struct JobArgs {
    /// Raw data file
    #[arg(value_name = "RAW")]
    raw: PathBuf,

    /// Sonar model key (AZFP, AZFP6, EK60, ES70, EK80, ES80, EA640, AD2CP)
    #[arg(short, long)]
    model: Option<String>,

    /// XML configuration file (AZFP)
    #[arg(long, value_name = "FILE")]
    xml: Option<PathBuf>,

    /// Bottom-detection file
    #[arg(long, value_name = "FILE")]
    bot: Option<PathBuf>,

    /// Index file
    #[arg(long, value_name = "FILE")]
    idx: Option<PathBuf>,

    /// Transmit waveform: CW or BB
    #[arg(long)]
    waveform_mode: Option<WaveformMode>,

    /// Sample encoding: power or complex
    #[arg(long)]
    encode_mode: Option<EncodeMode>,

    /// TOML job configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl JobArgs {
    /// Build the job from flags, filling gaps from the config file
    fn to_job(&self, config: &Config) -> Result<ConversionJob> {
        let model_key = self
            .model
            .as_deref()
            .or(config.conversion.sonar_model.as_deref())
            .context("No sonar model given: pass --model or set conversion.sonar_model")?;

        let mut job = ConversionJob::from_key(model_key, &self.raw)?
            .with_modes(
                self.waveform_mode.or(config.conversion.waveform_mode),
                self.encode_mode.or(config.conversion.encode_mode),
            )
            .with_parameters(config.environment.clone(), config.calibration.clone())
            .with_tilt_correction(config.conversion.tilt_corrected.unwrap_or(false));

        if let Some(xml) = &self.xml {
            job = job.with_xml(xml);
        }
        if let Some(bot) = &self.bot {
            job = job.with_bot(bot);
        }
        if let Some(idx) = &self.idx {
            job = job.with_idx(idx);
        }
        Ok(job)
    }

    fn config(&self) -> Result<Config> {
        Config::load_optional(self.config.as_deref())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported sonar models
    Models,

    /// Dry-run the checks of a conversion without computing anything
    Check {
        #[command(flatten)]
        job: JobArgs,

        /// Interchange record (JSON) to check as well
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,
    },

    /// Calibrate a decoded record and write its groups
    Convert {
        #[command(flatten)]
        job: JobArgs,

        /// Interchange record (JSON) produced by the vendor decoder
        #[arg(value_name = "RECORD")]
        record: PathBuf,

        /// Output container directory [default: RAW with .echocal extension]
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Compute Sp instead of Sv
        #[arg(long)]
        sp: bool,

        /// Output engine: netcdf4 or zarr
        #[arg(long)]
        engine: Option<Engine>,

        /// Write groups uncompressed
        #[arg(long)]
        no_compress: bool,
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

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Models => models::run(),
        Commands::Check { job, record } => check::run(job, record),
        Commands::Convert {
            job,
            record,
            output,
            sp,
            engine,
            no_compress,
        } => convert::run(convert::ConvertArgs {
            job,
            record,
            output,
            sp,
            engine,
            no_compress,
        }),
    }
}
