use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use echocal::calibrate::Quantity;
use echocal::convert::Converter;
use echocal::echodata::JsonRecordSource;
use echocal::store::{Engine, ParquetStore, SaveOptions};

use super::JobArgs;

/// Parsed `convert` arguments
pub struct ConvertArgs {
    pub job: JobArgs,
    pub record: PathBuf,
    pub output: Option<PathBuf>,
    pub sp: bool,
    pub engine: Option<Engine>,
    pub no_compress: bool,
}

/// Calibrate a record and write its groups to a Parquet container
pub fn run(args: ConvertArgs) -> Result<()> {
    let config = args.job.config()?;

    let engine = args.engine.or(config.conversion.engine).unwrap_or_default();
    let compress = !args.no_compress && config.conversion.compress.unwrap_or(true);
    let save = SaveOptions::resolve(engine, compress, &config.compression);
    let quantity = if args.sp { Quantity::Sp } else { Quantity::Sv };

    let job = args
        .job
        .to_job(&config)?
        .with_quantity(quantity)
        .with_save_options(save);

    let output = args
        .output
        .unwrap_or_else(|| job.raw_file.with_extension("echocal"));

    info!("echocal convert");
    info!("  Raw file: {}", job.raw_file.display());
    info!("  Record:   {}", args.record.display());
    info!("  Output:   {}", output.display());
    info!(
        "  Engine:   {} ({})",
        job.save.engine,
        job.save
            .compression
            .map_or_else(|| "uncompressed".to_string(), |c| c.to_string())
    );

    let source = JsonRecordSource::new(&args.record);
    let mut store = ParquetStore::create(&output)
        .with_context(|| format!("Failed to create output container {}", output.display()))?;

    let result = Converter::new(job).run(&source, &mut store)?;

    println!("{}", result.stats);
    for group in &result.stats.groups_written {
        println!("  {group}");
    }
    println!("Output: {}", output.display());
    Ok(())
}
