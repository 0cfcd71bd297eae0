use anyhow::Result;
use log::info;
use std::path::PathBuf;

use echocal::echodata::{JsonRecordSource, RecordSource};
use echocal::validator::check_job;

use super::JobArgs;

/// Dry-run a conversion job and print the report
pub fn run(args: JobArgs, record: Option<PathBuf>) -> Result<()> {
    let config = args.config()?;
    let job = args.to_job(&config)?;

    info!("echocal check: {} as {}", job.raw_file.display(), job.model);

    let source = record.map(JsonRecordSource::new);
    let report = check_job(&job, source.as_ref().map(|s| s as &dyn RecordSource));

    println!("{}", report.format_colored());

    // Exit with error code if a check failed
    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
