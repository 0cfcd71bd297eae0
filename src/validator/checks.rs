use crate::convert::ConversionJob;
use crate::echodata::{EchoData, RecordSource};
use crate::modes::ResolvedModes;

use super::report::{ValidationCheck, ValidationReport};

/// Dry run of a conversion job: every non-numeric stage is executed and its
/// outcome recorded instead of aborting.
///
/// Without a `source` the record-dependent checks are skipped.
pub fn check_job(job: &ConversionJob, source: Option<&dyn RecordSource>) -> ValidationReport {
    let descriptor = job.descriptor();
    let mut report = ValidationReport::new(job.raw_file.display().to_string());

    report.add_check(ValidationCheck::ok(format!(
        "Model {} ({}, parser {:?})",
        job.model,
        job.model.family(),
        descriptor.parser
    )));

    report.add_check(match descriptor.validate_raw_path(&job.raw_file) {
        Ok(()) => ValidationCheck::ok("Raw file extension"),
        Err(e) => ValidationCheck::failed("Raw file extension", e.to_string()),
    });

    if !job.raw_file.exists() {
        report.add_check(ValidationCheck::warning(
            "Raw file present",
            format!("{} does not exist", job.raw_file.display()),
        ));
    }

    let aux = descriptor.check_auxiliary_files(
        job.xml_file.as_deref(),
        job.bot_file.as_deref(),
        job.idx_file.as_deref(),
    );
    report.add_check(match (aux, &job.xml_file) {
        (Err(e), _) => ValidationCheck::failed("Auxiliary files", e.to_string()),
        (Ok(()), Some(xml)) if !descriptor.xml_required => ValidationCheck::warning(
            "Auxiliary files",
            format!("{} is ignored for {}", xml.display(), job.model),
        ),
        (Ok(()), _) => ValidationCheck::ok("Auxiliary files"),
    });

    let modes = descriptor
        .mode_check
        .resolve(job.model, job.waveform_mode, job.encode_mode);
    let modes = match modes {
        Ok(modes) => {
            report.add_check(mode_check(&modes));
            Some(modes)
        }
        Err(e) => {
            report.add_check(ValidationCheck::failed("Modes", e.to_string()));
            None
        }
    };

    check_parameters(job, &mut report);

    if let Some(source) = source {
        match source.load(descriptor) {
            Ok(record) => {
                report.add_check(ValidationCheck::ok(format!(
                    "Record ({} beam groups)",
                    record.beam_groups.len()
                )));
                if let Some(modes) = &modes {
                    report.add_check(size_check(job, &record, modes));
                }
            }
            Err(e) => report.add_check(ValidationCheck::failed("Record", e.to_string())),
        }
    }

    report
}

fn mode_check(modes: &ResolvedModes) -> ValidationCheck {
    let name = match (modes.waveform_mode, modes.encode_mode) {
        (Some(w), Some(e)) => format!("Modes (waveform_mode={w}, encode_mode={e})"),
        _ => "Modes (not applicable)".to_string(),
    };
    if modes.warnings.is_empty() {
        ValidationCheck::ok(name)
    } else {
        let messages: Vec<String> = modes.warnings.iter().map(|w| w.to_string()).collect();
        ValidationCheck::warning(name, messages.join("; "))
    }
}

fn check_parameters(job: &ConversionJob, report: &mut ValidationReport) {
    for (set, missing, empty) in [
        (
            "Environment parameters",
            job.environment.missing_keys(),
            job.environment == Default::default(),
        ),
        (
            "Calibration parameters",
            job.calibration.missing_keys(),
            job.calibration == Default::default(),
        ),
    ] {
        report.add_check(if empty {
            ValidationCheck::warning(set, "none supplied")
        } else if missing.is_empty() {
            ValidationCheck::ok(set)
        } else {
            ValidationCheck::failed(set, format!("missing {}", missing.join(", ")))
        });
    }
}

fn size_check(job: &ConversionJob, record: &EchoData, modes: &ResolvedModes) -> ValidationCheck {
    match job.descriptor().backscatter_size.estimate(record, modes) {
        Ok(Some(bytes)) => ValidationCheck::ok(format!("Backscatter size ({bytes} bytes)")),
        Ok(None) => ValidationCheck::ok("Backscatter size (no estimate for this model)"),
        Err(e) => ValidationCheck::failed("Backscatter size", e.to_string()),
    }
}
