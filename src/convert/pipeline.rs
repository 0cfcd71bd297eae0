use log::info;

use crate::calibrate::CalibrationEngine;
use crate::echodata::{EchoData, RecordSource};
use crate::modes::ResolvedModes;
use crate::store::GroupStore;

use super::error::{ConvertError, Stage, StageError};
use super::job::ConversionJob;
use super::stats::ConversionStats;

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The record with its range and calibrated quantity attached
    pub record: EchoData,
    /// Effective modes
    pub modes: ResolvedModes,
    /// Summary
    pub stats: ConversionStats,
}

/// Runs a [`ConversionJob`] through its stages, strictly in order:
/// extension, auxiliary files, load, modes, size, range, calibration,
/// annotation, save.
#[derive(Debug, Clone)]
pub struct Converter {
    job: ConversionJob,
}

impl Converter {
    /// Converter for `job`
    pub fn new(job: ConversionJob) -> Self {
        Self { job }
    }

    /// The job being run
    pub fn job(&self) -> &ConversionJob {
        &self.job
    }

    fn fail(&self, stage: Stage, source: impl Into<StageError>) -> ConvertError {
        ConvertError {
            model: self.job.model,
            path: self.job.raw_file.clone(),
            stage,
            source: source.into(),
        }
    }

    /// Run every stage, reading the record from `source` and writing groups
    /// to `store`. The first failing stage aborts the run.
    pub fn run(
        &self,
        source: &dyn RecordSource,
        store: &mut dyn GroupStore,
    ) -> Result<ConversionOutput, ConvertError> {
        let job = &self.job;
        let descriptor = job.descriptor();
        info!(
            "Converting {} as {} ({:?})",
            job.raw_file.display(),
            job.model,
            descriptor.parser
        );

        descriptor
            .validate_raw_path(&job.raw_file)
            .map_err(|e| self.fail(Stage::Extension, e))?;

        descriptor
            .check_auxiliary_files(
                job.xml_file.as_deref(),
                job.bot_file.as_deref(),
                job.idx_file.as_deref(),
            )
            .map_err(|e| self.fail(Stage::AuxiliaryFiles, e))?;

        let mut record = source
            .load(descriptor)
            .map_err(|e| self.fail(Stage::Load, e))?;

        let modes = descriptor
            .mode_check
            .resolve(job.model, job.waveform_mode, job.encode_mode)
            .map_err(|e| self.fail(Stage::Modes, e))?;

        let backscatter_bytes = descriptor
            .backscatter_size
            .estimate(&record, &modes)
            .map_err(|e| self.fail(Stage::Size, e))?;

        let beam_index = record.beam_index_for(modes.encode_mode);
        let engine = CalibrationEngine::new(descriptor, &job.environment, &job.calibration)
            .with_tilt_correction(job.tilt_corrected);

        engine
            .range(&mut record, beam_index)
            .map_err(|e| self.fail(Stage::Range, e))?;

        engine
            .compute(&mut record, beam_index, job.quantity)
            .map_err(|e| self.fail(Stage::Calibration, e))?;

        if let Some(result) = record.calibrated_mut(job.quantity) {
            descriptor.attrs.annotate(result, &modes);
        }

        let groups_written = descriptor
            .save
            .save(&record, store, &job.save)
            .map_err(|e| self.fail(Stage::Save, e))?;

        let (channels, pings, range_samples) = record
            .calibrated(job.quantity)
            .map_or((0, 0, 0), |result| result.values.dim());
        let stats = ConversionStats {
            model: job.model,
            quantity: job.quantity,
            beam_index,
            channels,
            pings,
            samples: channels * pings * range_samples,
            backscatter_bytes,
            mode_warnings: modes.warnings.len(),
            groups_written,
        };
        info!("{}", stats);

        Ok(ConversionOutput {
            record,
            modes,
            stats,
        })
    }
}
