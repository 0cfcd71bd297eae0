//! Expected backscatter payload size, used to sanity check a record and to
//! report conversion progress.

use crate::echodata::{EchoData, EchoDataError};
use crate::modes::{EncodeMode, ResolvedModes, WaveformMode};

/// Errors raised while sizing a payload
#[derive(Debug, thiserror::Error)]
pub enum SizeError {
    /// Mode combination that mode validation should have excluded
    #[error("Internal consistency error: no payload layout for waveform_mode={waveform:?}, encode_mode={encode:?}")]
    InternalConsistency {
        /// Effective waveform mode
        waveform: Option<WaveformMode>,
        /// Effective encode mode
        encode: Option<EncodeMode>,
    },

    /// Record lacks the data the modes call for
    #[error(transparent)]
    EchoData(#[from] EchoDataError),
}

/// Per-model sizing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// Real-valued samples only: size of `backscatter_r` in `Beam_group1`
    RealOnly,
    /// Real and imaginary parts depending on waveform and encode modes
    ModeDependent,
    /// Model has no size estimate
    NoEstimate,
}

impl SizeRule {
    /// Expected payload in bytes, or `None` for models without an estimate
    pub fn estimate(&self, record: &EchoData, modes: &ResolvedModes) -> Result<Option<u64>, SizeError> {
        match self {
            SizeRule::NoEstimate => Ok(None),
            SizeRule::RealOnly => Ok(Some(record.beam_group(0)?.backscatter_r_nbytes())),
            SizeRule::ModeDependent => {
                let index = record.beam_index_for(modes.encode_mode);
                let beam = record.beam_group(index)?;
                let with_imaginary = match (modes.waveform_mode, modes.encode_mode) {
                    (Some(WaveformMode::Bb), _) => true,
                    (Some(WaveformMode::Cw), Some(EncodeMode::Complex)) => true,
                    (Some(WaveformMode::Cw), Some(EncodeMode::Power)) => false,
                    (waveform, encode) => {
                        return Err(SizeError::InternalConsistency { waveform, encode })
                    }
                };

                let mut total = beam.backscatter_r_nbytes();
                if with_imaginary {
                    total += beam
                        .backscatter_i_nbytes()
                        .ok_or_else(|| EchoDataError::MissingField {
                            group: EchoData::beam_group_name(index),
                            field: "backscatter_i",
                        })?;
                }
                Ok(Some(total))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echodata::{BeamGroup, VendorSpecific};
    use crate::model::SonarModel;
    use ndarray::Array3;

    fn modes(w: Option<WaveformMode>, e: Option<EncodeMode>) -> ResolvedModes {
        ResolvedModes {
            waveform_mode: w,
            encode_mode: e,
            warnings: vec![],
        }
    }

    fn full_beam(samples: usize, complex: bool) -> BeamGroup {
        BeamGroup {
            channel: vec!["a".into(), "b".into()],
            ping_time: vec![chrono::Utc::now(); 3],
            backscatter_r: Array3::zeros((2, 3, samples)),
            backscatter_i: complex.then(|| Array3::zeros((2, 3, samples))),
            transmit_duration_nominal: vec![1e-3, 1e-3].into(),
            sample_interval: vec![1e-4, 1e-4].into(),
            cos_tilt_mag: None,
        }
    }

    #[test]
    fn test_real_only() {
        let record = EchoData::new(SonarModel::Ek60, vec![full_beam(10, true)], VendorSpecific::default());
        let size = SizeRule::RealOnly
            .estimate(&record, &modes(Some(WaveformMode::Cw), Some(EncodeMode::Power)))
            .unwrap();
        assert_eq!(size, Some(2 * 3 * 10 * 8));
    }

    #[test]
    fn test_broadband_power_counts_real_part() {
        let record = EchoData::new(SonarModel::Ek80, vec![full_beam(10, true)], VendorSpecific::default());
        let size = SizeRule::ModeDependent
            .estimate(&record, &modes(Some(WaveformMode::Cw), Some(EncodeMode::Power)))
            .unwrap();
        assert_eq!(size, Some(480));
    }

    #[test]
    fn test_broadband_complex_counts_both_parts() {
        let record = EchoData::new(SonarModel::Ek80, vec![full_beam(10, true)], VendorSpecific::default());
        for m in [
            modes(Some(WaveformMode::Bb), Some(EncodeMode::Complex)),
            modes(Some(WaveformMode::Cw), Some(EncodeMode::Complex)),
        ] {
            assert_eq!(SizeRule::ModeDependent.estimate(&record, &m).unwrap(), Some(960));
        }
    }

    #[test]
    fn test_power_reads_second_beam_group() {
        let record = EchoData::new(
            SonarModel::Ek80,
            vec![full_beam(10, true), full_beam(4, false)],
            VendorSpecific::default(),
        );
        let size = SizeRule::ModeDependent
            .estimate(&record, &modes(Some(WaveformMode::Cw), Some(EncodeMode::Power)))
            .unwrap();
        assert_eq!(size, Some(2 * 3 * 4 * 8));
    }

    #[test]
    fn test_missing_modes_is_internal_error() {
        let record = EchoData::new(SonarModel::Ek80, vec![full_beam(10, true)], VendorSpecific::default());
        let err = SizeRule::ModeDependent
            .estimate(&record, &modes(None, Some(EncodeMode::Power)))
            .unwrap_err();
        assert!(matches!(err, SizeError::InternalConsistency { .. }));
    }

    #[test]
    fn test_missing_imaginary_part() {
        let record = EchoData::new(SonarModel::Ek80, vec![full_beam(10, false)], VendorSpecific::default());
        let err = SizeRule::ModeDependent
            .estimate(&record, &modes(Some(WaveformMode::Bb), Some(EncodeMode::Complex)))
            .unwrap_err();
        assert!(matches!(
            err,
            SizeError::EchoData(EchoDataError::MissingField { field: "backscatter_i", .. })
        ));
    }

    #[test]
    fn test_no_estimate() {
        let record = EchoData::new(SonarModel::Ad2cp, vec![full_beam(10, false)], VendorSpecific::default());
        assert_eq!(SizeRule::NoEstimate.estimate(&record, &ResolvedModes::default()).unwrap(), None);
    }
}
