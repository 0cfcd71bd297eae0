use std::collections::BTreeMap;

use log::{debug, info, warn};
use ndarray::{Array1, Array2, Array3, ArrayView1};

use crate::echodata::{BeamGroup, DigitizationParams, EchoData, EchoDataError};
use crate::model::{RangeSource, SonarModelDescriptor};
use crate::range::echo_range;

use super::error::CalibrationError;
use super::params::{
    CalibrationParameters, EnvironmentParameters, ABSORPTION, DS, EL, EQUIVALENT_BEAM_ANGLE,
    SPEED_OF_SOUND, SV_OFFSET, TVR, VTX,
};
use super::result::{CalibratedResult, Quantity, RangeInputs, RangeProfile};

/// Counts-to-volts scaling of the AZFP detector
const COUNTS_PER_DS: f64 = 26214.0;

/// Range bins averaged together; 1 keeps raw resolution
const BINS_TO_AVERAGE: f64 = 1.0;

/// Group name used in shape errors raised outside a record
const BEAM_GROUP: &str = "beam group";

/// Legacy (AZFP) range formula on the (channel, range_sample) grid.
///
/// ```text
/// range(i) = lockout/(2*rate)*c + c/4 * (((2*(i+1)-1)*samples_per_bin*bins - 1)/rate + pulse)
/// ```
///
/// With `tilt` set, the whole profile is scaled by that mean cosine.
/// Every per-channel input must have one value per channel of `beam`.
pub fn legacy_range(
    beam: &BeamGroup,
    digitization: &DigitizationParams,
    sound_speed: ArrayView1<'_, f64>,
    tilt: Option<f64>,
) -> Result<Array2<f64>, CalibrationError> {
    beam.validate(BEAM_GROUP)?;
    let n = beam.channel_count();
    if sound_speed.len() != n {
        return Err(CalibrationError::ChannelCountMismatch {
            key: SPEED_OF_SOUND,
            expected: n,
            actual: sound_speed.len(),
        });
    }
    digitization.check_channels(n)?;

    let pulse_length = beam.transmit_duration_nominal.per_channel();
    let scale = tilt.unwrap_or(1.0);

    Ok(Array2::from_shape_fn(
        (beam.channel_count(), beam.range_sample_count()),
        |(ch, i)| {
            let c = sound_speed[ch];
            let rate = digitization.digitization_rate[ch];
            let index = (i + 1) as f64;
            let range = digitization.lockout_index[ch] / (2.0 * rate) * c
                + c / 4.0
                    * (((2.0 * index - 1.0) * digitization.samples_per_bin[ch] * BINS_TO_AVERAGE
                        - 1.0)
                        / rate
                        + pulse_length[ch]);
            scale * range
        },
    ))
}

/// Per-channel terms shared by the Sv and Sp formulas
struct ChannelTerms {
    el: Array1<f64>,
    ds: Array1<f64>,
    tvr: Array1<f64>,
    vtx: Array1<f64>,
    absorption: Array1<f64>,
    sound_speed: Array1<f64>,
    pulse_length: Array1<f64>,
}

impl ChannelTerms {
    fn gather(
        beam: &BeamGroup,
        env: &EnvironmentParameters,
        cal: &CalibrationParameters,
    ) -> Result<Self, CalibrationError> {
        let n = beam.channel_count();
        Ok(Self {
            el: cal.per_channel(EL, n)?,
            ds: cal.per_channel(DS, n)?,
            tvr: cal.per_channel(TVR, n)?,
            vtx: cal.per_channel(VTX, n)?,
            absorption: env.per_channel(ABSORPTION, n)?,
            sound_speed: env.per_channel(SPEED_OF_SOUND, n)?,
            pulse_length: beam.transmit_duration_nominal.per_channel(),
        })
    }

    /// Terms of the sonar equation that do not depend on range
    fn source_level(&self, ch: usize, counts: f64) -> f64 {
        self.el[ch] - 2.5 / self.ds[ch] + counts / (COUNTS_PER_DS * self.ds[ch])
            - self.tvr[ch]
            - 20.0 * self.vtx[ch].log10()
    }
}

fn check_range_shape(beam: &BeamGroup, range: &RangeProfile) -> Result<(), CalibrationError> {
    beam.validate(BEAM_GROUP)?;
    let expected = (beam.channel_count(), beam.range_sample_count());
    if range.dim() != expected {
        return Err(CalibrationError::RangeShapeMismatch {
            expected,
            actual: range.dim(),
        });
    }
    Ok(())
}

/// Volume backscattering strength for every sample of `beam`.
///
/// Documented as eq. (9) of the AZFP operator's manual, including the
/// frequency-dependent `Sv_offset`.
pub fn volume_backscattering(
    beam: &BeamGroup,
    range: &RangeProfile,
    env: &EnvironmentParameters,
    cal: &CalibrationParameters,
) -> Result<Array3<f64>, CalibrationError> {
    check_range_shape(beam, range)?;
    let terms = ChannelTerms::gather(beam, env, cal)?;
    let n = beam.channel_count();
    let psi = cal.per_channel(EQUIVALENT_BEAM_ANGLE, n)?;
    let sv_offset = cal.per_channel(SV_OFFSET, n)?;
    let r = range.values();

    Ok(Array3::from_shape_fn(beam.backscatter_r.dim(), |(ch, p, s)| {
        terms.source_level(ch, beam.backscatter_r[[ch, p, s]])
            + 20.0 * r[[ch, s]].log10()
            + 2.0 * terms.absorption[ch] * r[[ch, s]]
            - 10.0 * (0.5 * terms.sound_speed[ch] * terms.pulse_length[ch] * psi[ch]).log10()
            + sv_offset[ch]
    }))
}

/// Point backscattering strength for every sample of `beam`
pub fn point_backscattering(
    beam: &BeamGroup,
    range: &RangeProfile,
    env: &EnvironmentParameters,
    cal: &CalibrationParameters,
) -> Result<Array3<f64>, CalibrationError> {
    check_range_shape(beam, range)?;
    let terms = ChannelTerms::gather(beam, env, cal)?;
    let r = range.values();

    Ok(Array3::from_shape_fn(beam.backscatter_r.dim(), |(ch, p, s)| {
        terms.source_level(ch, beam.backscatter_r[[ch, p, s]])
            + 40.0 * r[[ch, s]].log10()
            + 2.0 * terms.absorption[ch] * r[[ch, s]]
    }))
}

/// Turns a record's raw counts into Sv / Sp for one model.
///
/// The engine is pure apart from writing its outputs onto the record handle:
/// the range profile is cached per beam group and the latest result per
/// quantity replaces the previous one.
pub struct CalibrationEngine<'a> {
    descriptor: &'static SonarModelDescriptor,
    env: &'a EnvironmentParameters,
    cal: &'a CalibrationParameters,
    tilt_corrected: bool,
}

impl<'a> CalibrationEngine<'a> {
    /// Engine for `descriptor`'s model with the given constants
    pub fn new(
        descriptor: &'static SonarModelDescriptor,
        env: &'a EnvironmentParameters,
        cal: &'a CalibrationParameters,
    ) -> Self {
        Self {
            descriptor,
            env,
            cal,
            tilt_corrected: false,
        }
    }

    /// Scale the legacy range by the mean tilt cosine
    pub fn with_tilt_correction(mut self, tilt_corrected: bool) -> Self {
        self.tilt_corrected = tilt_corrected;
        self
    }

    /// Range profile of a beam group. The profile is cached on the record
    /// and reused while the sound speed and tilt setting stay the same.
    pub fn range<'e>(
        &self,
        record: &'e mut EchoData,
        beam_index: usize,
    ) -> Result<&'e RangeProfile, CalibrationError> {
        let beam = checked_beam(record, beam_index)?;
        let inputs = RangeInputs {
            sound_speed: self.env.per_channel(SPEED_OF_SOUND, beam.channel_count())?,
            tilt_corrected: self.tilt_corrected,
        };
        if record.cached_range(beam_index, &inputs).is_none() {
            let profile = self.compute_range(record, beam_index, inputs.sound_speed.view())?;
            record.cache_range(beam_index, inputs, profile);
        }
        record
            .range_profile(beam_index)
            .ok_or(CalibrationError::EchoData(EchoDataError::MissingBeamGroup(beam_index)))
    }

    /// Calibrate to Sv and attach the result to the record
    pub fn compute_sv<'e>(
        &self,
        record: &'e mut EchoData,
        beam_index: usize,
    ) -> Result<&'e CalibratedResult, CalibrationError> {
        self.compute(record, beam_index, Quantity::Sv)
    }

    /// Calibrate to Sp and attach the result to the record
    pub fn compute_sp<'e>(
        &self,
        record: &'e mut EchoData,
        beam_index: usize,
    ) -> Result<&'e CalibratedResult, CalibrationError> {
        self.compute(record, beam_index, Quantity::Sp)
    }

    /// Calibrate to `quantity` and attach the result to the record
    pub fn compute<'e>(
        &self,
        record: &'e mut EchoData,
        beam_index: usize,
        quantity: Quantity,
    ) -> Result<&'e CalibratedResult, CalibrationError> {
        self.range(record, beam_index)?;

        let result = {
            let beam = record.beam_group(beam_index)?;
            let range = record
                .range_profile(beam_index)
                .ok_or(EchoDataError::MissingBeamGroup(beam_index))?;

            let values = match quantity {
                Quantity::Sv => volume_backscattering(beam, range, self.env, self.cal)?,
                Quantity::Sp => point_backscattering(beam, range, self.env, self.cal)?,
            };

            let mut attrs = BTreeMap::new();
            attrs.insert("long_name".to_string(), quantity.long_name().to_string());
            attrs.insert("units".to_string(), "dB".to_string());
            attrs.insert("sonar_model".to_string(), self.descriptor.model.to_string());

            CalibratedResult {
                quantity,
                channel: beam.channel.clone(),
                ping_time: beam.ping_time.clone(),
                values,
                range: range.broadcast_pings(beam.ping_count()),
                attrs,
            }
        };

        info!(
            "Calibrated {} samples of {} to {}",
            result.len(),
            EchoData::beam_group_name(beam_index),
            quantity
        );
        Ok(record.set_calibrated(result))
    }

    fn compute_range(
        &self,
        record: &EchoData,
        beam_index: usize,
        sound_speed: ArrayView1<'_, f64>,
    ) -> Result<RangeProfile, CalibrationError> {
        let beam = checked_beam(record, beam_index)?;
        let n = beam.channel_count();

        let uncorrected = match self.descriptor.range_source {
            RangeSource::LegacyFormula => {
                let digitization = record.vendor.digitization(n)?;
                let tilt = if self.tilt_corrected {
                    Some(mean_tilt_cosine(beam, beam_index)?)
                } else {
                    None
                };
                legacy_range(beam, &digitization, sound_speed, tilt)?
            }
            RangeSource::EchoRange => {
                if self.tilt_corrected {
                    warn!(
                        "{} has no tilt-corrected range formula; ignoring tilt correction",
                        self.descriptor.model
                    );
                }
                echo_range(beam, sound_speed)?
            }
        };

        let corrected = self.descriptor.range_correction.apply(
            &uncorrected,
            beam,
            &record.vendor,
            sound_speed,
        )?;
        debug!(
            "Range for {} computed with {:?} / {:?}",
            self.descriptor.model, self.descriptor.range_source, self.descriptor.range_correction
        );
        Ok(RangeProfile::new(corrected))
    }
}

/// Beam group at `beam_index`, with its shapes checked against its
/// coordinates
fn checked_beam(record: &EchoData, beam_index: usize) -> Result<&BeamGroup, CalibrationError> {
    let beam = record.beam_group(beam_index)?;
    beam.validate(&EchoData::beam_group_name(beam_index))?;
    Ok(beam)
}

fn mean_tilt_cosine(beam: &BeamGroup, beam_index: usize) -> Result<f64, CalibrationError> {
    let tilt = beam
        .cos_tilt_mag
        .as_ref()
        .ok_or_else(|| EchoDataError::MissingField {
            group: EchoData::beam_group_name(beam_index),
            field: "cos_tilt_mag",
        })?;
    let mean = tilt.mean().ok_or_else(|| EchoDataError::ShapeMismatch {
        group: EchoData::beam_group_name(beam_index),
        field: "cos_tilt_mag",
        expected: "at least 1 ping".to_string(),
        actual: "0 pings".to_string(),
    })?;
    Ok(mean)
}
