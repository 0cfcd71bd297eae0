//! Range-in-meters corrections per instrument family.
//!
//! * two-sample shift (classic CW family): `sample_interval * c`
//! * pulse shift (broadband family): `c * transmit_duration_nominal / 4`
//!
//! Corrections are subtracted from an explicit uncorrected range on the
//! (channel, range_sample) grid.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::echodata::{BeamGroup, VendorSpecific};

/// Errors raised by range computations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Range grid and beam group disagree on the channel count
    #[error("Range grid has {actual} channels but the beam group has {expected}")]
    ChannelMismatch {
        /// Channels in the beam group
        expected: usize,
        /// Rows of the range grid
        actual: usize,
    },

    /// A per-channel input does not have one value per channel
    #[error("'{field}' has {actual} values but the beam group has {expected} channels")]
    SeriesLength {
        /// Input name
        field: &'static str,
        /// Channels in the beam group
        expected: usize,
        /// Values supplied
        actual: usize,
    },
}

fn check_channels(beam: &BeamGroup, sound_speed: ArrayView1<'_, f64>) -> Result<(), RangeError> {
    let expected = beam.channel_count();
    for (field, actual) in [
        ("speed_of_sound_in_water", sound_speed.len()),
        ("sample_interval", beam.sample_interval.channel_count()),
        (
            "transmit_duration_nominal",
            beam.transmit_duration_nominal.channel_count(),
        ),
    ] {
        if actual != expected {
            return Err(RangeError::SeriesLength {
                field,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Per-model range correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCorrection {
    /// No range correction; the input is returned unchanged
    None,
    /// Subtract the two-sample shift on every channel
    TwoSampleShift,
    /// Subtract the pulse shift on every channel
    PulseShift,
    /// Subtract the pulse shift, except on GPT channels which take the
    /// two-sample shift instead
    PulseShiftWithGptOverride,
}

impl RangeCorrection {
    /// Apply the correction to `uncorrected` (channel x range_sample).
    ///
    /// `sound_speed` holds one value per channel.
    pub fn apply(
        &self,
        uncorrected: &Array2<f64>,
        beam: &BeamGroup,
        vendor: &VendorSpecific,
        sound_speed: ArrayView1<'_, f64>,
    ) -> Result<Array2<f64>, RangeError> {
        let n_channels = beam.channel_count();
        if uncorrected.nrows() != n_channels {
            return Err(RangeError::ChannelMismatch {
                expected: n_channels,
                actual: uncorrected.nrows(),
            });
        }
        check_channels(beam, sound_speed)?;

        let shift = match self {
            RangeCorrection::None => return Ok(uncorrected.clone()),
            RangeCorrection::TwoSampleShift => two_sample_shift(beam, sound_speed),
            RangeCorrection::PulseShift => pulse_shift(beam, sound_speed),
            RangeCorrection::PulseShiftWithGptOverride => {
                let mut shift = pulse_shift(beam, sound_speed);
                let legacy = two_sample_shift(beam, sound_speed);
                for (ch, is_gpt) in vendor.legacy_transceiver_mask(n_channels).into_iter().enumerate() {
                    if is_gpt {
                        shift[ch] = legacy[ch];
                    }
                }
                shift
            }
        };

        Ok(uncorrected - &shift.insert_axis(Axis(1)))
    }
}

/// Two-sample shift per channel: `2 * sample_interval * c / 2`
fn two_sample_shift(beam: &BeamGroup, sound_speed: ArrayView1<'_, f64>) -> Array1<f64> {
    2.0 * beam.sample_interval.per_channel() * &sound_speed / 2.0
}

/// Pulse shift per channel: `c * transmit_duration_nominal / 4`.
///
/// A per-ping pulse length is reduced to one value per channel first, the
/// correction being treated as constant within a channel.
fn pulse_shift(beam: &BeamGroup, sound_speed: ArrayView1<'_, f64>) -> Array1<f64> {
    &sound_speed * &beam.transmit_duration_nominal.per_channel() / 4.0
}

/// Uncorrected echo range `range_sample * sample_interval * c / 2`
/// on the (channel, range_sample) grid.
pub fn echo_range(
    beam: &BeamGroup,
    sound_speed: ArrayView1<'_, f64>,
) -> Result<Array2<f64>, RangeError> {
    check_channels(beam, sound_speed)?;
    let interval = beam.sample_interval.per_channel();
    let n_samples = beam.range_sample_count();
    Ok(Array2::from_shape_fn((beam.channel_count(), n_samples), |(ch, i)| {
        i as f64 * interval[ch] * sound_speed[ch] / 2.0
    }))
}
