use std::collections::BTreeMap;
use std::mem::size_of;

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::calibrate::{CalibratedResult, Quantity, RangeInputs, RangeProfile};
use crate::model::{SonarFamily, SonarModel};
use crate::modes::EncodeMode;

use super::error::EchoDataError;

/// Transceiver type string of Simrad's legacy GPT units
pub const LEGACY_TRANSCEIVER: &str = "GPT";

/// Name of the vendor-specific group, used in error messages
pub const VENDOR_GROUP: &str = "Vendor_specific";

/// A per-channel value that may also vary per ping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSeries {
    /// One value per channel
    PerChannel(Array1<f64>),
    /// One value per (channel, ping_time)
    PerPing(Array2<f64>),
}

impl ChannelSeries {
    /// Number of channels covered
    pub fn channel_count(&self) -> usize {
        match self {
            ChannelSeries::PerChannel(a) => a.len(),
            ChannelSeries::PerPing(a) => a.nrows(),
        }
    }

    /// One representative value per channel; per-ping values are averaged
    /// over ping time and the ping dimension is dropped.
    pub fn per_channel(&self) -> Array1<f64> {
        match self {
            ChannelSeries::PerChannel(a) => a.clone(),
            ChannelSeries::PerPing(a) => a
                .mean_axis(Axis(1))
                .unwrap_or_else(|| Array1::from_elem(a.nrows(), f64::NAN)),
        }
    }
}

impl From<Vec<f64>> for ChannelSeries {
    fn from(values: Vec<f64>) -> Self {
        ChannelSeries::PerChannel(Array1::from(values))
    }
}

/// One `Sonar/Beam_groupN` worth of acoustic samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamGroup {
    /// Channel identifiers
    pub channel: Vec<String>,
    /// Ping timestamps
    pub ping_time: Vec<DateTime<Utc>>,
    /// Real part (or power counts), shape (channel, ping_time, range_sample)
    pub backscatter_r: Array3<f64>,
    /// Imaginary part for complex data, same shape as `backscatter_r`
    #[serde(default)]
    pub backscatter_i: Option<Array3<f64>>,
    /// Nominal pulse length in seconds
    pub transmit_duration_nominal: ChannelSeries,
    /// Time between samples in seconds
    pub sample_interval: ChannelSeries,
    /// Cosine of the instrument tilt magnitude, per ping
    #[serde(default)]
    pub cos_tilt_mag: Option<Array1<f64>>,
}

impl BeamGroup {
    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channel.len()
    }

    /// Number of pings
    pub fn ping_count(&self) -> usize {
        self.ping_time.len()
    }

    /// Number of range samples per ping
    pub fn range_sample_count(&self) -> usize {
        self.backscatter_r.len_of(Axis(2))
    }

    /// In-memory size of `backscatter_r` in bytes
    pub fn backscatter_r_nbytes(&self) -> u64 {
        (self.backscatter_r.len() * size_of::<f64>()) as u64
    }

    /// In-memory size of `backscatter_i` in bytes, if present
    pub fn backscatter_i_nbytes(&self) -> Option<u64> {
        self.backscatter_i
            .as_ref()
            .map(|i| (i.len() * size_of::<f64>()) as u64)
    }

    /// Check array shapes against the channel and ping coordinates
    pub fn validate(&self, group: &str) -> Result<(), EchoDataError> {
        let expected = (self.channel_count(), self.ping_count());
        let (nc, np, ns) = self.backscatter_r.dim();
        if (nc, np) != expected {
            return Err(shape_mismatch(
                group,
                "backscatter_r",
                format!("({}, {}, *)", expected.0, expected.1),
                format!("({nc}, {np}, {ns})"),
            ));
        }
        if let Some(imag) = &self.backscatter_i {
            if imag.dim() != self.backscatter_r.dim() {
                return Err(shape_mismatch(
                    group,
                    "backscatter_i",
                    format!("{:?}", self.backscatter_r.dim()),
                    format!("{:?}", imag.dim()),
                ));
            }
        }
        for (field, series) in [
            ("transmit_duration_nominal", &self.transmit_duration_nominal),
            ("sample_interval", &self.sample_interval),
        ] {
            if series.channel_count() != nc {
                return Err(shape_mismatch(
                    group,
                    field,
                    format!("{nc} channels"),
                    format!("{} channels", series.channel_count()),
                ));
            }
        }
        if let Some(tilt) = &self.cos_tilt_mag {
            if tilt.len() != np {
                return Err(shape_mismatch(
                    group,
                    "cos_tilt_mag",
                    format!("{np} pings"),
                    format!("{} pings", tilt.len()),
                ));
            }
        }
        Ok(())
    }
}

fn shape_mismatch(group: &str, field: &'static str, expected: String, actual: String) -> EchoDataError {
    EchoDataError::ShapeMismatch {
        group: group.to_string(),
        field,
        expected,
        actual,
    }
}

/// Vendor-specific fields needed by range and calibration formulas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorSpecific {
    /// Transceiver type per channel (Simrad)
    #[serde(default)]
    pub transceiver_type: Option<Vec<String>>,
    /// Samples averaged into one range bin, per channel (AZFP)
    #[serde(default)]
    pub number_of_samples_per_average_bin: Option<Array1<f64>>,
    /// Digitization rate in Hz, per channel (AZFP)
    #[serde(default)]
    pub digitization_rate: Option<Array1<f64>>,
    /// Lockout index, per channel (AZFP)
    #[serde(default)]
    pub lockout_index: Option<Array1<f64>>,
}

/// Values copied out of the vendor group for the legacy range formula
#[derive(Debug, Clone, PartialEq)]
pub struct DigitizationParams {
    /// Samples per average bin
    pub samples_per_bin: Array1<f64>,
    /// Digitization rate (Hz)
    pub digitization_rate: Array1<f64>,
    /// Lockout index
    pub lockout_index: Array1<f64>,
}

impl DigitizationParams {
    /// Check that every field has one value per channel
    pub fn check_channels(&self, n_channels: usize) -> Result<(), EchoDataError> {
        for (field, values) in [
            ("number_of_samples_per_average_bin", &self.samples_per_bin),
            ("digitization_rate", &self.digitization_rate),
            ("lockout_index", &self.lockout_index),
        ] {
            if values.len() != n_channels {
                return Err(shape_mismatch(
                    VENDOR_GROUP,
                    field,
                    format!("{n_channels} channels"),
                    format!("{} channels", values.len()),
                ));
            }
        }
        Ok(())
    }
}

impl VendorSpecific {
    /// Copy the digitization constants for `n_channels` channels.
    pub fn digitization(&self, n_channels: usize) -> Result<DigitizationParams, EchoDataError> {
        Ok(DigitizationParams {
            samples_per_bin: per_channel_field(
                "number_of_samples_per_average_bin",
                &self.number_of_samples_per_average_bin,
                n_channels,
            )?,
            digitization_rate: per_channel_field(
                "digitization_rate",
                &self.digitization_rate,
                n_channels,
            )?,
            lockout_index: per_channel_field("lockout_index", &self.lockout_index, n_channels)?,
        })
    }

    /// Channels driven by a legacy GPT transceiver. All false when the
    /// record carries no transceiver types.
    pub fn legacy_transceiver_mask(&self, n_channels: usize) -> Vec<bool> {
        match &self.transceiver_type {
            Some(types) => (0..n_channels)
                .map(|i| types.get(i).is_some_and(|t| t == LEGACY_TRANSCEIVER))
                .collect(),
            None => vec![false; n_channels],
        }
    }
}

fn per_channel_field(
    field: &'static str,
    value: &Option<Array1<f64>>,
    n_channels: usize,
) -> Result<Array1<f64>, EchoDataError> {
    let value = value.as_ref().ok_or_else(|| EchoDataError::MissingField {
        group: VENDOR_GROUP.to_string(),
        field,
    })?;
    if value.len() != n_channels {
        return Err(shape_mismatch(
            VENDOR_GROUP,
            field,
            format!("{n_channels} channels"),
            format!("{} channels", value.len()),
        ));
    }
    Ok(value.clone())
}

/// A parsed instrument record plus the results derived from it.
///
/// This is the caller's handle during a conversion: the range profile and the
/// calibrated quantities are attached to it as they are computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoData {
    /// Model whose parser produced the record
    pub sonar_model: SonarModel,
    /// `Sonar/Beam_group1`, `Sonar/Beam_group2`, ...
    pub beam_groups: Vec<BeamGroup>,
    /// Vendor-specific group
    #[serde(default)]
    pub vendor: VendorSpecific,
    #[serde(skip)]
    range_cache: BTreeMap<usize, (RangeInputs, RangeProfile)>,
    #[serde(skip)]
    calibrated: BTreeMap<Quantity, CalibratedResult>,
}

impl EchoData {
    /// Create a record with no derived results
    pub fn new(sonar_model: SonarModel, beam_groups: Vec<BeamGroup>, vendor: VendorSpecific) -> Self {
        Self {
            sonar_model,
            beam_groups,
            vendor,
            range_cache: BTreeMap::new(),
            calibrated: BTreeMap::new(),
        }
    }

    /// Group path of the beam group at `index` (zero based)
    pub fn beam_group_name(index: usize) -> String {
        format!("Sonar/Beam_group{}", index + 1)
    }

    /// Beam group at `index` (zero based)
    pub fn beam_group(&self, index: usize) -> Result<&BeamGroup, EchoDataError> {
        self.beam_groups
            .get(index)
            .ok_or(EchoDataError::MissingBeamGroup(index))
    }

    /// Beam group holding the samples for an encode mode. Broadband records
    /// keep power samples in `Beam_group2` when they have one; every other
    /// family reads `Beam_group1`.
    pub fn beam_index_for(&self, encode_mode: Option<EncodeMode>) -> usize {
        match (self.sonar_model.family(), encode_mode) {
            (SonarFamily::Broadband, Some(EncodeMode::Power)) if self.beam_groups.len() > 1 => 1,
            _ => 0,
        }
    }

    /// Check that the record is internally consistent
    pub fn validate(&self) -> Result<(), EchoDataError> {
        if self.beam_groups.is_empty() {
            return Err(EchoDataError::NoBeamGroups);
        }
        for (i, beam) in self.beam_groups.iter().enumerate() {
            beam.validate(&Self::beam_group_name(i))?;
        }
        Ok(())
    }

    /// Cached range profile for a beam group
    pub fn range_profile(&self, beam_index: usize) -> Option<&RangeProfile> {
        self.range_cache.get(&beam_index).map(|(_, profile)| profile)
    }

    /// Cached range profile, if it was computed from `inputs`
    pub(crate) fn cached_range(&self, beam_index: usize, inputs: &RangeInputs) -> Option<&RangeProfile> {
        self.range_cache
            .get(&beam_index)
            .filter(|(cached, _)| cached == inputs)
            .map(|(_, profile)| profile)
    }

    pub(crate) fn cache_range(&mut self, beam_index: usize, inputs: RangeInputs, profile: RangeProfile) {
        self.range_cache.insert(beam_index, (inputs, profile));
    }

    /// Most recent calibrated result for a quantity
    pub fn calibrated(&self, quantity: Quantity) -> Option<&CalibratedResult> {
        self.calibrated.get(&quantity)
    }

    pub(crate) fn calibrated_mut(&mut self, quantity: Quantity) -> Option<&mut CalibratedResult> {
        self.calibrated.get_mut(&quantity)
    }

    pub(crate) fn set_calibrated(&mut self, result: CalibratedResult) -> &CalibratedResult {
        let quantity = result.quantity;
        self.calibrated.insert(quantity, result);
        &self.calibrated[&quantity]
    }
}
