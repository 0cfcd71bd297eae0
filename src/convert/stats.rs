use std::fmt;

use crate::calibrate::Quantity;
use crate::model::SonarModel;

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionStats {
    /// Model converted
    pub model: SonarModel,
    /// Quantity computed
    pub quantity: Quantity,
    /// Beam group the quantity was computed from (zero based)
    pub beam_index: usize,
    /// Channels in that beam group
    pub channels: usize,
    /// Pings in that beam group
    pub pings: usize,
    /// Calibrated samples
    pub samples: usize,
    /// Expected backscatter payload, for models with an estimate
    pub backscatter_bytes: Option<u64>,
    /// Mode coercions applied
    pub mode_warnings: usize,
    /// Groups written, in order
    pub groups_written: Vec<String>,
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} samples of {} ({} channels x {} pings), {} groups written",
            self.model,
            self.samples,
            self.quantity,
            self.channels,
            self.pings,
            self.groups_written.len()
        )?;
        if let Some(bytes) = self.backscatter_bytes {
            write!(f, ", {bytes} bytes of backscatter")?;
        }
        if self.mode_warnings > 0 {
            write!(f, ", {} mode warnings", self.mode_warnings)?;
        }
        Ok(())
    }
}
