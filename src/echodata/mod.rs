//! # Interchange Records
//!
//! In-memory form of a decoded instrument file: one or more beam groups
//! indexed by (channel, ping_time, range_sample) plus the vendor-specific
//! constants the range and calibration formulas need. Records arrive through a
//! [`RecordSource`]; this crate never interprets vendor bytes itself.

mod error;
mod source;
mod types;


pub use error::EchoDataError;
pub use source::{InMemorySource, JsonRecordSource, RecordSource};
pub use types::{
    BeamGroup, ChannelSeries, DigitizationParams, EchoData, VendorSpecific, LEGACY_TRANSCEIVER,
    VENDOR_GROUP,
};
