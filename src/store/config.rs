use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;
use serde::{Deserialize, Serialize};

use crate::calibrate::Quantity;

use super::error::StoreError;
use super::parquet_store::{BACKSCATTER_I, BACKSCATTER_R, CHANNEL, RANGE};

/// Storage engine named by the caller
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// NetCDF4 / HDF5 flavoured output
    Netcdf4,
    /// Zarr flavoured output
    #[default]
    Zarr,
}

impl Engine {
    /// Engine name used as configuration key
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Netcdf4 => "netcdf4",
            Engine::Zarr => "zarr",
        }
    }

    /// Compression applied when the caller asks for compression without
    /// overriding the settings for this engine
    pub fn default_compression(&self) -> CompressionSettings {
        match self {
            Engine::Netcdf4 => CompressionSettings::zstd(4),
            Engine::Zarr => CompressionSettings::zstd(3),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "netcdf4" => Ok(Engine::Netcdf4),
            "zarr" => Ok(Engine::Zarr),
            _ => Err(StoreError::UnknownEngine(s.to_string())),
        }
    }
}

/// Compression codec for group payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// ZSTD at the configured level
    Zstd,
    /// Snappy (level ignored)
    Snappy,
    /// No compression
    Uncompressed,
}

/// Codec plus level, as given under `[compression.<engine>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionSettings {
    /// Codec
    pub codec: Codec,
    /// Codec level, where the codec has one
    #[serde(default)]
    pub level: Option<i32>,
}

impl CompressionSettings {
    /// ZSTD at `level`
    pub fn zstd(level: i32) -> Self {
        Self {
            codec: Codec::Zstd,
            level: Some(level),
        }
    }

    /// Parquet compression for these settings. Out-of-range ZSTD levels fall
    /// back to the library default.
    pub fn to_parquet(&self) -> Compression {
        match self.codec {
            Codec::Zstd => {
                let level = self
                    .level
                    .and_then(|l| ZstdLevel::try_new(l).ok())
                    .unwrap_or_default();
                Compression::ZSTD(level)
            }
            Codec::Snappy => Compression::SNAPPY,
            Codec::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

impl fmt::Display for CompressionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.codec, self.level) {
            (Codec::Zstd, Some(level)) => write!(f, "zstd({level})"),
            (Codec::Zstd, None) => write!(f, "zstd"),
            (Codec::Snappy, _) => write!(f, "snappy"),
            (Codec::Uncompressed, _) => write!(f, "uncompressed"),
        }
    }
}

/// How groups are written: engine plus optional compression.
///
/// Writes are always in append mode: groups already in the container are
/// kept and a missing group is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Engine name carried through to the store
    pub engine: Engine,
    /// `None` leaves payloads uncompressed
    pub compression: Option<CompressionSettings>,
}

impl SaveOptions {
    /// Uncompressed output for `engine`
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            compression: None,
        }
    }

    /// Resolve options from the `compress` flag and per-engine overrides,
    /// keyed by engine name.
    pub fn resolve(
        engine: Engine,
        compress: bool,
        overrides: &BTreeMap<String, CompressionSettings>,
    ) -> Self {
        let compression = compress.then(|| {
            overrides
                .get(engine.as_str())
                .copied()
                .unwrap_or_else(|| engine.default_compression())
        });
        Self {
            engine,
            compression,
        }
    }

    /// Replace the compression settings
    pub fn with_compression(mut self, settings: CompressionSettings) -> Self {
        self.compression = Some(settings);
        self
    }

    /// Writer properties for one group file, carrying `metadata` in the footer
    pub(crate) fn to_writer_properties(&self, metadata: &BTreeMap<String, String>) -> WriterProperties {
        let compression = self
            .compression
            .map(|c| c.to_parquet())
            .unwrap_or(Compression::UNCOMPRESSED);

        let mut builder = WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(EnabledStatistics::Chunk)
            .set_column_dictionary_enabled(ColumnPath::new(vec![CHANNEL.to_string()]), true);

        // sample columns are high-cardinality floats
        for col in [BACKSCATTER_R, BACKSCATTER_I, RANGE, Quantity::Sv.name(), Quantity::Sp.name()] {
            let path = ColumnPath::new(vec![col.to_string()]);
            builder = builder
                .set_column_dictionary_enabled(path.clone(), false)
                .set_column_encoding(path, Encoding::BYTE_STREAM_SPLIT);
        }

        let kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();

        builder.set_key_value_metadata(Some(kv_metadata)).build()
    }
}
