use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampNanosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use log::debug;
use ndarray::Array3;
use parquet::arrow::ArrowWriter;
use parquet::file::reader::{FileReader, SerializedFileReader};
use tempfile::NamedTempFile;

use super::{GroupPayload, GroupStore, SaveOptions, StoreError};

/// Channel identifier column
pub const CHANNEL: &str = "channel";
/// Ping timestamp column (UTC nanoseconds)
pub const PING_TIME: &str = "ping_time";
/// Sample index column
pub const RANGE_SAMPLE: &str = "range_sample";
/// Real part / power counts column
pub const BACKSCATTER_R: &str = "backscatter_r";
/// Imaginary part column, present for complex data only
pub const BACKSCATTER_I: &str = "backscatter_i";
/// Range in meters column of calibrated groups
pub const RANGE: &str = "range";

/// Footer key holding the group name
pub const KEY_GROUP: &str = "echocal:group";
/// Footer key holding the engine name
pub const KEY_ENGINE: &str = "echocal:engine";
/// Footer key holding the compression settings
pub const KEY_COMPRESSION: &str = "echocal:compression";

const GROUP_EXTENSION: &str = "parquet";

/// Container directory with one Parquet file per group.
///
/// `Sonar/Beam_group1` lands in `<root>/Sonar/Beam_group1.parquet`. Each file
/// is written to a temporary file next to its final location and moved into
/// place once complete.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    root: PathBuf,
}

impl ParquetStore {
    /// Open the container at `root`, creating it when absent
    pub fn create(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Container directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `group`
    pub fn group_path(&self, group: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(group);
        let valid = !group.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StoreError::InvalidGroupName(group.to_string()));
        }
        Ok(self.root.join(relative).with_extension(GROUP_EXTENSION))
    }

    /// Attributes stored in the footer of `group`
    pub fn group_attrs(&self, group: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let reader = SerializedFileReader::new(fs::File::open(self.group_path(group)?)?)?;
        let attrs = reader
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .map(|kv| {
                kv.iter()
                    .filter_map(|e| e.value.clone().map(|v| (e.key.clone(), v)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(attrs)
    }

    /// Groups present in the container, sorted
    pub fn groups(&self) -> Result<Vec<String>, StoreError> {
        let mut groups = Vec::new();
        collect_groups(&self.root, &self.root, &mut groups)?;
        groups.sort();
        Ok(groups)
    }
}

fn collect_groups(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_groups(root, &path, out)?;
        } else if path.extension().is_some_and(|e| e == GROUP_EXTENSION) {
            if let Ok(relative) = path.with_extension("").strip_prefix(root) {
                let name: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(name.join("/"));
            }
        }
    }
    Ok(())
}

impl GroupStore for ParquetStore {
    fn write_group(
        &mut self,
        group: &str,
        payload: GroupPayload<'_>,
        options: &SaveOptions,
    ) -> Result<(), StoreError> {
        let path = self.group_path(group)?;
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::InvalidGroupName(group.to_string()))?;
        fs::create_dir_all(parent)?;

        let batch = match payload {
            GroupPayload::Beam(beam) => long_table(
                group,
                &beam.channel,
                &beam.ping_time,
                [
                    Some((BACKSCATTER_R, &beam.backscatter_r)),
                    beam.backscatter_i.as_ref().map(|i| (BACKSCATTER_I, i)),
                ],
            )?,
            GroupPayload::Calibrated(result) => long_table(
                group,
                &result.channel,
                &result.ping_time,
                [
                    Some((result.quantity.name(), &result.values)),
                    Some((RANGE, &result.range)),
                ],
            )?,
        };

        let mut metadata = payload.attrs();
        metadata.insert(KEY_GROUP.to_string(), group.to_string());
        metadata.insert(KEY_ENGINE.to_string(), options.engine.to_string());
        if let Some(compression) = &options.compression {
            metadata.insert(KEY_COMPRESSION.to_string(), compression.to_string());
        }
        let props = options.to_writer_properties(&metadata);

        let temp = NamedTempFile::new_in(parent)?;
        let mut writer = ArrowWriter::try_new(temp.reopen()?, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        temp.persist(&path).map_err(|e| e.error)?;

        debug!(
            "Wrote group {} ({} rows) to {}",
            group,
            batch.num_rows(),
            path.display()
        );
        Ok(())
    }
}

/// One row per (channel, ping_time, range_sample), with one column per
/// sample array. All arrays must share the same shape.
fn long_table<const N: usize>(
    group: &str,
    channel: &[String],
    ping_time: &[DateTime<Utc>],
    samples: [Option<(&str, &Array3<f64>)>; N],
) -> Result<RecordBatch, StoreError> {
    let invalid = |reason: String| StoreError::InvalidData {
        group: group.to_string(),
        reason,
    };

    let samples: Vec<(&str, &Array3<f64>)> = samples.into_iter().flatten().collect();
    let dim = samples
        .first()
        .map(|(_, a)| a.dim())
        .unwrap_or((channel.len(), ping_time.len(), 0));
    let (nc, np, ns) = dim;
    if (nc, np) != (channel.len(), ping_time.len()) {
        return Err(invalid(format!(
            "{} channels x {} pings do not match sample shape {:?}",
            channel.len(),
            ping_time.len(),
            dim
        )));
    }
    if let Some((name, _)) = samples.iter().find(|(_, a)| a.dim() != dim) {
        return Err(invalid(format!("column {name} does not match shape {dim:?}")));
    }

    let nanos = ping_time
        .iter()
        .map(|t| {
            t.timestamp_nanos_opt()
                .ok_or_else(|| invalid(format!("ping_time {t} is out of range")))
        })
        .collect::<Result<Vec<i64>, StoreError>>()?;

    let rows = nc * np * ns;
    let mut channels = Vec::with_capacity(rows);
    let mut times = Vec::with_capacity(rows);
    let mut indices = Vec::with_capacity(rows);
    for ch in channel {
        for t in &nanos {
            for s in 0..ns {
                channels.push(ch.as_str());
                times.push(*t);
                indices.push(s as u64);
            }
        }
    }

    let mut fields = vec![
        Field::new(CHANNEL, DataType::Utf8, false),
        Field::new(
            PING_TIME,
            DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
            false,
        ),
        Field::new(RANGE_SAMPLE, DataType::UInt64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(channels)),
        Arc::new(TimestampNanosecondArray::from(times).with_timezone("UTC")),
        Arc::new(UInt64Array::from(indices)),
    ];
    for (name, values) in samples {
        fields.push(Field::new(name, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from_iter_values(values.iter().copied())));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
