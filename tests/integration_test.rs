//! Integration tests for echocal
//!
//! These tests drive the full pipeline from an interchange record on disk to
//! a Parquet group container.

use chrono::{TimeZone, Utc};
use echocal::attrs::{ENCODE_MODE_ATTR, WAVEFORM_MODE_ATTR};
use echocal::calibrate::params::*;
use echocal::convert::{ConversionJob, Converter, Stage, StageError};
use echocal::echodata::{BeamGroup, ChannelSeries, EchoData, JsonRecordSource, VendorSpecific};
use echocal::model::SonarModel;
use echocal::modes::{EncodeMode, ModeError, WaveformMode};
use echocal::prelude::*;
use echocal::store::{KEY_COMPRESSION, KEY_ENGINE, KEY_GROUP};
use echocal::validator::CheckStatus;
use ndarray::{array, Array1, Array3};
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use tempfile::tempdir;

fn beam(channels: usize, pings: usize, samples: usize, complex: bool) -> BeamGroup {
    BeamGroup {
        channel: (0..channels).map(|c| format!("ch{}", c + 1)).collect(),
        ping_time: (0..pings as i64)
            .map(|p| Utc.timestamp_opt(1_503_000_000 + p, 0).unwrap())
            .collect(),
        backscatter_r: Array3::from_elem((channels, pings, samples), 2000.0),
        backscatter_i: complex.then(|| Array3::from_elem((channels, pings, samples), 0.5)),
        transmit_duration_nominal: vec![1e-3; channels].into(),
        sample_interval: vec![2.56e-5; channels].into(),
        cos_tilt_mag: Some(Array1::ones(pings)),
    }
}

fn write_record(path: &Path, record: &EchoData) {
    let file = File::create(path).unwrap();
    serde_json::to_writer(file, record).unwrap();
}

fn azfp_parameters() -> (EnvironmentParameters, CalibrationParameters) {
    (
        EnvironmentParameters::new()
            .with(SPEED_OF_SOUND, 1500.0)
            .with(ABSORPTION, vec![0.0093, 0.0282]),
        CalibrationParameters::new()
            .with(EL, vec![153.4, 146.7])
            .with(DS, 0.026)
            .with(TVR, vec![169.4, 164.4])
            .with(VTX, vec![151.0, 127.0])
            .with(SV_OFFSET, 1.1)
            .with(EQUIVALENT_BEAM_ANGLE, vec![0.0251, 0.0219]),
    )
}

fn row_count(path: &Path) -> i64 {
    let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();
    reader.metadata().file_metadata().num_rows()
}

/// AZFP record on disk -> Sv in a Parquet container
#[test]
fn test_azfp_json_to_parquet() {
    let dir = tempdir().unwrap();
    let record_path = dir.path().join("17082117.json");
    let container = dir.path().join("17082117.echocal");

    let record = EchoData::new(
        SonarModel::Azfp,
        vec![beam(2, 3, 4, false)],
        VendorSpecific {
            number_of_samples_per_average_bin: Some(array![8273.0, 8273.0]),
            digitization_rate: Some(array![20000.0, 20000.0]),
            lockout_index: Some(array![100.0, 100.0]),
            ..Default::default()
        },
    );
    write_record(&record_path, &record);

    let (env, cal) = azfp_parameters();
    let job = ConversionJob::from_key("AZFP", "17082117.01A")
        .unwrap()
        .with_xml("17041823.XML")
        .with_parameters(env, cal)
        .with_save_options(SaveOptions::resolve(
            Engine::Netcdf4,
            true,
            &Default::default(),
        ));

    let mut store = ParquetStore::create(&container).unwrap();
    let output = Converter::new(job)
        .run(&JsonRecordSource::new(&record_path), &mut store)
        .unwrap();

    assert_eq!(output.stats.samples, 2 * 3 * 4);
    assert_eq!(output.stats.backscatter_bytes, Some(2 * 3 * 4 * 8));
    assert_eq!(
        store.groups().unwrap(),
        vec!["Sonar/Beam_group1".to_string(), "Sv".to_string()]
    );

    // one row per sample in both groups
    assert_eq!(row_count(&store.group_path("Sonar/Beam_group1").unwrap()), 24);
    assert_eq!(row_count(&store.group_path("Sv").unwrap()), 24);

    let attrs = store.group_attrs("Sv").unwrap();
    assert_eq!(attrs[KEY_GROUP], "Sv");
    assert_eq!(attrs[KEY_ENGINE], "netcdf4");
    assert_eq!(attrs[KEY_COMPRESSION], "zstd(4)");
    assert_eq!(attrs["sonar_model"], "AZFP");
    assert!(!attrs.contains_key(WAVEFORM_MODE_ATTR));

    let sv = output.record.calibrated(Quantity::Sv).unwrap();
    assert!(sv.values.iter().all(|v| v.is_finite()));
}

/// EK80 complex data keeps both groups and stamps the modes on disk
#[test]
fn test_ek80_json_to_parquet() {
    let dir = tempdir().unwrap();
    let record_path = dir.path().join("ek80.json");

    let mut complex = beam(2, 2, 6, true);
    // per-ping pulse length is averaged over ping time
    complex.transmit_duration_nominal =
        ChannelSeries::PerPing(array![[1e-3, 1e-3], [5e-4, 1.5e-3]]);
    let record = EchoData::new(
        SonarModel::Ek80,
        vec![complex, beam(2, 2, 6, false)],
        VendorSpecific {
            transceiver_type: Some(vec!["WBT".into(), "WBT".into()]),
            ..Default::default()
        },
    );
    write_record(&record_path, &record);

    let (env, cal) = azfp_parameters();
    let job = ConversionJob::from_key("ek80", "D20210101-T000000.raw")
        .unwrap()
        .with_modes(Some(WaveformMode::Bb), Some(EncodeMode::Complex))
        .with_parameters(env, cal);

    let mut store = ParquetStore::create(dir.path().join("ek80.echocal")).unwrap();
    let output = Converter::new(job)
        .run(&JsonRecordSource::new(&record_path), &mut store)
        .unwrap();

    assert_eq!(output.stats.beam_index, 0);
    // real and imaginary parts
    assert_eq!(output.stats.backscatter_bytes, Some(2 * 2 * 2 * 6 * 8));
    assert_eq!(
        store.groups().unwrap(),
        vec!["Sonar/Beam_group1", "Sonar/Beam_group2", "Sv"]
    );

    let attrs = store.group_attrs("Sv").unwrap();
    assert_eq!(attrs[WAVEFORM_MODE_ATTR], "BB");
    assert_eq!(attrs[ENCODE_MODE_ATTR], "complex");
    assert_eq!(attrs[KEY_ENGINE], "zarr");
}

#[test]
fn test_ek80_missing_modes_writes_nothing() {
    let dir = tempdir().unwrap();
    let record_path = dir.path().join("ek80.json");
    write_record(
        &record_path,
        &EchoData::new(SonarModel::Ek80, vec![beam(1, 2, 3, true)], VendorSpecific::default()),
    );

    let (env, cal) = azfp_parameters();
    let job = ConversionJob::new(SonarModel::Ek80, "D20210101-T000000.raw")
        .with_modes(Some(WaveformMode::Cw), None)
        .with_parameters(env, cal);

    let mut store = ParquetStore::create(dir.path().join("out")).unwrap();
    let err = Converter::new(job)
        .run(&JsonRecordSource::new(&record_path), &mut store)
        .unwrap_err();

    assert_eq!(err.stage, Stage::Modes);
    assert!(matches!(
        err.source,
        StageError::Mode(ModeError::MissingMode {
            field: "encode_mode",
            ..
        })
    ));
    assert!(store.groups().unwrap().is_empty());
}

#[test]
fn test_json_record_for_wrong_model() {
    let dir = tempdir().unwrap();
    let record_path = dir.path().join("ek60.json");
    write_record(
        &record_path,
        &EchoData::new(SonarModel::Ek60, vec![beam(1, 2, 3, false)], VendorSpecific::default()),
    );

    let job = ConversionJob::new(SonarModel::Es70, "D20170101-T000000.raw");
    let err = Converter::new(job)
        .run(&JsonRecordSource::new(&record_path), &mut echocal::store::MemoryStore::new())
        .unwrap_err();
    assert_eq!(err.stage, Stage::Load);
}

#[test]
fn test_check_job_with_record_file() {
    let dir = tempdir().unwrap();
    let record_path = dir.path().join("ek80.json");
    write_record(
        &record_path,
        &EchoData::new(
            SonarModel::Ek80,
            vec![beam(1, 2, 5, true), beam(1, 2, 5, false)],
            VendorSpecific::default(),
        ),
    );

    let (env, cal) = azfp_parameters();
    let job = ConversionJob::new(SonarModel::Ek80, "D20210101-T000000.raw")
        .with_modes(Some(WaveformMode::Cw), Some(EncodeMode::Power))
        .with_parameters(env, cal);
    let source = JsonRecordSource::new(&record_path);
    let report = check_job(&job, Some(&source));

    assert!(!report.has_failures(), "{report}");
    // the raw file itself is not on disk
    assert!(report.has_warnings());
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "Backscatter size (80 bytes)" && c.status == CheckStatus::Ok));
    assert!(report.to_string().ends_with("Check PASSED with warnings\n"));
}
