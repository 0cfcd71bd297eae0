use super::params::*;
use super::*;
use crate::echodata::{BeamGroup, ChannelSeries, EchoData, EchoDataError, VendorSpecific};
use crate::model::SonarModel;
use chrono::{TimeZone, Utc};
use ndarray::{array, Array1, Array2, Array3};

fn azfp_beam(samples: usize) -> BeamGroup {
    BeamGroup {
        channel: vec!["38000".into()],
        ping_time: (0..2)
            .map(|p| Utc.timestamp_opt(1_503_000_000 + p, 0).unwrap())
            .collect(),
        backscatter_r: Array3::from_elem((1, 2, samples), 1000.0),
        backscatter_i: None,
        transmit_duration_nominal: vec![0.0001].into(),
        sample_interval: vec![0.0001].into(),
        cos_tilt_mag: Some(array![0.5, 1.0]),
    }
}

/// One ping, one sample of 1000 counts
fn single_sample_beam() -> BeamGroup {
    let mut beam = azfp_beam(1);
    beam.ping_time.truncate(1);
    beam.backscatter_r = Array3::from_elem((1, 1, 1), 1000.0);
    beam.cos_tilt_mag = Some(array![1.0]);
    beam
}

fn azfp_vendor() -> VendorSpecific {
    VendorSpecific {
        number_of_samples_per_average_bin: Some(array![8273.0]),
        digitization_rate: Some(array![20000.0]),
        lockout_index: Some(array![100.0]),
        ..Default::default()
    }
}

fn azfp_record() -> EchoData {
    EchoData::new(SonarModel::Azfp, vec![azfp_beam(3)], azfp_vendor())
}

fn env() -> EnvironmentParameters {
    EnvironmentParameters::new()
        .with(SPEED_OF_SOUND, 1500.0)
        .with(ABSORPTION, 0.01)
}

fn cal() -> CalibrationParameters {
    CalibrationParameters::new()
        .with(EL, 170.0)
        .with(DS, 0.02)
        .with(TVR, 180.0)
        .with(VTX, 170.0)
        .with(SV_OFFSET, 2.0)
        .with(EQUIVALENT_BEAM_ANGLE, 0.01)
}

#[test]
fn test_legacy_range_scenario() {
    let beam = azfp_beam(3);
    let digitization = azfp_vendor().digitization(1).unwrap();
    let range = legacy_range(&beam, &digitization, array![1500.0].view(), None).unwrap();

    let expected = [158.8875, 469.125, 779.3625];
    assert_eq!(range.dim(), (1, 3));
    for (got, want) in range.iter().zip(expected) {
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
}

#[test]
fn test_legacy_range_tilt_scaling() {
    let beam = azfp_beam(1);
    let digitization = azfp_vendor().digitization(1).unwrap();
    let range = legacy_range(&beam, &digitization, array![1500.0].view(), Some(0.75)).unwrap();
    assert!((range[[0, 0]] - 0.75 * 158.8875).abs() < 1e-3);
}

#[test]
fn test_sv_scenario() {
    let beam = single_sample_beam();
    let range = RangeProfile::new(array![[100.0]]);

    let sv = volume_backscattering(&beam, &range, &env(), &cal()).unwrap();
    assert!((sv[[0, 0, 0]] - -102.45).abs() < 0.05, "Sv = {}", sv[[0, 0, 0]]);
}

#[test]
fn test_sp_scenario() {
    let beam = single_sample_beam();
    let range = RangeProfile::new(array![[100.0]]);

    // Sp does not need Sv_offset or the beam angle
    let cal = CalibrationParameters::new()
        .with(EL, 170.0)
        .with(DS, 0.02)
        .with(TVR, 180.0)
        .with(VTX, 170.0);
    let sp = point_backscattering(&beam, &range, &env(), &cal).unwrap();
    assert!((sp[[0, 0, 0]] - -95.70).abs() < 0.05, "Sp = {}", sp[[0, 0, 0]]);
}

#[test]
fn test_missing_parameter_is_named() {
    let beam = azfp_beam(1);
    let range = RangeProfile::new(array![[100.0]]);
    let cal = CalibrationParameters::new()
        .with(EL, 170.0)
        .with(DS, 0.02)
        .with(TVR, 180.0)
        .with(VTX, 170.0);

    let err = volume_backscattering(&beam, &range, &env(), &cal).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::MissingParameter {
            set: "calibration",
            key: EQUIVALENT_BEAM_ANGLE
        }
    ));
    assert!(err.to_string().contains("equivalent_beam_angle"));

    let env = EnvironmentParameters::new().with(SPEED_OF_SOUND, 1500.0);
    let err = point_backscattering(&beam, &range, &env, &cal).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::MissingParameter {
            set: "environment",
            key: ABSORPTION
        }
    ));
}

#[test]
fn test_missing_keys_listing() {
    assert!(cal().missing_keys().is_empty());
    assert_eq!(
        EnvironmentParameters::new().with(ABSORPTION, 0.1).missing_keys(),
        vec![SPEED_OF_SOUND]
    );
}

#[test]
fn test_per_channel_parameters() {
    let params = CalibrationParameters::new()
        .with(EL, vec![170.0, 171.0])
        .with(DS, 0.02);
    assert_eq!(params.per_channel(EL, 2).unwrap(), array![170.0, 171.0]);
    assert_eq!(params.per_channel(DS, 2).unwrap(), array![0.02, 0.02]);
    assert!(matches!(
        params.per_channel(EL, 3),
        Err(CalibrationError::ChannelCountMismatch {
            key: EL,
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_parameters_from_toml() {
    let toml = r#"
        EL = 170
        DS = [0.02, 0.03]
    "#;
    let params: CalibrationParameters = toml::from_str(toml).unwrap();
    assert_eq!(params.get(EL), Some(&ParamValue::Scalar(170.0)));
    assert_eq!(params.get(DS), Some(&ParamValue::PerChannel(vec![0.02, 0.03])));
}

#[test]
fn test_range_shape_is_checked() {
    let beam = azfp_beam(3);
    let range = RangeProfile::new(Array2::zeros((1, 2)));
    assert!(matches!(
        volume_backscattering(&beam, &range, &env(), &cal()),
        Err(CalibrationError::RangeShapeMismatch { .. })
    ));
}

#[test]
fn test_engine_attaches_sv_with_broadcast_range() {
    let mut record = azfp_record();
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal);

    let sv = engine.compute_sv(&mut record, 0).unwrap();
    assert_eq!(sv.quantity, Quantity::Sv);
    assert_eq!(sv.values.dim(), (1, 2, 3));
    assert_eq!(sv.range.dim(), (1, 2, 3));
    assert!((sv.range[[0, 1, 2]] - 779.3625).abs() < 1e-3);
    assert_eq!(sv.range[[0, 0, 1]], sv.range[[0, 1, 1]]);
    assert_eq!(sv.attrs.get("units").map(String::as_str), Some("dB"));

    assert!(record.calibrated(Quantity::Sv).is_some());
    assert!(record.calibrated(Quantity::Sp).is_none());
    assert!(record.range_profile(0).is_some());
}

#[test]
fn test_engine_is_idempotent() {
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal);

    let mut record = azfp_record();
    let first = engine.compute_sv(&mut record, 0).unwrap().clone();
    let second = engine.compute_sv(&mut record, 0).unwrap().clone();
    assert_eq!(first, second);

    let mut fresh = azfp_record();
    let third = engine.compute_sp(&mut fresh, 0).unwrap().values.clone();
    let fourth = engine.compute_sp(&mut fresh, 0).unwrap().values.clone();
    let bits = |a: &Array3<f64>| a.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&third), bits(&fourth));
}

#[test]
fn test_engine_tilt_correction() {
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal)
        .with_tilt_correction(true);

    let mut record = azfp_record();
    let range = engine.range(&mut record, 0).unwrap();
    // mean of [0.5, 1.0]
    assert!((range.values()[[0, 0]] - 0.75 * 158.8875).abs() < 1e-3);

    let mut record = azfp_record();
    record.beam_groups[0].cos_tilt_mag = None;
    assert!(matches!(
        engine.range(&mut record, 0),
        Err(CalibrationError::EchoData(EchoDataError::MissingField {
            field: "cos_tilt_mag",
            ..
        }))
    ));
}

#[test]
fn test_engine_missing_vendor_field() {
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal);
    let mut record = EchoData::new(SonarModel::Azfp, vec![azfp_beam(3)], VendorSpecific::default());
    assert!(matches!(
        engine.compute_sv(&mut record, 0),
        Err(CalibrationError::EchoData(EchoDataError::MissingField { .. }))
    ));
}

#[test]
fn test_engine_classic_cw_range_is_shifted() {
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Ek60.descriptor(), &env, &cal);

    let mut beam = azfp_beam(4);
    beam.sample_interval = ChannelSeries::PerChannel(Array1::from(vec![2.56e-4]));
    let mut record = EchoData::new(SonarModel::Ek60, vec![beam], VendorSpecific::default());

    let range = engine.range(&mut record, 0).unwrap();
    // i * 0.192 - 0.384
    let expected = [-0.384, -0.192, 0.0, 0.192];
    for (got, want) in range.values().iter().zip(expected) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn test_range_recomputed_when_sound_speed_changes() {
    let cal = cal();
    let env_1500 = env();
    let env_1400 = EnvironmentParameters::new()
        .with(SPEED_OF_SOUND, 1400.0)
        .with(ABSORPTION, 0.01);
    let descriptor = SonarModel::Azfp.descriptor();

    let mut record = azfp_record();
    let at_1500 = CalibrationEngine::new(descriptor, &env_1500, &cal)
        .compute_sv(&mut record, 0)
        .unwrap()
        .clone();
    let at_1400 = CalibrationEngine::new(descriptor, &env_1400, &cal)
        .compute_sv(&mut record, 0)
        .unwrap()
        .clone();
    assert!((at_1500.range[[0, 0, 0]] - 158.8875).abs() < 1e-3);
    assert!((at_1400.range[[0, 0, 0]] - 148.295).abs() < 1e-3);

    // same as calibrating a fresh record
    let mut fresh = azfp_record();
    let expected = CalibrationEngine::new(descriptor, &env_1400, &cal)
        .compute_sv(&mut fresh, 0)
        .unwrap()
        .clone();
    assert_eq!(at_1400, expected);
}

#[test]
fn test_range_recomputed_when_tilt_setting_changes() {
    let env = env();
    let cal = cal();
    let plain = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal);
    let tilted = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal)
        .with_tilt_correction(true);

    let mut record = azfp_record();
    let first = plain.range(&mut record, 0).unwrap().values()[[0, 0]];
    let second = tilted.range(&mut record, 0).unwrap().values()[[0, 0]];
    let third = plain.range(&mut record, 0).unwrap().values()[[0, 0]];
    assert!((first - 158.8875).abs() < 1e-3);
    assert!((second - 0.75 * 158.8875).abs() < 1e-3);
    assert_eq!(first.to_bits(), third.to_bits());
}

#[test]
fn test_inconsistent_record_is_an_error() {
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Ek60.descriptor(), &env, &cal);

    // two channels but a single sample interval
    let mut beam = azfp_beam(3);
    beam.channel.push("120000".into());
    beam.backscatter_r = Array3::from_elem((2, 2, 3), 1000.0);
    beam.transmit_duration_nominal = vec![1e-4, 1e-4].into();
    let mut record = EchoData::new(SonarModel::Ek60, vec![beam.clone()], VendorSpecific::default());

    assert!(matches!(
        engine.compute_sv(&mut record, 0),
        Err(CalibrationError::EchoData(EchoDataError::ShapeMismatch {
            field: "sample_interval",
            ..
        }))
    ));

    let range = RangeProfile::new(Array2::from_elem((2, 3), 100.0));
    assert!(matches!(
        volume_backscattering(&beam, &range, &env, &cal),
        Err(CalibrationError::EchoData(EchoDataError::ShapeMismatch { .. }))
    ));

    // backscatter with fewer channels than the coordinate
    let mut beam = azfp_beam(3);
    beam.channel.push("120000".into());
    beam.transmit_duration_nominal = vec![1e-4, 1e-4].into();
    beam.sample_interval = vec![1e-4, 1e-4].into();
    assert!(matches!(
        point_backscattering(&beam, &range, &env, &cal),
        Err(CalibrationError::EchoData(EchoDataError::ShapeMismatch {
            field: "backscatter_r",
            ..
        }))
    ));
}

#[test]
fn test_legacy_range_checks_channel_inputs() {
    let beam = azfp_beam(3);
    let digitization = azfp_vendor().digitization(1).unwrap();
    assert!(matches!(
        legacy_range(&beam, &digitization, array![1500.0, 1500.0].view(), None),
        Err(CalibrationError::ChannelCountMismatch {
            key: SPEED_OF_SOUND,
            expected: 1,
            actual: 2
        })
    ));

    let mut digitization = digitization;
    digitization.lockout_index = array![100.0, 100.0];
    assert!(matches!(
        legacy_range(&beam, &digitization, array![1500.0].view(), None),
        Err(CalibrationError::EchoData(EchoDataError::ShapeMismatch {
            field: "lockout_index",
            ..
        }))
    ));
}

#[test]
fn test_empty_tilt_series_is_an_error() {
    let env = env();
    let cal = cal();
    let engine = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal)
        .with_tilt_correction(true);

    let mut beam = azfp_beam(3);
    beam.ping_time.clear();
    beam.backscatter_r = Array3::zeros((1, 0, 3));
    beam.cos_tilt_mag = Some(Array1::zeros(0));
    let mut record = EchoData::new(SonarModel::Azfp, vec![beam], azfp_vendor());

    assert!(matches!(
        engine.range(&mut record, 0),
        Err(CalibrationError::EchoData(EchoDataError::ShapeMismatch {
            field: "cos_tilt_mag",
            ..
        }))
    ));
}
