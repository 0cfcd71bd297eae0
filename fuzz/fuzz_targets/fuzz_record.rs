#![no_main]

use echocal::calibrate::params::*;
use echocal::calibrate::{CalibrationParameters, EnvironmentParameters, Quantity};
use echocal::convert::{ConversionJob, Converter};
use echocal::echodata::{EchoData, InMemorySource};
use echocal::model::ExtensionRule;
use echocal::modes::{EncodeMode, WaveformMode};
use echocal::store::MemoryStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Interchange records come from external decoders; malformed ones must
    // fail with an error, never a panic.
    let Ok(record) = serde_json::from_slice::<EchoData>(data) else {
        return;
    };

    let env = EnvironmentParameters::new()
        .with(SPEED_OF_SOUND, 1500.0)
        .with(ABSORPTION, 0.01);
    let cal = CalibrationParameters::new()
        .with(EL, 170.0)
        .with(DS, 0.02)
        .with(TVR, 180.0)
        .with(VTX, 170.0)
        .with(SV_OFFSET, 2.0)
        .with(EQUIVALENT_BEAM_ANGLE, 0.01);

    let model = record.sonar_model;
    let raw_file = match model.descriptor().extension {
        ExtensionRule::DigitsLetter => "fuzz.01A".to_string(),
        ExtensionRule::Exact(ext) => format!("fuzz{ext}"),
    };

    for quantity in [Quantity::Sv, Quantity::Sp] {
        let job = ConversionJob::new(model, &raw_file)
            .with_xml("fuzz.XML")
            .with_modes(Some(WaveformMode::Cw), Some(EncodeMode::Power))
            .with_parameters(env.clone(), cal.clone())
            .with_quantity(quantity)
            .with_tilt_correction(true);

        let source = InMemorySource::new(record.clone());
        let _ = Converter::new(job).run(&source, &mut MemoryStore::new());
    }
});
