use std::fmt;
use std::path::Path;

use log::warn;

use crate::attrs::AttrsRule;
use crate::modes::ModeCheck;
use crate::range::RangeCorrection;
use crate::size::SizeRule;
use crate::store::SaveRule;

use super::error::RegistryError;
use super::extension::ExtensionRule;
use super::SonarModel;

/// External raw-file decoder that handles a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// AZFP `.XXY` + XML decoder
    Azfp,
    /// AZFP6 `.azfp` decoder
    Azfp6,
    /// Simrad EK60-style `.raw` decoder (also ES70)
    Ek60,
    /// Simrad EK80-style `.raw` decoder (also ES80, EA640)
    Ek80,
    /// Nortek `.ad2cp` decoder
    Ad2cp,
}

/// External builder of convention groups for a parsed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBuilderKind {
    /// AZFP group layout
    Azfp,
    /// AZFP6 group layout
    Azfp6,
    /// EK60 group layout
    Ek60,
    /// EK80 group layout
    Ek80,
    /// AD2CP group layout (variable number of beam groups)
    Ad2cp,
}

/// Where the uncorrected range profile of a model comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSource {
    /// AZFP lockout/digitization formula
    LegacyFormula,
    /// `range_sample * sample_interval * c / 2`
    EchoRange,
}

/// Registry entry describing everything model-specific about a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SonarModelDescriptor {
    /// Model key
    pub model: SonarModel,
    /// Raw file extension rule
    pub extension: ExtensionRule,
    /// Whether an XML configuration file must accompany the raw file
    pub xml_required: bool,
    /// Whether `.bot` bottom-detection files are accepted
    pub accepts_bot: bool,
    /// Whether `.idx` index files are accepted
    pub accepts_idx: bool,
    /// Raw-file decoder
    pub parser: ParserKind,
    /// Convention group builder
    pub group_builder: GroupBuilderKind,
    /// Transmit/encode mode validation
    pub mode_check: ModeCheck,
    /// Source of the uncorrected range
    pub range_source: RangeSource,
    /// Range correction applied on top of the uncorrected range
    pub range_correction: RangeCorrection,
    /// Expected backscatter payload sizing
    pub backscatter_size: SizeRule,
    /// Calibration attribute stamping
    pub attrs: AttrsRule,
    /// Which groups to persist
    pub save: SaveRule,
}

static REGISTRY: [SonarModelDescriptor; 8] = [
    SonarModelDescriptor {
        model: SonarModel::Azfp,
        extension: ExtensionRule::DigitsLetter,
        xml_required: true,
        accepts_bot: false,
        accepts_idx: false,
        parser: ParserKind::Azfp,
        group_builder: GroupBuilderKind::Azfp,
        mode_check: ModeCheck::NarrowbandOnly,
        range_source: RangeSource::LegacyFormula,
        range_correction: RangeCorrection::None,
        backscatter_size: SizeRule::RealOnly,
        attrs: AttrsRule::NoOp,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Azfp6,
        extension: ExtensionRule::Exact(".azfp"),
        xml_required: false,
        accepts_bot: false,
        accepts_idx: false,
        parser: ParserKind::Azfp6,
        group_builder: GroupBuilderKind::Azfp6,
        mode_check: ModeCheck::NoOp,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::None,
        backscatter_size: SizeRule::NoEstimate,
        attrs: AttrsRule::NoOp,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Ek60,
        extension: ExtensionRule::Exact(".raw"),
        xml_required: false,
        accepts_bot: true,
        accepts_idx: true,
        parser: ParserKind::Ek60,
        group_builder: GroupBuilderKind::Ek60,
        mode_check: ModeCheck::NarrowbandOnly,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::TwoSampleShift,
        backscatter_size: SizeRule::RealOnly,
        attrs: AttrsRule::NoOp,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Es70,
        extension: ExtensionRule::Exact(".raw"),
        xml_required: false,
        accepts_bot: false,
        accepts_idx: false,
        parser: ParserKind::Ek60,
        group_builder: GroupBuilderKind::Ek60,
        mode_check: ModeCheck::NoOp,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::TwoSampleShift,
        backscatter_size: SizeRule::NoEstimate,
        attrs: AttrsRule::NoOp,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Ek80,
        extension: ExtensionRule::Exact(".raw"),
        xml_required: false,
        accepts_bot: true,
        accepts_idx: true,
        parser: ParserKind::Ek80,
        group_builder: GroupBuilderKind::Ek80,
        mode_check: ModeCheck::Broadband,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::PulseShiftWithGptOverride,
        backscatter_size: SizeRule::ModeDependent,
        attrs: AttrsRule::StampModes,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Es80,
        extension: ExtensionRule::Exact(".raw"),
        xml_required: false,
        accepts_bot: false,
        accepts_idx: false,
        parser: ParserKind::Ek80,
        group_builder: GroupBuilderKind::Ek80,
        mode_check: ModeCheck::NoOp,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::PulseShiftWithGptOverride,
        backscatter_size: SizeRule::NoEstimate,
        attrs: AttrsRule::NoOp,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Ea640,
        extension: ExtensionRule::Exact(".raw"),
        xml_required: false,
        accepts_bot: false,
        accepts_idx: false,
        parser: ParserKind::Ek80,
        group_builder: GroupBuilderKind::Ek80,
        mode_check: ModeCheck::NoOp,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::PulseShift,
        backscatter_size: SizeRule::NoEstimate,
        attrs: AttrsRule::NoOp,
        save: SaveRule::PrimaryAndSecondary,
    },
    SonarModelDescriptor {
        model: SonarModel::Ad2cp,
        extension: ExtensionRule::Exact(".ad2cp"),
        xml_required: false,
        accepts_bot: false,
        accepts_idx: false,
        parser: ParserKind::Ad2cp,
        group_builder: GroupBuilderKind::Ad2cp,
        mode_check: ModeCheck::NoOp,
        range_source: RangeSource::EchoRange,
        range_correction: RangeCorrection::None,
        backscatter_size: SizeRule::NoEstimate,
        attrs: AttrsRule::NoOp,
        save: SaveRule::EveryBeamGroup,
    },
];

/// Look up the registry entry for a model key (case-insensitive)
pub fn lookup(model_key: &str) -> Result<&'static SonarModelDescriptor, RegistryError> {
    let model: SonarModel = model_key.parse()?;
    Ok(descriptor_for(model))
}

pub(super) fn descriptor_for(model: SonarModel) -> &'static SonarModelDescriptor {
    // REGISTRY is laid out in SonarModel::ALL order
    let idx = match model {
        SonarModel::Azfp => 0,
        SonarModel::Azfp6 => 1,
        SonarModel::Ek60 => 2,
        SonarModel::Es70 => 3,
        SonarModel::Ek80 => 4,
        SonarModel::Es80 => 5,
        SonarModel::Ea640 => 6,
        SonarModel::Ad2cp => 7,
    };
    &REGISTRY[idx]
}

impl SonarModelDescriptor {
    /// Validate a bare extension (with its leading dot)
    pub fn validate_extension(&self, ext: &str) -> Result<(), RegistryError> {
        self.extension.validate(ext)
    }

    /// Validate the extension of a raw file path
    pub fn validate_raw_path(&self, path: &Path) -> Result<(), RegistryError> {
        self.extension.validate_path(path)
    }

    /// Check the companion files supplied with a raw file.
    ///
    /// An XML file given to a model that does not use one is ignored.
    pub fn check_auxiliary_files(
        &self,
        xml: Option<&Path>,
        bot: Option<&Path>,
        idx: Option<&Path>,
    ) -> Result<(), RegistryError> {
        if self.xml_required && xml.is_none() {
            return Err(RegistryError::MissingXmlFile {
                model: self.model.to_string(),
            });
        }
        if !self.xml_required {
            if let Some(xml) = xml {
                warn!(
                    "{} does not use an XML configuration file, ignoring {}",
                    self.model,
                    xml.display()
                );
            }
        }
        if bot.is_some() && !self.accepts_bot {
            return Err(RegistryError::UnsupportedAuxiliaryFile {
                model: self.model.to_string(),
                kind: ".bot".to_string(),
            });
        }
        if idx.is_some() && !self.accepts_idx {
            return Err(RegistryError::UnsupportedAuxiliaryFile {
                model: self.model.to_string(),
                kind: ".idx".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SonarModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} {:<18} ext={:<7} xml={:<5} bot={:<5} idx={:<5} save={}",
            self.model.key(),
            self.model.family().to_string(),
            match self.extension {
                ExtensionRule::DigitsLetter => ".XXY",
                ExtensionRule::Exact(ext) => ext,
            },
            self.xml_required,
            self.accepts_bot,
            self.accepts_idx,
            self.save,
        )
    }
}
