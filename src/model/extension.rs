use std::path::Path;

use super::error::RegistryError;

/// How a model recognises its raw file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionRule {
    /// `.XXY`: a dot, two digits and one letter (AZFP hourly files such as `.01A`)
    DigitsLetter,
    /// Exactly this extension, compared case-insensitively
    Exact(&'static str),
}

impl ExtensionRule {
    /// Human readable form of the accepted extension
    pub fn expected(&self) -> &'static str {
        match self {
            ExtensionRule::DigitsLetter => "\".XXY\" where XX is a number and Y is a letter",
            ExtensionRule::Exact(ext) => ext,
        }
    }

    /// Check an extension including its leading dot
    pub fn validate(&self, ext: &str) -> Result<(), RegistryError> {
        let ok = match self {
            ExtensionRule::DigitsLetter => {
                let b = ext.as_bytes();
                b.len() == 4
                    && b[0] == b'.'
                    && b[1].is_ascii_digit()
                    && b[2].is_ascii_digit()
                    && b[3].is_ascii_alphabetic()
            }
            ExtensionRule::Exact(expected) => expected.eq_ignore_ascii_case(ext),
        };

        if ok {
            Ok(())
        } else {
            Err(RegistryError::ExtensionMismatch {
                expected: self.expected().to_string(),
                actual: ext.to_string(),
            })
        }
    }

    /// Check the extension of a file path. A path without extension is
    /// validated as the empty string.
    pub fn validate_path(&self, path: &Path) -> Result<(), RegistryError> {
        self.validate(&dotted_extension(path))
    }
}

/// Extension of `path` with its leading dot, or `""`
pub(crate) fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}
