/// Errors raised while resolving a model or validating its input files
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Model key is not one of the supported instruments
    #[error("Unknown sonar model '{0}' (expected one of AZFP, AZFP6, EK60, ES70, EK80, ES80, EA640, AD2CP)")]
    UnknownModel(String),

    /// Raw file extension does not match what the model produces
    #[error("Expecting a file in the form {expected} but got '{actual}'")]
    ExtensionMismatch {
        /// Expected extension or extension shape
        expected: String,
        /// Extension actually received
        actual: String,
    },

    /// Model needs an XML configuration file and none was supplied
    #[error("{model} conversion requires an XML configuration file")]
    MissingXmlFile {
        /// Model key
        model: String,
    },

    /// Companion file kind (`.bot`, `.idx`) not produced by this model
    #[error("{model} does not accept {kind} files")]
    UnsupportedAuxiliaryFile {
        /// Model key
        model: String,
        /// Auxiliary file kind
        kind: String,
    },
}
