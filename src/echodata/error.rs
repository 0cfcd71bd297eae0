/// Errors raised while loading or reading an interchange record
#[derive(Debug, thiserror::Error)]
pub enum EchoDataError {
    /// I/O error reading the record file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed JSON record
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A named field is absent from the record
    #[error("Missing field '{field}' in {group}")]
    MissingField {
        /// Group holding the field
        group: String,
        /// Field name
        field: &'static str,
    },

    /// Beam group index out of range
    #[error("Sonar/Beam_group{} not present in record", .0 + 1)]
    MissingBeamGroup(usize),

    /// Array dimensions disagree with the group coordinates
    #[error("Shape mismatch for '{field}' in {group}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Group holding the field
        group: String,
        /// Field name
        field: &'static str,
        /// Expected shape
        expected: String,
        /// Actual shape
        actual: String,
    },

    /// Record was produced for a different model than requested
    #[error("Record was produced by a {found} parser but {expected} was requested")]
    ModelMismatch {
        /// Requested model key
        expected: String,
        /// Model key stored in the record
        found: String,
    },

    /// Record has no beam group at all
    #[error("Record contains no beam groups")]
    NoBeamGroups,
}
