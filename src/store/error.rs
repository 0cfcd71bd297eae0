use crate::echodata::EchoDataError;

/// Errors raised while persisting groups
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the Arrow library while building columns
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library while writing a group
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Engine name is not one of `netcdf4`, `zarr`
    #[error("Unknown engine '{0}', expected 'netcdf4' or 'zarr'")]
    UnknownEngine(String),

    /// Group name cannot be mapped to a location in the container
    #[error("Invalid group name '{0}'")]
    InvalidGroupName(String),

    /// Payload cannot be represented in the output
    #[error("Invalid data in group '{group}': {reason}")]
    InvalidData {
        /// Group being written
        group: String,
        /// What is wrong with it
        reason: String,
    },

    /// A group the model must save is absent from the record
    #[error(transparent)]
    EchoData(#[from] EchoDataError),
}
