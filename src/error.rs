use thiserror::Error;

pub type TradesheetResult<T> = Result<T, TradesheetError>;

#[derive(Debug, Error)]
pub enum TradesheetError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Errors related to data loading, parsing and table operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Data frame error: {0}")]
    DataFrame(String),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Schema mismatch for column '{column}': expected {expected}, found {found}")]
    SchemaMismatch {
        column: String,
        expected: String,
        found: String,
    },
}

/// Errors related to file I/O and serialization.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Invalid file pattern '{pattern}': {msg}")]
    InvalidPattern { pattern: String, msg: String },

    #[error("Failed to read data: {0}")]
    ReadFailed(String),

    #[error("Failed to write data: {0}")]
    WriteFailed(String),
}

/// Errors raised by report requests.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid metric '{0}': expected one of 'asset', 'volume', 'market'")]
    InvalidMetric(String),

    #[error("No joined trade data available: {0}")]
    MissingJoinedData(String),
}

