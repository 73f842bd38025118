use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Source columns missing from CSV header: {columns}")]
    MissingColumnsError { columns: String },

    #[error("Duplicate declaration id '{id}' in source data")]
    DuplicateIdError { id: String },
}

impl ExportError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            ExportError::CsvError(e) => {
                format!("The source export could not be parsed as CSV: {}", e)
            }
            ExportError::IoError(e) => format!("A file could not be read or written: {}", e),
            ExportError::SerializationError(e) => {
                format!("A declaration could not be written as JSON: {}", e)
            }
            ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => self.to_string(),
            ExportError::MissingColumnsError { columns } => format!(
                "The source export does not provide the columns this dialect maps: {}",
                columns
            ),
            ExportError::DuplicateIdError { id } => {
                format!("Two source rows resolved to the same declaration id '{}'", id)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ExportError::CsvError(_) => {
                "Check the dialect's delimiter and that the export has a header row"
            }
            ExportError::IoError(_) => {
                "Check that the source path exists and the output directory is writable"
            }
            ExportError::SerializationError(_) => "Re-run with --verbose to locate the failing row",
            ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. } => "Fix the reported option and run again",
            ExportError::MissingConfigError { .. } => "Pass the missing option on the command line",
            ExportError::MissingColumnsError { .. } => {
                "Select a matching dialect, or re-run with --on-missing-column ignore"
            }
            ExportError::DuplicateIdError { .. } => {
                "Re-run with --on-duplicate overwrite to keep the last occurrence"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
