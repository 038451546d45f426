use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Field mapping error: {message}")]
    MappingError { message: String },

    #[error("API transform error: {message}")]
    TransformError { message: String },

    #[error("Call generation error: {message}")]
    GenerationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤嚴重程度，決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// 錯誤分類，用於日誌與訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Mapping,
    Transform,
    Generation,
    Parsing,
}

impl ConvertError {
    pub fn mapping<S: Into<String>>(message: S) -> Self {
        ConvertError::MappingError {
            message: message.into(),
        }
    }

    pub fn transform<S: Into<String>>(message: S) -> Self {
        ConvertError::TransformError {
            message: message.into(),
        }
    }

    pub fn generation<S: Into<String>>(message: S) -> Self {
        ConvertError::GenerationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::IoError(_) => ErrorCategory::Io,
            ConvertError::SerializationError(_) => ErrorCategory::Parsing,
            ConvertError::SpreadsheetError(_) | ConvertError::CsvError(_) => ErrorCategory::Parsing,
            ConvertError::MappingError { .. } => ErrorCategory::Mapping,
            ConvertError::TransformError { .. } => ErrorCategory::Transform,
            ConvertError::GenerationError { .. } => ErrorCategory::Generation,
            ConvertError::ConfigError { .. }
            | ConvertError::MissingConfigError { .. }
            | ConvertError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConvertError::IoError(_) => ErrorSeverity::Critical,
            ConvertError::SerializationError(_) => ErrorSeverity::High,
            ConvertError::SpreadsheetError(_) | ConvertError::CsvError(_) => ErrorSeverity::High,
            ConvertError::MappingError { .. }
            | ConvertError::TransformError { .. }
            | ConvertError::GenerationError { .. } => ErrorSeverity::High,
            ConvertError::ConfigError { .. }
            | ConvertError::MissingConfigError { .. }
            | ConvertError::InvalidConfigValueError { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ConvertError::IoError(e) => format!("File operation failed: {}", e),
            ConvertError::SerializationError(e) => format!("JSON processing failed: {}", e),
            ConvertError::SpreadsheetError(e) => format!("Could not read the Excel file: {}", e),
            ConvertError::CsvError(e) => format!("Could not read the CSV file: {}", e),
            ConvertError::MappingError { message } => {
                format!("Field mapping failed: {}", message)
            }
            ConvertError::TransformError { message } => {
                format!("API document transformation failed: {}", message)
            }
            ConvertError::GenerationError { message } => {
                format!("API call generation failed: {}", message)
            }
            ConvertError::ConfigError { message } => format!("Configuration problem: {}", message),
            ConvertError::MissingConfigError { field } => {
                format!("Required setting '{}' was not provided", field)
            }
            ConvertError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!(
                "Setting '{}' has invalid value '{}': {}",
                field, value, reason
            ),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Io => {
                "Check that the input file exists and the output path is writable".to_string()
            }
            ErrorCategory::Configuration => {
                "Review the config file and command line flags; run with --help for the recognized options"
                    .to_string()
            }
            ErrorCategory::Mapping => {
                "Make sure the mapping file is a flat JSON object of source column to target field names"
                    .to_string()
            }
            ErrorCategory::Transform => {
                "Provide application_name and form_name in the 'api' config section or accept the defaults"
                    .to_string()
            }
            ErrorCategory::Generation => {
                "Check that the API endpoint is an absolute http(s) URL".to_string()
            }
            ErrorCategory::Parsing => {
                "Verify the spreadsheet is not corrupted and the sheet/header settings match its layout"
                    .to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
