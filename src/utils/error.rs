use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration file error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Song '{song}' contains no usable lines")]
    EmptySongError { song: String },

    #[error("Internal invariant violated: {message}")]
    InvariantError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, DeckError>;

/// How badly a failure should be treated at process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Recoverable, the run can be considered successful.
    Low,
    /// Output may be incomplete but usable.
    Medium,
    /// The run failed, user action required.
    High,
    /// The run failed in a way that suggests a bug or broken environment.
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Data,
    Internal,
}

impl DeckError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptySongError { .. } => ErrorSeverity::Low,
            Self::CsvError(_) => ErrorSeverity::Medium,
            Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::ProcessingError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) | Self::InvariantError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::InvalidConfigValueError { .. } | Self::ConfigValidationError { .. } => {
                ErrorCategory::Configuration
            }
            Self::CsvError(_) | Self::EmptySongError { .. } | Self::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            Self::SerializationError(_) | Self::InvariantError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => {
                "Check that the source directory exists and that the output directory is writable"
            }
            Self::CsvError(_) => {
                "Close any program that may be holding the output file open, then run again"
            }
            Self::SerializationError(_) => "Run again with --verbose and inspect the log output",
            Self::InvalidConfigValueError { .. } | Self::ConfigValidationError { .. } => {
                "Fix the configuration value and run again"
            }
            Self::EmptySongError { .. } => {
                "Add lyric lines to the file or remove it from the source directory"
            }
            Self::InvariantError { .. } => {
                "This looks like a bug; run again with --verbose and report the log output"
            }
            Self::ProcessingError { .. } => {
                "Check the source directory contents and the configured extensions"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("A file operation failed: {}", e),
            Self::CsvError(e) => format!("Writing the deck CSV failed: {}", e),
            Self::SerializationError(e) => format!("Writing the ambiguity report failed: {}", e),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("The value for '{}' is not usable: {}", field, reason)
            }
            Self::ConfigValidationError { field, message } => {
                format!("The configuration file entry '{}' is invalid: {}", field, message)
            }
            Self::EmptySongError { song } => {
                format!("'{}' has no lyric lines and was skipped", song)
            }
            Self::InvariantError { message } => {
                format!("An internal consistency check failed: {}", message)
            }
            Self::ProcessingError { message } => message.clone(),
        }
    }
}
