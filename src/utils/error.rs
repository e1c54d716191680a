use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Failed to read {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {} is not valid UTF-8", path.display())]
    EncodingError { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to back up {}: {source}", path.display())]
    BackupError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Rule '{rule}' has an invalid pattern: {source}")]
    InvalidPatternError {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule '{rule}' matched nothing in {}", path.display())]
    RuleNoMatchError { rule: String, path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PatchError::IoError { .. }
            | PatchError::EncodingError { .. }
            | PatchError::WriteError { .. }
            | PatchError::BackupError { .. }
            | PatchError::SerializationError(_) => ErrorCategory::Io,
            PatchError::ConfigError { .. }
            | PatchError::ConfigValidationError { .. }
            | PatchError::InvalidConfigValueError { .. }
            | PatchError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PatchError::InvalidPatternError { .. } | PatchError::RuleNoMatchError { .. } => {
                ErrorCategory::Rule
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 寫入中途失敗可能留下不完整的目標檔案
            PatchError::WriteError { .. } => ErrorSeverity::Critical,
            PatchError::RuleNoMatchError { .. } => ErrorSeverity::Medium,
            PatchError::SerializationError(_) => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => match self.category() {
                ErrorCategory::Io => 3,
                _ => 1,
            },
            ErrorSeverity::Critical => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PatchError::IoError { path, .. } => format!(
                "Check that {} exists and is readable, or pass --target",
                path.display()
            ),
            PatchError::EncodingError { .. } => {
                "Convert the file to UTF-8 before patching it".to_string()
            }
            PatchError::WriteError { path, .. } => format!(
                "Check permissions and free space for {}; restore from a backup if it was truncated",
                path.display()
            ),
            PatchError::BackupError { .. } => {
                "Check that the target directory is writable, or run without --backup".to_string()
            }
            PatchError::SerializationError(_) => "Run again without --json-report".to_string(),
            PatchError::ConfigError { .. }
            | PatchError::ConfigValidationError { .. }
            | PatchError::InvalidConfigValueError { .. }
            | PatchError::MissingConfigError { .. } => {
                "Fix the rule file and run again".to_string()
            }
            PatchError::InvalidPatternError { .. } => {
                "Fix the regular expression; look-around and back-references are not supported"
                    .to_string()
            }
            PatchError::RuleNoMatchError { rule, .. } => format!(
                "The content targeted by '{}' may already be removed or has drifted; update the pattern or run without --strict",
                rule
            ),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PatchError::IoError { path, .. } => {
                format!("Cannot read target file {}", path.display())
            }
            PatchError::EncodingError { path } => {
                format!("Target file {} is not UTF-8 text", path.display())
            }
            PatchError::WriteError { path, .. } => {
                format!("Could not write patched file {}", path.display())
            }
            PatchError::BackupError { path, .. } => {
                format!("Could not create a backup of {}", path.display())
            }
            PatchError::RuleNoMatchError { rule, path } => {
                format!("Rule '{}' found nothing to change in {}", rule, path.display())
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;
