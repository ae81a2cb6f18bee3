//! Error handling for mathcopy
//!
//! Every step of the recovery engine returns [`ExtractResult`]; the cascade
//! that runs the step downgrades an `Err` to "nothing found" for that step.
//! Only configuration loading and the CLI surface errors to callers.

use std::fmt;

use mathcopy_dom::DomError;

/// Extraction error type
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// DOM access failed (closed shadow root, bad selector)
    Dom(DomError),
    /// A regular expression could not be built
    InvalidPattern { pattern: String, message: String },
    /// Configuration could not be read or parsed
    Config { message: String },
    /// IO error (for file operations)
    Io { message: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Dom(err) => write!(f, "DOM error: {}", err),
            ExtractError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
            ExtractError::Config { message } => write!(f, "Config error: {}", message),
            ExtractError::Io { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for ExtractError {
    fn from(err: DomError) -> Self {
        ExtractError::Dom(err)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "config-file")]
impl From<toml::de::Error> for ExtractError {
    fn from(err: toml::de::Error) -> Self {
        ExtractError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for extraction steps
pub type ExtractResult<T> = Result<T, ExtractError>;

// Convenience constructors for errors
impl ExtractError {
    pub fn pattern(pattern: impl Into<String>, err: regex::Error) -> Self {
        ExtractError::InvalidPattern {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ExtractError::Config {
            message: message.into(),
        }
    }
}

/// Log a failed step and treat it as "nothing found".
pub fn downgrade<T>(step: &str, result: ExtractResult<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::debug!("{} failed, continuing: {}", step, err);
            None
        }
    }
}
