//! DOM access errors.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The host's shadow root is closed to script access.
    ClosedShadowRoot { host: String },
    /// A CSS selector failed to parse.
    InvalidSelector { selector: String, message: String },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::ClosedShadowRoot { host } => {
                write!(f, "shadow root of <{}> is closed", host)
            }
            DomError::InvalidSelector { selector, message } => {
                write!(f, "invalid selector '{}': {}", selector, message)
            }
        }
    }
}

impl std::error::Error for DomError {}
