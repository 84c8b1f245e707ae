//! Core error types for family organization
//!
//! Structural problems with family data are never errors here; they are
//! reported as [`ValidationError`](crate::organizer::ValidationError) values.
//! This enum covers fallible I/O-facing surfaces and internal invariant
//! failures. Unparseable JSON is reported as an input or config error,
//! depending on which document it came from.

use thiserror::Error;

/// Core error types for the organizer and its surfaces
#[derive(Error, Debug)]
pub enum KindredError {
    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Config error: {message}")]
    ConfigError { message: String },

    /// A resolver bug, not bad input
    #[error("Invariant violation: {message}")]
    InvariantViolation { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl KindredError {
    /// Create a new input error
    pub fn input_error(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
        }
    }

    /// Create a new config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invariant violation
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error() {
        let error = KindredError::input_error("missing people");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Input error"));
        assert!(error_msg.contains("missing people"));
    }

    #[test]
    fn test_config_error() {
        let error = KindredError::config_error("bad threshold");
        assert!(error.to_string().contains("Config error"));
    }

    #[test]
    fn test_invariant_violation() {
        let error = KindredError::invariant_violation("person 3 in two tiers");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Invariant violation"));
        assert!(error_msg.contains("person 3"));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: KindredError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
