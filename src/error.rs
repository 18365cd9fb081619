//! Fatal, structured errors
//!
//! A physical zero (an out-of-range mapping, a failed cut) is not an
//! error, it is `0.0` returned from
//! [`crate::process::Process::compute_weight`]. Only configuration
//! mistakes and numerical breakdowns that make the *intent* of a run
//! ambiguous surface here, composed with `thiserror`.

use thiserror::Error;

/// Category of a fatal error, carried alongside the diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration mapping named an unknown process, structure function,
    /// or otherwise held an invalid field
    ConfigInvalid,
    /// Beams, cuts or process mode are mutually inconsistent
    KinematicsInvalid,
    /// The integrator could not produce a finite estimate
    IntegratorFailure,
    /// The hadroniser exceeded its retry budget on too many consecutive events
    HadroniserFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ConfigInvalid => "invalid configuration",
            Self::KinematicsInvalid => "invalid kinematics",
            Self::IntegratorFailure => "integrator failure",
            Self::HadroniserFailure => "hadroniser failure",
        };
        f.write_str(s)
    }
}

/// A fatal, unrecoverable error
#[derive(Debug, Error)]
#[error("{kind}: {message} (key={key:?}, value={value:?})")]
pub struct Error {
    /// Category of failure
    pub kind: ErrorKind,
    /// Human-readable diagnostic
    pub message: String,
    /// Offending configuration key, if applicable
    pub key: Option<String>,
    /// Offending configuration value, if applicable
    pub value: Option<String>,
}

impl Error {
    /// Construct an error with no offending key/value attached
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            key: None,
            value: None,
        }
    }

    /// Construct an error carrying the offending configuration key and value
    pub fn with_key(
        kind: ErrorKind,
        message: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

/// Result alias used throughout the crate for fatal-error-returning operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_offending_key_and_value() {
        let err = Error::with_key(
            ErrorKind::ConfigInvalid,
            "unknown process",
            "process.name",
            "flibbertigibbet",
        );
        let msg = err.to_string();
        assert!(msg.contains("flibbertigibbet"));
        assert!(msg.contains("process.name"));
    }
}
