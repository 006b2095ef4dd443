//! Error types for the Nmbrs client.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Service;

/// Fault code Nmbrs uses for rejected credentials.
pub const UNAUTHORIZED_CODE: &str = "1002:";

// ASCII digits only; other scripts' digits never form a fault code.
static FAULT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}:").expect("valid fault code pattern"));

/// Error raised by every facade operation.
///
/// The message is the remote fault (or transport failure) text, kept verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NmbrsError {
    message: String,
}

impl NmbrsError {
    /// Create an error from a raw failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error for a reply that lacks a field the operation needs.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("malformed response: {}", detail))
    }

    /// The original failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the fault reports invalid credentials.
    ///
    /// Only the first `NNNN:` token in the message is considered; it must be
    /// exactly `1002:`.
    pub fn is_unauthorized(&self) -> bool {
        FAULT_CODE
            .find(&self.message)
            .is_some_and(|m| m.as_str() == UNAUTHORIZED_CODE)
    }
}

impl From<CallError> for NmbrsError {
    fn from(err: CallError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for NmbrsError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err)
    }
}

/// Failure of a single remote invocation on a channel.
///
/// `Display` is the bare underlying message so it survives translation into
/// [`NmbrsError`] untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// HTTP or IO failure below the SOAP layer.
    #[error("{0}")]
    Transport(String),

    /// SOAP fault returned by the remote service (the `faultstring`).
    #[error("{0}")]
    Fault(String),

    /// Reply that could not be read as a SOAP envelope.
    #[error("{0}")]
    Malformed(String),
}

/// Failure to establish a service session. Fatal for client construction.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("WSDL for {service} could not be resolved at {url}: {message}")]
    Wsdl {
        service: Service,
        url: String,
        message: String,
    },

    #[error("HTTP client setup failed: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tagged result of a soft-fail call.
///
/// Soft-fail variants capture the error instead of propagating it; the
/// default variants always return `Result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome<T> {
    Success { value: T },
    Failed { message: String },
}

impl<T> CallOutcome<T> {
    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure message, if any.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { message } => Some(message),
        }
    }

    /// Convert back into a `Result`, rebuilding the error from its message.
    pub fn into_result(self) -> Result<T, NmbrsError> {
        match self {
            Self::Success { value } => Ok(value),
            Self::Failed { message } => Err(NmbrsError::new(message)),
        }
    }
}

impl<T> From<Result<T, NmbrsError>> for CallOutcome<T> {
    fn from(result: Result<T, NmbrsError>) -> Self {
        match result {
            Ok(value) => Self::Success { value },
            Err(err) => Self::Failed {
                message: err.message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_code() {
        assert!(NmbrsError::new("1002: Unauthorized").is_unauthorized());
        assert!(
            NmbrsError::new("Server was unable to process request. ---> 1002: Unauthorized")
                .is_unauthorized()
        );
    }

    #[test]
    fn test_other_codes_not_unauthorized() {
        assert!(!NmbrsError::new("2001: some other fault").is_unauthorized());
        assert!(!NmbrsError::new("foo 1002 bar").is_unauthorized());
        assert!(!NmbrsError::new("").is_unauthorized());
    }

    #[test]
    fn test_only_first_code_counts() {
        assert!(!NmbrsError::new("2001: wrapped 1002: Unauthorized").is_unauthorized());
        assert!(NmbrsError::new("1002: then 2001: later").is_unauthorized());
        // Arabic-Indic digits are not a fault code.
        assert!(
            NmbrsError::new("ref \u{661}\u{662}\u{663}\u{664}: wrapped 1002: Unauthorized")
                .is_unauthorized()
        );
    }

    #[test]
    fn test_call_error_message_preserved() {
        let err: NmbrsError = CallError::Fault("1002: Unauthorized".to_string()).into();
        assert_eq!(err.message(), "1002: Unauthorized");
        assert_eq!(err.to_string(), "1002: Unauthorized");

        let err: NmbrsError = CallError::Transport("connection reset".to_string()).into();
        assert_eq!(err.message(), "connection reset");
    }

    #[test]
    fn test_call_outcome_serialization() {
        let ok: CallOutcome<i64> = Ok(42).into();
        assert!(ok.is_success());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["value"], 42);

        let failed: CallOutcome<i64> = Err(NmbrsError::new("2001: nope")).into();
        assert_eq!(failed.failure_message(), Some("2001: nope"));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(failed.into_result().unwrap_err().message(), "2001: nope");
    }
}
