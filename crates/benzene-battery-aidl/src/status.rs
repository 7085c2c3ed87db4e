//! Call status
//!
//! The contract has a single failure channel: every method either returns its
//! value or a [`Status`]. Exception codes are the transport's standard ones;
//! there is no per-method error vocabulary.

use std::fmt;
use thiserror::Error;

/// Transport-level exception code carried in every reply header
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExceptionCode(pub i32);

impl ExceptionCode {
    pub const NONE: Self = Self(0);
    pub const SECURITY: Self = Self(-1);
    pub const BAD_PARCELABLE: Self = Self(-2);
    pub const ILLEGAL_ARGUMENT: Self = Self(-3);
    pub const NULL_POINTER: Self = Self(-4);
    pub const ILLEGAL_STATE: Self = Self(-5);
    pub const UNSUPPORTED_OPERATION: Self = Self(-7);
    pub const SERVICE_SPECIFIC: Self = Self(-8);
    pub const TRANSACTION_FAILED: Self = Self(-129);

    /// Get the constant name, if this is a known code
    pub fn name(&self) -> Option<&'static str> {
        Some(match *self {
            Self::NONE => "NONE",
            Self::SECURITY => "SECURITY",
            Self::BAD_PARCELABLE => "BAD_PARCELABLE",
            Self::ILLEGAL_ARGUMENT => "ILLEGAL_ARGUMENT",
            Self::NULL_POINTER => "NULL_POINTER",
            Self::ILLEGAL_STATE => "ILLEGAL_STATE",
            Self::UNSUPPORTED_OPERATION => "UNSUPPORTED_OPERATION",
            Self::SERVICE_SPECIFIC => "SERVICE_SPECIFIC",
            Self::TRANSACTION_FAILED => "TRANSACTION_FAILED",
            _ => return None,
        })
    }
}

impl fmt::Debug for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "ExceptionCode({})", self.0),
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Failed call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{exception}{}{}", service_suffix(.service_specific), message_suffix(.message))]
pub struct Status {
    exception: ExceptionCode,
    service_specific: Option<i32>,
    message: Option<String>,
}

fn service_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" ({c})")).unwrap_or_default()
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl Status {
    /// Create a status for a transport exception
    pub fn new_exception(exception: ExceptionCode, message: Option<&str>) -> Self {
        Self {
            exception,
            service_specific: None,
            message: message.map(str::to_owned),
        }
    }

    /// Create a service-specific error carrying an implementation-defined code
    pub fn new_service_specific(code: i32, message: Option<&str>) -> Self {
        Self {
            exception: ExceptionCode::SERVICE_SPECIFIC,
            service_specific: Some(code),
            message: message.map(str::to_owned),
        }
    }

    pub fn illegal_argument(message: &str) -> Self {
        Self::new_exception(ExceptionCode::ILLEGAL_ARGUMENT, Some(message))
    }

    pub fn unsupported(message: &str) -> Self {
        Self::new_exception(ExceptionCode::UNSUPPORTED_OPERATION, Some(message))
    }

    pub fn bad_parcelable(message: &str) -> Self {
        Self::new_exception(ExceptionCode::BAD_PARCELABLE, Some(message))
    }

    pub fn transaction_failed(message: &str) -> Self {
        Self::new_exception(ExceptionCode::TRANSACTION_FAILED, Some(message))
    }

    pub fn exception_code(&self) -> ExceptionCode {
        self.exception
    }

    /// Service-specific code, set only for `SERVICE_SPECIFIC` exceptions
    pub fn service_specific_error(&self) -> Option<i32> {
        self.service_specific
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Result of a call across the interface
pub type Result<T> = std::result::Result<T, Status>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let status = Status::illegal_argument("stop must be 50-100");
        assert_eq!(status.to_string(), "ILLEGAL_ARGUMENT: stop must be 50-100");

        let status = Status::new_service_specific(1, Some("write stop"));
        assert_eq!(status.to_string(), "SERVICE_SPECIFIC (1): write stop");

        let status = Status::new_exception(ExceptionCode(-42), None);
        assert_eq!(status.to_string(), "ExceptionCode(-42)");
    }

    #[test]
    fn test_service_specific_code() {
        let status = Status::new_service_specific(7, None);
        assert_eq!(status.exception_code(), ExceptionCode::SERVICE_SPECIFIC);
        assert_eq!(status.service_specific_error(), Some(7));
        assert_eq!(Status::unsupported("x").service_specific_error(), None);
    }
}
