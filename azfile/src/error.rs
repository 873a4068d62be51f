//! Error types for file service operations

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for file service operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Machine-readable error classifier returned by the service in `x-ms-error-code`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ServiceCode(String);

impl ServiceCode {
    /// No code was returned
    pub const NONE: &'static str = "";
    /// The share already exists
    pub const SHARE_ALREADY_EXISTS: &'static str = "ShareAlreadyExists";
    /// The share does not exist
    pub const SHARE_NOT_FOUND: &'static str = "ShareNotFound";
    /// The share is being deleted
    pub const SHARE_BEING_DELETED: &'static str = "ShareBeingDeleted";
    /// A directory or file with that name already exists
    pub const RESOURCE_ALREADY_EXISTS: &'static str = "ResourceAlreadyExists";
    /// The directory or file does not exist
    pub const RESOURCE_NOT_FOUND: &'static str = "ResourceNotFound";
    /// The parent directory does not exist
    pub const PARENT_NOT_FOUND: &'static str = "ParentNotFound";
    /// The request signature was rejected
    pub const AUTHENTICATION_FAILED: &'static str = "AuthenticationFailed";
    /// The requested range is not satisfiable
    pub const INVALID_RANGE: &'static str = "InvalidRange";

    /// Wraps a raw code
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The raw code string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl PartialEq<&str> for ServiceCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Errors that can occur during file service operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The service answered with an unexpected status
    #[error("Service error {status} ({code}): {message}")]
    Service {
        /// HTTP status returned by the service
        status: StatusCode,
        /// Value of `x-ms-error-code`
        code: ServiceCode,
        /// Response body, usually an XML error document
        message: String,
        /// Value of `x-ms-request-id`
        request_id: Option<String>,
    },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A handle could not be turned into a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    /// Service code carried by a service error
    #[must_use]
    pub const fn service_code(&self) -> Option<&ServiceCode> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// HTTP status of a service error
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service rejected the request with 409 Conflict
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_code_accessors() {
        let err = StorageError::Service {
            status: StatusCode::CONFLICT,
            code: ServiceCode::new(ServiceCode::SHARE_ALREADY_EXISTS),
            message: String::new(),
            request_id: None,
        };

        assert!(err.is_conflict());
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(
            err.service_code(),
            Some(&ServiceCode::from(ServiceCode::SHARE_ALREADY_EXISTS))
        );
    }

    #[test]
    fn test_non_service_errors_have_no_code() {
        let err = StorageError::Config("missing key".to_string());
        assert!(err.service_code().is_none());
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }
}
