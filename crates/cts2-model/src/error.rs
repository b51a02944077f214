//! Error types for request parsing and parameter validation.

use thiserror::Error;

/// Errors that can occur while turning a request into typed values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Parse error at a specific position in the request path.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Byte offset in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Empty request path.
    #[error("empty request path")]
    EmptyPath,

    /// A query parameter had a value outside its domain.
    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// The path does not name any known resource.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

impl RequestError {
    /// Builds an [`RequestError::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestError::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Result type for request operations.
pub type RequestResult<T> = std::result::Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse_error() {
        let err = RequestError::ParseError {
            position: 4,
            message: "unexpected input at: '%zz'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "parse error at position 4: unexpected input at: '%zz'"
        );
    }

    #[test]
    fn test_error_display_invalid_parameter() {
        let err = RequestError::invalid_parameter("maxtoreturn", "0");
        assert_eq!(err.to_string(), "invalid value '0' for parameter 'maxtoreturn'");
    }

    #[test]
    fn test_error_display_unknown_resource() {
        let err = RequestError::UnknownResource("/foo/bar".to_string());
        assert_eq!(err.to_string(), "unknown resource: /foo/bar");
    }
}
