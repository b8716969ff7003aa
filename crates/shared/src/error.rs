//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Each variant maps to exactly one HTTP status and one stable error code,
/// so every layer above the stores can speak the same taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input, rejected before any store write.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad credential or malformed/expired token.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Valid identity, insufficient privilege or not the owner.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Referenced record absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate unique field or a lost concurrent update.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business rule violation (e.g. an illegal status transition).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Underlying persistence unavailable.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::BusinessRule(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the human-readable detail without the taxonomy prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::BusinessRule(m)
            | Self::Database(m)
            | Self::Internal(m) => m,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "AUTH_INVALID",
            Self::Forbidden(_) => "AUTH_FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Database(_) => "STORE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::Unauthorized(String::new()).status_code(), 401);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::BusinessRule(String::new()).status_code(), 422);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::Unauthorized(String::new()).error_code(),
            "AUTH_INVALID"
        );
        assert_eq!(
            AppError::Forbidden(String::new()).error_code(),
            "AUTH_FORBIDDEN"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::BusinessRule(String::new()).error_code(),
            "BUSINESS_RULE_VIOLATION"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "STORE_FAILURE"
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        assert_eq!(AppError::Conflict("dup".into()).message(), "dup");
        assert_eq!(AppError::Validation("bad".into()).message(), "bad");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(
            AppError::Forbidden("msg".into()).to_string(),
            "Access denied: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
    }
}
