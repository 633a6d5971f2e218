//! Error types shared across the domain.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Schema errors
    SchemaViolation,

    // Conversation errors
    SessionNotFound,
    InvalidPhaseTransition,
    NotReadyToRender,

    // Extraction errors
    ExtractionUnavailable,
    ValidationFailed,

    // Delivery errors
    SinkFailed,

    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::SchemaViolation => "SCHEMA_VIOLATION",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::InvalidPhaseTransition => "INVALID_PHASE_TRANSITION",
            ErrorCode::NotReadyToRender => "NOT_READY_TO_RENDER",
            ErrorCode::ExtractionUnavailable => "EXTRACTION_UNAVAILABLE",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::SinkFailed => "SINK_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Module-level errors (`SchemaViolation`, `FormatError`, ...) convert into
/// this type when they cross into the application layer.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SessionNotFound, "Session not found");
        assert_eq!(format!("{}", err), "[SESSION_NOT_FOUND] Session not found");
    }

    #[test]
    fn with_detail_accumulates_details() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "bad date")
            .with_detail("field", "start_date")
            .with_detail("raw", "Smarch 3rd");

        assert_eq!(err.details.get("field"), Some(&"start_date".to_string()));
        assert_eq!(err.details.get("raw"), Some(&"Smarch 3rd".to_string()));
    }

    #[test]
    fn error_code_display_is_screaming_snake_case() {
        assert_eq!(ErrorCode::SchemaViolation.to_string(), "SCHEMA_VIOLATION");
        assert_eq!(ErrorCode::ExtractionUnavailable.to_string(), "EXTRACTION_UNAVAILABLE");
        assert_eq!(ErrorCode::InternalError.to_string(), "INTERNAL_ERROR");
    }
}
