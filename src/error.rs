//! Error types for the AcroForm engine.
//!
//! Structural failures (no catalog, no form, broken xref or trailer syntax) surface as
//! [`Error::ParseError`] carrying the byte offset where parsing gave up. Everything
//! below that level (a dangling kid, an unreadable field) is logged and skipped by the
//! reader and writer instead of being reported here.

/// Result type alias for AcroForm engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading or filling a PDF form.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Invalid PDF header (expected '%PDF-')
    #[error("Invalid PDF header: {0}")]
    InvalidHeader(String),

    /// Structural parse error at a specific byte offset
    #[error("Failed to parse PDF at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where the error was detected
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// `startxref` is missing or does not point at a cross-reference table
    #[error("Invalid cross-reference table at byte {offset}")]
    InvalidXref {
        /// Offset that was expected to hold the `xref` keyword
        offset: usize,
    },

    /// Referenced object not found in cross-reference table
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Unexpected end of file
    #[error("End of file reached unexpectedly")]
    UnexpectedEof,

    /// Feature outside the classic-xref subset this engine handles
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(usize),

    /// Invalid field map definition or record
    #[error("Field map error: {0}")]
    FieldMap(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a [`Error::ParseError`] from an offset and a reason.
    pub(crate) fn parse(offset: usize, reason: impl Into<String>) -> Self {
        Error::ParseError {
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset attached to this error, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::ParseError { offset, .. } | Error::InvalidXref { offset } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_offset() {
        let err = Error::parse(1234, "missing /Root in trailer");
        let msg = format!("{}", err);
        assert!(msg.contains("1234"));
        assert!(msg.contains("missing /Root"));
        assert_eq!(err.offset(), Some(1234));
    }

    #[test]
    fn test_invalid_xref_offset() {
        let err = Error::InvalidXref { offset: 77 };
        assert_eq!(err.offset(), Some(77));
        assert!(format!("{}", err).contains("77"));
    }

    #[test]
    fn test_object_not_found_error() {
        let err = Error::ObjectNotFound(10, 0);
        assert!(format!("{}", err).contains("10 0 R"));
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
