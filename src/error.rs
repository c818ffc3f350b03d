//! Error types for content stream interpretation.
//!
//! This module defines all error types that can occur while tokenizing,
//! resolving resources for, and interpreting a PDF content stream.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during content stream processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operand count or type does not match the operator's contract
    #[error("Malformed operands for '{operator}': {reason}")]
    MalformedOperands {
        /// Operator mnemonic (e.g. "Tf")
        operator: String,
        /// What was wrong with the operands
        reason: String,
    },

    /// `Q` issued while only the base graphics state remains
    #[error("Graphics state stack underflow: restore without matching save")]
    StackUnderflow,

    /// Text operator used outside BT/ET, or a nested BT
    #[error("Text object violation at '{operator}': {reason}")]
    TextObjectViolation {
        /// Operator mnemonic
        operator: String,
        /// Description of the violation
        reason: String,
    },

    /// Named resource is absent from the active resource dictionary
    #[error("Missing resource: /{category} /{name}")]
    MissingResource {
        /// Resource category (Font, ExtGState, XObject)
        category: String,
        /// Resource name
        name: String,
    },

    /// Content the interpreter has no handler for (skipped locally)
    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),

    /// Operator mnemonic registered twice
    #[error("Operator '{0}' already registered")]
    DuplicateOperator(String),

    /// Configured operation budget exhausted
    #[error("Operation limit exceeded (max: {0})")]
    OperationLimitExceeded(usize),

    /// Recursion depth limit exceeded (nested forms, reference chains)
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Referenced object not found
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

    /// Requested page does not exist
    #[error("Page {0} not found")]
    PageNotFound(usize),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Font error
    #[error("Font error: {0}")]
    Font(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short, stable label for the error kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedOperands { .. } => "MalformedOperands",
            Error::StackUnderflow => "StackUnderflow",
            Error::TextObjectViolation { .. } => "TextObjectViolation",
            Error::MissingResource { .. } => "MissingResource",
            Error::UnsupportedContent(_) => "UnsupportedContent",
            Error::DuplicateOperator(_) => "DuplicateOperator",
            Error::OperationLimitExceeded(_) => "OperationLimitExceeded",
            Error::RecursionLimitExceeded(_) => "RecursionLimitExceeded",
            Error::ParseError { .. } => "ParseError",
            Error::ObjectNotFound(..) => "ObjectNotFound",
            Error::InvalidObjectType { .. } => "InvalidObjectType",
            Error::PageNotFound(_) => "PageNotFound",
            Error::UnsupportedFilter(_) => "UnsupportedFilter",
            Error::Decode(_) => "Decode",
            Error::Font(_) => "Font",
            Error::Io(_) => "Io",
        }
    }

    pub(crate) fn malformed(operator: &str, reason: impl Into<String>) -> Self {
        Error::MalformedOperands {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(category: &str, name: &str) -> Self {
        Error::MissingResource {
            category: category.to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_operands_message() {
        let err = Error::malformed("Tf", "expected 2 operands, found 1");
        let msg = format!("{}", err);
        assert!(msg.contains("Tf"));
        assert!(msg.contains("expected 2 operands"));
        assert_eq!(err.kind(), "MalformedOperands");
    }

    #[test]
    fn test_missing_resource_message() {
        let err = Error::missing("Font", "F1");
        assert_eq!(format!("{}", err), "Missing resource: /Font /F1");
    }

    #[test]
    fn test_object_not_found_error() {
        let err = Error::ObjectNotFound(10, 0);
        let msg = format!("{}", err);
        assert!(msg.contains("10 0 R"));
    }

    #[test]
    fn test_stack_underflow_kind() {
        assert_eq!(Error::StackUnderflow.kind(), "StackUnderflow");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
