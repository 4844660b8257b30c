/// Error types for the module rewriter

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransformError>;

/// File name the parser reports until the caller supplies the real path.
pub const PLACEHOLDER_FILE_NAME: &str = "unknown";

/// A parse failure, positioned in the source that was handed to the rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// File name shown in the message (the placeholder until `with_file`)
    pub file: String,
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 0-based column, in characters
    pub column: usize,
    /// The parser ran out of input, so more lines could complete the source
    pub incomplete: bool,
}

impl SyntaxError {
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({}:{})", self.file, self.message, self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("SyntaxError: {0}")]
    Syntax(SyntaxError),

    #[error("Unsupported module syntax in {file}: {message}")]
    Unsupported { file: String, message: String },
}

impl TransformError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        TransformError::Unsupported {
            file: PLACEHOLDER_FILE_NAME.to_string(),
            message: message.into(),
        }
    }

    /// Replace the placeholder file name with the path the user gave.
    pub fn with_file(self, file: impl Into<String>) -> Self {
        match self {
            TransformError::Syntax(err) => TransformError::Syntax(err.with_file(file)),
            TransformError::Unsupported { message, .. } => TransformError::Unsupported {
                file: file.into(),
                message,
            },
        }
    }

    /// True when the source parsed fine up to its end and only needs more input.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, TransformError::Syntax(err) if err.incomplete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxError {
        SyntaxError {
            file: PLACEHOLDER_FILE_NAME.to_string(),
            message: "Unexpected token `)`".to_string(),
            line: 3,
            column: 7,
            incomplete: false,
        }
    }

    #[test]
    fn test_display_uses_placeholder_until_file_is_known() {
        let err = TransformError::Syntax(sample());
        assert_eq!(err.to_string(), "SyntaxError: unknown: Unexpected token `)` (3:7)");

        let err = err.with_file("./lib/a.js");
        assert_eq!(err.to_string(), "SyntaxError: ./lib/a.js: Unexpected token `)` (3:7)");
    }

    #[test]
    fn test_incomplete_flag() {
        let mut err = sample();
        assert!(!TransformError::Syntax(err.clone()).is_incomplete());
        err.incomplete = true;
        assert!(TransformError::Syntax(err).is_incomplete());
        assert!(!TransformError::unsupported("x").is_incomplete());
    }
}
