//! Parse error type with source positions.

use std::fmt;
use std::sync::Arc;

/// An error produced while parsing `.lode` source.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message.
    pub message: Arc<str>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SyntaxError: {} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::new("unexpected character", 3, 7);
        let rendered = err.to_string();
        assert!(rendered.contains("unexpected character"));
        assert!(rendered.contains("line 3"));
        assert!(rendered.contains("column 7"));
    }
}
