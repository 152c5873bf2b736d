use serde::{Deserialize, Serialize};

/// A parse error. Parsing collects these instead of producing a partial AST.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{file}:{line}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(file: &str, line: u32, message: impl Into<String>) -> Self {
        ParseError {
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    /// Catch-all error for an unexpected failure inside the parser.
    pub fn internal(file: &str) -> Self {
        ParseError::new(file, 0, "internal parser error")
    }

    /// Serialize to JSON with every field present.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "file":    self.file,
            "line":    self.line,
            "message": self.message,
        })
    }
}
