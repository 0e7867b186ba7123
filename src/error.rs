//! Error types for the tessera crate.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Errors surfaced by the tessera library.
#[derive(Debug)]
pub enum TesseraError {
    /// I/O failure while reading or writing an index or resource file.
    Io(std::io::Error),

    /// Malformed query text; carries the byte position in the query string.
    Parse { message: String, position: usize },

    /// Corrupt or unsupported index data.
    Index(String),

    /// An argument that violates an operation's contract.
    InvalidArgument(String),

    /// A requested resource (document, term) does not exist.
    NotFound(String),
}

impl TesseraError {
    /// Create a parse error with a byte position.
    pub fn parse(message: impl Into<String>, position: usize) -> Self {
        TesseraError::Parse {
            message: message.into(),
            position,
        }
    }

    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        TesseraError::Index(message.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TesseraError::InvalidArgument(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        TesseraError::NotFound(message.into())
    }
}

impl fmt::Display for TesseraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TesseraError::Io(err) => write!(f, "I/O error: {err}"),
            TesseraError::Parse { message, position } => {
                write!(f, "Query parsing error at position {position}: {message}")
            }
            TesseraError::Index(msg) => write!(f, "Index error: {msg}"),
            TesseraError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            TesseraError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for TesseraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TesseraError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TesseraError {
    fn from(err: std::io::Error) -> Self {
        TesseraError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_position() {
        let err = TesseraError::parse("Unclosed quote", 17);
        assert_eq!(
            err.to_string(),
            "Query parsing error at position 17: Unclosed quote"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TesseraError = io.into();
        assert!(matches!(err, TesseraError::Io(_)));
    }
}
