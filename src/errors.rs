use std::fmt;
use std::io;

use thiserror::Error;

use crate::lexer::Position;

/// Errors surfaced to the caller of a fallible entry point.
///
/// Data-quality problems inside the `.bib` source never end up here; they
/// are recovered by the record builder and reported as [`SkippedEntry`].
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source is not valid UTF-8 text.
    #[error("source is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8 {
            offset: err.valid_up_to(),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        err.utf8_error().into()
    }
}

/// A convenience `Result` type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why the record builder abandoned an entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unexpected '{found}' while {action} at {at}")]
    UnexpectedToken {
        found: String,
        action: &'static str,
        at: Position,
    },

    #[error("delimiter opened at {opened} is never closed")]
    UnmatchedDelimiter { opened: Position },

    #[error("entry type is missing at {at}")]
    MissingType { at: Position },

    #[error("citation key is missing at {at}")]
    MissingKey { at: Position },

    #[error("expected '=' after field name '{name}' at {at}")]
    MissingAssign { name: String, at: Position },

    #[error("unexpected end of input while {action}")]
    Incomplete { action: &'static str },
}

/// Diagnostic for one entry dropped during recovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    /// entry type as written, e.g. “Article”, if it was read
    pub kind: Option<String>,
    /// citation key, if it was read before the failure
    pub id: Option<String>,
    /// where the entry started
    pub start: Position,
    pub error: StructuralError,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.id) {
            (_, Some(id)) => write!(f, "skipped entry '{}' at {}: {}", id, self.start, self.error),
            (Some(kind), None) => write!(f, "skipped @{} at {}: {}", kind, self.start, self.error),
            (None, None) => write!(f, "skipped entry at {}: {}", self.start, self.error),
        }
    }
}

impl std::error::Error for SkippedEntry {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_entry() {
        let skipped = SkippedEntry {
            kind: Some("article".to_string()),
            id: Some("foo".to_string()),
            start: Position { line: 3, col: 1 },
            error: StructuralError::MissingAssign {
                name: "author".to_string(),
                at: Position { line: 4, col: 10 },
            },
        };
        assert_eq!(
            skipped.to_string(),
            "skipped entry 'foo' at line 3 col 1: expected '=' after field name 'author' at line 4 col 10"
        );
    }

    #[test]
    fn test_utf8_offset() {
        let err: Error = std::str::from_utf8(b"ab\xffcd").unwrap_err().into();
        assert!(matches!(err, Error::InvalidUtf8 { offset: 2 }));
    }
}
