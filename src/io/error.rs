//! Canonical error type for every structure reader and writer.
//!
//! Records that are merely decorative or outside a format's data shape are skipped by the
//! readers and never reach this type; only failures that abort a whole parse do.

use crate::model::notation::NotationError;
use thiserror::Error;

/// Errors that can occur while reading or writing RNA structure data.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure of the underlying stream.
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// A required field is malformed, e.g. a non-numeric coordinate.
    #[error("failed to parse {format} input: {details} (line {line_number})")]
    Format {
        /// Name of the textual format (e.g. `"PDB"`, `"Stockholm"`).
        format: &'static str,
        /// One-based line number where parsing failed.
        line_number: usize,
        details: String,
    },

    /// A required element is absent from a structured document.
    #[error("missing required <{element}> element in {format} input")]
    MissingElement {
        format: &'static str,
        element: String,
    },

    /// Bracket notation in the input could not be decoded.
    #[error("invalid notation in {format} input: {source}")]
    Notation {
        format: &'static str,
        #[source]
        source: NotationError,
    },
}

impl Error {
    pub fn from_io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub fn format(format: &'static str, line_number: usize, details: impl Into<String>) -> Self {
        Self::Format {
            format,
            line_number,
            details: details.into(),
        }
    }

    pub fn missing_element(format: &'static str, element: impl Into<String>) -> Self {
        Self::MissingElement {
            format,
            element: element.into(),
        }
    }

    pub fn notation(format: &'static str, source: NotationError) -> Self {
        Self::Notation { format, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_format_and_location() {
        let err = Error::format("PDB", 12, "invalid X coordinate");
        assert_eq!(
            err.to_string(),
            "failed to parse PDB input: invalid X coordinate (line 12)"
        );

        let err = Error::missing_element("RNAML", "position");
        assert_eq!(
            err.to_string(),
            "missing required <position> element in RNAML input"
        );

        let err = Error::notation("dot-bracket", NotationError::UnmatchedClose(4));
        assert_eq!(
            err.to_string(),
            "invalid notation in dot-bracket input: unmatched closing bracket at position 4"
        );
    }
}
