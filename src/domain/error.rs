//! Classification of core failures.
//!
//! Each operation in the core returns its own error enum. All of them map
//! onto one of a small number of [`ErrorKind`]s so that a caller can decide
//! how to react (re-prompt, show a reason, ...) without matching every
//! variant. None of them are fatal.

use std::fmt;

use super::name::{InvalidNameError, Name};

/// The broad category of a core failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A persisted line was malformed and has been dropped.
    ParseSkipped,
    /// A raw field value was blank, too long, or out of range.
    ValidationFailed,
    /// A record with the same key already exists.
    DuplicateKey,
    /// A referenced course, class, or user does not exist.
    UnknownReference,
    /// The operation would break an invariant of the record store.
    ConstraintViolation,
    /// A secret did not match.
    CredentialMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ParseSkipped => "parse skipped",
            Self::ValidationFailed => "validation failed",
            Self::DuplicateKey => "duplicate key",
            Self::UnknownReference => "unknown reference",
            Self::ConstraintViolation => "constraint violation",
            Self::CredentialMismatch => "credential mismatch",
        };
        f.write_str(s)
    }
}

/// Errors that can be sorted into an [`ErrorKind`].
pub trait Classify {
    /// Returns the category of this error.
    fn kind(&self) -> ErrorKind;
}

/// A raw field value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field was left blank.
    #[error("{field} must not be blank")]
    Blank {
        /// Which field was blank.
        field: &'static str,
    },
    /// The field is longer than the configured maximum.
    #[error("{field} must be at most {max} characters (got {len})")]
    TooLong {
        /// Which field was too long.
        field: &'static str,
        /// The configured maximum length.
        max: usize,
        /// The actual length.
        len: usize,
    },
    /// The field contained characters that cannot be stored.
    #[error("{field}: {source}")]
    Invalid {
        /// Which field was invalid.
        field: &'static str,
        /// Why it was rejected.
        source: InvalidNameError,
    },
}

impl Classify for FieldError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailed
    }
}

/// Validates a raw field value as a [`Name`] no longer than `max_len`.
///
/// # Errors
///
/// Returns a [`FieldError`] naming `field` if the value is blank, too long,
/// or otherwise not a valid name.
pub fn parse_field(field: &'static str, raw: &str, max_len: usize) -> Result<Name, FieldError> {
    let raw = raw.trim();
    let name = Name::new(raw).map_err(|source| match source {
        InvalidNameError::Blank => FieldError::Blank { field },
        source => FieldError::Invalid { field, source },
    })?;

    let len = name.char_len();
    if len > max_len {
        return Err(FieldError::TooLong {
            field,
            max: max_len,
            len,
        });
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_trims_input() {
        assert_eq!(parse_field("course", "  CS101 ", 10).unwrap().as_str(), "CS101");
    }

    #[test]
    fn parse_field_reports_blank() {
        assert_eq!(
            parse_field("classroom", "", 10).unwrap_err(),
            FieldError::Blank { field: "classroom" }
        );
    }

    #[test]
    fn parse_field_reports_length() {
        let error = parse_field("classroom", "ABCDEFGHIJK", 10).unwrap_err();
        assert_eq!(
            error,
            FieldError::TooLong {
                field: "classroom",
                max: 10,
                len: 11
            }
        );
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn parse_field_rejects_sentinel() {
        assert!(matches!(
            parse_field("course", "None", 10),
            Err(FieldError::Invalid {
                source: InvalidNameError::Reserved,
                ..
            })
        ));
    }
}
