use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// The delimiter separating fields in a persisted record line.
pub const DELIMITER: &str = " / ";

/// Placeholder written in place of an empty list field.
///
/// Because it stands for "nothing", it can never be used as a name.
pub const NONE_SENTINEL: &str = "None";

/// A validated single-token key: a course name, a classroom, or a user
/// identifier.
///
/// Names are non-empty, contain no whitespace and no `/`, and are never the
/// reserved [`NONE_SENTINEL`]. They order lexicographically, which gives
/// courses and classes their stable listing order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(NonEmptyString);

impl Name {
    /// Creates a new `Name` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is blank, contains whitespace or a `/`,
    /// or is the reserved sentinel `None`.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidNameError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(InvalidNameError::Blank);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(InvalidNameError::Whitespace(s));
        }
        if s.contains('/') {
            return Err(InvalidNameError::Delimiter(s));
        }
        if s == NONE_SENTINEL {
            return Err(InvalidNameError::Reserved);
        }

        NonEmptyString::new(s)
            .map(Self)
            .map_err(|_| InvalidNameError::Blank)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Number of characters in the name.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.as_str().chars().count()
    }
}

/// Error returned when a string is not a valid [`Name`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InvalidNameError {
    /// The string was empty or only whitespace.
    #[error("must not be blank")]
    Blank,
    /// The string contained internal whitespace.
    #[error("'{0}' must not contain spaces")]
    Whitespace(String),
    /// The string contained the field delimiter character.
    #[error("'{0}' must not contain '/'")]
    Delimiter(String),
    /// The string was the reserved sentinel.
    #[error("'None' is reserved")]
    Reserved,
}

impl TryFrom<String> for Name {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Name {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Free text that may appear inside a single record field.
///
/// Used for student display names. Unlike [`Name`] it may contain spaces,
/// but never the field delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldText(NonEmptyString);

impl FieldText {
    /// Creates new field text, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed text is empty or contains `/`.
    pub fn new(s: &str) -> Result<Self, InvalidNameError> {
        let trimmed = s.trim();
        if trimmed.contains('/') {
            return Err(InvalidNameError::Delimiter(trimmed.to_string()));
        }
        NonEmptyString::new(trimmed.to_string())
            .map(Self)
            .map_err(|_| InvalidNameError::Blank)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FieldText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}
