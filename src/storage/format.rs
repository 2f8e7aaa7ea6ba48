//! The line-oriented text format of the four record files.
//!
//! One record per line, fields separated by `" / "`:
//!
//! ```text
//! users:    Admin / <username> / <password>
//!           Student / <id> / <password> / <name> / <unit limit>
//! courses:  <course> / <units> / <prerequisite> <prerequisite> ...
//! classes:  <course> / <classroom> / <student id> <student id> ...
//! history:  <student id> / <course> <course> ...
//! ```
//!
//! Space-separated list fields are written as `None` when empty. Lines that
//! cannot be parsed are dropped with a [`SkippedLine`] describing why; they
//! never abort a load.

use std::{collections::BTreeSet, fmt, num::ParseIntError};

use crate::domain::{
    Class, ClassKey, Classify, Course, DuplicateKey, ErrorKind, FieldText, InvalidNameError,
    InvalidUnits, Name, PriorEnrollment, Registry, Role, Units, User,
    name::{DELIMITER, NONE_SENTINEL},
    user::{InvalidSecret, Secret},
};

/// Which of the four record files a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Admin and student accounts.
    User,
    /// Courses.
    Course,
    /// Classes and their rosters.
    Class,
    /// Prior enrollment history.
    History,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::User => "user",
            Self::Course => "course",
            Self::Class => "class",
            Self::History => "history",
        };
        f.write_str(s)
    }
}

/// The contents of the four record files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFiles {
    /// Contents of the users file.
    pub users: String,
    /// Contents of the courses file.
    pub courses: String,
    /// Contents of the classes file.
    pub classes: String,
    /// Contents of the history file.
    pub history: String,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// The line had the wrong number of fields.
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Fields required for this record type.
        expected: usize,
        /// Fields present on the line.
        found: usize,
    },
    /// A user line did not start with `Admin` or `Student`.
    #[error("unknown account type '{0}'")]
    UnknownRole(String),
    /// A field that must be an integer was not.
    #[error("{field} is not an integer: {source}")]
    InvalidInteger {
        /// The field.
        field: &'static str,
        /// The parse failure.
        source: ParseIntError,
    },
    /// The units field was out of range.
    #[error(transparent)]
    InvalidUnits(#[from] InvalidUnits),
    /// A name or identifier was invalid.
    #[error("{field}: {source}")]
    InvalidName {
        /// The field.
        field: &'static str,
        /// Why the name was rejected.
        source: InvalidNameError,
    },
    /// The password field was invalid.
    #[error(transparent)]
    InvalidSecret(#[from] InvalidSecret),
    /// A record with the same key appeared earlier.
    #[error(transparent)]
    Duplicate(#[from] DuplicateKey),
}

/// A line that was dropped while loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("skipped {kind} line {line}: {reason}")]
pub struct SkippedLine {
    /// The file the line came from.
    pub kind: RecordKind,
    /// One-based line number.
    pub line: usize,
    /// Why it was skipped.
    pub reason: LineError,
}

impl Classify for SkippedLine {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ParseSkipped
    }
}

/// The result of parsing the four record files.
#[derive(Debug, Default)]
pub struct Parsed {
    /// The records that parsed.
    pub registry: Registry,
    /// The lines that did not.
    pub skipped: Vec<SkippedLine>,
}

fn fields(line: &str, expected: usize) -> Result<Vec<&str>, LineError> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() == expected {
        Ok(fields)
    } else {
        Err(LineError::FieldCount {
            expected,
            found: fields.len(),
        })
    }
}

fn name(field: &'static str, value: &str) -> Result<Name, LineError> {
    Name::new(value).map_err(|source| LineError::InvalidName { field, source })
}

fn names(field: &'static str, value: &str) -> Result<Vec<Name>, LineError> {
    if value == NONE_SENTINEL {
        return Ok(Vec::new());
    }
    value
        .split_whitespace()
        .map(|token| name(field, token))
        .collect()
}

fn join(names: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let joined = names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        NONE_SENTINEL.to_string()
    } else {
        joined
    }
}

/// Parses a line of the users file.
///
/// # Errors
///
/// Returns the reason the line is malformed.
pub fn parse_user(line: &str) -> Result<User, LineError> {
    let role = line.split(DELIMITER).next().unwrap_or_default().trim();
    match role {
        "Admin" => {
            let f = fields(line, 3)?;
            Ok(User::admin(name("username", f[1])?, Secret::new(f[2])?))
        }
        "Student" => {
            let f = fields(line, 5)?;
            let display_name = FieldText::new(f[3])
                .map_err(|source| LineError::InvalidName { field: "name", source })?;
            let unit_limit = f[4]
                .parse::<u32>()
                .map_err(|source| LineError::InvalidInteger {
                    field: "unit limit",
                    source,
                })?;
            Ok(User::student(
                name("id number", f[1])?,
                Secret::new(f[2])?,
                display_name,
                unit_limit,
            ))
        }
        other => Err(LineError::UnknownRole(other.to_string())),
    }
}

/// Formats a user as a line of the users file.
#[must_use]
pub fn format_user(user: &User) -> String {
    match user.role() {
        Role::Admin => ["Admin", user.id().as_str(), user.secret().expose()].join(DELIMITER),
        Role::Student(profile) => {
            let unit_limit = profile.unit_limit.to_string();
            [
                "Student",
                user.id().as_str(),
                user.secret().expose(),
                profile.display_name.as_str(),
                unit_limit.as_str(),
            ]
            .join(DELIMITER)
        }
    }
}

/// Parses a line of the courses file.
///
/// # Errors
///
/// Returns the reason the line is malformed.
pub fn parse_course(line: &str) -> Result<Course, LineError> {
    let f = fields(line, 3)?;
    let units = f[1]
        .parse::<i64>()
        .map_err(|source| LineError::InvalidInteger {
            field: "units",
            source,
        })?;
    Ok(Course::new(
        name("course name", f[0])?,
        Units::new(units)?,
        names("prerequisites", f[2])?.into_iter().collect(),
    ))
}

/// Formats a course as a line of the courses file.
#[must_use]
pub fn format_course(course: &Course) -> String {
    [
        course.name().to_string(),
        course.units().to_string(),
        join(course.prerequisites()),
    ]
    .join(DELIMITER)
}

/// Parses a line of the classes file.
///
/// # Errors
///
/// Returns the reason the line is malformed.
pub fn parse_class(line: &str) -> Result<Class, LineError> {
    let f = fields(line, 3)?;
    let key = ClassKey::new(name("course name", f[0])?, name("classroom", f[1])?);
    Ok(Class::with_roster(key, names("roster", f[2])?))
}

/// Formats a class as a line of the classes file.
#[must_use]
pub fn format_class(class: &Class) -> String {
    [
        class.course().to_string(),
        class.classroom().to_string(),
        join(class.roster()),
    ]
    .join(DELIMITER)
}

/// Parses a line of the history file.
///
/// # Errors
///
/// Returns the reason the line is malformed.
pub fn parse_history(line: &str) -> Result<PriorEnrollment, LineError> {
    let f = fields(line, 2)?;
    let courses: BTreeSet<Name> = names("courses", f[1])?.into_iter().collect();
    Ok(PriorEnrollment::new(name("id number", f[0])?, courses))
}

/// Formats a history record as a line of the history file.
#[must_use]
pub fn format_history(record: &PriorEnrollment) -> String {
    [record.student().to_string(), join(record.courses())].join(DELIMITER)
}

/// Parses every non-blank line of `content`, inserting each record with
/// `insert` and collecting the lines that fail.
fn load_file<T>(
    kind: RecordKind,
    content: &str,
    parse: impl Fn(&str) -> Result<T, LineError>,
    mut insert: impl FnMut(T) -> Result<(), DuplicateKey>,
    skipped: &mut Vec<SkippedLine>,
) {
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let result = parse(line).and_then(|record| insert(record).map_err(LineError::from));
        if let Err(reason) = result {
            let skip = SkippedLine {
                kind,
                line: index + 1,
                reason,
            };
            tracing::warn!("{skip}");
            skipped.push(skip);
        }
    }
}

/// Builds a record store from the contents of the four record files.
///
/// Malformed lines and lines repeating an earlier key are dropped and
/// reported in [`Parsed::skipped`]. References between records are not
/// checked here; see [`crate::domain::integrity::audit`].
#[must_use]
pub fn load(files: &DataFiles) -> Parsed {
    let mut registry = Registry::new();
    let mut skipped = Vec::new();

    load_file(
        RecordKind::User,
        &files.users,
        parse_user,
        |user| registry.insert_user(user),
        &mut skipped,
    );
    load_file(
        RecordKind::Course,
        &files.courses,
        parse_course,
        |course| registry.insert_course(course),
        &mut skipped,
    );
    load_file(
        RecordKind::Class,
        &files.classes,
        parse_class,
        |class| registry.insert_class(class),
        &mut skipped,
    );
    load_file(
        RecordKind::History,
        &files.history,
        parse_history,
        |record| registry.insert_history(record),
        &mut skipped,
    );

    tracing::debug!(
        users = registry.users().count(),
        courses = registry.courses().count(),
        classes = registry.classes().count(),
        skipped = skipped.len(),
        "Loaded records"
    );

    Parsed { registry, skipped }
}

fn lines<T>(records: impl Iterator<Item = T>, format: impl Fn(T) -> String) -> String {
    records.map(|record| format(record) + "\n").collect()
}

/// Renders the record store as the contents of the four record files.
///
/// Courses and classes are written sorted by key; users and history in the
/// order they were inserted.
#[must_use]
pub fn serialize(registry: &Registry) -> DataFiles {
    DataFiles {
        users: lines(registry.users(), format_user),
        courses: lines(registry.courses(), format_course),
        classes: lines(registry.classes(), format_class),
        history: lines(registry.history(), format_history),
    }
}
