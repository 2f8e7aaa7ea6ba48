use std::fmt;

use crate::domain::name::Name;

/// The identity of a class: a course taught in a classroom.
///
/// Keys order by course name first, then classroom.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClassKey {
    /// The course the class teaches.
    pub course: Name,
    /// The classroom the class meets in.
    pub classroom: Name,
}

impl ClassKey {
    /// Creates a class key.
    #[must_use]
    pub const fn new(course: Name, classroom: Name) -> Self {
        Self { course, classroom }
    }

    /// Whether this key matches the given course and classroom strings.
    #[must_use]
    pub fn is(&self, course: &str, classroom: &str) -> bool {
        self.course.as_str() == course && self.classroom.as_str() == classroom
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.course, self.classroom)
    }
}

/// A section of a course, with its live roster.
///
/// The roster keeps enrollment order and never contains the same student
/// twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    key: ClassKey,
    roster: Vec<Name>,
}

impl Class {
    /// Creates a class with an empty roster.
    #[must_use]
    pub const fn new(key: ClassKey) -> Self {
        Self {
            key,
            roster: Vec::new(),
        }
    }

    /// Creates a class with an existing roster.
    ///
    /// Repeated identifiers are collapsed, keeping the first occurrence.
    #[must_use]
    pub fn with_roster(key: ClassKey, roster: impl IntoIterator<Item = Name>) -> Self {
        let mut class = Self::new(key);
        for student in roster {
            class.add_student(student);
        }
        class
    }

    /// The class identity.
    #[must_use]
    pub const fn key(&self) -> &ClassKey {
        &self.key
    }

    /// The name of the course this class teaches.
    #[must_use]
    pub const fn course(&self) -> &Name {
        &self.key.course
    }

    /// The classroom this class meets in.
    #[must_use]
    pub const fn classroom(&self) -> &Name {
        &self.key.classroom
    }

    /// Enrolled student identifiers, in enrollment order.
    #[must_use]
    pub fn roster(&self) -> &[Name] {
        &self.roster
    }

    /// Whether the student is on the roster.
    #[must_use]
    pub fn has_student(&self, student: &str) -> bool {
        self.roster.iter().any(|id| id.as_str() == student)
    }

    /// Appends a student to the roster.
    ///
    /// Returns `false`, leaving the roster unchanged, if the student is
    /// already on it.
    pub(crate) fn add_student(&mut self, student: Name) -> bool {
        if self.has_student(&student) {
            return false;
        }
        self.roster.push(student);
        true
    }

    /// Removes a student from the roster.
    ///
    /// Returns `false` if the student was not on it.
    pub(crate) fn remove_student(&mut self, student: &str) -> bool {
        let before = self.roster.len();
        self.roster.retain(|id| id.as_str() != student);
        self.roster.len() != before
    }
}
