use std::collections::BTreeSet;

use crate::domain::name::Name;

/// Courses a student completed before the current enlistment period.
///
/// This history is separate from live enrollment, which is derived from
/// class rosters. Enrolling or dropping never touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorEnrollment {
    student: Name,
    courses: BTreeSet<Name>,
}

impl PriorEnrollment {
    /// Creates a history record.
    #[must_use]
    pub const fn new(student: Name, courses: BTreeSet<Name>) -> Self {
        Self { student, courses }
    }

    /// The student this record belongs to.
    #[must_use]
    pub const fn student(&self) -> &Name {
        &self.student
    }

    /// The completed course names.
    #[must_use]
    pub const fn courses(&self) -> &BTreeSet<Name> {
        &self.courses
    }
}
