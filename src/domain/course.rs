use std::{collections::BTreeSet, fmt};

use crate::domain::name::Name;

/// The unit weight of a course, in the inclusive range `0..=50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Units(u8);

impl Units {
    /// The largest unit weight a course may carry.
    pub const MAX: u8 = 50;

    /// Creates a unit weight.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUnits`] if `value` is negative or greater than
    /// [`Units::MAX`].
    pub fn new(value: i64) -> Result<Self, InvalidUnits> {
        u8::try_from(value)
            .ok()
            .filter(|units| *units <= Self::MAX)
            .map(Self)
            .ok_or(InvalidUnits(value))
    }

    /// Returns the unit weight as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A unit weight outside `0..=50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("units must be between 0 and {max}, got {0}", max = Units::MAX)]
pub struct InvalidUnits(pub i64);

/// A course offered by the institution.
///
/// Courses are keyed by name. A course's prerequisites are other course
/// names that a student must have completed before taking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    name: Name,
    units: Units,
    prerequisites: BTreeSet<Name>,
}

impl Course {
    /// Creates a new course.
    #[must_use]
    pub const fn new(name: Name, units: Units, prerequisites: BTreeSet<Name>) -> Self {
        Self {
            name,
            units,
            prerequisites,
        }
    }

    /// The course name.
    #[must_use]
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// The unit weight of the course.
    #[must_use]
    pub const fn units(&self) -> Units {
        self.units
    }

    /// The names of courses that must be completed first.
    #[must_use]
    pub const fn prerequisites(&self) -> &BTreeSet<Name> {
        &self.prerequisites
    }

    /// Whether `course` is one of this course's prerequisites.
    #[must_use]
    pub fn requires(&self, course: &str) -> bool {
        self.prerequisites.contains(course)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} units)", self.name, self.units)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0; "zero")]
    #[test_case(3; "typical")]
    #[test_case(50; "upper bound")]
    fn units_in_range(value: i64) {
        assert_eq!(i64::from(Units::new(value).unwrap().get()), value);
    }

    #[test_case(-1; "negative")]
    #[test_case(51; "over maximum")]
    #[test_case(1000; "far over u8")]
    fn units_out_of_range(value: i64) {
        assert_eq!(Units::new(value).unwrap_err(), InvalidUnits(value));
    }

    #[test]
    fn requires_checks_prerequisite_names() {
        let course = Course::new(
            Name::new("CS102").unwrap(),
            Units::new(3).unwrap(),
            [Name::new("CS101").unwrap()].into_iter().collect(),
        );
        assert!(course.requires("CS101"));
        assert!(!course.requires("CS102"));
    }
}
