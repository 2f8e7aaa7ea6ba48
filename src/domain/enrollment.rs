//! Enrollment eligibility engine.
//!
//! Live enrollment is never stored separately: it is recomputed from class
//! rosters every time it is needed. A student may take a class when
//!
//! - the class's course fits in their remaining unit budget,
//! - they are not already enrolled in any class of that course,
//! - they have not already completed the course, and
//! - they have completed every prerequisite of the course.

use std::{collections::BTreeSet, fmt};

use crate::domain::{
    class::{Class, ClassKey},
    course::Course,
    error::{Classify, ErrorKind},
    name::Name,
    registry::Registry,
    user::StudentProfile,
};

/// Why a student may not take a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
    /// The student already holds a seat in a class of this course.
    AlreadyEnrolled(Name),
    /// The student completed this course in a previous period.
    AlreadyCompleted(Name),
    /// The course is heavier than the remaining unit budget.
    InsufficientUnits {
        /// Units the course carries.
        required: u32,
        /// Units the student has left.
        remaining: u32,
    },
    /// Prerequisites the student has not completed.
    MissingPrerequisites(Vec<Name>),
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyEnrolled(course) => write!(f, "already enrolled in {course}"),
            Self::AlreadyCompleted(course) => write!(f, "already completed {course}"),
            Self::InsufficientUnits {
                required,
                remaining,
            } => write!(f, "needs {required} units but only {remaining} remain"),
            Self::MissingPrerequisites(missing) => {
                let names: Vec<&str> = missing.iter().map(Name::as_str).collect();
                write!(f, "missing prerequisites: {}", names.join(", "))
            }
        }
    }
}

/// Errors from eligibility queries and [`enroll`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollError {
    /// No student has this identifier.
    #[error("no student '{0}'")]
    UnknownStudent(String),
    /// No such class.
    #[error("no class {0}")]
    UnknownClass(String),
    /// The class teaches a course that no longer exists.
    #[error("class {0} teaches a course that does not exist")]
    UnknownCourse(ClassKey),
    /// The student may not take the class.
    #[error("cannot enroll in {class}: {reason}")]
    NotEligible {
        /// The class.
        class: ClassKey,
        /// Why not.
        reason: Ineligible,
    },
}

impl Classify for EnrollError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownStudent(_) | Self::UnknownClass(_) | Self::UnknownCourse(_) => {
                ErrorKind::UnknownReference
            }
            Self::NotEligible { .. } => ErrorKind::ConstraintViolation,
        }
    }
}

/// Errors from [`drop_class`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    /// No student has this identifier.
    #[error("no student '{0}'")]
    UnknownStudent(String),
    /// No such class.
    #[error("no class {0}")]
    UnknownClass(String),
    /// The student is not on the class roster.
    #[error("{student} is not enrolled in {class}")]
    NotEnrolled {
        /// The student.
        student: Name,
        /// The class.
        class: ClassKey,
    },
}

impl Classify for DropError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::UnknownReference
    }
}

/// The names of courses the student currently holds a seat in.
#[must_use]
pub fn live_courses<'a>(registry: &'a Registry, student: &'a str) -> BTreeSet<&'a Name> {
    registry.classes_of(student).map(Class::course).collect()
}

/// Total units of the courses the student currently holds a seat in.
///
/// Courses that no longer exist count as zero.
#[must_use]
pub fn unit_load(registry: &Registry, student: &str) -> u32 {
    live_courses(registry, student)
        .into_iter()
        .filter_map(|course| registry.course(course))
        .map(|course| course.units().get())
        .sum()
}

fn profile<'a>(registry: &'a Registry, student: &str) -> Option<&'a StudentProfile> {
    registry.user(student).and_then(|user| user.as_student())
}

/// The student's unit limit minus their live unit load, floored at zero.
///
/// # Errors
///
/// Returns [`EnrollError::UnknownStudent`] if `student` is not a student.
pub fn units_remaining(registry: &Registry, student: &str) -> Result<u32, EnrollError> {
    let profile = profile(registry, student)
        .ok_or_else(|| EnrollError::UnknownStudent(student.to_string()))?;
    Ok(profile
        .unit_limit
        .saturating_sub(unit_load(registry, student)))
}

/// A snapshot of everything eligibility depends on for one student.
struct Standing<'a> {
    live: BTreeSet<&'a Name>,
    prior: BTreeSet<&'a Name>,
    remaining: u32,
}

impl<'a> Standing<'a> {
    fn of(registry: &'a Registry, student: &'a str) -> Result<Self, EnrollError> {
        let remaining = units_remaining(registry, student)?;
        Ok(Self {
            live: live_courses(registry, student),
            prior: registry.prior_courses(student),
            remaining,
        })
    }

    fn check(&self, course: &Course) -> Result<(), Ineligible> {
        if self.live.contains(course.name()) {
            return Err(Ineligible::AlreadyEnrolled(course.name().clone()));
        }
        if self.prior.contains(course.name()) {
            return Err(Ineligible::AlreadyCompleted(course.name().clone()));
        }

        let required = course.units().get();
        if required > self.remaining {
            return Err(Ineligible::InsufficientUnits {
                required,
                remaining: self.remaining,
            });
        }

        let missing: Vec<Name> = course
            .prerequisites()
            .iter()
            .filter(|prerequisite| !self.prior.contains(prerequisite))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Ineligible::MissingPrerequisites(missing));
        }

        Ok(())
    }
}

/// Checks whether the student may enroll in a class.
///
/// # Errors
///
/// Returns [`EnrollError::NotEligible`] with the reason if the student may
/// not take the class, or an unknown-reference error if the student, class
/// or course does not exist.
pub fn eligibility(registry: &Registry, student: &str, class: &ClassKey) -> Result<(), EnrollError> {
    let standing = Standing::of(registry, student)?;
    let class = registry
        .class(class)
        .ok_or_else(|| EnrollError::UnknownClass(class.to_string()))?;
    let course = registry
        .course(class.course())
        .ok_or_else(|| EnrollError::UnknownCourse(class.key().clone()))?;

    standing
        .check(course)
        .map_err(|reason| EnrollError::NotEligible {
            class: class.key().clone(),
            reason,
        })
}

/// The classes the student may currently enroll in, sorted by course name
/// and classroom.
///
/// # Errors
///
/// Returns [`EnrollError::UnknownStudent`] if `student` is not a student.
pub fn available_classes<'a>(
    registry: &'a Registry,
    student: &'a str,
) -> Result<Vec<&'a Class>, EnrollError> {
    let standing = Standing::of(registry, student)?;

    Ok(registry
        .classes()
        .filter(|class| {
            registry
                .course(class.course())
                .is_some_and(|course| standing.check(course).is_ok())
        })
        .collect())
}

/// The classes the student currently holds a seat in.
///
/// # Errors
///
/// Returns [`EnrollError::UnknownStudent`] if `student` is not a student.
pub fn enrolled_classes<'a>(
    registry: &'a Registry,
    student: &'a str,
) -> Result<Vec<&'a Class>, EnrollError> {
    if profile(registry, student).is_none() {
        return Err(EnrollError::UnknownStudent(student.to_string()));
    }
    Ok(registry.classes_of(student).collect())
}

/// Adds the student to the class roster.
///
/// # Errors
///
/// Fails without changing anything if the student may not take the class.
/// See [`eligibility`].
pub fn enroll(registry: &mut Registry, student: &str, class: &ClassKey) -> Result<(), EnrollError> {
    eligibility(registry, student, class)?;

    let id = registry
        .user(student)
        .map(|user| user.id().clone())
        .ok_or_else(|| EnrollError::UnknownStudent(student.to_string()))?;
    let roster = registry
        .class_mut(class)
        .ok_or_else(|| EnrollError::UnknownClass(class.to_string()))?;

    if !roster.add_student(id) {
        return Err(EnrollError::NotEligible {
            class: class.clone(),
            reason: Ineligible::AlreadyEnrolled(class.course.clone()),
        });
    }

    tracing::info!("Enrolled {student} in {class}");
    Ok(())
}

/// Removes the student from the class roster.
///
/// # Errors
///
/// Fails if the student or class does not exist, or the student is not on
/// the roster.
pub fn drop_class(registry: &mut Registry, student: &str, class: &ClassKey) -> Result<(), DropError> {
    let id = registry
        .user(student)
        .filter(|user| user.as_student().is_some())
        .map(|user| user.id().clone())
        .ok_or_else(|| DropError::UnknownStudent(student.to_string()))?;
    let roster = registry
        .class_mut(class)
        .ok_or_else(|| DropError::UnknownClass(class.to_string()))?;

    if !roster.remove_student(&id) {
        return Err(DropError::NotEnrolled {
            student: id,
            class: class.clone(),
        });
    }

    tracing::info!("Dropped {student} from {class}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        course::Units,
        history::PriorEnrollment,
        name::FieldText,
        user::{Secret, User},
    };

    fn name(s: &str) -> Name {
        Name::new(s).unwrap()
    }

    fn key(course: &str, room: &str) -> ClassKey {
        ClassKey::new(name(course), name(room))
    }

    fn add_course(registry: &mut Registry, n: &str, units: i64, prerequisites: &[&str]) {
        registry
            .insert_course(Course::new(
                name(n),
                Units::new(units).unwrap(),
                prerequisites.iter().map(|p| name(p)).collect(),
            ))
            .unwrap();
    }

    fn add_student(registry: &mut Registry, id: &str, limit: u32) {
        registry
            .insert_user(User::student(
                name(id),
                Secret::new("pw").unwrap(),
                FieldText::new("Student").unwrap(),
                limit,
            ))
            .unwrap();
    }

    fn set_prior(registry: &mut Registry, student: &str, courses: &[&str]) {
        registry.remove_history(student);
        registry
            .insert_history(PriorEnrollment::new(
                name(student),
                courses.iter().map(|c| name(c)).collect(),
            ))
            .unwrap();
    }

    fn available(registry: &Registry, student: &str) -> Vec<ClassKey> {
        available_classes(registry, student)
            .unwrap()
            .into_iter()
            .map(|class| class.key().clone())
            .collect()
    }

    /// CS101 (3 units) and CS102 (3 units, requires CS101), one class each.
    fn catalogue() -> Registry {
        let mut registry = Registry::new();
        add_course(&mut registry, "CS101", 3, &[]);
        add_course(&mut registry, "CS102", 3, &["CS101"]);
        registry.insert_class(Class::new(key("CS101", "R1"))).unwrap();
        registry.insert_class(Class::new(key("CS101", "R2"))).unwrap();
        registry.insert_class(Class::new(key("CS102", "R1"))).unwrap();
        add_student(&mut registry, "s1", 6);
        registry
    }

    #[test]
    fn prerequisites_gate_availability() {
        let mut registry = catalogue();
        assert_eq!(
            available(&registry, "s1"),
            [key("CS101", "R1"), key("CS101", "R2")]
        );

        enroll(&mut registry, "s1", &key("CS101", "R1")).unwrap();
        set_prior(&mut registry, "s1", &["CS101"]);

        assert_eq!(available(&registry, "s1"), [key("CS102", "R1")]);
    }

    #[test]
    fn never_offers_live_or_completed_courses() {
        let mut registry = catalogue();
        add_course(&mut registry, "MATH1", 1, &[]);
        registry.insert_class(Class::new(key("MATH1", "R9"))).unwrap();
        set_prior(&mut registry, "s1", &["MATH1"]);
        enroll(&mut registry, "s1", &key("CS101", "R2")).unwrap();

        let live = live_courses(&registry, "s1");
        let prior = registry.prior_courses("s1");
        for class in available_classes(&registry, "s1").unwrap() {
            assert!(!live.contains(class.course()));
            assert!(!prior.contains(class.course()));
        }
        assert!(available(&registry, "s1").is_empty());
    }

    #[test]
    fn second_section_of_same_course_is_rejected() {
        let mut registry = catalogue();
        enroll(&mut registry, "s1", &key("CS101", "R1")).unwrap();

        let error = enroll(&mut registry, "s1", &key("CS101", "R2")).unwrap_err();
        assert_eq!(
            error,
            EnrollError::NotEligible {
                class: key("CS101", "R2"),
                reason: Ineligible::AlreadyEnrolled(name("CS101")),
            }
        );
        assert!(registry.class(&key("CS101", "R2")).unwrap().roster().is_empty());
    }

    #[test]
    fn enrolling_twice_is_rejected() {
        let mut registry = catalogue();
        enroll(&mut registry, "s1", &key("CS101", "R1")).unwrap();
        assert!(enroll(&mut registry, "s1", &key("CS101", "R1")).is_err());
        assert_eq!(registry.class(&key("CS101", "R1")).unwrap().roster().len(), 1);
    }

    #[test]
    fn unit_limit_is_enforced() {
        let mut registry = Registry::new();
        add_course(&mut registry, "BIG", 4, &[]);
        registry.insert_class(Class::new(key("BIG", "R1"))).unwrap();
        add_student(&mut registry, "s1", 3);

        let error = enroll(&mut registry, "s1", &key("BIG", "R1")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(
            error,
            EnrollError::NotEligible {
                class: key("BIG", "R1"),
                reason: Ineligible::InsufficientUnits {
                    required: 4,
                    remaining: 3
                },
            }
        );
        assert!(enrolled_classes(&registry, "s1").unwrap().is_empty());
        assert!(available(&registry, "s1").is_empty());
    }

    #[test]
    fn enroll_then_drop_restores_eligibility() {
        let mut registry = catalogue();
        add_course(&mut registry, "ART1", 2, &[]);
        registry.insert_class(Class::new(key("ART1", "R1"))).unwrap();

        let before = available(&registry, "s1");
        let remaining_before = units_remaining(&registry, "s1").unwrap();

        enroll(&mut registry, "s1", &key("ART1", "R1")).unwrap();
        assert_eq!(units_remaining(&registry, "s1").unwrap(), remaining_before - 2);
        assert_ne!(available(&registry, "s1"), before);

        drop_class(&mut registry, "s1", &key("ART1", "R1")).unwrap();
        assert_eq!(units_remaining(&registry, "s1").unwrap(), remaining_before);
        assert_eq!(available(&registry, "s1"), before);
    }

    #[test]
    fn zero_unit_course_fits_a_full_budget() {
        let mut registry = catalogue();
        add_course(&mut registry, "PE", 0, &[]);
        registry.insert_class(Class::new(key("PE", "GYM"))).unwrap();
        enroll(&mut registry, "s1", &key("CS101", "R1")).unwrap();
        add_course(&mut registry, "ART1", 3, &[]);
        registry.insert_class(Class::new(key("ART1", "R1"))).unwrap();
        enroll(&mut registry, "s1", &key("ART1", "R1")).unwrap();

        assert_eq!(units_remaining(&registry, "s1").unwrap(), 0);
        assert_eq!(available(&registry, "s1"), [key("PE", "GYM")]);
    }

    #[test]
    fn reports_missing_prerequisites() {
        let registry = catalogue();
        assert_eq!(
            eligibility(&registry, "s1", &key("CS102", "R1")),
            Err(EnrollError::NotEligible {
                class: key("CS102", "R1"),
                reason: Ineligible::MissingPrerequisites(vec![name("CS101")]),
            })
        );
    }

    #[test]
    fn drop_requires_enrollment() {
        let mut registry = catalogue();
        let error = drop_class(&mut registry, "s1", &key("CS101", "R1")).unwrap_err();
        assert_eq!(
            error,
            DropError::NotEnrolled {
                student: name("s1"),
                class: key("CS101", "R1"),
            }
        );
        assert_eq!(error.kind(), ErrorKind::UnknownReference);
    }

    #[test]
    fn unknown_references_are_reported() {
        let mut registry = catalogue();
        registry
            .insert_user(User::admin(name("admin"), Secret::new("pw").unwrap()))
            .unwrap();

        assert_eq!(
            available_classes(&registry, "admin").unwrap_err(),
            EnrollError::UnknownStudent("admin".into())
        );
        assert_eq!(
            enroll(&mut registry, "s1", &key("CS999", "R1")).unwrap_err().kind(),
            ErrorKind::UnknownReference
        );
        assert!(matches!(
            drop_class(&mut registry, "nobody", &key("CS101", "R1")),
            Err(DropError::UnknownStudent(_))
        ));
    }

    #[test]
    fn class_of_removed_course_is_never_available() {
        let mut registry = catalogue();
        registry.insert_class(Class::new(key("GONE", "R1"))).unwrap();
        assert!(!available(&registry, "s1").contains(&key("GONE", "R1")));
        assert_eq!(
            enroll(&mut registry, "s1", &key("GONE", "R1")),
            Err(EnrollError::UnknownCourse(key("GONE", "R1")))
        );
    }
}
