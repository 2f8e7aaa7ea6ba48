//! Admin mutation engine.
//!
//! Validated create and remove operations for courses and classes. Every
//! operation takes raw field values, checks them against the current
//! contents of the [`Registry`], and only then mutates it. A failed
//! operation never leaves a partial change behind.

use std::collections::BTreeSet;

use crate::domain::{
    Config,
    class::{Class, ClassKey},
    course::{Course, InvalidUnits, Units},
    error::{Classify, ErrorKind, FieldError, parse_field},
    integrity,
    name::{NONE_SENTINEL, Name},
    registry::Registry,
};

/// Errors from [`create_course`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateCourseError {
    /// The course name is not a valid field value.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// A course with this name already exists.
    #[error("course {0} already exists")]
    DuplicateName(Name),
    /// The unit weight is out of range.
    #[error(transparent)]
    InvalidUnits(#[from] InvalidUnits),
    /// A prerequisite names a course that does not exist.
    #[error("prerequisite {0} is not an existing course")]
    UnknownPrerequisite(String),
}

impl Classify for CreateCourseError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Field(_) | Self::InvalidUnits(_) => ErrorKind::ValidationFailed,
            Self::DuplicateName(_) => ErrorKind::DuplicateKey,
            Self::UnknownPrerequisite(_) => ErrorKind::UnknownReference,
        }
    }
}

/// Errors from [`remove_course`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoveCourseError {
    /// No such course.
    #[error("course {0} not found")]
    NotFound(String),
    /// At least one class still teaches the course.
    #[error("course {course} is still taught by {} class(es)", .classes.len())]
    InUseByClass {
        /// The course.
        course: Name,
        /// The classes teaching it.
        classes: Vec<ClassKey>,
    },
    /// At least one other course requires this course.
    #[error("course {course} is a prerequisite of {} course(s)", .dependents.len())]
    InUseAsPrerequisite {
        /// The course.
        course: Name,
        /// The courses requiring it.
        dependents: Vec<Name>,
    },
}

impl Classify for RemoveCourseError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::UnknownReference,
            Self::InUseByClass { .. } | Self::InUseAsPrerequisite { .. } => {
                ErrorKind::ConstraintViolation
            }
        }
    }
}

/// Errors from [`create_class`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateClassError {
    /// A field is blank, too long, or otherwise invalid.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The course does not exist.
    #[error("course {0} not found")]
    UnknownCourse(String),
    /// The course is already taught in this classroom.
    #[error("class {0} already exists")]
    DuplicateKey(ClassKey),
}

impl Classify for CreateClassError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Field(_) => ErrorKind::ValidationFailed,
            Self::UnknownCourse(_) => ErrorKind::UnknownReference,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
        }
    }
}

/// Errors from [`remove_class`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoveClassError {
    /// No such class.
    #[error("class {course} in {classroom} not found")]
    NotFound {
        /// The course name that was given.
        course: String,
        /// The classroom that was given.
        classroom: String,
    },
}

impl Classify for RemoveClassError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::UnknownReference
    }
}

/// Parses a list of raw prerequisite names.
///
/// Blank entries are ignored, repeats collapse, and a lone `None` means
/// "no prerequisites".
fn prerequisite_names<'a>(raw: &'a [&'a str]) -> BTreeSet<&'a str> {
    raw.iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && *name != NONE_SENTINEL)
        .collect()
}

/// Creates a course.
///
/// # Errors
///
/// Fails without changing the registry if the name is invalid or taken, the
/// units are outside `0..=50`, or a prerequisite is not an existing course.
pub fn create_course(
    registry: &mut Registry,
    config: &Config,
    name: &str,
    units: i64,
    prerequisites: &[&str],
) -> Result<Course, CreateCourseError> {
    let name = parse_field("course name", name, config.max_field_length())?;
    if registry.course(&name).is_some() {
        return Err(CreateCourseError::DuplicateName(name));
    }
    let units = Units::new(units)?;

    let wanted = prerequisite_names(prerequisites);
    if let Some(unknown) = integrity::first_unknown_prerequisite(registry, wanted.iter().copied())
    {
        return Err(CreateCourseError::UnknownPrerequisite(unknown.to_string()));
    }
    let prerequisites = wanted
        .into_iter()
        .filter_map(|prerequisite| registry.course(prerequisite))
        .map(|course| course.name().clone())
        .collect();

    let course = Course::new(name, units, prerequisites);
    registry
        .insert_course(course.clone())
        .map_err(|_| CreateCourseError::DuplicateName(course.name().clone()))?;

    tracing::info!("Created course {course}");
    Ok(course)
}

/// Removes a course that nothing refers to.
///
/// # Errors
///
/// Fails without changing the registry if the course does not exist, is
/// taught by a class, or is a prerequisite of another course.
pub fn remove_course(registry: &mut Registry, name: &str) -> Result<Course, RemoveCourseError> {
    integrity::course_deletable(registry, name)?;

    let course = registry
        .remove_course(name)
        .ok_or_else(|| RemoveCourseError::NotFound(name.to_string()))?;

    tracing::info!("Removed course {}", course.name());
    Ok(course)
}

/// Creates a class of an existing course, with an empty roster.
///
/// The course is looked up as it is stored; only the new classroom is held
/// to the configured field length.
///
/// # Errors
///
/// Fails without changing the registry if a field is invalid, the course
/// does not exist, or the course is already taught in the classroom.
pub fn create_class(
    registry: &mut Registry,
    config: &Config,
    course: &str,
    classroom: &str,
) -> Result<Class, CreateClassError> {
    let course = course.trim();
    if course.is_empty() {
        return Err(FieldError::Blank {
            field: "course name",
        }
        .into());
    }
    let course = registry
        .course(course)
        .map(|found| found.name().clone())
        .ok_or_else(|| CreateClassError::UnknownCourse(course.to_string()))?;
    let classroom = parse_field("classroom", classroom, config.max_field_length())?;

    let class = Class::new(ClassKey::new(course, classroom));
    registry
        .insert_class(class.clone())
        .map_err(|_| CreateClassError::DuplicateKey(class.key().clone()))?;

    tracing::info!("Created class {}", class.key());
    Ok(class)
}

/// Removes a class, returning it with the roster it had.
///
/// Students on the roster lose their seat. Their prior enrollment history is
/// not touched.
///
/// # Errors
///
/// Returns [`RemoveClassError::NotFound`] if there is no such class.
pub fn remove_class(
    registry: &mut Registry,
    course: &str,
    classroom: &str,
) -> Result<Class, RemoveClassError> {
    let key = integrity::class_deletable(registry, course, classroom)?;
    let class = registry
        .remove_class(&key)
        .ok_or_else(|| RemoveClassError::NotFound {
            course: course.to_string(),
            classroom: classroom.to_string(),
        })?;

    if class.roster().is_empty() {
        tracing::info!("Removed class {key}");
    } else {
        tracing::warn!(
            "Removed class {key}; {} enrolled student(s) lost their seat",
            class.roster().len()
        );
    }
    Ok(class)
}
