//! Referential integrity rules.
//!
//! These functions answer questions about the current contents of a
//! [`Registry`] without changing it: whether a course or class may be
//! removed, whether a prerequisite set is well-formed, and which invariants
//! loaded data already violates.

use std::{collections::BTreeSet, fmt};

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};

use crate::domain::{
    admin::{RemoveClassError, RemoveCourseError},
    class::ClassKey,
    enrollment,
    name::Name,
    registry::Registry,
};

/// Everything that refers to a course.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CourseUsage {
    /// Classes that teach the course.
    pub classes: Vec<ClassKey>,
    /// Courses that list it as a prerequisite.
    pub dependents: Vec<Name>,
}

impl CourseUsage {
    /// Whether nothing refers to the course.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.classes.is_empty() && self.dependents.is_empty()
    }
}

/// Scans all classes and courses for references to `course`.
#[must_use]
pub fn course_usage(registry: &Registry, course: &str) -> CourseUsage {
    CourseUsage {
        classes: registry
            .classes()
            .filter(|class| class.course().as_str() == course)
            .map(|class| class.key().clone())
            .collect(),
        dependents: registry
            .courses()
            .filter(|other| other.requires(course))
            .map(|other| other.name().clone())
            .collect(),
    }
}

/// Checks that a course exists and nothing refers to it.
///
/// Classes are checked before prerequisites, so a course that is both taught
/// and required reports [`RemoveCourseError::InUseByClass`].
///
/// # Errors
///
/// Returns the reason the course cannot be removed.
pub fn course_deletable(registry: &Registry, course: &str) -> Result<(), RemoveCourseError> {
    let Some(found) = registry.course(course) else {
        return Err(RemoveCourseError::NotFound(course.to_string()));
    };

    let usage = course_usage(registry, course);
    if !usage.classes.is_empty() {
        return Err(RemoveCourseError::InUseByClass {
            course: found.name().clone(),
            classes: usage.classes,
        });
    }
    if !usage.dependents.is_empty() {
        return Err(RemoveCourseError::InUseAsPrerequisite {
            course: found.name().clone(),
            dependents: usage.dependents,
        });
    }
    Ok(())
}

/// Checks that a class exists, returning its key.
///
/// Nothing else refers to a class, so existence is the only condition.
///
/// # Errors
///
/// Returns [`RemoveClassError::NotFound`] if there is no such class.
pub fn class_deletable(
    registry: &Registry,
    course: &str,
    classroom: &str,
) -> Result<ClassKey, RemoveClassError> {
    registry
        .find_class(course, classroom)
        .map(|class| class.key().clone())
        .ok_or_else(|| RemoveClassError::NotFound {
            course: course.to_string(),
            classroom: classroom.to_string(),
        })
}

/// Returns the first name in `prerequisites` that is not an existing course.
#[must_use]
pub fn first_unknown_prerequisite<'a>(
    registry: &Registry,
    prerequisites: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    prerequisites
        .into_iter()
        .find(|name| registry.course(name).is_none())
}

/// An invariant violation found in the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A class teaches a course that does not exist.
    UnknownCourse {
        /// The class.
        class: ClassKey,
    },
    /// A course requires a course that does not exist.
    UnknownPrerequisite {
        /// The requiring course.
        course: Name,
        /// The missing prerequisite.
        prerequisite: Name,
    },
    /// Courses that (transitively) require themselves.
    PrerequisiteCycle(Vec<Name>),
    /// A roster lists an identifier that is not a student.
    UnknownStudent {
        /// The class whose roster is affected.
        class: ClassKey,
        /// The identifier on the roster.
        student: Name,
    },
    /// A student holds seats in more than one class of a course.
    DuplicateEnrollment {
        /// The student.
        student: Name,
        /// The course.
        course: Name,
    },
    /// A student's live unit load exceeds their limit.
    UnitLimitExceeded {
        /// The student.
        student: Name,
        /// Units currently carried.
        load: u32,
        /// The student's limit.
        limit: u32,
    },
    /// A history record belongs to no known student.
    OrphanedHistory {
        /// The identifier on the record.
        student: Name,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCourse { class } => {
                write!(f, "class {class} teaches unknown course {}", class.course)
            }
            Self::UnknownPrerequisite {
                course,
                prerequisite,
            } => write!(f, "course {course} requires unknown course {prerequisite}"),
            Self::PrerequisiteCycle(courses) => {
                let names: Vec<&str> = courses.iter().map(Name::as_str).collect();
                write!(f, "prerequisite cycle between {}", names.join(", "))
            }
            Self::UnknownStudent { class, student } => {
                write!(f, "class {class} lists {student}, who is not a student")
            }
            Self::DuplicateEnrollment { student, course } => {
                write!(f, "{student} is enrolled in more than one class of {course}")
            }
            Self::UnitLimitExceeded {
                student,
                load,
                limit,
            } => write!(f, "{student} carries {load} units, over their limit of {limit}"),
            Self::OrphanedHistory { student } => {
                write!(f, "history record for unknown student {student}")
            }
        }
    }
}

/// Checks that every prerequisite refers to an existing course and that the
/// prerequisite graph has no cycles.
#[must_use]
pub fn prerequisite_issues(registry: &Registry) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for course in registry.courses() {
        graph.add_node(course.name().as_str());
        for prerequisite in course.prerequisites() {
            if registry.course(prerequisite).is_none() {
                issues.push(Issue::UnknownPrerequisite {
                    course: course.name().clone(),
                    prerequisite: prerequisite.clone(),
                });
                continue;
            }
            graph.add_edge(course.name().as_str(), prerequisite.as_str(), ());
        }
    }

    for component in tarjan_scc(&graph) {
        let is_cycle = match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        };
        if is_cycle {
            let mut names: Vec<Name> = component
                .iter()
                .filter_map(|name| registry.course(name))
                .map(|course| course.name().clone())
                .collect();
            names.sort();
            issues.push(Issue::PrerequisiteCycle(names));
        }
    }

    issues
}

/// Reports every invariant violation in the record store.
///
/// The loader only drops lines it cannot parse, so references between
/// records are not guaranteed to resolve until they have been audited.
#[must_use]
pub fn audit(registry: &Registry) -> Vec<Issue> {
    let mut issues = Vec::new();

    for class in registry.classes() {
        if registry.course(class.course()).is_none() {
            issues.push(Issue::UnknownCourse {
                class: class.key().clone(),
            });
        }
        for student in class.roster() {
            let is_student = registry
                .user(student)
                .is_some_and(|user| user.as_student().is_some());
            if !is_student {
                issues.push(Issue::UnknownStudent {
                    class: class.key().clone(),
                    student: student.clone(),
                });
            }
        }
    }

    issues.extend(prerequisite_issues(registry));

    for user in registry.users() {
        let Some(profile) = user.as_student() else {
            continue;
        };

        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        for class in registry.classes_of(user.id()) {
            if !seen.insert(class.course()) && reported.insert(class.course()) {
                issues.push(Issue::DuplicateEnrollment {
                    student: user.id().clone(),
                    course: class.course().clone(),
                });
            }
        }

        let load = enrollment::unit_load(registry, user.id());
        if load > profile.unit_limit {
            issues.push(Issue::UnitLimitExceeded {
                student: user.id().clone(),
                load,
                limit: profile.unit_limit,
            });
        }
    }

    for record in registry.history() {
        let known = registry
            .user(record.student())
            .is_some_and(|user| user.as_student().is_some());
        if !known {
            issues.push(Issue::OrphanedHistory {
                student: record.student().clone(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        class::Class,
        course::{Course, Units},
        history::PriorEnrollment,
        name::FieldText,
        user::{Secret, User},
    };

    fn name(s: &str) -> Name {
        Name::new(s).unwrap()
    }

    fn course(n: &str, units: i64, prerequisites: &[&str]) -> Course {
        Course::new(
            name(n),
            Units::new(units).unwrap(),
            prerequisites.iter().map(|p| name(p)).collect(),
        )
    }

    fn key(course: &str, room: &str) -> ClassKey {
        ClassKey::new(name(course), name(room))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.insert_course(course("CS101", 3, &[])).unwrap();
        registry.insert_course(course("CS102", 3, &["CS101"])).unwrap();
        registry.insert_course(course("ART1", 2, &[])).unwrap();
        registry.insert_class(Class::new(key("CS102", "R1"))).unwrap();
        registry
    }

    #[test]
    fn unused_course_is_deletable() {
        let registry = registry();
        assert!(course_usage(&registry, "ART1").is_unused());
        assert_eq!(course_deletable(&registry, "ART1"), Ok(()));
    }

    #[test]
    fn taught_course_is_not_deletable() {
        let registry = registry();
        assert_eq!(
            course_deletable(&registry, "CS102"),
            Err(RemoveCourseError::InUseByClass {
                course: name("CS102"),
                classes: vec![key("CS102", "R1")],
            })
        );
    }

    #[test]
    fn required_course_is_not_deletable() {
        let registry = registry();
        assert_eq!(
            course_deletable(&registry, "CS101"),
            Err(RemoveCourseError::InUseAsPrerequisite {
                course: name("CS101"),
                dependents: vec![name("CS102")],
            })
        );
    }

    #[test]
    fn missing_course_is_not_deletable() {
        assert_eq!(
            course_deletable(&registry(), "CS999"),
            Err(RemoveCourseError::NotFound("CS999".into()))
        );
    }

    #[test]
    fn class_deletable_requires_existence() {
        let registry = registry();
        assert_eq!(
            class_deletable(&registry, "CS102", "R1"),
            Ok(key("CS102", "R1"))
        );
        assert!(class_deletable(&registry, "CS102", "R2").is_err());
    }

    #[test]
    fn finds_unknown_prerequisite() {
        let registry = registry();
        assert_eq!(
            first_unknown_prerequisite(&registry, ["CS101", "PHYS1", "MATH1"]),
            Some("PHYS1")
        );
        assert_eq!(first_unknown_prerequisite(&registry, ["CS101"]), None);
    }

    #[test]
    fn well_formed_prerequisites_have_no_issues() {
        assert!(prerequisite_issues(&registry()).is_empty());
    }

    #[test]
    fn detects_cycles_and_dangling_prerequisites() {
        let mut registry = Registry::new();
        registry.insert_course(course("A", 1, &["B"])).unwrap();
        registry.insert_course(course("B", 1, &["A"])).unwrap();
        registry.insert_course(course("C", 1, &["C"])).unwrap();
        registry.insert_course(course("D", 1, &["GONE"])).unwrap();

        let issues = prerequisite_issues(&registry);
        assert!(issues.contains(&Issue::PrerequisiteCycle(vec![name("A"), name("B")])));
        assert!(issues.contains(&Issue::PrerequisiteCycle(vec![name("C")])));
        assert!(issues.contains(&Issue::UnknownPrerequisite {
            course: name("D"),
            prerequisite: name("GONE"),
        }));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn audit_reports_broken_references() {
        let mut registry = registry();
        registry
            .insert_user(User::student(
                name("s1"),
                Secret::new("pw").unwrap(),
                FieldText::new("Sam").unwrap(),
                3,
            ))
            .unwrap();
        registry
            .insert_user(User::admin(name("root"), Secret::new("pw").unwrap()))
            .unwrap();
        registry
            .insert_class(Class::with_roster(key("CS101", "R1"), [name("s1")]))
            .unwrap();
        registry
            .insert_class(Class::with_roster(key("CS101", "R2"), [name("s1")]))
            .unwrap();
        registry
            .insert_class(Class::with_roster(
                key("GONE", "R1"),
                [name("root"), name("s1")],
            ))
            .unwrap();
        registry
            .insert_class(Class::with_roster(key("CS102", "R2"), [name("s1")]))
            .unwrap();
        registry
            .insert_history(PriorEnrollment::new(name("ghost"), BTreeSet::new()))
            .unwrap();

        let issues = audit(&registry);

        assert!(issues.contains(&Issue::UnknownCourse {
            class: key("GONE", "R1")
        }));
        assert!(issues.contains(&Issue::UnknownStudent {
            class: key("GONE", "R1"),
            student: name("root"),
        }));
        assert!(issues.contains(&Issue::DuplicateEnrollment {
            student: name("s1"),
            course: name("CS101"),
        }));
        assert!(issues.contains(&Issue::UnitLimitExceeded {
            student: name("s1"),
            load: 6,
            limit: 3,
        }));
        assert!(issues.contains(&Issue::OrphanedHistory {
            student: name("ghost")
        }));
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn audit_of_clean_registry_is_empty() {
        assert!(audit(&registry()).is_empty());
    }
}
