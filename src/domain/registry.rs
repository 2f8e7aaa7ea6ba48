//! In-memory record store.
//!
//! The [`Registry`] holds the four record collections (users, courses,
//! classes and prior enrollment history). It knows nothing about files or the
//! line format they are stored in, and it enforces only key uniqueness.
//! Cross-record rules live in [`crate::domain::integrity`],
//! [`crate::domain::enrollment`] and [`crate::domain::admin`].

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    class::{Class, ClassKey},
    course::Course,
    error::{Classify, ErrorKind},
    history::PriorEnrollment,
    name::Name,
    user::{PasswordChangeError, RoleKind, User},
};

/// The in-memory record store.
///
/// Courses and classes are kept sorted by key. Users and history records
/// keep the order in which they were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    users: Vec<User>,
    courses: BTreeMap<Name, Course>,
    classes: BTreeMap<ClassKey, Class>,
    history: Vec<PriorEnrollment>,
}

/// A record with the same key is already stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' already exists")]
pub struct DuplicateKey(pub String);

impl Classify for DuplicateKey {
    fn kind(&self) -> ErrorKind {
        ErrorKind::DuplicateKey
    }
}

/// Errors from [`Registry::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// No user has this identifier.
    #[error("no user '{0}'")]
    UnknownUser(String),
    /// The user exists but has a different role.
    #[error("'{id}' is not a {expected} account")]
    WrongRole {
        /// The identifier that was tried.
        id: String,
        /// The role the caller asked for.
        expected: RoleKind,
    },
    /// The secret did not match.
    #[error("incorrect password")]
    CredentialMismatch,
}

impl Classify for LoginError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownUser(_) => ErrorKind::UnknownReference,
            Self::WrongRole { .. } | Self::CredentialMismatch => ErrorKind::CredentialMismatch,
        }
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- users ---

    /// All users, in insertion order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Looks up a user by identifier.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id().as_str() == id)
    }

    /// Looks up a user by identifier for modification.
    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id().as_str() == id)
    }

    /// Adds a user.
    ///
    /// # Errors
    ///
    /// Fails if any user, admin or student, already has the identifier.
    pub fn insert_user(&mut self, user: User) -> Result<(), DuplicateKey> {
        if self.user(user.id()).is_some() {
            return Err(DuplicateKey(user.id().to_string()));
        }
        self.users.push(user);
        Ok(())
    }

    /// Removes a user, returning it if it existed.
    pub fn remove_user(&mut self, id: &str) -> Option<User> {
        let index = self.users.iter().position(|user| user.id().as_str() == id)?;
        Some(self.users.remove(index))
    }

    /// Checks a login attempt.
    ///
    /// # Errors
    ///
    /// Fails if the identifier is unknown, belongs to a user of another role,
    /// or the secret does not match.
    pub fn authenticate(
        &self,
        id: &str,
        secret: &str,
        role: RoleKind,
    ) -> Result<&User, LoginError> {
        let user = self
            .user(id)
            .ok_or_else(|| LoginError::UnknownUser(id.to_string()))?;
        if user.role_kind() != role {
            return Err(LoginError::WrongRole {
                id: id.to_string(),
                expected: role,
            });
        }
        if !user.secret().matches(secret) {
            return Err(LoginError::CredentialMismatch);
        }

        tracing::info!("{} logged in as {role}", user.id());
        Ok(user)
    }

    /// Changes a user's password. See [`User::change_password`].
    ///
    /// # Errors
    ///
    /// Fails if the user does not exist, or for any reason
    /// [`User::change_password`] fails.
    pub fn change_password(
        &mut self,
        id: &str,
        old: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), PasswordChangeError> {
        self.user_mut(id)
            .ok_or_else(|| PasswordChangeError::UnknownUser(id.to_string()))?
            .change_password(old, new, confirm)
    }

    // --- courses ---

    /// All courses, sorted by name.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Looks up a course by name.
    #[must_use]
    pub fn course(&self, name: &str) -> Option<&Course> {
        self.courses.get(name)
    }

    /// Adds a course.
    ///
    /// No reference checks are performed here; see
    /// [`crate::domain::admin::create_course`].
    ///
    /// # Errors
    ///
    /// Fails if a course with the same name already exists.
    pub fn insert_course(&mut self, course: Course) -> Result<(), DuplicateKey> {
        if self.courses.contains_key(course.name().as_str()) {
            return Err(DuplicateKey(course.name().to_string()));
        }
        self.courses.insert(course.name().clone(), course);
        Ok(())
    }

    /// Removes a course, returning it if it existed.
    ///
    /// No reference checks are performed here; see
    /// [`crate::domain::admin::remove_course`].
    pub fn remove_course(&mut self, name: &str) -> Option<Course> {
        self.courses.remove(name)
    }

    // --- classes ---

    /// All classes, sorted by course name and then classroom.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    /// Looks up a class by key.
    #[must_use]
    pub fn class(&self, key: &ClassKey) -> Option<&Class> {
        self.classes.get(key)
    }

    /// Looks up a class by its raw course name and classroom.
    #[must_use]
    pub fn find_class(&self, course: &str, classroom: &str) -> Option<&Class> {
        self.classes
            .values()
            .find(|class| class.key().is(course, classroom))
    }

    pub(crate) fn class_mut(&mut self, key: &ClassKey) -> Option<&mut Class> {
        self.classes.get_mut(key)
    }

    /// Adds a class.
    ///
    /// # Errors
    ///
    /// Fails if a class with the same course and classroom already exists.
    pub fn insert_class(&mut self, class: Class) -> Result<(), DuplicateKey> {
        if self.classes.contains_key(class.key()) {
            return Err(DuplicateKey(class.key().to_string()));
        }
        self.classes.insert(class.key().clone(), class);
        Ok(())
    }

    /// Removes a class, returning it (with its roster) if it existed.
    pub fn remove_class(&mut self, key: &ClassKey) -> Option<Class> {
        self.classes.remove(key)
    }

    /// The classes whose roster lists the student.
    pub fn classes_of<'a>(&'a self, student: &'a str) -> impl Iterator<Item = &'a Class> + 'a {
        self.classes
            .values()
            .filter(move |class| class.has_student(student))
    }

    // --- history ---

    /// All prior enrollment records, in insertion order.
    pub fn history(&self) -> impl Iterator<Item = &PriorEnrollment> {
        self.history.iter()
    }

    /// The prior enrollment record of a student, if any.
    #[must_use]
    pub fn prior_enrollment(&self, student: &str) -> Option<&PriorEnrollment> {
        self.history
            .iter()
            .find(|record| record.student().as_str() == student)
    }

    /// The courses a student has completed. Empty if there is no record.
    #[must_use]
    pub fn prior_courses(&self, student: &str) -> BTreeSet<&Name> {
        self.prior_enrollment(student)
            .map(|record| record.courses().iter().collect())
            .unwrap_or_default()
    }

    /// Adds a prior enrollment record.
    ///
    /// # Errors
    ///
    /// Fails if the student already has a record.
    pub fn insert_history(&mut self, record: PriorEnrollment) -> Result<(), DuplicateKey> {
        if self.prior_enrollment(record.student()).is_some() {
            return Err(DuplicateKey(record.student().to_string()));
        }
        self.history.push(record);
        Ok(())
    }

    /// Removes a student's prior enrollment record.
    pub fn remove_history(&mut self, student: &str) -> Option<PriorEnrollment> {
        let index = self
            .history
            .iter()
            .position(|record| record.student().as_str() == student)?;
        Some(self.history.remove(index))
    }
}
