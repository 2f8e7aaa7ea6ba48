use std::fmt;

use crate::domain::{
    error::{Classify, ErrorKind},
    name::{DELIMITER, FieldText, Name},
};

/// A login secret.
///
/// Secrets are stored and compared in plaintext; the only protection is that
/// they never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Creates a secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is blank, has surrounding whitespace,
    /// or contains the field delimiter, any of which would stop it from
    /// surviving a save and reload.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidSecret> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(InvalidSecret::Empty);
        }
        if s.trim() != s {
            return Err(InvalidSecret::Padded);
        }
        if s.contains(DELIMITER.trim()) || s.contains('\n') {
            return Err(InvalidSecret::Unstorable);
        }
        Ok(Self(s))
    }

    /// Whether `candidate` matches this secret.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    /// Returns the raw secret, for persisting.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// A secret that cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSecret {
    /// The secret was empty or only whitespace.
    #[error("password must not be empty")]
    Empty,
    /// The secret started or ended with whitespace.
    #[error("password must not start or end with spaces")]
    Padded,
    /// The secret contained a `/` or a line break.
    #[error("password must not contain '/' or line breaks")]
    Unstorable,
}

/// Role-specific data attached to a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// An administrator, who manages courses and classes.
    Admin,
    /// A student, who enrolls in and drops classes.
    Student(StudentProfile),
}

/// The two kinds of [`Role`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    /// See [`Role::Admin`].
    Admin,
    /// See [`Role::Student`].
    Student,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("Admin"),
            Self::Student => f.write_str("Student"),
        }
    }
}

/// The data a student carries besides their credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    /// The student's full name.
    pub display_name: FieldText,
    /// The maximum number of units the student may carry at once.
    pub unit_limit: u32,
}

/// A person who can log in.
///
/// Identifiers share one namespace across admins and students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Name,
    secret: Secret,
    role: Role,
}

impl User {
    /// Creates an administrator.
    #[must_use]
    pub const fn admin(id: Name, secret: Secret) -> Self {
        Self {
            id,
            secret,
            role: Role::Admin,
        }
    }

    /// Creates a student.
    #[must_use]
    pub const fn student(id: Name, secret: Secret, display_name: FieldText, unit_limit: u32) -> Self {
        Self {
            id,
            secret,
            role: Role::Student(StudentProfile {
                display_name,
                unit_limit,
            }),
        }
    }

    /// The user's identifier (username for admins, ID number for students).
    #[must_use]
    pub const fn id(&self) -> &Name {
        &self.id
    }

    /// The user's secret.
    #[must_use]
    pub const fn secret(&self) -> &Secret {
        &self.secret
    }

    /// The user's role.
    #[must_use]
    pub const fn role(&self) -> &Role {
        &self.role
    }

    /// The kind of role this user has.
    #[must_use]
    pub const fn role_kind(&self) -> RoleKind {
        match self.role {
            Role::Admin => RoleKind::Admin,
            Role::Student(_) => RoleKind::Student,
        }
    }

    /// The student profile, if this user is a student.
    #[must_use]
    pub const fn as_student(&self) -> Option<&StudentProfile> {
        match &self.role {
            Role::Student(profile) => Some(profile),
            Role::Admin => None,
        }
    }

    /// Replaces the user's secret.
    ///
    /// The old secret must match, and the new secret must be typed
    /// identically twice.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if the old secret is wrong, the
    /// confirmation differs, or the new secret cannot be stored.
    pub fn change_password(
        &mut self,
        old: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), PasswordChangeError> {
        if !self.secret.matches(old) {
            return Err(PasswordChangeError::WrongOldSecret);
        }
        if new != confirm {
            return Err(PasswordChangeError::Mismatch);
        }
        self.secret = Secret::new(new)?;

        tracing::info!("Changed password for {}", self.id);
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Role::Admin => write!(f, "Admin: {}", self.id),
            Role::Student(profile) => write!(
                f,
                "Student: {} [{}] - {} units",
                self.id, profile.display_name, profile.unit_limit
            ),
        }
    }
}

/// Errors from [`User::change_password`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordChangeError {
    /// No user has this identifier.
    #[error("no user '{0}'")]
    UnknownUser(String),
    /// The old secret did not match.
    #[error("current password is incorrect")]
    WrongOldSecret,
    /// The new secret and its confirmation differ.
    #[error("new passwords do not match")]
    Mismatch,
    /// The new secret cannot be stored.
    #[error(transparent)]
    Invalid(#[from] InvalidSecret),
}

impl Classify for PasswordChangeError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownUser(_) => ErrorKind::UnknownReference,
            Self::WrongOldSecret | Self::Mismatch => ErrorKind::CredentialMismatch,
            Self::Invalid(_) => ErrorKind::ValidationFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn student() -> User {
        User::student(
            Name::new("2019-001").unwrap(),
            Secret::new("hunter2").unwrap(),
            FieldText::new("Ana Reyes").unwrap(),
            18,
        )
    }

    #[test]
    fn change_password_succeeds() {
        let mut user = student();
        user.change_password("hunter2", "swordfish", "swordfish")
            .unwrap();
        assert!(user.secret().matches("swordfish"));
        assert!(!user.secret().matches("hunter2"));
    }

    #[test]
    fn change_password_rejects_wrong_old_secret() {
        let mut user = student();
        let error = user
            .change_password("nope", "swordfish", "swordfish")
            .unwrap_err();
        assert_eq!(error, PasswordChangeError::WrongOldSecret);
        assert_eq!(error.kind(), ErrorKind::CredentialMismatch);
        assert!(user.secret().matches("hunter2"));
    }

    #[test]
    fn change_password_rejects_mismatched_confirmation() {
        let mut user = student();
        assert_eq!(
            user.change_password("hunter2", "swordfish", "swordfsh"),
            Err(PasswordChangeError::Mismatch)
        );
        assert!(user.secret().matches("hunter2"));
    }

    #[test]
    fn change_password_rejects_unstorable_secret() {
        let mut user = student();
        assert_eq!(
            user.change_password("hunter2", "a/b", "a/b"),
            Err(PasswordChangeError::Invalid(InvalidSecret::Unstorable))
        );
    }

    #[test_case("   ", InvalidSecret::Empty; "whitespace only")]
    #[test_case(" pw", InvalidSecret::Padded; "leading space")]
    #[test_case("pw ", InvalidSecret::Padded; "trailing space")]
    #[test_case("a/b", InvalidSecret::Unstorable; "delimiter")]
    fn change_password_rejects_secrets_that_cannot_be_reloaded(
        secret: &str,
        expected: InvalidSecret,
    ) {
        let mut user = student();
        let error = user.change_password("hunter2", secret, secret).unwrap_err();
        assert_eq!(error, PasswordChangeError::Invalid(expected));
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);
        assert!(user.secret().matches("hunter2"));
    }

    #[test]
    fn inner_spaces_are_allowed() {
        assert!(Secret::new("correct horse").is_ok());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let user = student();
        assert!(!format!("{user:?}").contains("hunter2"));
    }

    #[test]
    fn role_accessors() {
        let admin = User::admin(Name::new("admin").unwrap(), Secret::new("admin").unwrap());
        assert_eq!(admin.role_kind(), RoleKind::Admin);
        assert!(admin.as_student().is_none());
        assert_eq!(student().as_student().unwrap().unit_limit, 18);
    }
}
