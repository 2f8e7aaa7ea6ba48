//! Domain models for course enlistment.
//!
//! This module contains the record types, the in-memory record store, and
//! the engines that enforce enrollment eligibility and referential
//! integrity. Nothing here touches the filesystem.

/// Validated course, classroom, and user identifiers.
pub mod name;
pub use name::{FieldText, InvalidNameError, Name};

/// Courses and their unit weights.
pub mod course;
pub use course::{Course, InvalidUnits, Units};

/// Class sections and their live rosters.
pub mod class;
pub use class::{Class, ClassKey};

/// Accounts: administrators and students.
pub mod user;
pub use user::{PasswordChangeError, Role, RoleKind, Secret, StudentProfile, User};

mod history;
pub use history::PriorEnrollment;

mod config;
pub use config::{CONFIG_FILE, Config};

/// Failure classification shared by every operation.
pub mod error;
pub use error::{Classify, ErrorKind, FieldError};

mod registry;
pub use registry::{DuplicateKey, LoginError, Registry};

pub mod admin;
pub mod enrollment;
pub mod integrity;
