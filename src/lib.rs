//! Plain-text Course Enlistment
//!
//! Administrators maintain courses and classes; students enroll in and drop
//! classes within their unit limit once they have completed the
//! prerequisites. All records live in four delimited text files.

pub mod domain;
pub use domain::{
    Class, ClassKey, Classify, Config, Course, ErrorKind, Name, PriorEnrollment, Registry, User,
};

/// Text-file storage and session management for the record store.
pub mod storage;
pub use storage::{Directory, Loaded, Unloaded};
