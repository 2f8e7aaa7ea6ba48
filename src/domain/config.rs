use std::path::Path;

use serde::{Deserialize, Serialize};

/// The name of the configuration file inside a data directory.
pub const CONFIG_FILE: &str = "enlist.toml";

/// Configuration for an enlistment data directory.
///
/// This struct holds the names of the four record files and the validation
/// limits applied to values entered by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The maximum number of characters in a course name or classroom.
    max_field_length: usize,

    /// File holding admin and student accounts.
    pub users_file: String,

    /// File holding courses.
    pub courses_file: String,

    /// File holding classes and their rosters.
    pub classes_file: String,

    /// File holding prior enrollment history.
    pub history_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_field_length: default_max_field_length(),
            users_file: default_users_file(),
            courses_file: default_courses_file(),
            classes_file: default_classes_file(),
            history_file: default_history_file(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the maximum length of a course name or classroom.
    #[must_use]
    pub const fn max_field_length(&self) -> usize {
        self.max_field_length
    }

    /// Sets the maximum field length. A length of zero is raised to one.
    pub fn set_max_field_length(&mut self, length: usize) {
        self.max_field_length = length.max(1);
    }
}

const fn default_max_field_length() -> usize {
    20
}

fn default_users_file() -> String {
    "users.txt".to_string()
}

fn default_courses_file() -> String {
    "courses.txt".to_string()
}

fn default_classes_file() -> String {
    "classes.txt".to_string()
}

fn default_history_file() -> String {
    "history.txt".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        /// The maximum number of characters in a course name or classroom.
        #[serde(default = "default_max_field_length")]
        max_field_length: usize,

        #[serde(default = "default_users_file")]
        users_file: String,

        #[serde(default = "default_courses_file")]
        courses_file: String,

        #[serde(default = "default_classes_file")]
        classes_file: String,

        #[serde(default = "default_history_file")]
        history_file: String,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                max_field_length,
                users_file,
                courses_file,
                classes_file,
                history_file,
            } => Self {
                max_field_length: max_field_length.max(1),
                users_file,
                courses_file,
                classes_file,
                history_file,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            max_field_length: config.max_field_length,
            users_file: config.users_file,
            courses_file: config.courses_file,
            classes_file: config.classes_file,
            history_file: config.history_file,
        }
    }
}
