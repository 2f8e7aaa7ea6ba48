//! A filesystem backed store of enlistment records
//!
//! The [`Directory`] reads the four record files into a [`Registry`], lets
//! the caller mutate it in memory, and writes everything back only when
//! [`Directory::save`] is called. Dropping or [`Directory::discard`]ing a
//! loaded directory abandons unsaved changes.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;

use crate::{
    domain::{CONFIG_FILE, Config, Name, Registry, User, user::Secret},
    storage::format::{self, DataFiles, RecordKind, SkippedLine},
};

/// A directory whose records have been read into memory.
#[derive(Debug)]
pub struct Loaded {
    registry: Registry,
    skipped: Vec<SkippedLine>,
    dirty: bool,
}

/// A directory whose records have not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed store of enlistment records.
#[derive(Debug)]
pub struct Directory<S> {
    /// The directory the record files are stored in.
    root: PathBuf,
    config: Config,
    state: S,
}

impl<S> Directory<S> {
    /// The directory the record files are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The path of one of the four record files.
    #[must_use]
    pub fn path(&self, kind: RecordKind) -> PathBuf {
        let file = match kind {
            RecordKind::User => &self.config.users_file,
            RecordKind::Course => &self.config.courses_file,
            RecordKind::Class => &self.config.classes_file,
            RecordKind::History => &self.config.history_file,
        };
        self.root.join(file)
    }
}

const KINDS: [RecordKind; 4] = [
    RecordKind::User,
    RecordKind::Course,
    RecordKind::Class,
    RecordKind::History,
];

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    ///
    /// The configuration is read from `enlist.toml` if present; otherwise
    /// defaults are used.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self {
            root,
            config,
            state: Unloaded,
        }
    }

    /// Creates a new data directory with a default configuration, empty
    /// record files, and a single administrator `admin` with password
    /// `admin`.
    ///
    /// # Errors
    ///
    /// Fails if the directory already holds a configuration file or if any
    /// file cannot be written.
    pub fn init(root: PathBuf) -> Result<Self, InitError> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(InitError::AlreadyInitialized(root));
        }

        fs::create_dir_all(&root)?;
        let config = Config::default();
        config.save(&config_path).map_err(InitError::Config)?;

        let mut registry = Registry::new();
        let admin = User::admin(
            Name::new("admin").map_err(|e| InitError::Config(e.to_string()))?,
            Secret::new("admin").map_err(|e| InitError::Config(e.to_string()))?,
        );
        registry
            .insert_user(admin)
            .map_err(|e| InitError::Config(e.to_string()))?;

        let directory = Self {
            root,
            config,
            state: Unloaded,
        };
        let files = format::serialize(&registry);
        for kind in KINDS {
            let path = directory.path(kind);
            if !path.exists() {
                fs::write(&path, contents(&files, kind))?;
            }
        }

        tracing::info!("Initialized data directory {}", directory.root.display());
        Ok(directory)
    }

    /// Reads all four record files.
    ///
    /// A missing file is treated as empty. Malformed lines are skipped and
    /// can be inspected with [`Directory::skipped`].
    ///
    /// # Errors
    ///
    /// Fails if a file exists but cannot be read.
    pub fn load(self) -> Result<Directory<Loaded>, LoadError> {
        let mut files = DataFiles::default();
        for kind in KINDS {
            let path = self.path(kind);
            let content = read_or_empty(&path).map_err(|source| LoadError { path, source })?;
            *contents_mut(&mut files, kind) = content;
        }

        let parsed = format::load(&files);

        Ok(Directory {
            root: self.root,
            config: self.config,
            state: Loaded {
                registry: parsed.registry,
                skipped: parsed.skipped,
                dirty: false,
            },
        })
    }
}

impl Directory<Loaded> {
    /// The in-memory records.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.state.registry
    }

    /// Lines dropped while loading.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.state.skipped
    }

    /// Whether there are changes that have not been saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    /// Runs a mutation against the in-memory records.
    ///
    /// The directory is marked as having unsaved changes only if the
    /// mutation succeeds.
    ///
    /// # Errors
    ///
    /// Returns whatever error the mutation returns.
    pub fn apply<T, E>(
        &mut self,
        mutation: impl FnOnce(&mut Registry) -> Result<T, E>,
    ) -> Result<T, E> {
        let value = mutation(&mut self.state.registry)?;
        self.state.dirty = true;
        Ok(value)
    }

    /// Writes all four record files.
    ///
    /// # Errors
    ///
    /// Returns an error if some of the files cannot be written. This method
    /// does *not* fail fast: it attempts every file before returning the
    /// error, and the directory stays dirty.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let files = format::serialize(&self.state.registry);

        let failures: Vec<_> = KINDS
            .into_iter()
            .filter_map(|kind| {
                let path = self.path(kind);
                fs::write(&path, contents(&files, kind))
                    .err()
                    .map(|e| (path, e))
            })
            .collect();

        if let Some(failures) = NonEmpty::from_vec(failures) {
            return Err(SaveError { failures });
        }

        self.state.dirty = false;
        tracing::info!("Saved records to {}", self.root.display());
        Ok(())
    }

    /// Abandons the in-memory records, including unsaved changes.
    #[must_use]
    pub fn discard(self) -> Directory<Unloaded> {
        if self.state.dirty {
            tracing::info!("Discarded unsaved changes");
        }
        Directory {
            root: self.root,
            config: self.config,
            state: Unloaded,
        }
    }
}

fn contents(files: &DataFiles, kind: RecordKind) -> &String {
    match kind {
        RecordKind::User => &files.users,
        RecordKind::Course => &files.courses,
        RecordKind::Class => &files.classes,
        RecordKind::History => &files.history,
    }
}

fn contents_mut(files: &mut DataFiles, kind: RecordKind) -> &mut String {
    match kind {
        RecordKind::User => &mut files.users,
        RecordKind::Course => &mut files.courses,
        RecordKind::Class => &mut files.classes,
        RecordKind::History => &mut files.history,
    }
}

fn read_or_empty(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, treating as empty", path.display());
            Ok(String::new())
        }
        Err(e) => Err(e),
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Errors from [`Directory::init`].
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A configuration file already exists.
    #[error("{} is already initialized", .0.display())]
    AlreadyInitialized(PathBuf),
    /// The configuration could not be written.
    #[error("{0}")]
    Config(String),
    /// A record file could not be written.
    #[error("failed to create record file: {0}")]
    Io(#[from] io::Error),
}

/// A record file could not be read.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {source}", .path.display())]
pub struct LoadError {
    path: PathBuf,
    source: io::Error,
}

/// Some record files could not be written.
#[derive(Debug, thiserror::Error)]
pub struct SaveError {
    failures: NonEmpty<(PathBuf, io::Error)>,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to save records: ")?;

        let paths: Vec<String> = self
            .failures
            .iter()
            .map(|(p, e)| format!("{} ({e})", p.display()))
            .collect();

        write!(f, "{}", paths.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{RoleKind, admin, enrollment};

    fn setup_temp_directory() -> (TempDir, Directory<Loaded>) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let path = tmp.path().to_path_buf();
        let directory = Directory::init(path).unwrap().load().unwrap();
        (tmp, directory)
    }

    fn reload(directory: &Directory<Loaded>) -> Directory<Loaded> {
        Directory::new(directory.root().to_path_buf()).load().unwrap()
    }

    #[test]
    fn init_seeds_default_admin() {
        let (_tmp, directory) = setup_temp_directory();
        assert!(directory.root().join(CONFIG_FILE).exists());
        assert!(directory.path(RecordKind::History).exists());
        assert!(
            directory
                .registry()
                .authenticate("admin", "admin", RoleKind::Admin)
                .is_ok()
        );
    }

    #[test]
    fn init_refuses_existing_directory() {
        let (_tmp, directory) = setup_temp_directory();
        assert!(matches!(
            Directory::init(directory.root().to_path_buf()),
            Err(InitError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn missing_files_load_as_empty() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::new(tmp.path().to_path_buf()).load().unwrap();
        assert_eq!(directory.registry(), &Registry::new());
        assert!(directory.skipped().is_empty());
    }

    #[test]
    fn changes_persist_only_after_save() {
        let (_tmp, mut directory) = setup_temp_directory();
        let config = directory.config().clone();

        directory
            .apply(|registry| admin::create_course(registry, &config, "CS101", 3, &[]))
            .unwrap();
        assert!(directory.is_dirty());
        assert!(reload(&directory).registry().course("CS101").is_none());

        directory.save().unwrap();
        assert!(!directory.is_dirty());
        assert!(reload(&directory).registry().course("CS101").is_some());
    }

    #[test]
    fn failed_mutation_does_not_mark_dirty() {
        let (_tmp, mut directory) = setup_temp_directory();
        let result = directory.apply(|registry| admin::remove_course(registry, "CS101"));
        assert!(result.is_err());
        assert!(!directory.is_dirty());
    }

    #[test]
    fn discard_abandons_changes() {
        let (_tmp, mut directory) = setup_temp_directory();
        let config = directory.config().clone();
        directory
            .apply(|registry| admin::create_course(registry, &config, "CS101", 3, &[]))
            .unwrap();

        let reopened = directory.discard().load().unwrap();
        assert!(reopened.registry().course("CS101").is_none());
    }

    #[test]
    fn enrollment_survives_round_trip() {
        let (_tmp, directory) = setup_temp_directory();
        fs::write(
            directory.path(RecordKind::User),
            "Admin / admin / admin\nStudent / s1 / pw / Sam Cruz / 6\n",
        )
        .unwrap();
        let mut directory = reload(&directory);
        let config = directory.config().clone();

        let key = directory
            .apply(|registry| -> anyhow::Result<_> {
                admin::create_course(registry, &config, "CS101", 3, &[])?;
                Ok(admin::create_class(registry, &config, "CS101", "R1")?)
            })
            .unwrap()
            .key()
            .clone();
        directory
            .apply(|registry| enrollment::enroll(registry, "s1", &key))
            .unwrap();
        directory.save().unwrap();

        let reopened = reload(&directory);
        assert_eq!(
            enrollment::units_remaining(reopened.registry(), "s1").unwrap(),
            3
        );
        let written = fs::read_to_string(reopened.path(RecordKind::Class)).unwrap();
        assert_eq!(written, "CS101 / R1 / s1\n");
    }

    #[test]
    fn seeded_admin_password_can_be_changed() {
        let (_tmp, mut directory) = setup_temp_directory();
        directory
            .apply(|registry| registry.change_password("admin", "admin", "s3cret", "s3cret"))
            .unwrap();
        directory.save().unwrap();

        let reopened = reload(&directory);
        let registry = reopened.registry();
        assert!(registry.authenticate("admin", "s3cret", RoleKind::Admin).is_ok());
        assert!(registry.authenticate("admin", "admin", RoleKind::Admin).is_err());
    }

    #[test]
    fn skipped_lines_are_reported() {
        let (_tmp, directory) = setup_temp_directory();
        fs::write(
            directory.path(RecordKind::Course),
            "CS101 / 3 / None\ngarbage\n",
        )
        .unwrap();
        let reopened = reload(&directory);
        assert_eq!(reopened.skipped().len(), 1);
        assert_eq!(reopened.skipped()[0].line, 2);
        assert_eq!(reopened.registry().courses().count(), 1);
    }

    #[test]
    fn honours_configured_file_names() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.users_file = "accounts.txt".to_string();
        config.save(&tmp.path().join(CONFIG_FILE)).unwrap();
        fs::write(tmp.path().join("accounts.txt"), "Admin / boss / pw\n").unwrap();

        let directory = Directory::new(tmp.path().to_path_buf()).load().unwrap();
        assert!(directory.registry().user("boss").is_some());
    }
}
