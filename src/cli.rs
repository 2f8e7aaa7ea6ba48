use std::path::PathBuf;

mod available;
mod class;
mod course;
mod init;
mod list;
mod prompt;
mod render;
mod session;
mod terminal;
mod validate;

use clap::ArgAction;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the record files
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Session(session::Command::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Log in and work interactively (default)
    Session(session::Command),

    /// Create the record files and a default administrator
    Init(init::Command),

    /// List courses, classes, users, or enrollment history
    List(list::Command),

    /// Show the classes a student may enroll in
    Available(available::Command),

    /// Check the records for skipped lines and broken references
    Validate(validate::Command),

    /// Create or remove courses
    Course(course::Command),

    /// Create or remove classes
    Class(class::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Session(command) => command.run(root)?,
            Self::Init(command) => command.run(&root)?,
            Self::List(command) => command.run(root)?,
            Self::Available(command) => command.run(root)?,
            Self::Validate(command) => command.run(root)?,
            Self::Course(command) => command.run(root)?,
            Self::Class(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use enlist::{ClassKey, Directory, Name};
    use tempfile::tempdir;

    use super::*;

    fn run(root: &std::path::Path, args: &[&str]) -> anyhow::Result<()> {
        let root = root.to_string_lossy().into_owned();
        let mut argv = vec!["enlist", "--root", root.as_str()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        cli.command.expect("a subcommand").run(cli.root)
    }

    fn registry(root: &std::path::Path) -> enlist::Registry {
        Directory::new(root.to_path_buf())
            .load()
            .unwrap()
            .registry()
            .clone()
    }

    #[test]
    fn no_subcommand_means_session() {
        let cli = Cli::try_parse_from(["enlist"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn verbosity_is_counted() {
        let cli = Cli::try_parse_from(["enlist", "-vvv", "validate"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn init_seeds_files_and_refuses_to_run_twice() {
        let tmp = tempdir().unwrap();
        run(tmp.path(), &["init"]).unwrap();

        let users = fs::read_to_string(tmp.path().join("users.txt")).unwrap();
        assert_eq!(users, "Admin / admin / admin\n");
        assert!(tmp.path().join("enlist.toml").exists());

        assert!(run(tmp.path(), &["init"]).is_err());
    }

    #[test]
    fn course_and_class_commands_persist_changes() {
        let tmp = tempdir().unwrap();
        run(tmp.path(), &["init"]).unwrap();

        run(tmp.path(), &["course", "add", "CS11", "--units", "3"]).unwrap();
        run(
            tmp.path(),
            &["course", "add", "CS21", "-u", "4", "--requires", "CS11"],
        )
        .unwrap();
        run(tmp.path(), &["class", "add", "CS21", "R101"]).unwrap();

        let courses = fs::read_to_string(tmp.path().join("courses.txt")).unwrap();
        assert_eq!(courses, "CS11 / 3 / None\nCS21 / 4 / CS11\n");

        let key = ClassKey {
            course: Name::new("CS21").unwrap(),
            classroom: Name::new("R101").unwrap(),
        };
        assert!(registry(tmp.path()).class(&key).is_some());
    }

    #[test]
    fn rejected_changes_leave_files_untouched() {
        let tmp = tempdir().unwrap();
        run(tmp.path(), &["init"]).unwrap();
        run(tmp.path(), &["course", "add", "CS11", "--units", "3"]).unwrap();
        run(
            tmp.path(),
            &["course", "add", "CS21", "--units", "3", "--requires", "CS11"],
        )
        .unwrap();
        let before = fs::read_to_string(tmp.path().join("courses.txt")).unwrap();

        let error = run(tmp.path(), &["course", "remove", "CS11"]).unwrap_err();
        assert!(error.to_string().starts_with("constraint violation"));
        assert!(run(tmp.path(), &["course", "add", "CS31", "--units", "-1"]).is_err());
        assert!(run(tmp.path(), &["class", "add", "CS99", "R1"]).is_err());

        let after = fs::read_to_string(tmp.path().join("courses.txt")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn validate_fails_on_broken_records() {
        let tmp = tempdir().unwrap();
        run(tmp.path(), &["init"]).unwrap();
        run(tmp.path(), &["validate"]).unwrap();

        fs::write(tmp.path().join("classes.txt"), "CS99 / R1 / None\n").unwrap();
        assert!(run(tmp.path(), &["validate", "--quiet"]).is_err());
    }

    #[test]
    fn available_requires_a_known_student() {
        let tmp = tempdir().unwrap();
        run(tmp.path(), &["init"]).unwrap();
        assert!(run(tmp.path(), &["available", "nobody"]).is_err());
    }
}
