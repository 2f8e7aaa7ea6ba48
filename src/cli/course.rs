use std::path::PathBuf;

use enlist::{
    Classify, Directory,
    domain::{admin, integrity},
};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: CourseCommand,
}

#[derive(Debug, clap::Parser)]
enum CourseCommand {
    /// Create a course
    Add(Add),

    /// Remove a course that no class teaches and no course requires
    Remove {
        /// The course name
        name: String,
    },

    /// Show the classes and courses that refer to a course
    Usage {
        /// The course name
        name: String,
    },
}

#[derive(Debug, clap::Parser)]
struct Add {
    /// The course name (no spaces)
    name: String,

    /// Unit weight, 0 to 50
    #[arg(long, short, allow_negative_numbers = true)]
    units: i64,

    /// Courses that must be completed first (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "COURSE")]
    requires: Vec<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load()?;
        let config = directory.config().clone();

        match self.command {
            CourseCommand::Add(add) => {
                let requires: Vec<&str> = add.requires.iter().map(String::as_str).collect();
                let course = directory
                    .apply(|registry| {
                        admin::create_course(registry, &config, &add.name, add.units, &requires)
                    })
                    .map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))?;
                directory.save()?;
                println!("{}", format!("✅ Created course {course}").success());
            }
            CourseCommand::Remove { name } => {
                let course = directory
                    .apply(|registry| admin::remove_course(registry, &name))
                    .map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))?;
                directory.save()?;
                println!("{}", format!("✅ Removed course {}", course.name()).success());
            }
            CourseCommand::Usage { name } => {
                let registry = directory.registry();
                if registry.course(&name).is_none() {
                    anyhow::bail!("Course {name} not found");
                }
                let usage = integrity::course_usage(registry, &name);
                if usage.is_unused() {
                    println!("{}", format!("{name} is not referenced and can be removed").dim());
                }
                for class in &usage.classes {
                    println!("taught by class {class}");
                }
                for dependent in &usage.dependents {
                    println!("required by course {dependent}");
                }
            }
        }
        Ok(())
    }
}
