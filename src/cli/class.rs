use std::path::PathBuf;

use enlist::{Classify, Directory, domain::admin};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ClassCommand,
}

#[derive(Debug, clap::Parser)]
enum ClassCommand {
    /// Create a class of an existing course
    Add {
        /// The course the class teaches
        course: String,
        /// The classroom it meets in (no spaces)
        classroom: String,
    },

    /// Remove a class
    ///
    /// Students enrolled in the class lose their seat.
    Remove {
        /// The course the class teaches
        course: String,
        /// The classroom it meets in
        classroom: String,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load()?;
        let config = directory.config().clone();

        match self.command {
            ClassCommand::Add { course, classroom } => {
                let class = directory
                    .apply(|registry| admin::create_class(registry, &config, &course, &classroom))
                    .map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))?;
                directory.save()?;
                println!("{}", format!("✅ Created class {}", class.key()).success());
            }
            ClassCommand::Remove { course, classroom } => {
                let class = directory
                    .apply(|registry| admin::remove_class(registry, &course, &classroom))
                    .map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))?;
                directory.save()?;
                println!("{}", format!("✅ Removed class {}", class.key()).success());
                if !class.roster().is_empty() {
                    let ids: Vec<&str> = class.roster().iter().map(|id| id.as_str()).collect();
                    println!(
                        "{}",
                        format!("⚠️  Seats lost: {}", ids.join(", ")).warning()
                    );
                }
            }
        }
        Ok(())
    }
}
