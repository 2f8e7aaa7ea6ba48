use std::path::PathBuf;

use clap::Parser;
use enlist::{Directory, domain::integrity};
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `enlist validate`.
#[derive(Debug, Parser)]
#[command(about = "Check the record files for malformed lines and broken references")]
pub struct Command {
    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root).load()?;

        let skipped = directory.skipped();
        let issues = integrity::audit(directory.registry());

        if skipped.is_empty() && issues.is_empty() {
            if !self.quiet {
                println!("{}", "✅ No problems found".success());
            }
            return Ok(());
        }

        for skip in skipped {
            println!("{}", format!("⚠️  {skip}").warning());
        }
        for issue in &issues {
            println!("{}", format!("⚠️  {issue}").warning());
        }

        anyhow::bail!(
            "{} malformed line(s) and {} integrity issue(s) found",
            skipped.len(),
            issues.len()
        );
    }
}
