use std::path::PathBuf;

use clap::Parser;
use enlist::{Directory, domain::enrollment};
use tracing::instrument;

use crate::cli::{
    list::{ClassRow, OutputFormat},
    render,
    terminal::Colorize,
};

/// Command arguments for `enlist available`.
#[derive(Debug, Parser)]
#[command(about = "Show the classes a student may enroll in")]
pub struct Command {
    /// The student's ID number.
    student: String,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root).load()?;
        let registry = directory.registry();

        let available = enrollment::available_classes(registry, &self.student)?;
        let remaining = enrollment::units_remaining(registry, &self.student)?;

        match self.format {
            OutputFormat::Table => {
                render::print_classes(registry, available);
                println!("{}", format!("Units remaining: {remaining}").dim());
            }
            OutputFormat::Json => {
                let rows: Vec<ClassRow> = available
                    .into_iter()
                    .map(|class| ClassRow::new(registry, class))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        }
        Ok(())
    }
}
