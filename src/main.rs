//! Command-line interface for plain-text course enlistment.
//!
//! Run without a subcommand to start an interactive session, or use the
//! scripted subcommands (`list`, `available`, `course`, `class`, `validate`)
//! for one-shot operations against the record files.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
