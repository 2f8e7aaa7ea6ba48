use std::path::Path;

use enlist::{Directory, storage::RecordKind};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let directory = Directory::init(root.to_path_buf())
            .map_err(|e| anyhow::anyhow!("Failed to initialize: {e}"))?;

        println!("Initialized enlistment data in {}", root.display());
        println!("  Created: {}", enlist::domain::CONFIG_FILE);
        for kind in [
            RecordKind::User,
            RecordKind::Course,
            RecordKind::Class,
            RecordKind::History,
        ] {
            if let Some(name) = directory.path(kind).file_name() {
                println!("  Created: {}", name.to_string_lossy());
            }
        }
        println!();
        println!("Log in as 'admin' with password 'admin' and change it:");
        println!("  enlist session");

        Ok(())
    }
}
