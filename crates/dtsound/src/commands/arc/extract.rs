use clap::Args;
use dtsound_arc::SoundArchive;
use miette::{Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input sound archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory, defaults to the current directory
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let directory = match &self.directory {
            Some(directory) => directory.clone(),
            None => std::env::current_dir().into_diagnostic()?,
        };

        let mut arc = SoundArchive::open(&self.file)
            .context(format!("reading {}", &self.file.display()))?;

        info!("extracting to {}", directory.display());
        let report = arc
            .extract(&directory)
            .context(format!("extracting {}", &self.file.display()))?;

        info!(
            "extracted {} entries ({} bytes) from {} tables",
            report.entries, report.bytes, report.tables
        );
        Ok(())
    }
}
