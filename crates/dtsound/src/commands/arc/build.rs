use clap::Args;
use dtsound_arc::{build_archive, SoundArchive};
use miette::{miette, Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct BuildArgs {
    /// The original sound archive, providing the tables and entry order
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// An input directory laid out as produced by extract
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// The sound archive to create
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl BuildArgs {
    pub fn handle(&self) -> Result<()> {
        if !self.overwrite && self.output.exists() {
            return Err(miette!(
                "{} already exists, pass --overwrite to replace it",
                self.output.display()
            ));
        }

        let mut index = SoundArchive::open(&self.file)
            .context(format!("reading {}", &self.file.display()))?
            .into_index();

        info!(
            "building {} from {}",
            self.output.display(),
            self.directory.display()
        );
        build_archive(&mut index, &self.directory, &self.output)
            .context(format!("creating {}", &self.output.display()))?;

        info!(
            "wrote {} tables with {} entries ({} bytes)",
            index.len(),
            index.entry_count(),
            index.total_len()
        );
        Ok(())
    }
}
