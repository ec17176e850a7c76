use clap::Args;
use dtsound_arc::SoundArchive;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input sound archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only list the tables
    #[arg(long, default_value_t = false)]
    tables: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let arc = SoundArchive::open(&self.file)
            .context(format!("reading {}", &self.file.display()))?;
        let index = arc.index();

        for table in index.tables() {
            let kind = table
                .sound_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|_| "unknown".into());

            println!(
                "{} {}: {} entries, {} bytes at {:#x}, data at +{:#x}",
                format!("[{}]", table.id).bold(),
                kind.blue(),
                table.entry_count(),
                table.table_size,
                table.table_start,
                table.file_data_offset,
            );

            if self.tables {
                continue;
            }

            for (i, entry) in table.files.iter().enumerate() {
                println!(
                    "  {:>4} {:<32} id {:>6} {:>10} bytes at +{:#x}",
                    i,
                    entry.name.green(),
                    entry.file_id,
                    entry.size,
                    entry.offset
                );
            }
        }

        println!(
            "{} tables, {} entries, {} bytes",
            index.len(),
            index.entry_count(),
            index.total_len()
        );
        Ok(())
    }
}
