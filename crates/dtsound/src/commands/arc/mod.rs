pub mod build;
pub mod diff;
pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum ArcCommands {
    /// Build a sound archive from an extracted directory
    Build(build::BuildArgs),
    /// Compare two sound archives
    Diff(diff::DiffArgs),
    /// Extract a sound archive into a directory
    Extract(extract::ExtractArgs),
    /// List the tables and entries of a sound archive
    List(list::ListArgs),
}

impl ArcCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ArcCommands::Build(build) => build.handle(),
            ArcCommands::Diff(diff) => diff.handle(),
            ArcCommands::Extract(extract) => extract.handle(),
            ArcCommands::List(list) => list.handle(),
        }
    }
}
