//! Extraction of an archive into a directory tree
//!
//! Every table gets a folder named after its [`SoundType`](crate::index::SoundType) and every entry is written
//! to `<out>/<folder>/<name>.rsd`. Existing files are overwritten.

use std::{
    fs,
    io::{Read, Seek},
    path::Path,
};
use tracing::{debug, info, instrument};

use crate::{
    error::{Error, Result},
    index::ArchiveIndex,
    read::{read_entry, SoundArchive},
};

/// Summary of an extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Number of table folders written
    pub tables: usize,
    /// Number of entry files written
    pub entries: usize,
    /// Number of data bytes written
    pub bytes: u64,
}

impl<R: Read + Seek> SoundArchive<R> {
    /// Extract every entry below `out_dir`
    #[instrument(skip(self, out_dir), fields(out_dir = %out_dir.as_ref().display()), err)]
    pub fn extract(&mut self, out_dir: impl AsRef<Path>) -> Result<ExtractReport> {
        let (reader, index) = self.parts_mut();
        extract(index, reader, out_dir.as_ref())
    }
}

/// Open the archive at `path` and extract it below `out_dir`
pub fn extract_archive(path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<ExtractReport> {
    SoundArchive::open(path)?.extract(out_dir)
}

/// Write the entries described by `index` from `reader` below `out_dir`
///
/// Table ids and entry names are checked before anything is written, so an unknown table id leaves the output
/// directory untouched.
pub fn extract<R: Read + Seek>(
    index: &ArchiveIndex,
    reader: &mut R,
    out_dir: &Path,
) -> Result<ExtractReport> {
    for table in index.tables() {
        table.sound_type()?;
        for entry in &table.files {
            entry.validate_name()?;
        }
    }

    fs::create_dir_all(out_dir).map_err(Error::write_failure(out_dir))?;

    let mut report = ExtractReport::default();
    for table in index.tables() {
        let sound_type = table.sound_type()?;
        let folder = out_dir.join(sound_type.folder_name());
        fs::create_dir_all(&folder).map_err(Error::write_failure(&folder))?;
        info!("extracting {} entries to {}", table.files.len(), folder.display());

        for entry in &table.files {
            let path = folder.join(entry.file_name());
            debug!("writing {}", path.display());

            let data = read_entry(reader, table, entry)?;
            fs::write(&path, &data).map_err(Error::write_failure(&path))?;

            report.entries += 1;
            report.bytes += data.len() as u64;
        }
        report.tables += 1;
    }

    Ok(report)
}
