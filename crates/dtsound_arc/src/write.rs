//! Types for rebuilding sound archives
//!
//! Building happens in two steps. [`plan_layout`] walks the source tree, takes the size of every entry from its
//! file and lays the tables out back to back; nothing is written until every source has been found. The
//! resulting [`BuildPlan`] is then serialized by [`SoundArchiveWriter`].

use binrw::BinWrite;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::cursor::NameWriteExt;
use crate::error::{Error, Result};
use crate::index::{ArchiveIndex, Table};
use crate::types::{IndexRecord, TableHeader};

/// A table with recomputed sizes and offsets, ready to be written
#[derive(Debug, Clone)]
struct PlannedTable {
    table: Table,
    folder: PathBuf,
}

/// Layout of an archive computed from a source tree
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    tables: Vec<PlannedTable>,
}

impl BuildPlan {
    /// Tables in the order they will be written
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().map(|p| &p.table)
    }

    /// Length of the archive that will be written
    pub fn total_len(&self) -> u64 {
        self.tables().map(|t| t.table_size as u64).sum()
    }
}

/// Recompute sizes and offsets of every table in `index` from the files below `source`
///
/// Entry sizes come from `<source>/<folder>/<name>.rsd`. Entries are packed in order starting at the table's
/// file data offset, which is kept from the index along with the string table size. Tables follow each other
/// without gaps, starting at offset 0.
#[instrument(skip_all, fields(source = %source.as_ref().display()), err)]
pub fn plan_layout(index: &mut ArchiveIndex, source: impl AsRef<Path>) -> Result<BuildPlan> {
    let source = source.as_ref();
    if !source.is_dir() {
        return Err(Error::SourceMissing(source.to_path_buf()));
    }

    let mut current_offset = 0u64;
    let mut plan = BuildPlan::default();
    for table in index.tables_mut() {
        let folder = source.join(table.sound_type()?.folder_name());
        if !folder.is_dir() {
            return Err(Error::SourceMissing(folder));
        }

        for entry in &table.files {
            entry.validate_name()?;
        }

        let required = table.header_len();
        if required > table.file_data_offset as u64 {
            return Err(Error::LayoutOverflow {
                table: table.id,
                required,
                available: table.file_data_offset,
            });
        }

        let id = table.id;
        let mut table_size = table.file_data_offset as u64;
        for entry in table.files.iter_mut() {
            let path = folder.join(entry.file_name());
            let size = source_len(&path)?;

            entry.size = u32::try_from(size).map_err(|_| Error::ArchiveTooLarge(id))?;
            entry.offset = u32::try_from(table_size).map_err(|_| Error::ArchiveTooLarge(id))?;
            table_size += size;
        }

        table.table_size = u32::try_from(table_size).map_err(|_| Error::ArchiveTooLarge(id))?;
        table.table_start =
            u32::try_from(current_offset).map_err(|_| Error::ArchiveTooLarge(id))?;
        debug!(
            id = table.id,
            start = table.table_start,
            size = table.table_size,
            "planned table"
        );

        current_offset += table_size;
        plan.tables.push(PlannedTable {
            table: table.clone(),
            folder,
        });
    }

    Ok(plan)
}

fn source_len(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::SourceMissing(path.to_path_buf()),
        _ => Error::IOError(e),
    })?;
    if !metadata.is_file() {
        return Err(Error::SourceMissing(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Sound archive generator
///
/// ```
/// # fn doit() -> dtsound_arc::error::Result<()>
/// # {
/// use dtsound_arc::index::{ArchiveIndex, FileEntry, Table};
/// use dtsound_arc::write::plan_layout;
/// use dtsound_arc::SoundArchiveWriter;
///
/// let source = std::env::temp_dir().join("dtsound_arc_doc");
/// std::fs::create_dir_all(source.join("SE"))?;
/// std::fs::write(source.join("SE/click.rsd"), b"click")?;
///
/// let mut index = ArchiveIndex::new();
/// index.insert(
///     Table::builder()
///         .id(1)
///         .file_data_offset(0x40)
///         .files(vec![FileEntry::builder().file_id(0).name("click").build()])
///         .build(),
/// )?;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let plan = plan_layout(&mut index, &source)?;
/// let arc = SoundArchiveWriter::new(std::io::Cursor::new(Vec::new())).write_plan(&plan)?;
/// assert_eq!(arc.get_ref().len(), 0x45);
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct SoundArchiveWriter<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> SoundArchiveWriter<W> {
    /// Initializes the writer.
    pub fn new(inner: W) -> SoundArchiveWriter<W> {
        SoundArchiveWriter { inner }
    }

    /// Lay out `index` from the files below `source` and write the archive
    ///
    /// The sizes and offsets of `index` are updated to match what was written.
    pub fn build(self, index: &mut ArchiveIndex, source: impl AsRef<Path>) -> Result<W> {
        let plan = plan_layout(index, source)?;
        self.write_plan(&plan)
    }

    /// Write every table of `plan`
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip_all, fields(tables = plan.tables.len()), err)]
    pub fn write_plan(mut self, plan: &BuildPlan) -> Result<W> {
        for planned in &plan.tables {
            self.write_table(&planned.table, &planned.folder)?;
        }
        self.inner.flush()?;

        Ok(self.inner)
    }

    #[instrument(skip(self, table, folder), fields(id = table.id), err)]
    fn write_table(&mut self, table: &Table, folder: &Path) -> Result<()> {
        TableHeader::from(table).write(&mut self.inner)?;

        for entry in &table.files {
            IndexRecord::from(entry).write(&mut self.inner)?;
        }

        for entry in &table.files {
            self.inner.write_name(&entry.name)?;
        }

        // Pad the header up to where the file data starts
        self.inner
            .write_zeroes(table.file_data_offset as u64 - table.header_len())?;

        for entry in &table.files {
            let path = folder.join(entry.file_name());
            let data = fs::read(&path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::SourceMissing(path.clone()),
                _ => Error::IOError(e),
            })?;

            if data.len() as u64 != entry.size as u64 {
                return Err(Error::WriteFailure {
                    source: io::Error::new(
                        io::ErrorKind::Other,
                        format!(
                            "expected {} bytes but found {}, the file changed while building",
                            entry.size,
                            data.len()
                        ),
                    ),
                    path,
                });
            }

            self.inner.write_all(&data)?;
        }

        Ok(())
    }
}

/// Build a new archive at `output` from the files below `source`
///
/// The archive is written to a temporary file next to `output` which replaces `output` once complete. When the
/// build fails the temporary file is removed and `output` is left untouched.
#[instrument(skip_all, fields(output = %output.as_ref().display()), err)]
pub fn build_archive(
    index: &mut ArchiveIndex,
    source: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<()> {
    let output = output.as_ref();
    let plan = plan_layout(index, source)?;

    let mut temp_name = output
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| Error::WriteFailure {
            path: output.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "output is not a file path"),
        })?;
    temp_name.push(".partial");
    let temp = output.with_file_name(temp_name);

    let result = write_to(&plan, &temp).and_then(|_| {
        fs::rename(&temp, output).map_err(Error::write_failure(output))
    });
    if result.is_err() {
        if let Err(err) = fs::remove_file(&temp) {
            debug!("unable to remove {}: {}", temp.display(), err);
        }
        return result;
    }

    info!("wrote {} bytes", plan.total_len());
    Ok(())
}

fn write_to(plan: &BuildPlan, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(Error::write_failure(path))?;
    let writer = SoundArchiveWriter::new(BufWriter::new(file)).write_plan(plan)?;
    writer
        .into_inner()
        .map_err(|e| Error::write_failure(path)(e.into_error()))?
        .sync_all()
        .map_err(Error::write_failure(path))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use std::io::Cursor;
    use std::path::Path;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::index::{ArchiveIndex, FileEntry, Table};
    use crate::write::{build_archive, plan_layout, SoundArchiveWriter};

    fn source_tree(files: &[(&str, Vec<u8>)]) -> Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        for (name, data) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap())?;
            std::fs::write(path, data)?;
        }
        Ok(dir)
    }

    fn click_index(file_data_offset: u32) -> Result<ArchiveIndex> {
        let mut index = ArchiveIndex::new();
        index.insert(
            Table::builder()
                .id(1)
                .file_data_offset(file_data_offset)
                .string_table_size(7)
                .files(vec![FileEntry::builder().file_id(7).name("click").build()])
                .build(),
        )?;
        Ok(index)
    }

    #[traced_test]
    #[test]
    fn writes_single_table() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x43, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x07, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Records
            0x07, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Names
            0x06, 0x63, 0x6C, 0x69, 0x63, 0x6B, 0x00,
            // Padding
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Data
            0xAA, 0xBB, 0xCC,
        ];

        let source = source_tree(&[("SE/click.rsd", vec![0xAA, 0xBB, 0xCC])])?;
        let mut index = click_index(0x40)?;

        let result = SoundArchiveWriter::new(Cursor::new(Vec::new())).build(&mut index, source.path())?;
        assert_str_eq!(
            format!("{:02X?}", result.get_ref()),
            format!("{:02X?}", expected)
        );

        let table = index.table(1)?;
        assert_eq!(table.table_size, 0x43);
        assert_eq!(table.files[0].size, 3);
        assert_eq!(table.files[0].offset, 0x40);

        Ok(())
    }

    #[test]
    fn packs_entries_and_tables() -> Result<()> {
        let source = source_tree(&[
            ("WAVE/kick.rsd", vec![1; 10]),
            ("WAVE/snare.rsd", vec![2; 5]),
            ("SE/click.rsd", vec![3; 4]),
        ])?;

        let mut index = ArchiveIndex::new();
        index.insert(
            Table::builder()
                .id(0)
                .file_data_offset(0x60)
                .table_start(0x999)
                .files(vec![
                    FileEntry::builder().file_id(1).name("kick").build(),
                    FileEntry::builder().file_id(2).name("snare").build(),
                ])
                .build(),
        )?;
        index.insert(
            Table::builder()
                .id(1)
                .file_data_offset(0x40)
                .files(vec![FileEntry::builder().file_id(3).name("click").build()])
                .build(),
        )?;

        let plan = plan_layout(&mut index, source.path())?;
        assert_eq!(plan.total_len(), 0x60 + 15 + 0x40 + 4);

        let wave = index.table(0)?;
        assert_eq!(wave.table_start, 0);
        assert_eq!(wave.table_size, 0x60 + 15);
        assert_eq!(wave.files[0].offset, 0x60);
        assert_eq!(wave.files[1].offset, 0x60 + 10);

        let se = index.table(1)?;
        assert_eq!(se.table_start, wave.table_start + wave.table_size);
        assert_eq!(se.files[0].offset, 0x40);

        let result = SoundArchiveWriter::new(Cursor::new(Vec::new())).write_plan(&plan)?;
        assert_eq!(result.get_ref().len() as u64, plan.total_len());

        Ok(())
    }

    #[test]
    fn missing_table_folder() -> Result<()> {
        let source = source_tree(&[("WAVE/click.rsd", vec![0])])?;
        let mut index = click_index(0x40)?;

        let result = SoundArchiveWriter::new(Cursor::new(Vec::new())).build(&mut index, source.path());
        assert!(matches!(result, Err(Error::SourceMissing(p)) if p.ends_with("SE")));

        Ok(())
    }

    #[test]
    fn missing_entry_file() -> Result<()> {
        let source = source_tree(&[("SE/other.rsd", vec![0])])?;
        let mut index = click_index(0x40)?;

        let result = plan_layout(&mut index, source.path());
        assert!(matches!(result, Err(Error::SourceMissing(p)) if p.ends_with("click.rsd")));

        Ok(())
    }

    #[test]
    fn unknown_table_id() -> Result<()> {
        let source = source_tree(&[("SE/click.rsd", vec![0])])?;
        let mut index = ArchiveIndex::new();
        index.insert(Table::builder().id(3).file_data_offset(0x20).build())?;

        let result = plan_layout(&mut index, source.path());
        assert!(matches!(result, Err(Error::UnknownTableID(3))));

        Ok(())
    }

    #[test]
    fn header_does_not_fit() -> Result<()> {
        let source = source_tree(&[("SE/click.rsd", vec![0])])?;
        // header, one record and "\x06click\0" need 0x37 bytes
        let mut index = click_index(0x36)?;

        let result = plan_layout(&mut index, source.path());
        assert!(matches!(
            result,
            Err(Error::LayoutOverflow {
                table: 1,
                required: 0x37,
                available: 0x36
            })
        ));

        let source = source_tree(&[("SE/click.rsd", vec![0])])?;
        let mut index = click_index(0x37)?;
        assert!(plan_layout(&mut index, source.path()).is_ok());

        Ok(())
    }

    #[test]
    fn build_archive_without_source_writes_nothing() -> Result<()> {
        let source = source_tree(&[("WAVE/kick.rsd", vec![0])])?;
        let out = tempfile::tempdir()?;
        let output = out.path().join("SoundData_new.arc");
        let mut index = click_index(0x40)?;

        let result = build_archive(&mut index, source.path(), &output);
        assert!(matches!(result, Err(Error::SourceMissing(_))));
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(out.path())?.count(), 0);

        Ok(())
    }

    #[test]
    fn payload_changed_after_planning() -> Result<()> {
        let source = source_tree(&[("SE/click.rsd", vec![0xAA, 0xBB, 0xCC])])?;
        let mut index = click_index(0x40)?;

        let plan = plan_layout(&mut index, source.path())?;
        std::fs::write(source.path().join("SE/click.rsd"), vec![0xAA; 8])?;

        let result = SoundArchiveWriter::new(Cursor::new(Vec::new())).write_plan(&plan);
        assert!(matches!(
            result,
            Err(Error::WriteFailure { path, .. }) if path.ends_with("click.rsd")
        ));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn build_archive_reports_leftover_partial() -> Result<()> {
        let source = source_tree(&[("SE/click.rsd", vec![0xAA, 0xBB, 0xCC])])?;
        let out = tempfile::tempdir()?;
        let output = out.path().join("SoundData_new.arc");
        // A directory in the way of the temporary file can be neither created nor removed as a file
        std::fs::create_dir(out.path().join("SoundData_new.arc.partial"))?;

        let mut index = click_index(0x40)?;
        let result = build_archive(&mut index, source.path(), &output);

        assert!(matches!(result, Err(Error::WriteFailure { .. })));
        assert!(!output.exists());
        assert!(logs_contain("unable to remove"));

        Ok(())
    }

    #[test]
    fn build_archive_replaces_output() -> Result<()> {
        let source = source_tree(&[("SE/click.rsd", vec![0xAA, 0xBB, 0xCC])])?;
        let out = tempfile::tempdir()?;
        let output = out.path().join("SoundData_new.arc");
        std::fs::write(&output, b"previous")?;

        let mut index = click_index(0x40)?;
        build_archive(&mut index, source.path(), &output)?;

        let written = std::fs::read(&output)?;
        assert_eq!(written.len(), 0x43);
        assert_eq!(&written[0x40..], &[0xAA, 0xBB, 0xCC]);
        assert!(!Path::new(&format!("{}.partial", output.display())).exists());

        Ok(())
    }
}
