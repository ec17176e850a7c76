//! Types for reading sound archives
//!

use binrw::BinRead;
use std::{
    fmt::{self, Debug},
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};
use tracing::{debug, instrument, trace};

use crate::{
    cursor::{name_block_offset, NameReadExt, TableSeekExt, HEADER_SIZE},
    error::{Error, Result},
    index::{ArchiveIndex, FileEntry, Table},
    types::{IndexRecord, TableHeader},
};

/// Sound archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_archive_contents(reader: impl Read + Seek) -> dtsound_arc::error::Result<()> {
///     let mut arc = dtsound_arc::SoundArchive::new(reader)?;
///
///     let ids = arc.index().ids().collect::<Vec<_>>();
///     for id in ids {
///         let count = arc.index().table(id)?.files.len();
///         for i in 0..count {
///             let data = arc.read_entry(id, i)?;
///             println!("{} {}: {} bytes", id, arc.index().table(id)?.files[i].name, data.len());
///         }
///     }
///
///     Ok(())
/// }
/// ```
pub struct SoundArchive<R> {
    reader: R,
    index: ArchiveIndex,
}

impl<R> Debug for SoundArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SoundArchive({:#?})", self.index)
    }
}

impl SoundArchive<File> {
    /// Open and parse the archive at `path`
    #[instrument(skip(path), fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>) -> Result<SoundArchive<File>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ArchiveNotFound(path.to_path_buf()),
            _ => Error::IOError(e),
        })?;
        Self::new(file)
    }
}

impl<R> SoundArchive<R> {
    /// The parsed index
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Drop the reader and keep the index
    pub fn into_index(self) -> ArchiveIndex {
        self.index
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut R, &ArchiveIndex) {
        (&mut self.reader, &self.index)
    }
}

impl<R: Read + Seek> SoundArchive<R> {
    /// Read a sound archive collecting the tables and entries it contains.
    pub fn new(mut reader: R) -> Result<SoundArchive<R>> {
        let index = parse_index(&mut reader)?;
        Ok(SoundArchive { reader, index })
    }

    /// Get a reader limited to the data of an entry
    pub fn entry_reader(&mut self, table_id: i32, index: usize) -> Result<io::Take<&mut R>> {
        let table = self.index.table(table_id)?;
        let entry = table.entry_by_index(index)?;
        entry_reader(&mut self.reader, table, entry)
    }

    /// Read the data of an entry into memory
    pub fn read_entry(&mut self, table_id: i32, index: usize) -> Result<Vec<u8>> {
        let table = self.index.table(table_id)?;
        let entry = table.entry_by_index(index)?;
        read_entry(&mut self.reader, table, entry)
    }

    /// Read the data of an entry, looked up by name, into memory
    pub fn read_entry_by_name(&mut self, table_id: i32, name: &str) -> Result<Vec<u8>> {
        let table = self.index.table(table_id)?;
        let entry = table.entry_by_name(name)?;
        read_entry(&mut self.reader, table, entry)
    }
}

pub(crate) fn entry_reader<'a, R: Read + Seek>(
    reader: &'a mut R,
    table: &Table,
    entry: &FileEntry,
) -> Result<io::Take<&'a mut R>> {
    reader.seek_entry_data(table.table_start, entry.offset)?;
    Ok(reader.take(entry.size as u64))
}

pub(crate) fn read_entry<R: Read + Seek>(
    reader: &mut R,
    table: &Table,
    entry: &FileEntry,
) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(entry.size as usize);
    entry_reader(reader, table, entry)?.read_to_end(&mut data)?;

    if data.len() != entry.size as usize {
        return Err(Error::CorruptArchive(format!(
            "entry {} of table {} is {} bytes but only {} could be read",
            entry.name,
            table.id,
            entry.size,
            data.len()
        )));
    }
    Ok(data)
}

/// Walk the archive from the start and build its index.
///
/// Tables are read back to back until the end of the source is reached. Ending exactly on a table boundary is
/// the normal way out, anything declared past the end is [`Error::CorruptArchive`].
#[instrument(skip_all, err)]
pub fn parse_index<R: Read + Seek>(reader: &mut R) -> Result<ArchiveIndex> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let mut index = ArchiveIndex::new();
    let mut position = 0u64;
    while position < len {
        let table = read_table(reader, position, len)?;
        debug!(
            id = table.id,
            entries = table.files.len(),
            start = table.table_start,
            size = table.table_size,
            "read table"
        );

        position = reader.seek_table_end(table.table_start, table.table_size)?;
        index.insert(table)?;
    }

    Ok(index)
}

fn read_table<R: Read + Seek>(reader: &mut R, position: u64, len: u64) -> Result<Table> {
    let header = TableHeader::read(reader)
        .map_err(|e| Error::from_read(e, format_args!("table header at {position:#x}")))?;
    validate_header(&header, position, len)?;

    let mut files = Vec::with_capacity(header.entry_count as usize);
    for i in 0..header.entry_count {
        reader.seek_index_record(header.table_start, i)?;
        let record = IndexRecord::read(reader).map_err(|e| {
            Error::from_read(e, format_args!("record {i} of table {}", header.table_id))
        })?;

        if record.offset as u64 + record.size as u64 > header.table_size as u64 {
            return Err(Error::CorruptArchive(format!(
                "record {i} of table {} points outside of the table",
                header.table_id
            )));
        }

        files.push(FileEntry {
            file_id: record.file_id,
            size: record.size,
            offset: record.offset,
            name: String::new(),
        });
    }

    reader.seek_name_block(header.table_start, header.entry_count)?;
    for (i, file) in files.iter_mut().enumerate() {
        let raw = reader.read_name().map_err(|e| {
            Error::from_io_read(e, format_args!("name {i} of table {}", header.table_id))
        })?;
        file.name = String::from_utf8(raw).map_err(|_| {
            Error::CorruptArchive(format!(
                "name {i} of table {} is not valid text",
                header.table_id
            ))
        })?;
        trace!(table = header.table_id, name = %file.name, size = file.size, "read entry");
    }

    Ok(Table {
        id: header.table_id,
        table_size: header.table_size,
        file_data_offset: header.file_data_offset,
        table_start: header.table_start,
        string_table_size: header.string_table_size,
        files,
    })
}

fn validate_header(header: &TableHeader, position: u64, len: u64) -> Result<()> {
    let id = header.table_id;

    if header.table_start as u64 != position {
        return Err(Error::CorruptArchive(format!(
            "table {id} found at {position:#x} declares a start of {:#x}",
            header.table_start
        )));
    }

    if (header.table_size as u64) < HEADER_SIZE {
        return Err(Error::CorruptArchive(format!(
            "table {id} declares a size of {} which can not hold its header",
            header.table_size
        )));
    }

    if position + header.table_size as u64 > len {
        return Err(Error::CorruptArchive(format!(
            "table {id} ends at {:#x} past the end of the archive at {len:#x}",
            position + header.table_size as u64
        )));
    }

    let index_end = name_block_offset(0, header.entry_count);
    if index_end > header.file_data_offset as u64
        || header.file_data_offset > header.table_size
    {
        return Err(Error::CorruptArchive(format!(
            "table {id} with {} entries declares file data at {:#x} in a table of {:#x} bytes",
            header.entry_count, header.file_data_offset, header.table_size
        )));
    }

    Ok(())
}
