//! Base types for the on-disk structure of a sound archive.

use binrw::{BinRead, BinWrite};

use crate::index::{FileEntry, Table};

/// Table header
///
/// Every table starts with this 32 byte header. The final 8 bytes are reserved, they are always written as zero
/// and never interpreted when reading.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct TableHeader {
    /// Identifies the sound type stored in the table
    pub table_id: i32,

    /// The number of entries stored in the table
    pub entry_count: u32,

    /// Total length of the table, file data included
    pub table_size: u32,

    /// Offset from the start of the table where the file data begins
    pub file_data_offset: u32,

    /// Offset from the start of the archive where the table begins
    pub table_start: u32,

    /// Declared size of the name block
    #[brw(pad_after = 8)]
    pub string_table_size: u32,
}

impl From<&Table> for TableHeader {
    fn from(table: &Table) -> Self {
        Self {
            table_id: table.id,
            entry_count: table.entry_count(),
            table_size: table.table_size,
            file_data_offset: table.file_data_offset,
            table_start: table.table_start,
            string_table_size: table.string_table_size,
        }
    }
}

/// Index record
///
/// One 16 byte record per entry follows the table header. The last 4 bytes are reserved.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct IndexRecord {
    /// Archive internal identifier of the entry
    pub file_id: u32,

    /// Length of the entry's data
    pub size: u32,

    /// Offset of the entry's data from the start of the table
    #[brw(pad_after = 4)]
    pub offset: u32,
}

impl From<&FileEntry> for IndexRecord {
    fn from(entry: &FileEntry) -> Self {
        Self {
            file_id: entry.file_id,
            size: entry.size,
            offset: entry.offset,
        }
    }
}
