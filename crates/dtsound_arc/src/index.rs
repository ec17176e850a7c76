//! In-memory index of a sound archive.
//!
//! The index describes which tables an archive holds and where each entry's data lives. It is built once when
//! an archive is parsed and consumed by extraction or by the builder, it never outlives that pass.

use std::fmt;

use bon::Builder;
use indexmap::IndexMap;

use crate::cursor::{HEADER_SIZE, RECORD_SIZE};
use crate::error::{EntryNotFoundError, Error, Result};

/// File extension used for extracted entries
pub const ENTRY_EXTENSION: &str = "rsd";

/// The category of sounds stored in a table
///
/// The mapping from table id to folder name is fixed, ids outside of it are rejected with
/// [`Error::UnknownTableID`] whenever a folder name is needed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SoundType {
    /// Wave bank
    Wave = 0,
    /// Sound effects
    Se = 1,
    /// Sound effect banks
    Seb = 2,
    /// Streamed sound effects
    StrSe = 4,
    /// Streamed music
    StrBgm = 5,
    /// Streamed voices
    StrVoice = 6,
}

impl SoundType {
    /// Every known sound type, in id order
    pub const ALL: [SoundType; 6] = [
        SoundType::Wave,
        SoundType::Se,
        SoundType::Seb,
        SoundType::StrSe,
        SoundType::StrBgm,
        SoundType::StrVoice,
    ];

    /// The table id used for this sound type
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// The folder entries of this type are extracted to
    pub const fn folder_name(self) -> &'static str {
        match self {
            SoundType::Wave => "WAVE",
            SoundType::Se => "SE",
            SoundType::Seb => "SEB",
            SoundType::StrSe => "STRSE",
            SoundType::StrBgm => "STRBGM",
            SoundType::StrVoice => "STRVOICE",
        }
    }
}

impl TryFrom<i32> for SoundType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        SoundType::ALL
            .into_iter()
            .find(|t| t.id() == value)
            .ok_or(Error::UnknownTableID(value))
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// A single sound file stored in a table
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    /// Archive internal identifier, kept as is
    pub file_id: u32,

    /// Length of the data in bytes
    #[builder(default)]
    pub size: u32,

    /// Offset of the data relative to the start of the owning table
    #[builder(default)]
    pub offset: u32,

    /// Name of the entry, without the terminating NUL
    #[builder(into)]
    pub name: String,
}

impl FileEntry {
    /// Name of the file this entry is extracted to
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, ENTRY_EXTENSION)
    }

    /// Bytes the name occupies in the name block: length prefix, name and terminator
    pub fn stored_name_len(&self) -> u64 {
        self.name.len() as u64 + 2
    }

    /// Check that the name can be stored in the name block and used as a file name
    pub fn validate_name(&self) -> Result<()> {
        let name = self.name.as_str();
        let unsafe_name = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if unsafe_name || name.len() + 1 > u8::MAX as usize {
            return Err(Error::InvalidEntryName(self.name.clone()));
        }
        Ok(())
    }
}

/// One sound type worth of entries, stored contiguously in the archive
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Table id, see [`SoundType`]
    pub id: i32,

    /// Total length of the table, header and file data included
    #[builder(default)]
    pub table_size: u32,

    /// Offset from the start of the table where the file data begins
    ///
    /// This includes any padding after the name block and is reused as is when rebuilding.
    pub file_data_offset: u32,

    /// Offset from the start of the archive where the table begins
    #[builder(default)]
    pub table_start: u32,

    /// Declared size of the name block, copied through verbatim when rebuilding
    #[builder(default)]
    pub string_table_size: u32,

    /// Entries in their stored order
    #[builder(default)]
    pub files: Vec<FileEntry>,
}

impl Table {
    /// Number of entries in the table
    pub fn entry_count(&self) -> u32 {
        self.files.len() as u32
    }

    /// The sound type of this table
    pub fn sound_type(&self) -> Result<SoundType> {
        SoundType::try_from(self.id)
    }

    /// Natural size of header, index records and name block, without padding
    pub fn header_len(&self) -> u64 {
        HEADER_SIZE
            + RECORD_SIZE * self.files.len() as u64
            + self.files.iter().map(FileEntry::stored_name_len).sum::<u64>()
    }

    /// Sum of the sizes of every entry
    pub fn payload_len(&self) -> u64 {
        self.files.iter().map(|f| f.size as u64).sum()
    }

    /// Absolute offset of an entry's data in the archive
    pub fn absolute_offset(&self, entry: &FileEntry) -> u64 {
        self.table_start as u64 + entry.offset as u64
    }

    /// Find an entry by name
    pub fn entry_by_name(&self, name: &str) -> Result<&FileEntry> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| EntryNotFoundError::Name(self.id, name.to_owned()).into())
    }

    /// Get an entry by its position in the table
    pub fn entry_by_index(&self, index: usize) -> Result<&FileEntry> {
        self.files
            .get(index)
            .ok_or_else(|| EntryNotFoundError::Index(self.id, index).into())
    }
}

/// Ordered collection of the tables in an archive
///
/// Iteration always follows insertion order, which for a parsed archive is the order the tables appear in the
/// file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveIndex {
    tables: IndexMap<i32, Table>,
}

impl ArchiveIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table, rejecting ids that are already present
    pub fn insert(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(&table.id) {
            return Err(Error::DuplicateTable(table.id));
        }
        self.tables.insert(table.id, table);
        Ok(())
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the index holds no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up a table by id
    pub fn get(&self, id: i32) -> Option<&Table> {
        self.tables.get(&id)
    }

    /// Look up a table by id, failing when it is absent
    pub fn table(&self, id: i32) -> Result<&Table> {
        self.get(id).ok_or_else(|| EntryNotFoundError::Table(id).into())
    }

    /// Table ids in order
    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.tables.keys().copied()
    }

    /// Tables in order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Mutable access to the tables, in order
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.values_mut()
    }

    /// Number of entries over all tables
    pub fn entry_count(&self) -> usize {
        self.tables().map(|t| t.files.len()).sum()
    }

    /// Length of the archive described by this index
    pub fn total_len(&self) -> u64 {
        self.tables().map(|t| t.table_size as u64).sum()
    }
}
