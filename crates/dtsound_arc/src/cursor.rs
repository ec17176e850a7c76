//! Positioning and primitive reads/writes within a table.
//!
//! All layout arithmetic of a table lives here:
//!
//! ```text
//! table_start
//! +0x00                    header (HEADER_SIZE)
//! +0x20 + i * 0x10         index record i (RECORD_SIZE)
//! +0x20 + count * 0x10     name block
//! +file_data_offset        file data
//! +table_size              next table
//! ```

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

/// Size of a table header
pub const HEADER_SIZE: u64 = 0x20;

/// Size of a single index record
pub const RECORD_SIZE: u64 = 0x10;

/// Offset of index record `index` from the start of the archive
pub fn index_record_offset(table_start: u32, index: u32) -> u64 {
    table_start as u64 + HEADER_SIZE + index as u64 * RECORD_SIZE
}

/// Offset of the name block from the start of the archive
pub fn name_block_offset(table_start: u32, entry_count: u32) -> u64 {
    index_record_offset(table_start, entry_count)
}

/// Named seek operations over a table
pub trait TableSeekExt: Seek {
    /// Move to the table header
    fn seek_table_start(&mut self, table_start: u32) -> io::Result<u64> {
        self.seek(SeekFrom::Start(table_start as u64))
    }

    /// Move to index record `index`
    fn seek_index_record(&mut self, table_start: u32, index: u32) -> io::Result<u64> {
        self.seek(SeekFrom::Start(index_record_offset(table_start, index)))
    }

    /// Move to the first name of the name block
    fn seek_name_block(&mut self, table_start: u32, entry_count: u32) -> io::Result<u64> {
        self.seek(SeekFrom::Start(name_block_offset(table_start, entry_count)))
    }

    /// Move to the data of an entry
    fn seek_entry_data(&mut self, table_start: u32, offset: u32) -> io::Result<u64> {
        self.seek(SeekFrom::Start(table_start as u64 + offset as u64))
    }

    /// Move past the end of the table
    fn seek_table_end(&mut self, table_start: u32, table_size: u32) -> io::Result<u64> {
        self.seek(SeekFrom::Start(table_start as u64 + table_size as u64))
    }
}

impl<S: Seek + ?Sized> TableSeekExt for S {}

/// Reading of length prefixed names
pub trait NameReadExt: Read {
    /// Read a name stored as a length byte followed by that many bytes
    ///
    /// The length includes the terminator. Trailing NULs are stripped from the result.
    fn read_name(&mut self) -> io::Result<Vec<u8>> {
        let len = self.read_u8()?;

        let mut name = vec![0u8; len as usize];
        self.read_exact(&mut name)?;

        while name.last() == Some(&0) {
            name.pop();
        }
        Ok(name)
    }
}

impl<R: Read + ?Sized> NameReadExt for R {}

/// Writing of length prefixed names and padding
pub trait NameWriteExt: Write {
    /// Write a name as a length byte, the name and a terminating NUL
    fn write_name(&mut self, name: &str) -> io::Result<()> {
        let len = u8::try_from(name.len() + 1).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("name {name:?} is too long to store"),
            )
        })?;

        self.write_u8(len)?;
        self.write_all(name.as_bytes())?;
        self.write_u8(0)
    }

    /// Write `count` zero bytes
    fn write_zeroes(&mut self, count: u64) -> io::Result<()> {
        io::copy(&mut io::repeat(0).take(count), self)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> NameWriteExt for W {}
