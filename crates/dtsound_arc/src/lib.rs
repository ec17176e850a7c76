//! This library handles reading, extracting and rebuilding **ARC** sound archives (`SoundData.arc`).
//!
//! # ARC Sound Archive Format Documentation
//!
//! An archive is a flat sequence of tables, one per sound type. Tables are stored back to back without gaps,
//! the first one starting at offset 0 and each following one starting where the previous ends. There is no
//! global header, reading continues table by table until the end of the file.
//!
//! ## Table Structure
//!
//! Each table consists of a header, an index record per entry, a name block, padding and finally the data of
//! every entry.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Table ID               | 4 bytes: Sound type stored in the table                    |
//! | 0x0004         | Entry Count            | 4 bytes: Number of entries in the table                    |
//! | 0x0008         | Table Size             | 4 bytes: Length of the whole table, data included          |
//! | 0x000C         | File Data Offset       | 4 bytes: Offset from the table start to the entry data     |
//! | 0x0010         | Table Start            | 4 bytes: Offset from the archive start to this table       |
//! | 0x0014         | String Table Size      | 4 bytes: Declared size of the name block                   |
//! | 0x0018         | Reserved               | 8 bytes: Always zero                                       |
//!
//! ### Table ID
//!
//! The table id selects the sound type and the folder its entries are extracted to:
//!
//! | ID | Folder     |
//! |----|------------|
//! | 0  | `WAVE`     |
//! | 1  | `SE`       |
//! | 2  | `SEB`      |
//! | 4  | `STRSE`    |
//! | 5  | `STRBGM`   |
//! | 6  | `STRVOICE` |
//!
//! Any other id can be parsed but not extracted or rebuilt.
//!
//! ### Index Records
//!
//! Directly after the header follows one record per entry:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | File ID                | 4 bytes: Archive internal identifier                    |
//! | 0x0004         | Size                   | 4 bytes: Length of the entry's data                     |
//! | 0x0008         | Offset                 | 4 bytes: Offset from the table start to the data        |
//! | 0x000C         | Reserved               | 4 bytes: Always zero                                    |
//!
//! ### Name Block
//!
//! The names follow the last record, in the same order as the records. Every name is stored as a single length
//! byte, counting the terminator, followed by the ASCII name and a NUL.
//!
//! ### File Data
//!
//! The name block is padded with zeroes up to the **File Data Offset**. The data of every entry follows, packed
//! in record order.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.arc`, extracted entries use `.rsd`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod cursor;
pub mod error;
pub mod extract;
pub mod index;
pub mod read;
pub mod types;
pub mod write;

pub use extract::extract_archive;
pub use index::{ArchiveIndex, FileEntry, SoundType, Table};
pub use read::SoundArchive;
pub use write::{build_archive, SoundArchiveWriter};
