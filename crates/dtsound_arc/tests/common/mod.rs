#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub struct Entry {
    pub file_id: u32,
    pub name: &'static str,
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(file_id: u32, name: &'static str, data: Vec<u8>) -> Self {
        Self {
            file_id,
            name,
            data,
        }
    }
}

/// Lay out a single table by hand
pub fn table(id: i32, start: u32, file_data_offset: u32, entries: &[Entry]) -> Vec<u8> {
    let names_len: u32 = entries.iter().map(|e| e.name.len() as u32 + 2).sum();
    let data_len: u32 = entries.iter().map(|e| e.data.len() as u32).sum();

    let mut out = Vec::new();
    for value in [
        id as u32,
        entries.len() as u32,
        file_data_offset + data_len,
        file_data_offset,
        start,
        names_len,
        0,
        0,
    ] {
        out.write_u32::<LittleEndian>(value).unwrap();
    }

    let mut offset = file_data_offset;
    for entry in entries {
        out.write_u32::<LittleEndian>(entry.file_id).unwrap();
        out.write_u32::<LittleEndian>(entry.data.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(offset).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        offset += entry.data.len() as u32;
    }

    for entry in entries {
        out.push(entry.name.len() as u8 + 1);
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
    }

    assert!(out.len() <= file_data_offset as usize);
    out.resize(file_data_offset as usize, 0);

    for entry in entries {
        out.extend_from_slice(&entry.data);
    }
    out
}

/// Concatenate tables, fixing up each table start
pub fn archive(tables: &[(i32, u32, Vec<Entry>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (id, file_data_offset, entries) in tables {
        let bytes = table(*id, out.len() as u32, *file_data_offset, entries);
        out.extend(bytes);
    }
    out
}

pub fn kick() -> Vec<u8> {
    (0u8..12).collect()
}

pub fn snare() -> Vec<u8> {
    vec![0x5A; 7]
}

pub fn click() -> Vec<u8> {
    b"click".to_vec()
}

/// WAVE with "kick" and "snare", SE with "click"
pub fn sample_archive() -> Vec<u8> {
    archive(&[
        (
            0,
            0x80,
            vec![Entry::new(10, "kick", kick()), Entry::new(11, "snare", snare())],
        ),
        (1, 0x40, vec![Entry::new(20, "click", click())]),
    ])
}
