mod common;

use std::io::Cursor;

use dtsound_arc::error::{Error, Result};
use dtsound_arc::{build_archive, SoundArchive, SoundArchiveWriter};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

use common::{sample_archive, snare};

#[traced_test]
#[test]
fn rebuild_extracted_archive() -> Result<()> {
    let original = sample_archive();
    let dir = tempfile::tempdir()?;

    let mut arc = SoundArchive::new(Cursor::new(original.clone()))?;
    arc.extract(dir.path())?;

    let mut index = arc.into_index();
    let rebuilt = SoundArchiveWriter::new(Cursor::new(Vec::new()))
        .build(&mut index, dir.path())?
        .into_inner();

    // Nothing changed on disk and the sample uses the regular packing
    assert_eq!(rebuilt, original);

    let mut before = SoundArchive::new(Cursor::new(original))?;
    let mut after = SoundArchive::new(Cursor::new(rebuilt))?;
    assert_eq!(before.index(), after.index());

    let ids = before.index().ids().collect::<Vec<_>>();
    for id in ids {
        let count = before.index().table(id)?.files.len();
        for i in 0..count {
            info!("comparing entry {i} of table {id}");
            assert_eq!(before.read_entry(id, i)?, after.read_entry(id, i)?);
        }
    }

    Ok(())
}

#[test]
fn rebuild_with_changed_entry() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let mut arc = SoundArchive::new(Cursor::new(sample_archive()))?;
    arc.extract(dir.path())?;

    let replacement = vec![0xEE; 100];
    std::fs::write(dir.path().join("WAVE/snare.rsd"), &replacement)?;

    let mut index = arc.into_index();
    let rebuilt = SoundArchiveWriter::new(Cursor::new(Vec::new())).build(&mut index, dir.path())?;

    let mut after = SoundArchive::new(rebuilt)?;
    let wave = after.index().table(0)?.clone();
    let se = after.index().table(1)?.clone();

    assert_eq!(wave.files[1].size, 100);
    assert_eq!(wave.string_table_size, 13);
    assert_eq!(wave.file_data_offset, 0x80);
    assert_eq!(wave.table_size, 0x80 + 12 + 100);

    let mut expected_offset = wave.file_data_offset;
    for entry in &wave.files {
        assert_eq!(entry.offset, expected_offset);
        expected_offset += entry.size;
    }

    assert_eq!(se.table_start, wave.table_start + wave.table_size);
    assert_eq!(after.read_entry_by_name(0, "snare")?, replacement);
    assert_ne!(after.read_entry_by_name(0, "snare")?, snare());
    assert_eq!(after.read_entry_by_name(1, "click")?, b"click".to_vec());

    Ok(())
}

#[test]
fn rebuild_to_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source");
    let input = dir.path().join("SoundData.arc");
    let output = dir.path().join("SoundData_new.arc");
    std::fs::write(&input, sample_archive())?;

    let mut arc = SoundArchive::open(&input)?;
    arc.extract(&source)?;

    let mut index = arc.into_index();
    build_archive(&mut index, &source, &output)?;

    assert_eq!(std::fs::read(&output)?, sample_archive());

    Ok(())
}

#[test]
fn rebuild_without_table_folder() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source");
    let output = dir.path().join("SoundData_new.arc");

    let mut arc = SoundArchive::new(Cursor::new(sample_archive()))?;
    arc.extract(&source)?;
    std::fs::remove_dir_all(source.join("SE"))?;

    let mut index = arc.into_index();
    let result = build_archive(&mut index, &source, &output);

    assert!(matches!(result, Err(Error::SourceMissing(p)) if p.ends_with("SE")));
    assert!(!output.exists());

    Ok(())
}
