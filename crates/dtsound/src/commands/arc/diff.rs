use clap::{Args, ValueEnum};
use dtsound_arc::{SoundArchive, SoundType, Table};
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::{
    fmt::Display,
    io::{Read, Seek},
    path::PathBuf,
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Mode {
    /// Compare tables, entry names, ids and sizes
    #[default]
    Index,
    /// Also compare layout fields and entry contents
    Full,
}

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String),
    Removed(String),
    Comparison(String, String, String),
    Note(String),
    Modified(String, Vec<Change>),
}

impl Change {
    fn modified(subject: impl Into<String>) -> Self {
        Change::Modified(subject.into(), Vec::new())
    }

    fn push(&mut self, change: Change) {
        if let Change::Modified(_, children) = self {
            children.push(change);
        }
    }

    fn compare<T: PartialEq + Display>(&mut self, key: &str, left: T, right: T) {
        if left != right {
            self.push(Change::Comparison(
                key.into(),
                left.to_string(),
                right.to_string(),
            ));
        }
    }

    fn into_option(self) -> Option<Change> {
        match &self {
            Change::Modified(_, children) if children.is_empty() => None,
            _ => Some(self),
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(v) => {
                writeln!(f, "✅ {}", v.green())
            }
            Change::Removed(v) => {
                writeln!(f, "❌ {}", v.red())
            }
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Note(v) => {
                writeln!(f, "* {}", v.yellow())
            }
            Change::Modified(v, children) => {
                writeln!(f, "🔃 {}", v.blue())?;
                let body = children.iter().map(|c| c.to_string()).join("");
                for line in body.lines() {
                    writeln!(f, "  {}", line)?;
                }
                Ok(())
            }
        }
    }
}

fn table_label(id: i32) -> String {
    match SoundType::try_from(id) {
        Ok(kind) => format!("table {} ({})", id, kind),
        Err(_) => format!("table {}", id),
    }
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input sound archive
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input sound archive
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,

    /// Comparison mode
    #[arg(short, long, value_enum, default_value_t = Mode::Index)]
    mode: Mode,
}

impl DiffArgs {
    fn handle_table<R: Read + Seek>(
        &self,
        left_table: &Table,
        right_table: &Table,
        left: &mut SoundArchive<R>,
        right: &mut SoundArchive<R>,
    ) -> Result<Option<Change>> {
        let id = left_table.id;
        let mut result = Change::modified(table_label(id));

        result.compare(
            "entries",
            left_table.entry_count(),
            right_table.entry_count(),
        );
        if self.mode == Mode::Full {
            result.compare("start", left_table.table_start, right_table.table_start);
            result.compare("size", left_table.table_size, right_table.table_size);
            result.compare(
                "file data offset",
                left_table.file_data_offset,
                right_table.file_data_offset,
            );
            result.compare(
                "string table size",
                left_table.string_table_size,
                right_table.string_table_size,
            );
        }

        right_table
            .files
            .iter()
            .filter(|f| left_table.entry_by_name(&f.name).is_err())
            .for_each(|f| result.push(Change::Added(format!("entry {}", f.name))));

        left_table
            .files
            .iter()
            .filter(|f| right_table.entry_by_name(&f.name).is_err())
            .for_each(|f| result.push(Change::Removed(format!("entry {}", f.name))));

        for (i, left_entry) in left_table.files.iter().enumerate() {
            let Some((j, right_entry)) = right_table
                .files
                .iter()
                .find_position(|f| f.name == left_entry.name)
            else {
                continue;
            };

            let mut entry = Change::modified(format!("entry {}", left_entry.name));
            entry.compare("position", i, j);
            entry.compare("file id", left_entry.file_id, right_entry.file_id);
            entry.compare("size", left_entry.size, right_entry.size);

            if self.mode == Mode::Full {
                entry.compare("offset", left_entry.offset, right_entry.offset);

                if left_entry.size == right_entry.size
                    && left.read_entry(id, i)? != right.read_entry(id, j)?
                {
                    entry.push(Change::Note("contents differ".into()));
                }
            }

            if let Some(change) = entry.into_option() {
                result.push(change);
            }
        }

        Ok(result.into_option())
    }

    fn handle_archive<R: Read + Seek>(
        &self,
        name: &str,
        left: &mut SoundArchive<R>,
        right: &mut SoundArchive<R>,
    ) -> Result<Option<Change>> {
        let mut result = Change::modified(name);

        let left_tables = left.index().tables().cloned().collect::<Vec<_>>();
        let right_tables = right.index().tables().cloned().collect::<Vec<_>>();

        right_tables
            .iter()
            .filter(|t| left.index().get(t.id).is_none())
            .for_each(|t| result.push(Change::Added(table_label(t.id))));

        left_tables
            .iter()
            .filter(|t| right.index().get(t.id).is_none())
            .for_each(|t| result.push(Change::Removed(table_label(t.id))));

        let left_order = left_tables.iter().map(|t| t.id).join(", ");
        let right_order = right_tables.iter().map(|t| t.id).join(", ");
        if left_order != right_order {
            result.push(Change::Comparison(
                "table order".into(),
                left_order,
                right_order,
            ));
        }

        for left_table in &left_tables {
            let Some(right_table) = right_tables.iter().find(|t| t.id == left_table.id) else {
                continue;
            };

            if let Some(change) = self.handle_table(left_table, right_table, left, right)? {
                result.push(change);
            }
        }

        Ok(result.into_option())
    }

    pub fn handle(&self) -> Result<()> {
        let mut left = SoundArchive::open(&self.left)
            .context(format!("reading {}", &self.left.display()))?;

        let mut right = SoundArchive::open(&self.right)
            .context(format!("reading {}", &self.right.display()))?;

        let difference =
            self.handle_archive(&self.left.to_string_lossy(), &mut left, &mut right)?;

        if let Some(d) = difference {
            println!("{}", d);
        }

        Ok(())
    }
}
