//! Flat-file persistence for the ordered record collection.
//!
//! The whole collection lives in one CSV file (see [`RECORD_COLUMNS`]) and every
//! mutation rewrites it completely. Writes go to a temporary file in the same
//! directory which then replaces the target, so a failed save never leaves a
//! half-written file behind.

use crate::core::record::{Record, RECORD_COLUMNS};
use crate::{Result, StockbookError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Owns the in-memory collection and the file it is persisted to.
///
/// The in-memory records only change after the file has been written
/// successfully, so the two never disagree once a call returns.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<Record>,
}

impl RecordStore {
    /// Opens the store at `path`, loading any records already persisted there.
    ///
    /// A missing file is an empty collection; the file is only created on the
    /// first save.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::Parse`] if the file exists but does not match the
    /// expected columns, or [`StockbookError::Io`] if it cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = load_records(&path)?;
        log::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Re-reads the persisted file, replacing the in-memory collection.
    ///
    /// On error the current collection is left untouched.
    pub fn load(&mut self) -> Result<&[Record]> {
        self.records = load_records(&self.path)?;
        log::info!("Reloaded {} records from {}", self.records.len(), self.path.display());
        Ok(&self.records)
    }

    /// Replaces the whole collection and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::Io`] if the file cannot be written; the file on
    /// disk and the in-memory collection are then both unchanged.
    pub fn save_all(&mut self, records: Vec<Record>) -> Result<()> {
        write_records(&self.path, &records)?;
        self.records = records;
        log::info!("Saved {} records to {}", self.records.len(), self.path.display());
        Ok(())
    }

    /// Appends `record` to the end of the collection and persists it.
    ///
    /// Returns the index of the new record, which is always `len - 1`.
    pub fn append(&mut self, record: Record) -> Result<usize> {
        let mut next = self.records.clone();
        next.push(record);
        self.save_all(next)?;
        Ok(self.records.len() - 1)
    }

    /// Removes the record at `index` and persists the shortened collection.
    ///
    /// The image referenced by the removed record is left on disk.
    ///
    /// # Errors
    ///
    /// Returns [`StockbookError::IndexOutOfRange`] if `index` is not a valid
    /// position, including when the collection is empty.
    pub fn delete_at(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(StockbookError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let mut next = self.records.clone();
        let removed = next.remove(index);
        self.save_all(next)?;
        Ok(removed)
    }
}

/// Reads every record from `path` in file order.
///
/// Any malformed row aborts the whole load rather than silently dropping data.
fn load_records(path: &Path) -> Result<Vec<Record>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_slice());

    let headers = reader.headers()?.clone();
    for column in RECORD_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(StockbookError::Parse(format!(
                "{} is missing the '{column}' column",
                path.display()
            )));
        }
    }

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.map_err(|e| {
            StockbookError::Parse(format!("{} row {}: {e}", path.display(), row + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Serializes `records` to `path` through a temporary sibling file.
fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(tmp.as_file_mut());
        writer.write_record(RECORD_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
