use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::row_file::RowFile;
use crate::{DatabaseError, common::durable::write_atomic, core::types::Value};

/// Equality index over one INT column of one table.
///
/// Maps a stored value (`None` for NULL) to the positions holding it, in
/// ascending order. Lookups never touch storage, so the owner must call
/// [`HashIndex::add`] after every append and [`HashIndex::rebuild`] after
/// anything that renumbers rows.
///
/// When persistence is on, a snapshot is written by `rebuild` and `flush`.
/// `add` only changes memory. Each snapshot records the checksum of the data
/// file it was computed from, and a snapshot whose checksum no longer matches
/// must not be trusted.
#[derive(Debug, Clone)]
pub struct HashIndex {
    table: String,
    column: String,
    path: PathBuf,
    persist: bool,
    /// Number of rows the entries describe.
    row_count: usize,
    /// CRC32 of the data file as of the last snapshot.
    data_checksum: u32,
    /// Entries added since the last snapshot.
    dirty: bool,
    entries: BTreeMap<Option<u64>, Vec<usize>>,
}

/// On-disk form of an index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    table: String,
    column: String,
    row_count: usize,
    data_checksum: u32,
    entries: Vec<(Option<u64>, Vec<usize>)>,
}

impl HashIndex {
    /// Creates an empty index. Nothing is written until it is rebuilt or
    /// flushed.
    pub fn new<P: AsRef<Path>>(table: &str, column: &str, path: P, persist: bool) -> Self {
        Self {
            table: table.to_owned(),
            column: column.to_owned(),
            path: path.as_ref().to_path_buf(),
            persist,
            row_count: 0,
            data_checksum: 0,
            dirty: false,
            entries: BTreeMap::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows covered by the index.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Whether entries were added since the last snapshot.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a loaded snapshot was computed from the current contents of
    /// `storage`.
    pub fn matches(&self, storage: &RowFile) -> Result<bool, DatabaseError> {
        Ok(self.row_count == storage.row_count()?
            && self.data_checksum == storage.checksum()?)
    }

    /// Recomputes the whole index from `storage`.
    pub fn rebuild(&mut self, storage: &RowFile) -> Result<(), DatabaseError> {
        self.entries.clear();
        self.row_count = 0;

        let Some(col_idx) = storage.schema().get_column_index(&self.column) else {
            return Err(DatabaseError::ColumnNotFound {
                table: self.table.clone(),
                column: self.column.clone(),
            });
        };

        let rows = storage.read_all()?;
        for (position, row) in rows.iter().enumerate() {
            let key = index_key(row.get_value(col_idx).unwrap_or(&Value::Null));
            self.entries.entry(key).or_default().push(position);
        }
        self.row_count = rows.len();

        debug!(
            table = %self.table,
            column = %self.column,
            rows = self.row_count,
            keys = self.entries.len(),
            "rebuilt index"
        );
        self.save(storage)
    }

    /// Records a freshly appended row.
    ///
    /// `position` must be the position the row was just appended at;
    /// positions are assumed to only grow.
    pub fn add(&mut self, value: &Value, position: usize) {
        self.entries.entry(index_key(value)).or_default().push(position);
        self.row_count = self.row_count.max(position + 1);
        self.dirty = true;
    }

    /// Writes a snapshot if entries were added since the last one.
    pub fn flush(&mut self, storage: &RowFile) -> Result<(), DatabaseError> {
        if self.dirty {
            self.save(storage)?;
        }
        Ok(())
    }

    /// Empties the index and removes its file.
    pub fn clear(&mut self) -> Result<(), DatabaseError> {
        self.entries.clear();
        self.row_count = 0;
        self.dirty = false;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Positions recorded for `value`, in ascending order.
    pub fn find(&self, value: &Value) -> &[usize] {
        match value {
            Value::Text(_) => &[],
            _ => self
                .entries
                .get(&index_key(value))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    /// Loads a snapshot written by a previous process.
    ///
    /// Returns `Ok(None)` if there is no file at `path`. Check the result
    /// with [`HashIndex::matches`] before using it.
    pub fn load<P: AsRef<Path>>(path: P, persist: bool) -> Result<Option<Self>, DatabaseError> {
        let json = match fs::read(path.as_ref()) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: IndexSnapshot = serde_json::from_slice(&json)?;
        Ok(Some(Self {
            table: snapshot.table,
            column: snapshot.column,
            path: path.as_ref().to_path_buf(),
            persist,
            row_count: snapshot.row_count,
            data_checksum: snapshot.data_checksum,
            dirty: false,
            entries: snapshot.entries.into_iter().collect(),
        }))
    }

    fn save(&mut self, storage: &RowFile) -> Result<(), DatabaseError> {
        self.data_checksum = storage.checksum()?;
        self.dirty = false;
        if !self.persist {
            return Ok(());
        }

        let snapshot = IndexSnapshot {
            table: self.table.clone(),
            column: self.column.clone(),
            row_count: self.row_count,
            data_checksum: self.data_checksum,
            entries: self
                .entries
                .iter()
                .map(|(key, positions)| (*key, positions.clone()))
                .collect(),
        };
        write_atomic(&self.path, &serde_json::to_vec(&snapshot)?)?;
        debug!(table = %self.table, column = %self.column, "wrote index snapshot");
        Ok(())
    }
}

impl PartialEq for HashIndex {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.column == other.column
            && self.row_count == other.row_count
            && self.entries == other.entries
    }
}

fn index_key(value: &Value) -> Option<u64> {
    match value {
        Value::Int(number) => Some(*number),
        _ => None,
    }
}
