use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    DatabaseError,
    common::durable::write_atomic,
    core::types::Value,
    db::table::{row::Row, schema::TableSchema},
};

/// Positional access to a table's fixed-width rows.
///
/// The data file is a plain concatenation of encoded rows with no header;
/// row `i` starts at byte `i * row_size`. A file is opened and closed within
/// every call, no handle is kept between operations.
///
/// # Layout
///
/// ```text
/// <dir>/
/// ├── T.schema    # column layout (see TableSchema)
/// ├── T.data      # row_count * row_size bytes
/// └── T.data.tmp  # only exists while delete_where rewrites the table
/// ```
#[derive(Debug)]
pub struct RowFile {
    path: PathBuf,
    schema: TableSchema,
}

impl RowFile {
    pub fn new<P: AsRef<Path>>(path: P, schema: TableSchema) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            schema,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the data file, 0 if it does not exist.
    pub fn file_len(&self) -> Result<u64, DatabaseError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of complete rows in the file. Trailing partial bytes are ignored.
    pub fn row_count(&self) -> Result<usize, DatabaseError> {
        let row_size = self.schema.row_size() as u64;
        Ok(self
            .file_len()?
            .checked_div(row_size)
            .unwrap_or(0) as usize)
    }

    /// CRC32 of the whole data file, 0 if it does not exist.
    pub fn checksum(&self) -> Result<u32, DatabaseError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(crc32fast::hash(&bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends a row and returns its position.
    pub fn append(&self, row: &Row) -> Result<usize, DatabaseError> {
        let bytes = self.schema.encode_row(row)?;
        let position = self.row_count()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;

        debug!(table = %self.schema.table_name, position, "appended row");
        Ok(position)
    }

    /// Reads the row at `position`.
    ///
    /// Returns `None` when the file is absent, the position is past the end,
    /// or the row at that position is truncated.
    pub fn read(&self, position: usize) -> Result<Option<Row>, DatabaseError> {
        let row_size = self.schema.row_size();
        if position >= self.row_count()? {
            return Ok(None);
        }

        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        file.seek(SeekFrom::Start((position * row_size) as u64))?;

        let mut buf = vec![0u8; row_size];
        match file.read_exact(&mut buf) {
            Ok(()) => Ok(self.schema.decode_row(&buf)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads every complete row, in position order.
    pub fn read_all(&self) -> Result<Vec<Row>, DatabaseError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let row_size = self.schema.row_size();
        if row_size == 0 {
            return Ok(Vec::new());
        }

        Ok(bytes
            .chunks_exact(row_size)
            .filter_map(|chunk| self.schema.decode_row(chunk))
            .collect())
    }

    /// Removes the data file. The next append recreates it.
    pub fn clear(&self) -> Result<(), DatabaseError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!(table = %self.schema.table_name, "cleared data file");
        Ok(())
    }

    /// Removes every row whose `column` equals `value` and returns how many
    /// were removed.
    ///
    /// Survivors keep their relative order but are renumbered. The new
    /// contents are written to a sibling temp file which then replaces the
    /// data file, so a failed rewrite leaves the old file in place.
    pub fn delete_where(&self, column: &str, value: &Value) -> Result<usize, DatabaseError> {
        let col_idx = self.schema.get_column_index(column).ok_or_else(|| {
            DatabaseError::ColumnNotFound {
                table: self.schema.table_name.clone(),
                column: column.to_owned(),
            }
        })?;

        if !self.path.exists() {
            return Ok(0);
        }

        let rows = self.read_all()?;

        let mut removed = 0;
        let mut survivors = Vec::with_capacity(rows.len() * self.schema.row_size());
        for row in &rows {
            if row.get_value(col_idx) == Some(value) {
                removed += 1;
            } else {
                survivors.extend(self.schema.encode_row(row)?);
            }
        }

        write_atomic(&self.path, &survivors)?;

        debug!(
            table = %self.schema.table_name,
            column,
            removed,
            remaining = rows.len() - removed,
            "rewrote data file"
        );
        Ok(removed)
    }
}
