use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{column_def::Column, row::Row};
use crate::{
    DatabaseError,
    common::durable::write_atomic,
    core::{
        serialization::{IntCell, Serializable},
        types::{DataType, Value},
    },
};

/// A table schema: name, ordered columns and the fixed row width.
///
/// `row_size` is computed once from the columns and governs every offset into
/// the table's data file. When a schema is read back from its sidecar the
/// stored `row_size` is ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SchemaFile")]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<Column>,
    row_size: usize,
}

#[derive(Deserialize)]
struct SchemaFile {
    table_name: String,
    columns: Vec<Column>,
}

impl From<SchemaFile> for TableSchema {
    fn from(file: SchemaFile) -> Self {
        TableSchema::new(file.table_name, file.columns)
    }
}

impl TableSchema {
    /// Creates a new schema from a table name and its column definitions.
    pub fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Self {
        let row_size = columns.iter().map(Column::width).sum();
        Self {
            table_name: table_name.into(),
            columns,
            row_size,
        }
    }

    /// Bytes occupied by every row of this table.
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Finds the index of a column by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    /// Finds a column and its index by name.
    pub fn column(&self, name: &str) -> Option<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, col)| col.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// Writes the schema sidecar as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatabaseError> {
        let json = serde_json::to_vec(self)?;
        write_atomic(path.as_ref(), &json)?;
        Ok(())
    }

    /// Reads a schema sidecar written by [`TableSchema::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Encodes a row into exactly `row_size` bytes.
    ///
    /// - INT: 8 bytes, little-endian unsigned; NULL is written as 0
    /// - VARCHAR(n): the UTF-8 bytes cut to `n`, right-padded with zeros
    ///
    /// Missing trailing values are encoded as NULL.
    pub(crate) fn encode_row(&self, row: &Row) -> Result<Vec<u8>, DatabaseError> {
        let mut bytes = Vec::with_capacity(self.row_size);

        for (idx, column) in self.columns.iter().enumerate() {
            let value = row.get_value(idx).unwrap_or(&Value::Null);

            match (column.data_type, value) {
                (DataType::Int, Value::Int(number)) => {
                    bytes.extend_from_slice(&IntCell(Some(*number)).to_bytes());
                }
                (DataType::Int, Value::Null) => {
                    bytes.extend_from_slice(&IntCell(None).to_bytes());
                }
                (DataType::Int, Value::Text(text)) => {
                    return Err(DatabaseError::coercion(
                        &column.name,
                        text.as_str(),
                        "text cannot be stored in an INT column",
                    ));
                }
                (DataType::VarChar(size), value) => {
                    let text = match value {
                        Value::Text(text) => text.clone(),
                        Value::Int(number) => number.to_string(),
                        Value::Null => String::new(),
                    };
                    let text_bytes = text.as_bytes();
                    let kept = text_bytes.len().min(size);
                    bytes.extend_from_slice(&text_bytes[..kept]);
                    bytes.resize(bytes.len() + size - kept, 0);
                }
            }
        }

        debug_assert_eq!(bytes.len(), self.row_size);
        Ok(bytes)
    }

    /// Decodes one row from the front of `bytes`.
    ///
    /// Returns `None` when fewer than `row_size` bytes are available.
    pub(crate) fn decode_row(&self, bytes: &[u8]) -> Option<Row> {
        if bytes.len() < self.row_size {
            return None;
        }

        let mut values = Vec::with_capacity(self.columns.len());
        let mut offset = 0;

        for column in &self.columns {
            let width = column.width();
            let cell = &bytes[offset..offset + width];

            let value = match column.data_type {
                DataType::Int => {
                    let mut num_bytes = [0u8; 8];
                    num_bytes.copy_from_slice(cell);
                    match IntCell::from_bytes(num_bytes) {
                        IntCell(Some(number)) => Value::Int(number),
                        IntCell(None) => Value::Null,
                    }
                }
                DataType::VarChar(_) => decode_text(cell),
            };

            values.push(value);
            offset += width;
        }

        Some(Row::new(values))
    }

    /// The row as it will read back after a round trip through storage.
    ///
    /// Applies VARCHAR truncation and turns INT `0` and empty text into NULL.
    pub(crate) fn stored_form(&self, row: &Row) -> Result<Row, DatabaseError> {
        let bytes = self.encode_row(row)?;
        Ok(self
            .decode_row(&bytes)
            .unwrap_or_else(|| Row::new(vec![Value::Null; self.columns.len()])))
    }
}

/// Strips the zero padding and drops any bytes that are not valid UTF-8,
/// e.g. a multi-byte character cut in half by truncation.
fn decode_text(cell: &[u8]) -> Value {
    let end = cell.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);

    let text: String = cell[..end]
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect();

    if text.is_empty() {
        Value::Null
    } else {
        Value::Text(text)
    }
}
