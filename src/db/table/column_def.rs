use serde::{Deserialize, Serialize};

use crate::{
    DatabaseError,
    core::types::{DataType, Value},
};

/// Definition of a single column in a table schema.
///
/// A column's width is fixed when the table is created and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColumnRecord", into = "ColumnRecord")]
pub struct Column {
    /// The column name.
    pub name: String,

    /// The data type for values in this column.
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_owned(),
            data_type,
        }
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, DataType::Int)
    }

    pub fn varchar(name: &str, size: usize) -> Self {
        Self::new(name, DataType::VarChar(size))
    }

    /// Bytes this column occupies in every row.
    pub fn width(&self) -> usize {
        self.data_type.width()
    }

    /// Converts a literal's text into a value of this column's type.
    ///
    /// INT literals must parse as an unsigned integer. Anything is accepted
    /// for VARCHAR; the text is kept as-is and truncated only when stored.
    pub fn coerce(&self, raw: &str) -> Result<Value, DatabaseError> {
        match self.data_type {
            DataType::Int => raw.trim().parse::<u64>().map(Value::Int).map_err(|e| {
                DatabaseError::coercion(&self.name, raw, format!("expected an INT literal ({e})"))
            }),
            DataType::VarChar(_) => Ok(Value::Text(raw.to_owned())),
        }
    }
}

const INT_TAG: u8 = 1;
const VARCHAR_TAG: u8 = 2;

/// On-disk shape of a column inside a `.schema` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnRecord {
    name: String,
    data_type: u8,
    #[serde(default)]
    size: Option<usize>,
}

impl TryFrom<ColumnRecord> for Column {
    type Error = String;

    fn try_from(record: ColumnRecord) -> Result<Self, Self::Error> {
        let data_type = match (record.data_type, record.size) {
            (INT_TAG, _) => DataType::Int,
            (VARCHAR_TAG, Some(size)) => DataType::VarChar(size),
            (VARCHAR_TAG, None) => {
                return Err(format!("VARCHAR column {} has no size", record.name));
            }
            (tag, _) => return Err(format!("unknown type tag {tag} for column {}", record.name)),
        };

        Ok(Self {
            name: record.name,
            data_type,
        })
    }
}

impl From<Column> for ColumnRecord {
    fn from(column: Column) -> Self {
        let (data_type, size) = match column.data_type {
            DataType::Int => (INT_TAG, None),
            DataType::VarChar(size) => (VARCHAR_TAG, Some(size)),
        };

        Self {
            name: column.name,
            data_type,
            size,
        }
    }
}
