/// Column types supported by flatrow.
///
/// Every type has a fixed on-disk width, which is what makes positional
/// seeks into a data file possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 64-bit integer.
    ///
    /// Stored as 8 bytes in little-endian format. Zero doubles as NULL.
    Int,

    /// Text of at most `n` bytes.
    ///
    /// Stored as exactly `n` bytes: longer values are truncated, shorter ones
    /// are padded with zero bytes.
    VarChar(usize),
}

impl DataType {
    /// Width of the type in bytes.
    pub fn width(self) -> usize {
        match self {
            DataType::Int => 8,
            DataType::VarChar(size) => size,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, DataType::Int)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::VarChar(size) => write!(f, "VARCHAR({size})"),
        }
    }
}

/// A value that can be stored in a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// An unsigned integer.
    Int(u64),

    /// A UTF-8 string.
    Text(String),

    /// Absence of a value.
    ///
    /// Also what a stored INT `0` or an empty VARCHAR decodes to.
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
