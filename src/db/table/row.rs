use crate::core::types::Value;

/// A row of data containing one value per column.
///
/// Values are positionally aligned with the owning schema's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The ordered values in this row.
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row from a vector of values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Gets a reference to the value at the given column index.
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Narrows the row to the given column positions, in that order.
    pub fn project(&self, indices: &[usize]) -> Row {
        Row::new(
            indices
                .iter()
                .filter_map(|&i| self.values.get(i).cloned())
                .collect(),
        )
    }
}

impl<V: Into<Value>> FromIterator<V> for Row {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}
