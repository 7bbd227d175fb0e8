pub mod hash_index;
pub mod row_file;

pub use hash_index::HashIndex;
pub use row_file::RowFile;
