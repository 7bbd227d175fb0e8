pub mod column_def;
pub mod row;
pub mod schema;
