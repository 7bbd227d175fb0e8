pub(crate) mod serialization;
pub mod types;
