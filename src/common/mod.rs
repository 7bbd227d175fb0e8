pub mod config;
pub(crate) mod durable;
pub mod error;
