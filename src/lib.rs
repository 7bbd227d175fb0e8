//! A minimal relational store.
//!
//! Each table is a JSON schema sidecar plus a flat file of fixed-width binary
//! rows. A small SQL subset (`CREATE TABLE`, `CREATE INDEX`, `SELECT`,
//! `INSERT`, `DELETE`) drives it, and equality lookups on INT columns can be
//! served from hash indexes.

pub(crate) mod catalog;
pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod sql;
pub(crate) mod storage;

pub use catalog::Catalog;
pub use common::{
    config::{DatabaseConfig, DatabaseConfigBuilder},
    error::DatabaseError,
};
pub use crate::core::types::{DataType, Value};
pub use db::{
    database::{Database, QueryResponse},
    table::{column_def::Column, row::Row, schema::TableSchema},
};
pub use sql::{StatementKind, execute};
pub use storage::{HashIndex, RowFile};
