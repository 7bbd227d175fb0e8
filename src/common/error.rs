use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::{core::types::DataType, sql::StatementKind};

/// Every failure the database surfaces to its caller.
///
/// Errors are raised synchronously from [`crate::sql::execute`] and never
/// retried internally.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("Unsupported statement: {0}")]
    #[diagnostic(
        code(flatrow::unsupported_statement),
        help("Supported statements: CREATE TABLE, CREATE INDEX, SELECT, INSERT, DELETE")
    )]
    UnsupportedStatement(String),

    #[error("Invalid {statement} syntax, expected `{expected}`")]
    #[diagnostic(code(flatrow::syntax))]
    Syntax {
        statement: StatementKind,
        expected: &'static str,
        found: String,
        #[label("found {found}")]
        span: SourceSpan,
    },

    #[error("Table {0} does not exist")]
    #[diagnostic(code(flatrow::table_not_found), help("Create it first with CREATE TABLE"))]
    TableNotFound(String),

    #[error("Column {column} not found in table {table}")]
    #[diagnostic(code(flatrow::column_not_found))]
    ColumnNotFound { table: String, column: String },

    #[error("Column {column} not found in table {table} or is not INT")]
    #[diagnostic(
        code(flatrow::column_not_indexable),
        help("Indexes can only be built over INT columns")
    )]
    ColumnNotIndexable {
        table: String,
        column: String,
        data_type: Option<DataType>,
    },

    #[error("Cannot use {value:?} for column {column}: {reason}")]
    #[diagnostic(code(flatrow::value_coercion))]
    ValueCoercion {
        column: String,
        value: String,
        reason: String,
    },

    #[error("IO Error: {0}")]
    #[diagnostic(code(flatrow::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    #[diagnostic(code(flatrow::serialization))]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(flatrow::config))]
    Config(#[from] toml::de::Error),
}

impl DatabaseError {
    pub(crate) fn coercion(
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueCoercion {
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
