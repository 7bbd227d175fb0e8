use std::path::Path;

use crate::{
    DatabaseError, catalog::Catalog, common::config::DatabaseConfig, db::table::row::Row, sql,
};

/// Response from executing a SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Result of a SELECT.
    Rows {
        /// Names of the projected columns, in output order.
        columns: Vec<String>,
        /// The rows returned by the query.
        rows: Vec<Row>,
    },

    /// Confirmation of a statement that returns no rows.
    Message(String),
}

impl QueryResponse {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResponse::Rows { rows, .. } => Some(rows),
            QueryResponse::Message(_) => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            QueryResponse::Rows { rows, .. } => Some(rows),
            QueryResponse::Message(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            QueryResponse::Message(message) => Some(message),
            QueryResponse::Rows { .. } => None,
        }
    }
}

/// The main database handle.
///
/// `Database` owns a [`Catalog`] and runs statements against it. Callers that
/// want to manage the catalog themselves can use [`sql::execute`] directly.
///
/// # Example
///
/// ```no_run
/// use flatrow_db::{Database, Value};
///
/// let mut db = Database::new("./db")?;
/// db.execute_query("CREATE TABLE t (id INT, name VARCHAR(5))")?;
/// db.execute_query("INSERT INTO t VALUES (1, 'alice')")?;
///
/// let response = db.execute_query("SELECT * FROM t WHERE id = 1")?;
/// assert_eq!(response.rows().unwrap()[0].values[1], Value::from("alice"));
/// # Ok::<(), flatrow_db::DatabaseError>(())
/// ```
#[derive(Debug)]
pub struct Database {
    catalog: Catalog,
}

impl Database {
    /// Opens a database in `data_directory` with default settings.
    ///
    /// Creates the data directory if it doesn't exist.
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Result<Self, DatabaseError> {
        Self::open(DatabaseConfig::new(data_directory))
    }

    pub fn open(config: DatabaseConfig) -> Result<Self, DatabaseError> {
        Ok(Self {
            catalog: Catalog::open(config)?,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Persists index entries added since their last snapshot.
    pub fn flush(&mut self) -> Result<(), DatabaseError> {
        self.catalog.flush()
    }

    /// Executes one SQL statement.
    pub fn execute_query(&mut self, query: &str) -> Result<QueryResponse, DatabaseError> {
        sql::execute(&mut self.catalog, query)
    }
}
