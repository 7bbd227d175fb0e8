//! The caller-owned cache of resident tables and registered indexes.

use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    DatabaseError,
    common::config::DatabaseConfig,
    db::table::schema::TableSchema,
    storage::{HashIndex, RowFile},
};

/// `(table, column)`
type IndexKey = (String, String);

/// Tables and indexes known to one database directory.
///
/// Tables are loaded from their `.schema` sidecar the first time they are
/// referenced and stay resident for the lifetime of the catalog. At most one
/// index exists per `(table, column)`. Nothing is ever evicted.
///
/// A catalog assumes it is the only writer of its directory.
#[derive(Debug)]
pub struct Catalog {
    config: DatabaseConfig,
    tables: BTreeMap<String, RowFile>,
    indexes: BTreeMap<IndexKey, HashIndex>,
}

impl Catalog {
    /// Opens the catalog for `config.data_dir`, creating the directory if
    /// needed. No table is loaded until it is referenced.
    pub fn open(config: DatabaseConfig) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&config.data_dir)?;

        Ok(Self {
            config,
            tables: BTreeMap::new(),
            indexes: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn schema_path(&self, table: &str) -> PathBuf {
        self.config.data_dir.join(format!("{table}.schema"))
    }

    pub fn data_path(&self, table: &str) -> PathBuf {
        self.config.data_dir.join(format!("{table}.data"))
    }

    pub fn index_path(&self, table: &str, column: &str) -> PathBuf {
        self.config.data_dir.join(format!("{table}_{column}.index"))
    }

    /// Whether `table` is currently loaded.
    pub fn is_resident(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Creates (or re-creates) a table with an empty data file.
    ///
    /// Indexes belonging to a previous table of the same name are dropped and
    /// their files removed.
    pub fn create_table(&mut self, schema: TableSchema) -> Result<&RowFile, DatabaseError> {
        let name = schema.table_name.clone();
        self.drop_indexes(&name)?;

        schema.save(self.schema_path(&name))?;
        let data_path = self.data_path(&name);
        File::create(&data_path)?;

        info!(
            table = %name,
            columns = schema.columns.len(),
            row_size = schema.row_size(),
            "created table"
        );

        self.tables.remove(&name);
        Ok(self
            .tables
            .entry(name)
            .or_insert_with(|| RowFile::new(data_path, schema)))
    }

    /// Makes `table` resident, reading its schema sidecar on first use.
    pub fn load_table(&mut self, table: &str) -> Result<(), DatabaseError> {
        if self.tables.contains_key(table) {
            return Ok(());
        }

        let schema_path = self.schema_path(table);
        if !schema_path.exists() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        let schema = TableSchema::load(&schema_path)?;
        let storage = RowFile::new(self.data_path(table), schema);
        let rows = storage.row_count()?;
        info!(table, rows, "loaded table");

        if self.config.persist_indexes {
            self.load_indexes(&storage)?;
        }

        self.tables.insert(table.to_string(), storage);
        Ok(())
    }

    /// A resident table.
    pub fn table(&self, table: &str) -> Result<&RowFile, DatabaseError> {
        self.tables
            .get(table)
            .ok_or_else(|| DatabaseError::TableNotFound(table.to_string()))
    }

    /// The index registered for `(table, column)`, if any.
    pub fn index(&self, table: &str, column: &str) -> Option<&HashIndex> {
        self.indexes.get(&(table.to_string(), column.to_string()))
    }

    /// Builds a fresh index over an INT column and registers it, replacing
    /// any previous one. An existing index file is never read.
    pub fn create_index(&mut self, table: &str, column: &str) -> Result<&HashIndex, DatabaseError> {
        self.load_table(table)?;
        let storage = self.table(table)?;

        let data_type = storage.schema().column(column).map(|(_, col)| col.data_type);
        if !data_type.is_some_and(|data_type| data_type.is_int()) {
            return Err(DatabaseError::ColumnNotIndexable {
                table: table.to_string(),
                column: column.to_string(),
                data_type,
            });
        }

        let mut index = HashIndex::new(
            table,
            column,
            self.index_path(table, column),
            self.config.persist_indexes,
        );
        index.rebuild(storage)?;
        info!(table, column, rows = index.row_count(), "created index");

        let key = (table.to_string(), column.to_string());
        self.indexes.insert(key.clone(), index);
        Ok(&self.indexes[&key])
    }

    /// Writes a snapshot of every index with entries added since its last
    /// one. Also runs when the catalog is dropped.
    pub fn flush(&mut self) -> Result<(), DatabaseError> {
        for ((table, _), index) in self.indexes.iter_mut() {
            if let Some(storage) = self.tables.get(table) {
                index.flush(storage)?;
            }
        }
        Ok(())
    }

    /// A resident table together with every index registered on it.
    pub(crate) fn table_with_indexes(
        &mut self,
        table: &str,
    ) -> Result<(&RowFile, Vec<&mut HashIndex>), DatabaseError> {
        let storage = self
            .tables
            .get(table)
            .ok_or_else(|| DatabaseError::TableNotFound(table.to_string()))?;

        let indexes = self
            .indexes
            .iter_mut()
            .filter(|((t, _), _)| t == table)
            .map(|(_, index)| index)
            .collect();

        Ok((storage, indexes))
    }

    /// Re-registers indexes persisted by an earlier process.
    ///
    /// A snapshot that was not computed from the data file's current contents
    /// is rebuilt from storage.
    fn load_indexes(&mut self, storage: &RowFile) -> Result<(), DatabaseError> {
        let table = storage.schema().table_name.clone();
        let row_count = storage.row_count()?;

        for column in storage.schema().columns.iter().filter(|c| c.data_type.is_int()) {
            let path = self.index_path(&table, &column.name);

            let mut index = match HashIndex::load(&path, true) {
                Ok(Some(index)) => index,
                Ok(None) => continue,
                Err(e) => {
                    warn!(table = %table, column = %column.name, error = %e, "unreadable index file");
                    HashIndex::new(&table, &column.name, &path, true)
                }
            };

            if !index.matches(storage)? || index.table() != table || index.column() != column.name
            {
                warn!(
                    table = %table,
                    column = %column.name,
                    indexed = index.row_count(),
                    stored = row_count,
                    "stale index file, rebuilding"
                );
                index = HashIndex::new(&table, &column.name, &path, true);
                index.rebuild(storage)?;
            }

            info!(table = %table, column = %column.name, "loaded index");
            self.indexes
                .insert((table.clone(), column.name.clone()), index);
        }

        Ok(())
    }

    /// Unregisters every index of `table` and removes their files, including
    /// files left behind by an earlier process.
    fn drop_indexes(&mut self, table: &str) -> Result<(), DatabaseError> {
        let keys: Vec<IndexKey> = self
            .indexes
            .keys()
            .filter(|(t, _)| t == table)
            .cloned()
            .collect();
        for key in keys {
            if let Some(mut index) = self.indexes.remove(&key) {
                index.clear()?;
            }
        }

        let previous = match self.tables.get(table) {
            Some(storage) => Some(storage.schema().clone()),
            None if self.schema_path(table).exists() => {
                Some(TableSchema::load(self.schema_path(table))?)
            }
            None => None,
        };

        for column in previous.iter().flat_map(|schema| &schema.columns) {
            HashIndex::new(table, &column.name, self.index_path(table, &column.name), false)
                .clear()?;
        }

        Ok(())
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush indexes");
        }
    }
}
