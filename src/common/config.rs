//! Database configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DatabaseError;

/// Settings for a [`Catalog`](crate::Catalog).
///
/// Can be built in code, loaded from a TOML file, or both:
///
/// ```toml
/// data_dir = "db_files"
/// persist_indexes = true
/// strict_int_nulls = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding `.schema`, `.data` and `.index` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Write index snapshots next to the table files and reload them when a
    /// table is first referenced.
    #[serde(default = "default_persist_indexes")]
    pub persist_indexes: bool,

    /// Reject inserting `0` into INT columns.
    ///
    /// Zero is the on-disk encoding of NULL, so without this flag an inserted
    /// `0` silently reads back as NULL.
    #[serde(default)]
    pub strict_int_nulls: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("db_files")
}

fn default_persist_indexes() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            persist_indexes: default_persist_indexes(),
            strict_int_nulls: false,
        }
    }
}

impl DatabaseConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, DatabaseError> {
        Ok(toml::from_str(content)?)
    }

    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::default()
    }
}

/// Builder for [`DatabaseConfig`].
#[derive(Debug, Default)]
pub struct DatabaseConfigBuilder {
    config: DatabaseConfig,
}

impl DatabaseConfigBuilder {
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    pub fn persist_indexes(mut self, enabled: bool) -> Self {
        self.config.persist_indexes = enabled;
        self
    }

    pub fn strict_int_nulls(mut self, enabled: bool) -> Self {
        self.config.strict_int_nulls = enabled;
        self
    }

    pub fn build(self) -> DatabaseConfig {
        self.config
    }
}
