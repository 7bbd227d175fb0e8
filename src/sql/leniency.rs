//! The two places where malformed input is dropped instead of rejected.
//!
//! Both steps log what they skip at `warn` level. Turning either into a hard
//! error only needs a change here.

use tracing::warn;

use crate::db::table::{column_def::Column, schema::TableSchema};

/// Builds the columns of a new table from raw definitions.
///
/// Definitions that [`classify_column_def`] cannot make sense of are left out
/// of the schema.
pub(crate) fn resolve_column_defs(table_name: &str, defs: &[&str]) -> Vec<Column> {
    defs.iter()
        .filter_map(|def| {
            let column = classify_column_def(def);
            if column.is_none() {
                warn!(table = table_name, definition = def, "dropping column definition");
            }
            column
        })
        .collect()
}

/// Classifies one column definition by its text.
///
/// - containing `INT` (any case): an INT column named by the first word
/// - otherwise containing `VARCHAR`: must start with `<name> VARCHAR(<size>)`
/// - anything else: `None`
///
/// The `INT` test is a plain substring match, so it also fires on names such
/// as `points` and wins over a `VARCHAR` type.
pub(crate) fn classify_column_def(def: &str) -> Option<Column> {
    let upper = def.to_ascii_uppercase();

    if upper.contains("INT") {
        let name = def.split_whitespace().next()?;
        return Some(Column::int(name));
    }

    if upper.contains("VARCHAR") {
        return parse_varchar(def);
    }

    None
}

/// Matches `<name> VARCHAR(<size>)` at the start of `def`.
fn parse_varchar(def: &str) -> Option<Column> {
    let def = def.trim_start();

    let name_end = def
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(def.len());
    if name_end == 0 {
        return None;
    }
    let (name, rest) = def.split_at(name_end);

    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    let keyword = rest.get(..7)?;
    if !keyword.eq_ignore_ascii_case("VARCHAR") {
        return None;
    }

    let rest = rest[7..].strip_prefix('(')?;
    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    let size = rest[..digits_end].parse().ok()?;
    rest[digits_end..].strip_prefix(')')?;

    Some(Column::varchar(name, size))
}

/// Resolves projected column names to positions in `schema`.
///
/// Unknown names are skipped, so the result may be shorter than `names`.
pub(crate) fn resolve_projection(schema: &TableSchema, names: &[&str]) -> Vec<usize> {
    names
        .iter()
        .filter_map(|name| {
            let idx = schema.get_column_index(name);
            if idx.is_none() {
                warn!(
                    table = %schema.table_name,
                    column = name,
                    "dropping unknown column from projection"
                );
            }
            idx
        })
        .collect()
}
