use tracing::{debug, info};

use crate::{
    DatabaseError,
    catalog::Catalog,
    core::types::Value,
    db::{
        database::QueryResponse,
        table::{column_def::Column, row::Row, schema::TableSchema},
    },
    sql::{
        leniency,
        parser::{
            CreateIndexStatement, CreateTableStatement, DeleteFilter, DeleteStatement,
            InsertStatement, Predicate, SelectList, SelectStatement, SqlParser, Statement,
        },
    },
};

/// Parses one statement and runs it against `catalog`.
///
/// Tables and indexes referenced by the statement are loaded into the catalog
/// on first use and stay there.
pub fn execute(catalog: &mut Catalog, query: &str) -> Result<QueryResponse, DatabaseError> {
    let statement = SqlParser::new(query).parse()?;
    debug!(statement = %statement.kind(), "executing");

    match statement {
        Statement::CreateTable(stmt) => create_table(catalog, stmt),
        Statement::CreateIndex(stmt) => create_index(catalog, stmt),
        Statement::Select(stmt) => select(catalog, stmt),
        Statement::Insert(stmt) => insert(catalog, stmt),
        Statement::Delete(stmt) => delete(catalog, stmt),
    }
}

fn create_table(
    catalog: &mut Catalog,
    stmt: CreateTableStatement,
) -> Result<QueryResponse, DatabaseError> {
    let columns = leniency::resolve_column_defs(stmt.table_name, &stmt.column_defs);
    catalog.create_table(TableSchema::new(stmt.table_name, columns))?;

    Ok(QueryResponse::Message(format!(
        "Table {} created",
        stmt.table_name
    )))
}

fn create_index(
    catalog: &mut Catalog,
    stmt: CreateIndexStatement,
) -> Result<QueryResponse, DatabaseError> {
    catalog.create_index(stmt.table_name, stmt.column)?;

    Ok(QueryResponse::Message(format!(
        "Index on {}.{} created",
        stmt.table_name, stmt.column
    )))
}

fn select(catalog: &mut Catalog, stmt: SelectStatement) -> Result<QueryResponse, DatabaseError> {
    catalog.load_table(stmt.table_name)?;
    let storage = catalog.table(stmt.table_name)?;
    let schema = storage.schema();

    let rows = match &stmt.where_clause {
        None => storage.read_all()?,
        Some(predicate) => {
            let (col_idx, column, value) = resolve_predicate(schema, predicate)?;
            let index = catalog
                .index(stmt.table_name, &column.name)
                .filter(|_| column.data_type.is_int());

            match index {
                Some(index) => {
                    debug!(table = stmt.table_name, column = %column.name, "index lookup");
                    let mut rows = Vec::new();
                    for &position in index.find(&value) {
                        if let Some(row) = storage.read(position)? {
                            rows.push(row);
                        }
                    }
                    rows
                }
                None => storage
                    .read_all()?
                    .into_iter()
                    .filter(|row| row.get_value(col_idx) == Some(&value))
                    .collect(),
            }
        }
    };

    let (columns, rows) = match &stmt.select_list {
        SelectList::Star => (schema.column_names(), rows),
        SelectList::Columns(names) => {
            let indices = leniency::resolve_projection(schema, names);
            let columns = indices
                .iter()
                .map(|&i| schema.columns[i].name.clone())
                .collect();
            let rows = rows.iter().map(|row| row.project(&indices)).collect();
            (columns, rows)
        }
    };

    Ok(QueryResponse::Rows { columns, rows })
}

fn insert(catalog: &mut Catalog, stmt: InsertStatement) -> Result<QueryResponse, DatabaseError> {
    catalog.load_table(stmt.table_name)?;
    let strict = catalog.config().strict_int_nulls;
    let (storage, indexes) = catalog.table_with_indexes(stmt.table_name)?;
    let schema = storage.schema();

    if stmt.values.len() > schema.columns.len() {
        return Err(DatabaseError::coercion(
            format!("{}#{}", stmt.table_name, schema.columns.len() + 1),
            stmt.values[schema.columns.len()].as_str(),
            format!(
                "{} values given but the table has {} columns",
                stmt.values.len(),
                schema.columns.len()
            ),
        ));
    }

    let mut values = Vec::with_capacity(stmt.values.len());
    for (literal, column) in stmt.values.iter().zip(&schema.columns) {
        let value = column.coerce(literal.as_str())?;
        if strict && value == Value::Int(0) {
            return Err(DatabaseError::coercion(
                &column.name,
                literal.as_str(),
                "0 is stored as NULL in INT columns",
            ));
        }
        values.push(value);
    }

    let row = Row::new(values);
    let position = storage.append(&row)?;

    // Index what will be read back, so 0 and NULL land on the same key.
    let stored = schema.stored_form(&row)?;
    for index in indexes {
        if let Some(value) = schema
            .get_column_index(index.column())
            .and_then(|idx| stored.get_value(idx))
        {
            index.add(value, position);
        }
    }

    Ok(QueryResponse::Message(format!(
        "1 row inserted into {}",
        stmt.table_name
    )))
}

fn delete(catalog: &mut Catalog, stmt: DeleteStatement) -> Result<QueryResponse, DatabaseError> {
    catalog.load_table(stmt.table_name)?;
    let (storage, indexes) = catalog.table_with_indexes(stmt.table_name)?;

    match &stmt.filter {
        DeleteFilter::All => {
            storage.clear()?;
            for index in indexes {
                index.clear()?;
            }
            info!(table = stmt.table_name, "deleted all rows");

            Ok(QueryResponse::Message(format!(
                "All rows deleted from {}",
                stmt.table_name
            )))
        }
        DeleteFilter::Where(predicate) => {
            let (_, column, value) = resolve_predicate(storage.schema(), predicate)?;
            let removed = storage.delete_where(&column.name, &value)?;

            // Positions shifted, patching is not enough.
            for index in indexes {
                index.rebuild(storage)?;
            }
            info!(table = stmt.table_name, column = %column.name, removed, "deleted rows");

            Ok(QueryResponse::Message(format!(
                "Deleted {removed} row(s) where {} = {value}",
                column.name
            )))
        }
    }
}

/// Finds the predicate's column and coerces its literal to the column type.
fn resolve_predicate<'s>(
    schema: &'s TableSchema,
    predicate: &Predicate,
) -> Result<(usize, &'s Column, Value), DatabaseError> {
    let (col_idx, column) =
        schema
            .column(predicate.column)
            .ok_or_else(|| DatabaseError::ColumnNotFound {
                table: schema.table_name.clone(),
                column: predicate.column.to_string(),
            })?;

    let value = column.coerce(predicate.value.as_str())?;
    Ok((col_idx, column, value))
}
