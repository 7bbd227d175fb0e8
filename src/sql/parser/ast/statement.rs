use std::fmt;

use super::SelectList;
use crate::sql::parser::Literal;

/// The five statement forms, identified by their leading keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    CreateIndex,
    Select,
    Insert,
    Delete,
}

impl StatementKind {
    /// The grammar this statement form must match.
    pub fn expected(self) -> &'static str {
        match self {
            StatementKind::CreateTable => "CREATE TABLE <name> (<column definitions>)",
            StatementKind::CreateIndex => "CREATE INDEX ON <table> (<column>)",
            StatementKind::Select => "SELECT <columns> FROM <table> [WHERE <column> = <value>]",
            StatementKind::Insert => "INSERT INTO <table> VALUES (<values>)",
            StatementKind::Delete => {
                "DELETE * FROM <table> | DELETE FROM <table> WHERE <column> = <value>"
            }
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A SQL statement (top-level AST node).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'src> {
    CreateTable(CreateTableStatement<'src>),
    CreateIndex(CreateIndexStatement<'src>),
    Select(SelectStatement<'src>),
    Insert(InsertStatement<'src>),
    Delete(DeleteStatement<'src>),
}

impl Statement<'_> {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::CreateTable(_) => StatementKind::CreateTable,
            Statement::CreateIndex(_) => StatementKind::CreateIndex,
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Delete(_) => StatementKind::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement<'src> {
    pub table_name: &'src str,
    /// Raw text of each comma-separated column definition, trimmed.
    pub column_defs: Vec<&'src str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement<'src> {
    pub table_name: &'src str,
    pub column: &'src str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement<'src> {
    pub select_list: SelectList<'src>,
    pub table_name: &'src str,
    pub where_clause: Option<Predicate<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement<'src> {
    pub table_name: &'src str,
    pub values: Vec<Literal<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement<'src> {
    pub table_name: &'src str,
    pub filter: DeleteFilter<'src>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteFilter<'src> {
    /// `DELETE * FROM <table>`
    All,
    /// `DELETE FROM <table> WHERE <column> = <value>`
    Where(Predicate<'src>),
}

/// `<column> = <value>`, the only supported condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<'src> {
    pub column: &'src str,
    pub value: Literal<'src>,
}
