pub(crate) mod statement;
pub(crate) mod target;

pub use statement::{
    CreateIndexStatement, CreateTableStatement, DeleteFilter, DeleteStatement, InsertStatement,
    Predicate, SelectStatement, Statement, StatementKind,
};
pub use target::SelectList;
