pub(crate) mod dispatcher;
pub(crate) mod leniency;
pub(crate) mod lexer;
pub(crate) mod parser;

pub use dispatcher::execute;
pub use parser::ast::statement::{Statement, StatementKind};
