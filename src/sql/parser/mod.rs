use std::iter::Peekable;

use miette::SourceSpan;

use crate::{
    DatabaseError,
    sql::lexer::{LexError, Lexer, Spanned, Token},
};

pub(crate) use ast::*;
pub(crate) use keyword::Keyword;
pub(crate) use literal::Literal;

pub(crate) mod ast;
pub(crate) mod keyword;
pub(crate) mod literal;

/// SQL parser that converts tokens into a [`Statement`].
///
/// The leading keywords pick one of five fixed grammars; the rest of the
/// query must match that grammar exactly, apart from an optional trailing
/// semicolon.
pub struct SqlParser<'src> {
    source: &'src str,
    /// Token stream from the lexer
    lexer: Peekable<Lexer<'src>>,
    /// Form being parsed, used to label syntax errors.
    kind: StatementKind,
}

impl<'src> SqlParser<'src> {
    /// Creates a new parser for the given SQL query string.
    pub fn new(query: &'src str) -> Self {
        Self {
            source: query,
            lexer: Lexer::new(query).peekable(),
            kind: StatementKind::Select,
        }
    }

    /// Parses the query and returns the top-level AST node.
    pub fn parse(&mut self) -> Result<Statement<'src>, DatabaseError> {
        self.kind = self.classify()?;

        let statement = match self.kind {
            StatementKind::CreateTable => self.parse_create_table()?,
            StatementKind::CreateIndex => self.parse_create_index()?,
            StatementKind::Select => self.parse_select()?,
            StatementKind::Insert => self.parse_insert()?,
            StatementKind::Delete => self.parse_delete()?,
        };

        self.expect_end()?;
        Ok(statement)
    }

    /// Identifies the statement form from its leading keyword(s).
    fn classify(&self) -> Result<StatementKind, DatabaseError> {
        let mut probe = Lexer::new(self.source).map(|t| t.ok().map(|s| s.token));
        let first = probe.next().flatten();
        let second = probe.next().flatten();

        match (first, second) {
            (Some(Token::Keyword(Keyword::Create)), Some(Token::Keyword(Keyword::Table))) => {
                Ok(StatementKind::CreateTable)
            }
            (Some(Token::Keyword(Keyword::Create)), Some(Token::Keyword(Keyword::Index))) => {
                Ok(StatementKind::CreateIndex)
            }
            (Some(Token::Keyword(Keyword::Select)), _) => Ok(StatementKind::Select),
            (Some(Token::Keyword(Keyword::Insert)), _) => Ok(StatementKind::Insert),
            (Some(Token::Keyword(Keyword::Delete)), _) => Ok(StatementKind::Delete),
            _ => Err(DatabaseError::UnsupportedStatement(
                self.source.trim().to_string(),
            )),
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement<'src>, DatabaseError> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        let table_name = self.expect_identifier()?;
        let open = self.expect_token(Token::LeftParen)?;

        // Column definitions are handed on as raw text and never lexed.
        let body_start = open.offset() + open.len();
        let Some(body_len) = matching_paren(&self.source[body_start..]) else {
            return Err(self.syntax_error("end of input", (self.source.len(), 0).into()));
        };
        let body = &self.source[body_start..body_start + body_len];
        self.lexer = Lexer::starting_at(self.source, body_start + body_len + 1).peekable();

        let column_defs = body.split(',').map(str::trim).collect();

        Ok(Statement::CreateTable(CreateTableStatement {
            table_name,
            column_defs,
        }))
    }

    fn parse_create_index(&mut self) -> Result<Statement<'src>, DatabaseError> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Index)?;
        self.expect_keyword(Keyword::On)?;

        let table_name = self.expect_identifier()?;
        self.expect_token(Token::LeftParen)?;
        let column = self.expect_identifier()?;
        self.expect_token(Token::RightParen)?;

        Ok(Statement::CreateIndex(CreateIndexStatement { table_name, column }))
    }

    fn parse_select(&mut self) -> Result<Statement<'src>, DatabaseError> {
        self.expect_keyword(Keyword::Select)?;

        let select_list = if self.consume_if(Token::Asterisk) {
            SelectList::Star
        } else {
            let mut columns = vec![self.expect_identifier()?];
            while self.consume_if(Token::Comma) {
                columns.push(self.expect_identifier()?);
            }
            SelectList::Columns(columns)
        };

        self.expect_keyword(Keyword::From)?;
        let table_name = self.expect_identifier()?;

        let where_clause = if self.consume_if(Token::Keyword(Keyword::Where)) {
            Some(self.parse_predicate()?)
        } else {
            None
        };

        Ok(Statement::Select(SelectStatement {
            select_list,
            table_name,
            where_clause,
        }))
    }

    fn parse_insert(&mut self) -> Result<Statement<'src>, DatabaseError> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table_name = self.expect_identifier()?;
        self.expect_keyword(Keyword::Values)?;
        self.expect_token(Token::LeftParen)?;

        let mut values = vec![self.parse_literal()?];
        while self.consume_if(Token::Comma) {
            values.push(self.parse_literal()?);
        }

        self.expect_token(Token::RightParen)?;

        Ok(Statement::Insert(InsertStatement { table_name, values }))
    }

    fn parse_delete(&mut self) -> Result<Statement<'src>, DatabaseError> {
        self.expect_keyword(Keyword::Delete)?;

        if self.consume_if(Token::Asterisk) {
            self.expect_keyword(Keyword::From)?;
            let table_name = self.expect_identifier()?;
            return Ok(Statement::Delete(DeleteStatement {
                table_name,
                filter: DeleteFilter::All,
            }));
        }

        self.expect_keyword(Keyword::From)?;
        let table_name = self.expect_identifier()?;
        self.expect_keyword(Keyword::Where)?;
        let predicate = self.parse_predicate()?;

        Ok(Statement::Delete(DeleteStatement {
            table_name,
            filter: DeleteFilter::Where(predicate),
        }))
    }

    fn parse_predicate(&mut self) -> Result<Predicate<'src>, DatabaseError> {
        let column = self.expect_identifier()?;
        self.expect_token(Token::Equal)?;
        let value = self.parse_literal()?;

        Ok(Predicate { column, value })
    }

    fn parse_literal(&mut self) -> Result<Literal<'src>, DatabaseError> {
        let spanned = self.next_token()?;
        match spanned.token {
            Token::Number(n) => Ok(Literal::Number(n)),
            Token::String(s) => Ok(Literal::Text(s)),
            Token::Identifier(word) => Ok(Literal::Word(word)),
            _ => Err(self.unexpected(&spanned)),
        }
    }

    fn expect_end(&mut self) -> Result<(), DatabaseError> {
        self.consume_if(Token::SemiColon);

        match self.lexer.next() {
            None => Ok(()),
            Some(Ok(spanned)) => Err(self.unexpected(&spanned)),
            Some(Err(e)) => Err(self.lex_error(e)),
        }
    }

    fn next_token(&mut self) -> Result<Spanned<'src>, DatabaseError> {
        match self.lexer.next() {
            Some(Ok(spanned)) => Ok(spanned),
            Some(Err(e)) => Err(self.lex_error(e)),
            None => Err(self.syntax_error("end of input", (self.source.len(), 0).into())),
        }
    }

    /// Consumes the expected token and returns its span.
    fn expect_token(&mut self, expected: Token<'src>) -> Result<SourceSpan, DatabaseError> {
        let spanned = self.next_token()?;
        if spanned.token == expected {
            Ok(spanned.span)
        } else {
            Err(self.unexpected(&spanned))
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<(), DatabaseError> {
        self.expect_token(Token::Keyword(expected)).map(|_| ())
    }

    fn expect_identifier(&mut self) -> Result<&'src str, DatabaseError> {
        let spanned = self.next_token()?;
        match spanned.token {
            Token::Identifier(ident) => Ok(ident),
            _ => Err(self.unexpected(&spanned)),
        }
    }

    fn peek_is(&mut self, expected: Token) -> bool {
        matches!(self.lexer.peek(), Some(Ok(spanned)) if spanned.token == expected)
    }

    fn consume_if(&mut self, expected: Token) -> bool {
        if self.peek_is(expected) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, spanned: &Spanned<'src>) -> DatabaseError {
        self.syntax_error(&spanned.token.to_string(), spanned.span)
    }

    fn lex_error(&self, error: LexError) -> DatabaseError {
        self.syntax_error(&error.message, error.span)
    }

    fn syntax_error(&self, found: &str, span: SourceSpan) -> DatabaseError {
        DatabaseError::Syntax {
            statement: self.kind,
            expected: self.kind.expected(),
            found: found.to_string(),
            span,
        }
    }
}

/// Length of the text before the `)` closing an already opened parenthesis.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to parse a query that must succeed
    fn parse(query: &str) -> Statement<'_> {
        SqlParser::new(query).parse().expect("Failed to parse query")
    }

    fn parse_err(query: &str) -> DatabaseError {
        SqlParser::new(query)
            .parse()
            .expect_err("Query should not parse")
    }

    fn assert_syntax_error(query: &str, kind: StatementKind) {
        match parse_err(query) {
            DatabaseError::Syntax { statement, .. } => assert_eq!(statement, kind),
            other => panic!("Expected syntax error for {query:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_table() {
        assert_eq!(
            parse("CREATE TABLE t (id INT, name VARCHAR(5))"),
            Statement::CreateTable(CreateTableStatement {
                table_name: "t",
                column_defs: vec!["id INT", "name VARCHAR(5)"],
            })
        );
    }

    #[test]
    fn test_parse_create_table_keeps_raw_defs() {
        match parse("create table people (age integer not null,  bio varchar ( 40 ) )") {
            Statement::CreateTable(stmt) => {
                assert_eq!(stmt.table_name, "people");
                assert_eq!(stmt.column_defs, vec!["age integer not null", "bio varchar ( 40 )"]);
            }
            other => panic!("Expected CREATE TABLE, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_table_empty_body() {
        match parse("CREATE TABLE t ()") {
            Statement::CreateTable(stmt) => assert_eq!(stmt.column_defs, vec![""]),
            other => panic!("Expected CREATE TABLE, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_table_body_is_not_lexed() {
        match parse("CREATE TABLE t (`id` INT, n INT CHECK (n > 0), tag VARCHAR(2))") {
            Statement::CreateTable(stmt) => assert_eq!(
                stmt.column_defs,
                vec!["`id` INT", "n INT CHECK (n > 0)", "tag VARCHAR(2)"]
            ),
            other => panic!("Expected CREATE TABLE, got {other:?}"),
        }

        assert_syntax_error("CREATE TABLE t (id INT) extra", StatementKind::CreateTable);
    }

    #[test]
    fn test_parse_create_table_unclosed() {
        assert_syntax_error("CREATE TABLE t (id INT", StatementKind::CreateTable);
        assert_syntax_error("CREATE TABLE (id INT)", StatementKind::CreateTable);
    }

    #[test]
    fn test_parse_create_index() {
        assert_eq!(
            parse("CREATE INDEX ON users (id);"),
            Statement::CreateIndex(CreateIndexStatement {
                table_name: "users",
                column: "id",
            })
        );
        assert_syntax_error("CREATE INDEX users (id)", StatementKind::CreateIndex);
    }

    #[test]
    fn test_parse_select_all() {
        assert_eq!(
            parse("SELECT * FROM users"),
            Statement::Select(SelectStatement {
                select_list: SelectList::Star,
                table_name: "users",
                where_clause: None,
            })
        );
    }

    #[test]
    fn test_parse_select_columns_with_where() {
        assert_eq!(
            parse("select name, id from users where name = \"bob\""),
            Statement::Select(SelectStatement {
                select_list: SelectList::Columns(vec!["name", "id"]),
                table_name: "users",
                where_clause: Some(Predicate {
                    column: "name",
                    value: Literal::Text("bob"),
                }),
            })
        );
    }

    #[test]
    fn test_parse_select_unquoted_value() {
        match parse("SELECT * FROM t WHERE name = alice") {
            Statement::Select(SelectStatement {
                where_clause: Some(predicate),
                ..
            }) => assert_eq!(predicate.value, Literal::Word("alice")),
            other => panic!("Expected SELECT with WHERE, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_select_errors() {
        assert_syntax_error("SELECT FROM t", StatementKind::Select);
        assert_syntax_error("SELECT * t", StatementKind::Select);
        assert_syntax_error("SELECT * FROM t WHERE id", StatementKind::Select);
        assert_syntax_error("SELECT * FROM t WHERE id = 1 extra", StatementKind::Select);
    }

    #[test]
    fn test_parse_insert() {
        assert_eq!(
            parse("INSERT INTO t VALUES (1, 'alice', \"x, y\")"),
            Statement::Insert(InsertStatement {
                table_name: "t",
                values: vec![
                    Literal::Number("1"),
                    Literal::Text("alice"),
                    Literal::Text("x, y"),
                ],
            })
        );
        assert_syntax_error("INSERT INTO t VALUES ()", StatementKind::Insert);
        assert_syntax_error("INSERT t VALUES (1)", StatementKind::Insert);
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(
            parse("DELETE * FROM t"),
            Statement::Delete(DeleteStatement {
                table_name: "t",
                filter: DeleteFilter::All,
            })
        );
        assert_eq!(
            parse("delete from t where id = 2"),
            Statement::Delete(DeleteStatement {
                table_name: "t",
                filter: DeleteFilter::Where(Predicate {
                    column: "id",
                    value: Literal::Number("2"),
                }),
            })
        );
        assert_syntax_error("DELETE FROM t", StatementKind::Delete);
        assert_syntax_error("DELETE * FROM t WHERE id = 2", StatementKind::Delete);
    }

    #[test]
    fn test_unsupported_statements() {
        for query in ["UPDATE t SET a = 1", "DROP TABLE t", "CREATE VIEW v", "", "42"] {
            assert!(
                matches!(parse_err(query), DatabaseError::UnsupportedStatement(_)),
                "{query:?} should be unsupported"
            );
        }
    }

    #[test]
    fn test_syntax_error_points_at_token() {
        match parse_err("SELECT * FROM t WHERE id > 3") {
            DatabaseError::Syntax { span, .. } => assert_eq!(span.offset(), 25),
            other => panic!("Expected syntax error, got {other:?}"),
        }
    }
}
