use std::fmt;

/// A literal value in SQL, kept as text until the target column is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal<'src> {
    Number(&'src str),
    /// A quoted string, quotes stripped.
    Text(&'src str),
    /// An unquoted word, e.g. `WHERE name = alice`.
    Word(&'src str),
}

impl<'src> Literal<'src> {
    pub fn as_str(&self) -> &'src str {
        match self {
            Literal::Number(s) | Literal::Text(s) | Literal::Word(s) => s,
        }
    }
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "'{s}'"),
            Literal::Number(s) | Literal::Word(s) => write!(f, "{s}"),
        }
    }
}
