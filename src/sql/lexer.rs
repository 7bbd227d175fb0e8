use std::fmt;

use miette::SourceSpan;

use crate::sql::parser::Keyword;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    Identifier(&'a str),
    /// Digits, dots and an optional leading minus, unparsed.
    Number(&'a str),
    /// Contents of a single- or double-quoted string, quotes removed.
    String(&'a str),

    Comma,
    Asterisk,
    SemiColon,
    Equal,

    LeftParen,
    RightParen,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "keyword {kw}"),
            Token::Identifier(ident) => write!(f, "identifier `{ident}`"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::String(s) => write!(f, "string '{s}'"),
            Token::Comma => write!(f, "`,`"),
            Token::Asterisk => write!(f, "`*`"),
            Token::SemiColon => write!(f, "`;`"),
            Token::Equal => write!(f, "`=`"),
            Token::LeftParen => write!(f, "`(`"),
            Token::RightParen => write!(f, "`)`"),
        }
    }
}

/// A token together with its location in the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub span: SourceSpan,
}

pub(crate) struct Lexer<'a> {
    pub rest: &'a str,
    pub position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            position: 0,
        }
    }

    /// Lexes `input` from byte `offset` on, keeping spans relative to `input`.
    pub fn starting_at(input: &'a str, offset: usize) -> Self {
        Self {
            rest: &input[offset..],
            position: offset,
        }
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.advance(non_whitespace_pos);
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let consumed = &self.rest[..len];
        self.position += len;
        self.rest = &self.rest[len..];
        consumed
    }

    fn consume_word(&mut self) -> &'a str {
        let word_end = self
            .rest
            .find(|c: char| !is_word_char(c))
            .unwrap_or(self.rest.len());

        self.advance(word_end)
    }

    fn consume_string(&mut self, quote: char) -> Result<&'a str, LexError> {
        let start = self.position;
        match self.rest[1..].find(quote) {
            Some(close) => {
                let consumed = self.advance(close + 2);
                Ok(&consumed[1..consumed.len() - 1])
            }
            None => Err(LexError {
                message: "unterminated string".to_string(),
                span: (start, self.rest.len()).into(),
            }),
        }
    }

    fn consume_number(&mut self) -> &'a str {
        let sign = usize::from(self.rest.starts_with('-'));
        let number_end = self.rest[sign..]
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .map_or(self.rest.len(), |end| end + sign);

        self.advance(number_end)
    }

    fn single(&mut self, token: Token<'a>) -> Result<Token<'a>, LexError> {
        self.advance(1);
        Ok(token)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Spanned<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let char = self.rest.chars().next()?;
        let start = self.position;

        let token = match char {
            ',' => self.single(Token::Comma),
            '*' => self.single(Token::Asterisk),
            ';' => self.single(Token::SemiColon),
            '=' => self.single(Token::Equal),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '\'' | '"' => self.consume_string(char).map(Token::String),
            '-' if self.rest[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                Ok(Token::Number(self.consume_number()))
            }
            _ if char.is_ascii_digit() => Ok(Token::Number(self.consume_number())),
            _ if char.is_alphabetic() || char == '_' => {
                let word = self.consume_word();
                Ok(word
                    .parse::<Keyword>()
                    .map_or(Token::Identifier(word), Token::Keyword))
            }
            _ => Err(LexError {
                message: format!("unexpected character '{char}'"),
                span: (start, char.len_utf8()).into(),
            }),
        };

        Some(token.map(|token| Spanned {
            token,
            span: (start, self.position - start).into(),
        }))
    }
}
