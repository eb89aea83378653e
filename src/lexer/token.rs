use std::fmt::{self, Display};

/// A single lexical position: 1-based column within the request line.
pub type Column = usize;

/// The kind of a [`Token`], per the request grammar's lexical categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    StringLiteral,
    Number,
    Operator,
    Comparison,
    LeftParen,
    RightParen,
    Punctuation,
    End,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Comparison => "comparison",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Punctuation => "punctuation",
            TokenKind::End => "';'",
        };
        f.write_str(repr)
    }
}

/// A `(kind, lexeme)` pair produced by the lexer, plus the column it started
/// at (used for syntax-error reporting further down the pipeline).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub column: Column,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, column: Column) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            column,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme.eq_ignore_ascii_case(word)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.lexeme)
    }
}

/// Cursor over an already-lexed token sequence, used by the parser.
///
/// An iterator-with-peek specialised to `Token`, giving the parser the
/// random-access rewinding its shunting-yard condition parser needs.
#[derive(Debug, Clone)]
pub struct Tokens {
    tokens: Vec<Token>,
    index: usize,
}

impl Tokens {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
