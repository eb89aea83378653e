//! The lexer: a pure function from request text to a token sequence.
//!
//! A hand-rolled `Lexer` over `Peekable<Chars>`, with explicit
//! `eat_whitespace`/`next_if` helpers and dispatch by character class, rather
//! than a parser-combinator or regex approach.

mod error;
mod token;

pub use error::{LexError, LexResult};
pub use token::{Column, Token, TokenKind, Tokens};

use once_cell::sync::Lazy;
use std::{collections::HashSet, iter::Peekable, str::Chars};

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "create", "delete", "drop", "float", "from", "insert", "int", "into", "or", "pk",
        "select", "set", "table", "update", "values", "varchar", "where",
    ]
    .into_iter()
    .collect()
});

/// Lexes `text` into a token sequence, per §4.1.
///
/// The trailing `End` (`;`) token required of every well-formed request is
/// consumed but not included in the returned sequence.
pub fn lex(text: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(text);
    lexer.run()?;
    let mut tokens = lexer.tokens;

    match tokens.last() {
        Some(tok) if tok.kind == TokenKind::End => {
            tokens.pop();
            Ok(tokens)
        }
        _ => Err(LexError::new(text.to_owned(), text.chars().count() + 1)),
    }
}

struct Lexer<'a> {
    source: &'a str,
    iterator: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    column: Column,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            iterator: source.chars().peekable(),
            tokens: Vec::new(),
            column: 1,
        }
    }

    fn error(&self, column: Column) -> LexError {
        LexError::new(self.source.to_owned(), column)
    }

    fn peek(&mut self) -> Option<char> {
        self.iterator.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.iterator.next();
        if next.is_some() {
            self.column += 1;
        }
        next
    }

    fn next_if(&mut self, pred: impl FnOnce(char) -> bool) -> Option<char> {
        let next = self.iterator.next_if(|c| pred(*c));
        if next.is_some() {
            self.column += 1;
        }
        next
    }

    fn eat_whitespace(&mut self) {
        while self.next_if(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r').is_some() {}
    }

    fn run(&mut self) -> LexResult<()> {
        loop {
            self.eat_whitespace();
            let Some(next) = self.peek() else {
                return Ok(());
            };

            if next.is_ascii_digit() {
                self.lex_number()?;
            } else if next == '"' {
                self.lex_identifier()?;
            } else if next == '\'' {
                self.lex_string_literal()?;
            } else if next.is_alphabetic() || next == '_' {
                self.lex_word()?;
            } else {
                self.lex_symbol()?;
            }
        }
    }

    fn lex_word(&mut self) -> LexResult<()> {
        let column = self.column;
        let mut word = String::new();
        while let Some(c) = self.next_if(|c| c.is_alphanumeric() || c == '_') {
            word.push(c);
        }

        let lower = word.to_ascii_lowercase();
        if lower == "and" || lower == "or" {
            self.tokens
                .push(Token::new(TokenKind::Comparison, lower.to_uppercase(), column));
        } else if KEYWORDS.contains(lower.as_str()) {
            self.tokens
                .push(Token::new(TokenKind::Keyword, lower.to_uppercase(), column));
        } else {
            return Err(self.error(column));
        }

        Ok(())
    }

    fn lex_number(&mut self) -> LexResult<()> {
        let column = self.column;
        let mut lexeme = String::new();

        if self.peek() == Some('0') {
            lexeme.push(self.bump().unwrap());
            if matches!(self.peek(), Some('x') | Some('X')) {
                lexeme.push(self.bump().unwrap());
                while let Some(c) = self.next_if(|c| c.is_ascii_hexdigit()) {
                    lexeme.push(c);
                }
                self.tokens.push(Token::new(TokenKind::Number, lexeme, column));
                return Ok(());
            }
        }

        while let Some(c) = self.next_if(|c| c.is_ascii_digit()) {
            lexeme.push(c);
        }

        self.tokens.push(Token::new(TokenKind::Number, lexeme, column));
        Ok(())
    }

    fn lex_identifier(&mut self) -> LexResult<()> {
        let column = self.column;
        let mut lexeme = String::new();
        lexeme.push(self.bump().unwrap()); // opening quote

        loop {
            match self.bump() {
                Some('"') => {
                    lexeme.push('"');
                    self.tokens
                        .push(Token::new(TokenKind::Identifier, lexeme, column));
                    return Ok(());
                }
                Some(c) => lexeme.push(c),
                None => return Err(self.error(column)),
            }
        }
    }

    fn lex_string_literal(&mut self) -> LexResult<()> {
        let column = self.column;
        let mut lexeme = String::new();
        lexeme.push(self.bump().unwrap()); // opening quote

        loop {
            match self.bump() {
                Some('\\') => {
                    lexeme.push('\\');
                    match self.bump() {
                        Some(escaped) => lexeme.push(escaped),
                        None => return Err(self.error(column)),
                    }
                }
                Some('\'') => {
                    lexeme.push('\'');
                    self.tokens
                        .push(Token::new(TokenKind::StringLiteral, lexeme, column));
                    return Ok(());
                }
                Some(c) => lexeme.push(c),
                None => return Err(self.error(column)),
            }
        }
    }

    fn lex_symbol(&mut self) -> LexResult<()> {
        let column = self.column;
        let c = self.peek().expect("lex_symbol called at end of input");

        let two_char = {
            let mut clone = self.iterator.clone();
            clone.next();
            clone.next().map(|second| {
                let mut s = String::new();
                s.push(c);
                s.push(second);
                s
            })
        };

        if let Some(candidate) = &two_char {
            if matches!(candidate.as_str(), "!=" | "<=" | ">=") {
                self.bump();
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::Comparison, candidate.clone(), column));
                return Ok(());
            }
        }

        match c {
            '=' | '<' | '>' => {
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::Comparison, c.to_string(), column));
            }
            '+' | '-' | '*' | '/' | '%' => {
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::Operator, c.to_string(), column));
            }
            '(' => {
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::LeftParen, c.to_string(), column));
            }
            ')' => {
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::RightParen, c.to_string(), column));
            }
            ',' | '.' => {
                self.bump();
                self.tokens
                    .push(Token::new(TokenKind::Punctuation, c.to_string(), column));
            }
            ';' => {
                self.bump();
                self.tokens.push(Token::new(TokenKind::End, c.to_string(), column));
            }
            _ => return Err(self.error(column)),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_create_table() {
        let tokens = lex(r#"CREATE TABLE "u" ("a" int pk, "b" int);"#).unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Punctuation,
                TokenKind::Identifier,
                TokenKind::Keyword,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn lexes_comparisons_and_connectives() {
        let tokens = lex(r#"SELECT * FROM "u" WHERE (("a" = 1) AND ("b" != 2));"#).unwrap();
        let comparisons: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comparison)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(comparisons, vec!["=", "AND", "!="]);
    }

    #[test]
    fn keyword_into_is_not_split() {
        let tokens = lex(r#"INSERT INTO "u" VALUES (1);"#).unwrap();
        assert_eq!(tokens[1].lexeme, "INTO");
    }

    #[test]
    fn hex_number_literal() {
        let tokens = lex(r#"INSERT INTO "u" VALUES (0xFF);"#).unwrap();
        let number = tokens.iter().find(|t| t.kind == TokenKind::Number).unwrap();
        assert_eq!(number.lexeme, "0xFF");
    }

    #[test]
    fn string_literal_escape() {
        let tokens = lex(r#"INSERT INTO "u" VALUES ('it\'s');"#).unwrap();
        let literal = tokens
            .iter()
            .find(|t| t.kind == TokenKind::StringLiteral)
            .unwrap();
        assert_eq!(literal.lexeme, r"'it\'s'");
    }

    #[test]
    fn unterminated_identifier_is_syntax_error() {
        let err = lex(r#"SELECT * FROM "u;"#).unwrap_err();
        assert!(err.column > 0);
    }

    #[test]
    fn missing_trailing_end_is_syntax_error() {
        assert!(lex(r#"SELECT * FROM "u""#).is_err());
    }

    #[test]
    fn float_literal_is_number_dot_number() {
        let tokens = lex(r#"INSERT INTO "u" VALUES (12.5);"#).unwrap();
        let numbers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(numbers, vec!["12", "5"]);
    }
}
