//! The top-level error type unifying the three error domains (§7): syntax
//! errors from the lexer, parser errors from the grammar, and runtime
//! errors from execution and snapshot I/O.

use std::{error::Error, fmt::Display};

use crate::executor::RuntimeError;
use crate::lexer::LexError;
use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum QdbError {
    Syntax(LexError),
    Parser(ParseError),
    Runtime(RuntimeError),
}

impl Display for QdbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QdbError::Syntax(e) => write!(f, "{e}"),
            QdbError::Parser(e) => write!(f, "Parse error: {e}"),
            QdbError::Runtime(e) => write!(f, "Runtime error: {e}"),
        }
    }
}

impl Error for QdbError {}

impl From<LexError> for QdbError {
    fn from(e: LexError) -> Self {
        QdbError::Syntax(e)
    }
}

impl From<ParseError> for QdbError {
    fn from(e: ParseError) -> Self {
        QdbError::Parser(e)
    }
}

impl From<RuntimeError> for QdbError {
    fn from(e: RuntimeError) -> Self {
        QdbError::Runtime(e)
    }
}

pub type QdbResult<T> = Result<T, QdbError>;
