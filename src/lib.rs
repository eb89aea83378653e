//! An in-memory, SQL-like relational engine: a lexer and parser for a small
//! request grammar, an executor maintaining a table catalog under a
//! primary-key uniqueness invariant, and binary snapshot persistence.

pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod schema;
pub mod snapshot;
pub mod storage;
pub mod value;

use std::io::Write;
use std::path::Path;

use log::warn;

use error::QdbResult;
use storage::Catalog;

/// The engine: a resident table catalog plus the pipeline (lex, parse,
/// execute) that applies one request to it.
#[derive(Debug, Default)]
pub struct Database {
    catalog: Catalog,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Lexes, parses, and executes one `;`-terminated request. `SELECT`
    /// output is written to `out` as the scan proceeds.
    pub fn run<W: Write>(&mut self, request: &str, out: &mut W) -> QdbResult<()> {
        let tokens = lexer::lex(request)?;
        let ast = parser::parse(tokens)?;
        executor::execute(&mut self.catalog, &ast, out)?;
        Ok(())
    }

    /// `.save <path>` (§4.7).
    pub fn save(&self, path: &Path) -> QdbResult<()> {
        snapshot::save(&self.catalog, path).map_err(executor::RuntimeError::from)?;
        Ok(())
    }

    /// `.open <path>` (§4.7). Does NOT clear the catalog first — callers
    /// wanting a clean restore should call [`Database::clear`] beforehand.
    pub fn open(&mut self, path: &Path) -> QdbResult<()> {
        if !self.catalog.is_empty() {
            warn!(
                "opening a snapshot into a catalog with {} resident table(s); they will not be cleared first",
                self.catalog.len()
            );
        }
        let tables = snapshot::open(path).map_err(executor::RuntimeError::from)?;
        self.catalog.absorb(tables);
        Ok(())
    }

    /// `.clear`: drops every resident table.
    pub fn clear(&mut self) {
        self.catalog.clear();
    }
}
