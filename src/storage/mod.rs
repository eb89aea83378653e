//! The table catalog and row storage (§4.3, §4.4).
//!
//! Each table keeps its rows in one flat byte buffer and refers to them by
//! index rather than as a `Vec<Vec<u8>>` of heap-allocated rows — the arena
//! layout the design notes recommend in place of the source's per-row
//! pointer graph, and the layout [`crate::snapshot`] serializes directly.

mod error;
mod row;
mod table;

pub use error::{StorageError, StorageResult};
pub use row::{decode_row, encode_row};
pub use table::Table;

use std::collections::HashMap;

use log::debug;

use crate::schema::Schema;
use crate::value::Value;

/// Upper bound on resident tables (§4.4, `MAXTABLES`).
pub const MAX_TABLES: usize = 128;

/// The set of tables currently resident in memory.
///
/// Table names compare case-sensitively and exactly (§9: "string
/// comparisons on command prefixes ... must use length-bounded exact
/// prefix checks", the same discipline applies to table lookup).
#[derive(Debug, Default)]
pub struct Catalog {
    tables: Vec<Table>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every resident table, in catalog order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn find(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).map(|&i| &self.tables[i])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Table> {
        match self.by_name.get(name) {
            Some(&i) => Some(&mut self.tables[i]),
            None => None,
        }
    }

    /// `create(schema)` (§4.4): rejects a name already in use, and the
    /// `MAXTABLES` bound.
    pub fn create(&mut self, schema: Schema) -> StorageResult<()> {
        if self.by_name.contains_key(&schema.table_name) {
            return Err(StorageError::DuplicateTable(schema.table_name));
        }
        if self.tables.len() >= MAX_TABLES {
            return Err(StorageError::TooManyTables);
        }
        let name = schema.table_name.clone();
        debug!("creating table '{name}' ({} column(s))", schema.columns.len());
        self.by_name.insert(name, self.tables.len());
        self.tables.push(Table::new(schema));
        Ok(())
    }

    /// `drop(name)` (§4.4): removes by name; remaining tables keep their
    /// relative order. `Vec::remove` plus a full reindex gives this directly.
    pub fn drop_table(&mut self, name: &str) -> StorageResult<()> {
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| StorageError::UnknownTable(name.to_owned()))?;
        self.tables.remove(index);
        self.by_name.clear();
        for (i, table) in self.tables.iter().enumerate() {
            self.by_name.insert(table.schema().table_name.clone(), i);
        }
        Ok(())
    }

    /// `.clear`: drops every table.
    pub fn clear(&mut self) {
        self.tables.clear();
        self.by_name.clear();
    }

    /// Replaces the catalog's tables with `tables`, keyed by schema name.
    /// Used by [`crate::snapshot::open`], which — per §4.7 — does NOT clear
    /// whatever was already resident first.
    pub fn absorb(&mut self, tables: Vec<Table>) {
        for table in tables {
            let name = table.schema().table_name.clone();
            match self.by_name.get(&name) {
                Some(&i) => self.tables[i] = table,
                None => {
                    self.by_name.insert(name, self.tables.len());
                    self.tables.push(table);
                }
            }
        }
    }

    /// `insert(table, row_literals)` (§4.4): validates arity, primary-key
    /// non-emptiness, primary-key uniqueness by linear scan, grows capacity
    /// (×2) if full, appends the row.
    pub fn insert(&mut self, table_name: &str, literals: &[Value]) -> StorageResult<()> {
        let table = self
            .find_mut(table_name)
            .ok_or_else(|| StorageError::UnknownTable(table_name.to_owned()))?;
        table.insert(literals)
    }
}
