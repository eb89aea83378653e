use log::trace;

use crate::schema::Schema;
use crate::value::Value;

use super::error::{StorageError, StorageResult};
use super::row::{decode_from, decode_row, encode_into, encode_row};

const INITIAL_CAPACITY: usize = 16;

/// One resident table: a [`Schema`] plus a flat row buffer addressed by
/// index, rather than one heap allocation per row.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    rows: Vec<u8>,
    nb_rows: usize,
    capacity: usize,
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        let row_width = schema.row_width();
        Self {
            rows: vec![0u8; row_width * INITIAL_CAPACITY],
            capacity: INITIAL_CAPACITY,
            nb_rows: 0,
            schema,
        }
    }

    /// Reconstructs a table whose shape and row bytes are already known, used
    /// by [`crate::snapshot::open`].
    pub fn from_parts(schema: Schema, rows: Vec<u8>, nb_rows: usize, capacity: usize) -> Self {
        Self { schema, rows, nb_rows, capacity }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn nb_rows(&self) -> usize {
        self.nb_rows
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn row_width(&self) -> usize {
        self.schema.row_width()
    }

    pub fn raw_rows(&self) -> &[u8] {
        &self.rows[..self.row_width() * self.nb_rows]
    }

    fn row_slice(&self, index: usize) -> &[u8] {
        let width = self.row_width();
        &self.rows[index * width..(index + 1) * width]
    }

    fn row_slice_mut(&mut self, index: usize) -> &mut [u8] {
        let width = self.row_width();
        &mut self.rows[index * width..(index + 1) * width]
    }

    fn decoded_row(&self, index: usize) -> Vec<Value> {
        decode_row(&self.schema, self.row_slice(index))
    }

    fn pk_value(&self, index: usize) -> Value {
        let pk = self.schema.primary_key();
        let offset = self.schema.offset_of(self.schema.primary_key_index());
        decode_from(&self.row_slice(index)[offset..offset + pk.width_bytes()], &pk.ty)
    }

    fn is_empty_value(value: &Value) -> bool {
        matches!(value, Value::Text(s) if s.is_empty())
    }

    fn grow_if_full(&mut self) {
        if self.nb_rows < self.capacity {
            return;
        }
        let old_capacity = self.capacity;
        self.capacity *= 2;
        self.rows.resize(self.row_width() * self.capacity, 0);
        trace!(
            "table '{}' grew capacity {} -> {}",
            self.schema.table_name,
            old_capacity,
            self.capacity
        );
    }

    /// `scan(table)` (§4.4): a lazy, finite, non-restartable iterator over
    /// decoded rows in storage order.
    pub fn scan(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.nb_rows).map(move |i| self.decoded_row(i))
    }

    /// `insert(table, row_literals)` (§4.4).
    pub fn insert(&mut self, literals: &[Value]) -> StorageResult<()> {
        if literals.len() != self.schema.columns.len() {
            return Err(StorageError::ArityMismatch {
                expected: self.schema.columns.len(),
                found: literals.len(),
            });
        }

        let pk_literal = &literals[self.schema.primary_key_index()];
        if Self::is_empty_value(pk_literal) {
            return Err(StorageError::EmptyPrimaryKey);
        }
        for i in 0..self.nb_rows {
            if self.pk_value(i) == *pk_literal {
                return Err(StorageError::DuplicatePrimaryKey(pk_literal.to_string()));
            }
        }

        self.grow_if_full();
        let encoded = encode_row(&self.schema, literals);
        let index = self.nb_rows;
        self.row_slice_mut(index).copy_from_slice(&encoded);
        self.nb_rows += 1;
        Ok(())
    }

    /// `delete(table, predicate)` with no predicate: truncates to 0 rows.
    pub fn clear_rows(&mut self) {
        self.nb_rows = 0;
    }

    /// `delete(table, predicate)` (§4.4): scans from the last index to the
    /// first; each match is removed by overwriting with the subsequent
    /// rows (compaction), decrementing `nb_rows`. Returns the number of
    /// rows removed.
    pub fn delete_where<F, E>(&mut self, mut predicate: F) -> Result<usize, E>
    where
        F: FnMut(&[Value]) -> Result<bool, E>,
    {
        let mut removed = 0;
        let mut index = self.nb_rows;
        while index > 0 {
            index -= 1;
            let row = self.decoded_row(index);
            if predicate(&row)? {
                let width = self.row_width();
                let tail_start = (index + 1) * width;
                let tail_end = self.nb_rows * width;
                self.rows.copy_within(tail_start..tail_end, index * width);
                self.nb_rows -= 1;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// `update(table, assignments, predicate)` (§4.4): for each row
    /// satisfying `predicate`, writes every assignment's encoded value into
    /// the column's slot. If the primary key is among the assignments, its
    /// new value must be non-empty and not equal to any *existing*
    /// primary-key value — including the row being updated's own current
    /// value (the self-compare wart, normative here per §4.4).
    ///
    /// A conflict aborts immediately; rows already written by this call are
    /// NOT rolled back (§4.4, §9).
    pub fn update_where<F, E>(
        &mut self,
        assignments: &[(usize, Value)],
        mut predicate: F,
    ) -> Result<usize, E>
    where
        F: FnMut(&[Value]) -> Result<bool, E>,
        E: From<StorageError>,
    {
        let pk_index = self.schema.primary_key_index();
        let touches_pk = assignments.iter().any(|(col, _)| *col == pk_index);
        let mut updated = 0;

        for index in 0..self.nb_rows {
            let row = self.decoded_row(index);
            if !predicate(&row)? {
                continue;
            }

            if touches_pk {
                let (_, new_pk) = assignments.iter().find(|(col, _)| *col == pk_index).unwrap();
                if Self::is_empty_value(new_pk) {
                    return Err(StorageError::EmptyPrimaryKey.into());
                }
                for other in 0..self.nb_rows {
                    if self.pk_value(other) == *new_pk {
                        return Err(StorageError::DuplicatePrimaryKey(new_pk.to_string()).into());
                    }
                }
            }

            for (col_index, value) in assignments {
                let column = &self.schema.columns[*col_index];
                let offset = self.schema.offset_of(*col_index);
                let width = column.width_bytes();
                let ty = column.ty;
                encode_into(&mut self.row_slice_mut(index)[offset..offset + width], &ty, value);
            }
            updated += 1;
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::value::ColumnType;

    fn table() -> Table {
        Table::new(Schema::new(
            "t",
            vec![Column::new("id", ColumnType::Int), Column::new("name", ColumnType::Varchar(8))],
        ))
    }

    #[test]
    fn capacity_doubles_past_initial_sixteen() {
        let mut t = table();
        for i in 0..17 {
            t.insert(&[Value::Int(i), Value::Text("x".into())]).unwrap();
        }
        assert_eq!(t.capacity(), 32);
        assert_eq!(t.nb_rows(), 17);
    }

    #[test]
    fn duplicate_primary_key_is_rejected() {
        let mut t = table();
        t.insert(&[Value::Int(1), Value::Text("a".into())]).unwrap();
        let err = t.insert(&[Value::Int(1), Value::Text("b".into())]).unwrap_err();
        assert!(matches!(err, StorageError::DuplicatePrimaryKey(_)));
    }

    #[test]
    fn delete_compacts_from_the_tail() {
        let mut t = table();
        for i in 0..5 {
            t.insert(&[Value::Int(i), Value::Text("x".into())]).unwrap();
        }
        let removed = t
            .delete_where::<_, StorageError>(|row| Ok(row[0] == Value::Int(2) || row[0] == Value::Int(4)))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(t.nb_rows(), 3);
        let remaining: Vec<i64> = t
            .scan()
            .map(|row| match row[0] {
                Value::Int(i) => i,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(remaining, vec![0, 1, 3]);
    }

    #[test]
    fn update_pk_conflicts_even_against_its_own_current_value() {
        let mut t = table();
        t.insert(&[Value::Int(1), Value::Text("a".into())]).unwrap();
        let result = t.update_where::<_, StorageError>(&[(0, Value::Int(1))], |row| {
            Ok(row[0] == Value::Int(1))
        });
        assert!(result.is_err());
    }
}
