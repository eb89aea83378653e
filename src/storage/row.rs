//! Fixed-width row encoding (§4.3).
//!
//! Numeric columns are 8-byte little-endian, resolving the host-dependent,
//! unspecified endianness left open by §9's Open Questions in favor of
//! snapshot portability across machines. `Varchar(n)`
//! columns are `n`-byte NUL-terminated slots; bytes past the terminator are
//! left as written (zeroed on first write) rather than meaningful padding.

use crate::schema::Schema;
use crate::value::{ColumnType, Value};

/// Encodes `values` into a freshly allocated row buffer of `schema.row_width()`
/// bytes, in column order.
pub fn encode_row(schema: &Schema, values: &[Value]) -> Vec<u8> {
    let mut buf = vec![0u8; schema.row_width()];
    for (column, value) in schema.columns.iter().zip(values) {
        let offset = schema.offset_of(schema.index_of(&column.name).unwrap());
        encode_into(&mut buf[offset..offset + column.width_bytes()], &column.ty, value);
    }
    buf
}

/// Encodes a single `value` into `slot`, which must be exactly
/// `ty.width_bytes()` long.
pub fn encode_into(slot: &mut [u8], ty: &ColumnType, value: &Value) {
    match (ty, value) {
        (ColumnType::Int, Value::Int(i)) => slot.copy_from_slice(&i.to_le_bytes()),
        (ColumnType::Float, Value::Float(x)) => slot.copy_from_slice(&x.to_le_bytes()),
        (ColumnType::Varchar(_), Value::Text(s)) => {
            slot.fill(0);
            let bytes = s.as_bytes();
            let take = bytes.len().min(slot.len().saturating_sub(1));
            slot[..take].copy_from_slice(&bytes[..take]);
        }
        _ => unreachable!("value/type mismatch should be rejected before encoding"),
    }
}

/// Decodes every column of one row out of `buf`, which must be exactly
/// `schema.row_width()` bytes.
pub fn decode_row(schema: &Schema, buf: &[u8]) -> Vec<Value> {
    schema
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let offset = schema.offset_of(i);
            decode_from(&buf[offset..offset + column.width_bytes()], &column.ty)
        })
        .collect()
}

/// Decodes a single slot per `decode(slot, type)` (§4.3): for `Text`,
/// reading stops at the first NUL.
pub fn decode_from(slot: &[u8], ty: &ColumnType) -> Value {
    match ty {
        ColumnType::Int => Value::Int(i64::from_le_bytes(slot.try_into().unwrap())),
        ColumnType::Float => Value::Float(f64::from_le_bytes(slot.try_into().unwrap())),
        ColumnType::Varchar(_) => {
            let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
            Value::Text(String::from_utf8_lossy(&slot[..end]).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn schema() -> Schema {
        Schema::new(
            "t",
            vec![
                Column::new("a", ColumnType::Int),
                Column::new("b", ColumnType::Float),
                Column::new("c", ColumnType::Varchar(8)),
            ],
        )
    }

    #[test]
    fn round_trips_every_column() {
        let schema = schema();
        let values = vec![Value::Int(-7), Value::Float(2.5), Value::Text("hi".into())];
        let buf = encode_row(&schema, &values);
        assert_eq!(buf.len(), schema.row_width());
        assert_eq!(decode_row(&schema, &buf), values);
    }

    #[test]
    fn text_truncates_to_slot_and_nul_terminates() {
        let schema = schema();
        let values = vec![Value::Int(1), Value::Float(0.0), Value::Text("abcdefghij".into())];
        let buf = encode_row(&schema, &values);
        let decoded = decode_row(&schema, &buf);
        assert_eq!(decoded[2], Value::Text("abcdefg".into()));
    }
}
