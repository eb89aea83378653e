//! Predicate evaluation over a decoded row (§4.5).

use std::cmp::Ordering;

use crate::parser::{AstKind, AstNode};
use crate::schema::Schema;
use crate::value::{ColumnType, Value};

use super::error::{RuntimeError, RuntimeResult};

/// Evaluates the boolean-expression tree rooted at `node` against one
/// already-decoded `row`.
pub fn eval(node: &AstNode, schema: &Schema, row: &[Value]) -> RuntimeResult<bool> {
    match node.lexeme.as_str() {
        "AND" => {
            let left = eval(child(node, Side::Left)?, schema, row)?;
            let right = eval(child(node, Side::Right)?, schema, row)?;
            Ok(left && right)
        }
        "OR" => {
            let left = eval(child(node, Side::Left)?, schema, row)?;
            let right = eval(child(node, Side::Right)?, schema, row)?;
            Ok(left || right)
        }
        op => eval_relation(node, op, schema, row),
    }
}

enum Side {
    Left,
    Right,
}

fn child(node: &AstNode, side: Side) -> RuntimeResult<&AstNode> {
    let got = match side {
        Side::Left => node.left.as_deref(),
        Side::Right => node.right.as_deref(),
    };
    got.ok_or_else(|| RuntimeError::Malformed("boolean connective missing a child".into()))
}

fn eval_relation(node: &AstNode, op: &str, schema: &Schema, row: &[Value]) -> RuntimeResult<bool> {
    let left = child(node, Side::Left)?;
    let right = child(node, Side::Right)?;

    let left_is_col = left.kind == AstKind::ColName;
    let right_is_col = right.kind == AstKind::ColName;

    let (lhs, rhs, column_ty) = match (left_is_col, right_is_col) {
        (true, false) => {
            let (index, column) = resolve_column(schema, &left.lexeme)?;
            let literal = literal_value(right, &column.ty)?;
            (row[index].clone(), literal, column.ty)
        }
        (false, true) => {
            let (index, column) = resolve_column(schema, &right.lexeme)?;
            let literal = literal_value(left, &column.ty)?;
            (literal, row[index].clone(), column.ty)
        }
        _ => {
            return Err(RuntimeError::TypeError(
                "a relation must compare a column to a literal".into(),
            ))
        }
    };

    check_operator_allowed(op, &column_ty)?;
    compare_values(op, &lhs, &rhs)
}

fn resolve_column<'s>(
    schema: &'s Schema,
    name: &str,
) -> RuntimeResult<(usize, &'s crate::schema::Column)> {
    let index = schema
        .index_of(name)
        .ok_or_else(|| RuntimeError::TypeError(format!("unknown column '{name}'")))?;
    Ok((index, &schema.columns[index]))
}

/// Resolves an AST literal node to a [`Value`] of the column's declared
/// type; a kind mismatch (e.g. a string literal against an int column) is a
/// type error.
pub fn literal_value(node: &AstNode, ty: &ColumnType) -> RuntimeResult<Value> {
    match (ty, node.kind) {
        (ColumnType::Int, AstKind::Int) => Ok(Value::Int(node.int_value)),
        (ColumnType::Float, AstKind::Float) => Ok(Value::Float(node.float_value)),
        (ColumnType::Varchar(_), AstKind::String) => Ok(Value::Text(node.lexeme.clone())),
        _ => Err(RuntimeError::TypeError(format!(
            "literal '{}' does not match column type {ty}",
            node.lexeme
        ))),
    }
}

fn check_operator_allowed(op: &str, ty: &ColumnType) -> RuntimeResult<()> {
    let allowed: &[&str] = match ty {
        ColumnType::Int => &["=", "!=", "<", "<=", ">", ">="],
        // Float equality is intentionally unsupported (§4.5, §9).
        ColumnType::Float => &["<", ">"],
        ColumnType::Varchar(_) => &["="],
    };
    if allowed.contains(&op) {
        Ok(())
    } else {
        Err(RuntimeError::TypeError(format!(
            "'{op}' is not supported on a {ty} column"
        )))
    }
}

fn compare_values(op: &str, a: &Value, b: &Value) -> RuntimeResult<bool> {
    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.partial_cmp(y),
        _ => None,
    };

    match op {
        "=" => Ok(a == b),
        "!=" => Ok(a != b),
        "<" => Ok(ordering == Some(Ordering::Less)),
        "<=" => Ok(matches!(ordering, Some(Ordering::Less | Ordering::Equal))),
        ">" => Ok(ordering == Some(Ordering::Greater)),
        ">=" => Ok(matches!(ordering, Some(Ordering::Greater | Ordering::Equal))),
        _ => Err(RuntimeError::InvalidComparison(format!("unknown operator '{op}'"))),
    }
}
