//! Statement execution (§4.6): dispatches a parsed [`AstNode`] against the
//! [`Catalog`], evaluating `WHERE` predicates via [`predicate::eval`].

mod error;
mod predicate;

pub use error::{RuntimeError, RuntimeResult};

use std::io::Write;

use crate::parser::{AstKind, AstNode};
use crate::schema::{Column, Schema};
use crate::storage::Catalog;
use crate::value::{ColumnType, Value};

/// Executes one parsed statement against `catalog`. `SELECT` writes its
/// result table directly to `out` as it scans — if a predicate fails partway
/// through, whatever was already written stays (§4.6), and the error still
/// propagates as a failed command.
pub fn execute<W: Write>(catalog: &mut Catalog, ast: &AstNode, out: &mut W) -> RuntimeResult<()> {
    match ast.kind {
        AstKind::Create => execute_create(catalog, table_name_node(ast)?),
        AstKind::Insert => execute_insert(catalog, table_name_node(ast)?),
        AstKind::Select => execute_select(catalog, table_name_node(ast)?, out),
        AstKind::Update => execute_update(catalog, table_name_node(ast)?),
        AstKind::Delete => execute_delete(catalog, table_name_node(ast)?),
        AstKind::Drop => execute_drop(catalog, table_name_node(ast)?),
        other => Err(RuntimeError::Malformed(format!("'{other}' is not a statement root"))),
    }
}

fn table_name_node(ast: &AstNode) -> RuntimeResult<&AstNode> {
    ast.left
        .as_deref()
        .filter(|n| n.kind == AstKind::TableName)
        .ok_or_else(|| RuntimeError::Malformed("statement missing its table-name node".into()))
}

// ---- CREATE -----------------------------------------------------------

fn execute_create(catalog: &mut Catalog, table_name_node: &AstNode) -> RuntimeResult<()> {
    if table_name_node.int_value == 0 {
        return Err(RuntimeError::EmptyAttributeList);
    }
    let first_column = table_name_node
        .left
        .as_deref()
        .ok_or_else(|| RuntimeError::Malformed("CREATE has no column descriptors".into()))?;
    let columns = extract_columns(first_column)?;
    let schema = Schema::new(table_name_node.lexeme.clone(), columns);
    catalog.create(schema)?;
    Ok(())
}

/// Columns and their type nodes interleave via `left`: `col0 -> type0 ->
/// col1 -> type1 -> ...` (§4.2), unlike the simple literal/assignment
/// chains elsewhere in the tree.
fn extract_columns(first: &AstNode) -> RuntimeResult<Vec<Column>> {
    let mut columns = Vec::new();
    let mut current = Some(first);

    while let Some(col_node) = current {
        let type_node = col_node
            .left
            .as_deref()
            .ok_or_else(|| RuntimeError::Malformed("column missing a type node".into()))?;
        let ty = build_column_type(type_node)?;
        columns.push(Column::new(col_node.lexeme.clone(), ty));
        current = type_node.left.as_deref();
    }

    Ok(columns)
}

fn build_column_type(type_node: &AstNode) -> RuntimeResult<ColumnType> {
    match type_node.lexeme.as_str() {
        "INT" => Ok(ColumnType::Int),
        "FLOAT" => Ok(ColumnType::Float),
        "VARCHAR" => {
            let width_node = type_node
                .left
                .as_deref()
                .ok_or_else(|| RuntimeError::Malformed("VARCHAR missing a width".into()))?;
            Ok(ColumnType::Varchar(width_node.int_value as usize))
        }
        other => Err(RuntimeError::Malformed(format!("unknown column type tag '{other}'"))),
    }
}

// ---- INSERT ------------------------------------------------------------

fn execute_insert(catalog: &mut Catalog, table_name_node: &AstNode) -> RuntimeResult<()> {
    let schema = catalog
        .find(&table_name_node.lexeme)
        .ok_or_else(|| RuntimeError::from(crate::storage::StorageError::UnknownTable(table_name_node.lexeme.clone())))?
        .schema()
        .clone();

    let literal_nodes = table_name_node.left_chain();
    if literal_nodes.len() != schema.columns.len() {
        return Err(RuntimeError::from(crate::storage::StorageError::ArityMismatch {
            expected: schema.columns.len(),
            found: literal_nodes.len(),
        }));
    }

    let values = literal_nodes
        .iter()
        .zip(&schema.columns)
        .map(|(node, column)| predicate::literal_value(node, &column.ty))
        .collect::<RuntimeResult<Vec<Value>>>()?;

    catalog.insert(&table_name_node.lexeme, &values)?;
    Ok(())
}

// ---- SELECT --------------------------------------------------------------

fn execute_select<W: Write>(
    catalog: &Catalog,
    table_name_node: &AstNode,
    out: &mut W,
) -> RuntimeResult<()> {
    let table = catalog
        .find(&table_name_node.lexeme)
        .ok_or_else(|| RuntimeError::from(crate::storage::StorageError::UnknownTable(table_name_node.lexeme.clone())))?;
    let schema = table.schema();

    let projection = table_name_node
        .left
        .as_deref()
        .ok_or_else(|| RuntimeError::Malformed("SELECT has no projection".into()))?;
    let columns = resolve_projection(projection, schema)?;
    let indices: Vec<usize> = columns
        .iter()
        .map(|name| schema.index_of(name).expect("projection validated against schema"))
        .collect();

    print_header(out, &columns);

    for row in table.scan() {
        if let Some(condition) = table_name_node.right.as_deref() {
            let root = condition
                .left
                .as_deref()
                .ok_or_else(|| RuntimeError::Malformed("WHERE has no condition root".into()))?;
            if !predicate::eval(root, schema, &row)? {
                continue;
            }
        }
        let projected: Vec<Value> = indices.iter().map(|&i| row[i].clone()).collect();
        print_row(out, &projected);
    }
    print_rule(out, columns.len());
    Ok(())
}

fn resolve_projection(projection: &AstNode, schema: &Schema) -> RuntimeResult<Vec<String>> {
    let first = projection
        .left
        .as_deref()
        .ok_or_else(|| RuntimeError::Malformed("empty projection".into()))?;

    if first.kind == AstKind::AllCols {
        return Ok(schema.columns.iter().map(|c| c.name.clone()).collect());
    }

    let mut names = vec![first.lexeme.clone()];
    names.extend(first.left_chain().into_iter().map(|n| n.lexeme.clone()));
    for name in &names {
        if schema.index_of(name).is_none() {
            return Err(RuntimeError::TypeError(format!("unknown column '{name}'")));
        }
    }
    Ok(names)
}

fn column_width(name: &str) -> usize {
    name.len().max(8)
}

fn print_header<W: Write>(out: &mut W, columns: &[String]) {
    print_rule(out, columns.len());
    let _ = write!(out, "|");
    for name in columns {
        let _ = write!(out, " {:^width$} |", name, width = column_width(name));
    }
    let _ = writeln!(out);
    print_rule(out, columns.len());
}

fn print_row<W: Write>(out: &mut W, values: &[Value]) {
    let _ = write!(out, "|");
    for value in values {
        let rendered = value.to_string();
        let _ = write!(out, " {:^width$} |", rendered, width = column_width(&rendered));
    }
    let _ = writeln!(out);
}

fn print_rule<W: Write>(out: &mut W, columns: usize) {
    let _ = write!(out, "+");
    for _ in 0..columns {
        let _ = write!(out, "----------+");
    }
    let _ = writeln!(out);
}

// ---- UPDATE --------------------------------------------------------------

fn execute_update(catalog: &mut Catalog, table_name_node: &AstNode) -> RuntimeResult<()> {
    let schema = catalog
        .find(&table_name_node.lexeme)
        .ok_or_else(|| RuntimeError::from(crate::storage::StorageError::UnknownTable(table_name_node.lexeme.clone())))?
        .schema()
        .clone();

    let set_node = table_name_node
        .left
        .as_deref()
        .ok_or_else(|| RuntimeError::Malformed("UPDATE has no SET node".into()))?;
    let first_assignment = set_node
        .left
        .as_deref()
        .ok_or_else(|| RuntimeError::Malformed("SET has no assignments".into()))?;

    let mut assignments = Vec::new();
    for assignment in std::iter::once(first_assignment).chain(first_assignment.left_chain()) {
        let index = schema
            .index_of(&assignment.lexeme)
            .ok_or_else(|| RuntimeError::TypeError(format!("unknown column '{}'", assignment.lexeme)))?;
        let literal_node = assignment
            .right
            .as_deref()
            .ok_or_else(|| RuntimeError::Malformed("assignment missing a value".into()))?;
        let value = predicate::literal_value(literal_node, &schema.columns[index].ty)?;
        assignments.push((index, value));
    }

    let condition_root = match table_name_node.right.as_deref() {
        Some(condition) => Some(
            condition
                .left
                .as_deref()
                .ok_or_else(|| RuntimeError::Malformed("WHERE has no condition root".into()))?,
        ),
        None => None,
    };

    let table = catalog.find_mut(&table_name_node.lexeme).expect("checked above");
    table.update_where(&assignments, |row| match condition_root {
        Some(root) => predicate::eval(root, &schema, row),
        None => Ok(true),
    })?;
    Ok(())
}

// ---- DELETE --------------------------------------------------------------

fn execute_delete(catalog: &mut Catalog, table_name_node: &AstNode) -> RuntimeResult<()> {
    let schema = catalog
        .find(&table_name_node.lexeme)
        .ok_or_else(|| RuntimeError::from(crate::storage::StorageError::UnknownTable(table_name_node.lexeme.clone())))?
        .schema()
        .clone();

    let table = catalog.find_mut(&table_name_node.lexeme).expect("checked above");
    if table.nb_rows() == 0 {
        return Err(RuntimeError::from(crate::storage::StorageError::TableEmpty(
            table_name_node.lexeme.clone(),
        )));
    }

    match table_name_node.right.as_deref() {
        None => table.clear_rows(),
        Some(condition) => {
            let root = condition
                .left
                .as_deref()
                .ok_or_else(|| RuntimeError::Malformed("WHERE has no condition root".into()))?;
            table.delete_where(|row| predicate::eval(root, &schema, row))?;
        }
    }
    Ok(())
}

// ---- DROP ------------------------------------------------------------------

fn execute_drop(catalog: &mut Catalog, table_name_node: &AstNode) -> RuntimeResult<()> {
    if catalog.is_empty() {
        return Err(RuntimeError::from(crate::storage::StorageError::UnknownTable(
            table_name_node.lexeme.clone(),
        )));
    }
    catalog.drop_table(&table_name_node.lexeme)?;
    Ok(())
}
