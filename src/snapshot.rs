//! Binary catalog persistence (§4.7): `.save` writes every resident table to
//! a single file, `.open` reconstructs tables from one.
//!
//! Numeric fields are 8-byte little-endian throughout — the source this
//! format is modeled on leaves endianness host-dependent (§9's Open
//! Questions); little-endian is the resolution chosen here for snapshot
//! portability across machines.

use std::{
    error::Error,
    fmt::Display,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::{debug, trace};

use crate::schema::{Column, Schema};
use crate::storage::{Catalog, Table};
use crate::value::ColumnType;

/// Wraps a writer, counting every byte that passes through — used only to
/// report the snapshot's total size via `log::debug!`.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Wraps a reader, counting every byte consumed — the `open` counterpart of
/// [`CountingWriter`].
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Corrupt(String),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "I/O failure: {e}"),
            SnapshotError::Corrupt(msg) => write!(f, "corrupt snapshot: {msg}"),
        }
    }
}

impl Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

const TYPE_TAG_INT: u8 = 0;
const TYPE_TAG_FLOAT: u8 = 1;
const TYPE_TAG_VARCHAR: u8 = 2;

/// `.save <path>` (§4.7): serializes every resident table.
pub fn save(catalog: &Catalog, path: &Path) -> SnapshotResult<()> {
    let file = File::create(path)?;
    let mut out = CountingWriter { inner: BufWriter::new(file), count: 0 };

    write_u64(&mut out, catalog.len() as u64)?;
    for table in catalog.tables() {
        write_table(&mut out, table)?;
    }
    out.flush()?;
    debug!(
        "saved {} table(s) to {} ({} bytes)",
        catalog.len(),
        path.display(),
        out.count
    );
    Ok(())
}

/// `.open <path>` (§4.7): reconstructs tables from a snapshot file. Returns
/// the tables to be absorbed into a catalog; does NOT implicitly clear
/// whatever tables are already resident (a documented wart — callers wanting
/// a clean restore issue `.clear` first).
pub fn open(path: &Path) -> SnapshotResult<Vec<Table>> {
    let file = File::open(path)?;
    let mut input = CountingReader { inner: BufReader::new(file), count: 0 };

    let table_count = read_u64(&mut input)?;
    let mut tables = Vec::with_capacity(table_count as usize);
    for _ in 0..table_count {
        tables.push(read_table(&mut input)?);
    }
    debug!(
        "loaded {} table(s) from {} ({} bytes)",
        tables.len(),
        path.display(),
        input.count
    );
    Ok(tables)
}

fn write_table<W: Write>(out: &mut W, table: &Table) -> SnapshotResult<()> {
    write_schema(out, table.schema())?;
    write_u64(out, table.nb_rows() as u64)?;
    write_u64(out, table.capacity() as u64)?;
    write_u64(out, table.row_width() as u64)?;
    out.write_all(table.raw_rows())?;
    trace!(
        "wrote table '{}': {} row(s), {} byte(s) of row data",
        table.schema().table_name,
        table.nb_rows(),
        table.raw_rows().len()
    );
    Ok(())
}

fn read_table<R: Read>(input: &mut R) -> SnapshotResult<Table> {
    let schema = read_schema(input)?;
    let nb_rows = read_u64(input)? as usize;
    let capacity = read_u64(input)? as usize;
    let row_width = read_u64(input)? as usize;

    if row_width != schema.row_width() {
        return Err(SnapshotError::Corrupt(format!(
            "row width {row_width} does not match schema width {}",
            schema.row_width()
        )));
    }

    let mut rows = vec![0u8; row_width * capacity];
    input.read_exact(&mut rows[..row_width * nb_rows])?;
    trace!(
        "read table '{}': {} row(s), {} byte(s) of row data",
        schema.table_name,
        nb_rows,
        row_width * nb_rows
    );
    Ok(Table::from_parts(schema, rows, nb_rows, capacity))
}

fn write_schema<W: Write>(out: &mut W, schema: &Schema) -> SnapshotResult<()> {
    write_string(out, &schema.table_name)?;
    write_u64(out, schema.columns.len() as u64)?;
    for column in &schema.columns {
        write_string(out, &column.name)?;
        match column.ty {
            ColumnType::Int => {
                out.write_all(&[TYPE_TAG_INT])?;
                write_u64(out, 8)?;
            }
            ColumnType::Float => {
                out.write_all(&[TYPE_TAG_FLOAT])?;
                write_u64(out, 8)?;
            }
            ColumnType::Varchar(n) => {
                out.write_all(&[TYPE_TAG_VARCHAR])?;
                write_u64(out, n as u64)?;
            }
        }
    }
    Ok(())
}

fn read_schema<R: Read>(input: &mut R) -> SnapshotResult<Schema> {
    let table_name = read_string(input)?;
    let column_count = read_u64(input)?;
    let mut columns = Vec::with_capacity(column_count as usize);
    for _ in 0..column_count {
        let name = read_string(input)?;
        let mut tag = [0u8; 1];
        input.read_exact(&mut tag)?;
        let width = read_u64(input)? as usize;
        let ty = match tag[0] {
            TYPE_TAG_INT => ColumnType::Int,
            TYPE_TAG_FLOAT => ColumnType::Float,
            TYPE_TAG_VARCHAR => ColumnType::Varchar(width),
            other => return Err(SnapshotError::Corrupt(format!("unknown type tag {other}"))),
        };
        columns.push(Column::new(name, ty));
    }
    Ok(Schema::new(table_name, columns))
}

fn write_u64<W: Write>(out: &mut W, value: u64) -> SnapshotResult<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u64<R: Read>(input: &mut R) -> SnapshotResult<u64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn write_string<W: Write>(out: &mut W, s: &str) -> SnapshotResult<()> {
    write_u64(out, s.len() as u64)?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(input: &mut R) -> SnapshotResult<String> {
    let len = read_u64(input)? as usize;
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| SnapshotError::Corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn round_trips_a_populated_catalog() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("qdb-snapshot-test-{}.bin", std::process::id()));

        let mut catalog = Catalog::new();
        let schema = Schema::new(
            "u",
            vec![
                Column::new("a", ColumnType::Int),
                Column::new("b", ColumnType::Varchar(16)),
            ],
        );
        catalog.create(schema).unwrap();
        catalog
            .insert("u", &[Value::Int(1), Value::Text("hi".into())])
            .unwrap();
        catalog
            .insert("u", &[Value::Int(2), Value::Text("there".into())])
            .unwrap();

        save(&catalog, &path).unwrap();
        let tables = open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(tables.len(), 1);
        let rows: Vec<_> = tables[0].scan().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Value::Int(1), Value::Text("hi".into())]);
        assert_eq!(rows[1], vec![Value::Int(2), Value::Text("there".into())]);
    }
}
