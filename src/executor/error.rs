use std::{error::Error, fmt::Display};

use crate::snapshot::SnapshotError;
use crate::storage::StorageError;

/// A runtime failure (§7): unknown table, duplicate table, arity mismatch,
/// unknown column, type error in a predicate, invalid comparison, primary-key
/// violation, a malformed tree the parser is supposed to rule out, or I/O
/// failure on snapshot (§7 groups snapshot I/O under runtime errors too).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    Storage(StorageError),
    TypeError(String),
    InvalidComparison(String),
    EmptyAttributeList,
    Malformed(String),
    Snapshot(String),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Storage(e) => write!(f, "{e}"),
            RuntimeError::TypeError(msg) => write!(f, "type error: {msg}"),
            RuntimeError::InvalidComparison(msg) => write!(f, "invalid comparison: {msg}"),
            RuntimeError::EmptyAttributeList => write!(f, "a table needs at least one column"),
            RuntimeError::Malformed(msg) => write!(f, "malformed statement tree: {msg}"),
            RuntimeError::Snapshot(msg) => write!(f, "{msg}"),
        }
    }
}

impl Error for RuntimeError {}

impl From<StorageError> for RuntimeError {
    fn from(e: StorageError) -> Self {
        RuntimeError::Storage(e)
    }
}

impl From<SnapshotError> for RuntimeError {
    fn from(e: SnapshotError) -> Self {
        RuntimeError::Snapshot(e.to_string())
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
