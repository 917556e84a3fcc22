//! Row and schema validation errors.

use crate::access::handle::Handle;
use crate::access::value::DataType;
use thiserror::Error;

/// Errors raised when a row does not satisfy a relation's schema, or a
/// handle does not name a live row. These abort the operation with no
/// partial mutation.
#[derive(Error, Debug)]
pub enum RelationError {
    #[error("missing column in row: {column}")]
    MissingColumn { column: String },

    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("type mismatch for column {column}: expected {expected}")]
    TypeMismatch { column: String, expected: DataType },

    #[error("cannot store value for column {column}: unsupported data type")]
    UnsupportedType { column: String },

    #[error("text value for column {column} too long: {len} bytes")]
    TextTooLong { column: String, len: usize },

    #[error("no record at handle {handle}")]
    RecordNotFound { handle: Handle },
}
