//! Access layer: typed relations over heap files.
//!
//! A `HeapTable` pairs a heap file with a declared column schema and
//! translates between rows (column name to `Value` mappings) and the
//! positional byte records stored in slotted pages.

pub mod error;
pub mod handle;
pub mod heap_table;
pub mod value;

pub use error::RelationError;
pub use handle::Handle;
pub use heap_table::{Column, HeapTable};
pub use value::{DataType, Row, Value};
