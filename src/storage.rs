//! Storage layer for minirel.
//!
//! Persistence is organized around fixed-size 4096-byte blocks:
//!
//! - **FileBlockStore**: reads and writes whole blocks in one file per relation
//! - **SlottedPage**: slotted record format over a single block, with a
//!   compacting free-space manager
//! - **HeapFile**: the ordered block sequence backing one relation
//!
//! Pages fetched from a heap file are exclusively owned by the caller and
//! must be written back explicitly for mutations to persist.

pub mod disk;
pub mod error;
pub mod heap_file;
pub mod page;

pub use disk::{FileBlockStore, BLOCK_SIZE};
pub use error::{StorageError, StorageResult};
pub use heap_file::HeapFile;
pub use page::{BlockId, RecordId, SlottedPage};
