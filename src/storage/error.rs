//! Storage layer error types.

use crate::storage::page::BlockId;
use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no room in page: requires {required} bytes but only {available} available")]
    NoRoom { required: usize, available: usize },

    #[error("invalid record id {record_id} (page has {max} allocated)")]
    InvalidRecordId { record_id: u16, max: u16 },

    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("corrupt page header in block {block_id}: {reason}")]
    CorruptPage { block_id: BlockId, reason: String },

    #[error("heap file already exists: {0}")]
    AlreadyExists(String),

    #[error("heap file not found: {0}")]
    NotFound(String),

    #[error("heap file is not open: {0}")]
    NotOpen(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
