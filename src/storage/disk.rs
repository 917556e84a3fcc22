use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::BlockId;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Fixed block size for all storage files.
pub const BLOCK_SIZE: usize = 4096;

/// Whole-block file I/O for one relation. Blocks are 1-based; block `n`
/// lives at file offset `(n - 1) * BLOCK_SIZE`.
pub struct FileBlockStore {
    file: File,
}

impl FileBlockStore {
    /// Creates the backing file, failing if it already exists.
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.display().to_string()),
                _ => StorageError::Io(e),
            })?;
        Ok(Self { file })
    }

    /// Opens an existing backing file.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
                _ => StorageError::Io(e),
            })?;
        Ok(Self { file })
    }

    /// Removes the backing file and every block persisted in it.
    pub fn remove(path: &Path) -> StorageResult<()> {
        std::fs::remove_file(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
            _ => StorageError::Io(e),
        })
    }

    pub fn read_block(&mut self, block_id: BlockId, buf: &mut [u8; BLOCK_SIZE]) -> StorageResult<()> {
        let offset = Self::block_offset(block_id)?;
        if offset >= self.file.metadata()?.len() {
            return Err(StorageError::BlockNotFound(block_id));
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    pub fn write_block(&mut self, block_id: BlockId, data: &[u8; BLOCK_SIZE]) -> StorageResult<()> {
        let offset = Self::block_offset(block_id)?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Number of blocks currently persisted; doubles as the highest
    /// allocated block id.
    pub fn num_blocks(&self) -> StorageResult<u32> {
        let file_size = self.file.metadata()?.len();
        Ok((file_size / BLOCK_SIZE as u64) as u32)
    }

    fn block_offset(block_id: BlockId) -> StorageResult<u64> {
        if block_id.0 == 0 {
            return Err(StorageError::BlockNotFound(block_id));
        }
        Ok((block_id.0 as u64 - 1) * BLOCK_SIZE as u64)
    }
}
