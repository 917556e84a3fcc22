use crate::storage::disk::{FileBlockStore, BLOCK_SIZE};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::{BlockId, SlottedPage};
use log::debug;
use std::path::{Path, PathBuf};

/// The ordered block sequence backing one relation.
///
/// Blocks are numbered 1..=last with no gaps. Pages handed out by `get`
/// and `get_new` are owned by the caller; mutations persist only after
/// `put` writes the page back.
pub struct HeapFile {
    name: String,
    path: PathBuf,
    store: Option<FileBlockStore>,
    last: u32,
}

impl HeapFile {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: dir.join(format!("{name}.db")),
            store: None,
            last: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Creates the backing store and allocates block 1.
    pub fn create(&mut self) -> StorageResult<()> {
        self.store = Some(FileBlockStore::create(&self.path)?);
        self.last = 0;
        // The first page only needs to exist on disk; get_new persists it.
        self.get_new()?;
        debug!("created heap file {}", self.name);
        Ok(())
    }

    /// No-op if already open; otherwise reads the highest block id from
    /// the store.
    pub fn open(&mut self) -> StorageResult<()> {
        if self.store.is_some() {
            return Ok(());
        }
        let store = FileBlockStore::open(&self.path)?;
        self.last = store.num_blocks()?;
        self.store = Some(store);
        debug!("opened heap file {} with {} blocks", self.name, self.last);
        Ok(())
    }

    pub fn close(&mut self) {
        self.store = None;
    }

    /// Closes the file and removes every persisted block. Irrecoverable.
    pub fn drop_file(&mut self) -> StorageResult<()> {
        self.close();
        self.last = 0;
        debug!("dropping heap file {}", self.name);
        FileBlockStore::remove(&self.path)
    }

    pub fn last_block_id(&self) -> BlockId {
        BlockId(self.last)
    }

    /// Allocates the next block id, persists a freshly initialized page
    /// there, and returns the page to the caller.
    pub fn get_new(&mut self) -> StorageResult<SlottedPage> {
        let block_id = BlockId(self.last + 1);
        let page = SlottedPage::new(block_id);
        self.store_mut()?.write_block(block_id, page.data())?;
        self.last = block_id.0;
        debug!("allocated block {} in heap file {}", block_id, self.name);
        Ok(page)
    }

    /// Fetches and parses an existing block.
    pub fn get(&mut self, block_id: BlockId) -> StorageResult<SlottedPage> {
        if block_id.0 == 0 || block_id.0 > self.last {
            return Err(StorageError::BlockNotFound(block_id));
        }
        let mut buf = Box::new([0u8; BLOCK_SIZE]);
        self.store_mut()?.read_block(block_id, &mut buf)?;
        SlottedPage::from_bytes(buf, block_id)
    }

    /// Writes the page's in-memory image back to its block.
    pub fn put(&mut self, page: &SlottedPage) -> StorageResult<()> {
        self.store_mut()?.write_block(page.block_id(), page.data())
    }

    /// All block ids of this file, in order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (1..=self.last).map(BlockId)
    }

    fn store_mut(&mut self) -> StorageResult<&mut FileBlockStore> {
        self.store
            .as_mut()
            .ok_or_else(|| StorageError::NotOpen(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_allocates_first_block() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;

        assert_eq!(file.last_block_id(), BlockId(1));
        let page = file.get(BlockId(1))?;
        assert_eq!(page.num_records(), 0);
        Ok(())
    }

    #[test]
    fn test_create_duplicate_fails() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;

        let mut again = HeapFile::new(dir.path(), "t");
        assert!(matches!(
            again.create(),
            Err(StorageError::AlreadyExists(_))
        ));
        Ok(())
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        let mut file = HeapFile::new(dir.path(), "missing");
        assert!(matches!(file.open(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_open_is_idempotent() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;
        file.open()?;
        file.open()?;
        assert!(file.is_open());
        Ok(())
    }

    #[test]
    fn test_closed_file_rejects_io() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;
        file.close();
        assert!(matches!(file.get_new(), Err(StorageError::NotOpen(_))));
        Ok(())
    }

    #[test]
    fn test_get_new_is_sequential() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;

        let b2 = file.get_new()?;
        let b3 = file.get_new()?;
        assert_eq!(b2.block_id(), BlockId(2));
        assert_eq!(b3.block_id(), BlockId(3));
        assert_eq!(file.block_ids().collect::<Vec<_>>(), vec![BlockId(1), BlockId(2), BlockId(3)]);
        Ok(())
    }

    #[test]
    fn test_get_out_of_range() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;
        assert!(matches!(
            file.get(BlockId(2)),
            Err(StorageError::BlockNotFound(BlockId(2)))
        ));
        assert!(matches!(
            file.get(BlockId(0)),
            Err(StorageError::BlockNotFound(BlockId(0)))
        ));
        Ok(())
    }

    #[test]
    fn test_put_persists_mutation() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;

        let mut page = file.get(BlockId(1))?;
        let id = page.add(b"durable record")?;

        // Not written back yet: a fresh fetch sees the empty page.
        assert_eq!(file.get(BlockId(1))?.num_records(), 0);

        file.put(&page)?;
        let reloaded = file.get(BlockId(1))?;
        assert_eq!(reloaded.get(id)?, Some(&b"durable record"[..]));
        Ok(())
    }

    #[test]
    fn test_last_recovered_on_open() -> StorageResult<()> {
        let dir = tempdir()?;
        {
            let mut file = HeapFile::new(dir.path(), "t");
            file.create()?;
            file.get_new()?;
            file.get_new()?;
        }
        {
            let mut file = HeapFile::new(dir.path(), "t");
            file.open()?;
            assert_eq!(file.last_block_id(), BlockId(3));
        }
        Ok(())
    }

    #[test]
    fn test_drop_then_open_fails() -> StorageResult<()> {
        let dir = tempdir()?;
        let mut file = HeapFile::new(dir.path(), "t");
        file.create()?;
        file.drop_file()?;

        let mut reopened = HeapFile::new(dir.path(), "t");
        assert!(matches!(reopened.open(), Err(StorageError::NotFound(_))));
        Ok(())
    }
}
