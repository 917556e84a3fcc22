use crate::storage::disk::BLOCK_SIZE;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::{BlockId, RecordId};

// Block header: 2 bytes num_records + 2 bytes end_free at the front,
// followed by one (size, location) pair per allocated record id. The
// entry for record id k lives at offset 4*k.
const NUM_RECORDS_OFFSET: usize = 0;
const END_FREE_OFFSET: usize = 2;
const HEADER_ENTRY_SIZE: usize = 4;

/// Size field value marking a tombstoned slot. The slot's location is
/// retained so compaction keeps every entry's relative order intact.
const DELETED_SENTINEL: u16 = u16::MAX;

/// Slotted record storage over a single block.
///
/// Records are packed from the back of the block while the header grows
/// from the front; `end_free` is the offset of the last free byte between
/// them. Live records are always contiguous and end at `BLOCK_SIZE - 1`,
/// so deleting or resizing a record slides everything between it and the
/// free boundary.
pub struct SlottedPage {
    data: Box<[u8; BLOCK_SIZE]>,
    block_id: BlockId,
    num_records: u16,
    end_free: u16,
}

impl SlottedPage {
    /// Initializes an empty page over a zeroed block.
    pub fn new(block_id: BlockId) -> Self {
        let mut page = Self {
            data: Box::new([0u8; BLOCK_SIZE]),
            block_id,
            num_records: 0,
            end_free: (BLOCK_SIZE - 1) as u16,
        };
        page.put_block_header();
        page
    }

    /// Parses an existing block image, rejecting headers whose values
    /// cannot describe a well-formed page.
    pub fn from_bytes(data: Box<[u8; BLOCK_SIZE]>, block_id: BlockId) -> StorageResult<Self> {
        let num_records = u16::from_le_bytes([data[NUM_RECORDS_OFFSET], data[NUM_RECORDS_OFFSET + 1]]);
        let end_free = u16::from_le_bytes([data[END_FREE_OFFSET], data[END_FREE_OFFSET + 1]]);

        if end_free as usize >= BLOCK_SIZE {
            return Err(StorageError::CorruptPage {
                block_id,
                reason: format!("end_free {} out of range", end_free),
            });
        }
        let header_end = HEADER_ENTRY_SIZE * (num_records as usize + 1);
        if header_end > end_free as usize + 1 {
            return Err(StorageError::CorruptPage {
                block_id,
                reason: format!("header for {} records overlaps the record area", num_records),
            });
        }

        let page = Self {
            data,
            block_id,
            num_records,
            end_free,
        };
        for id in 1..=num_records {
            let (size, loc) = page.get_entry(id);
            if size == DELETED_SENTINEL {
                continue;
            }
            if (loc as usize) <= end_free as usize || loc as usize + size as usize > BLOCK_SIZE {
                return Err(StorageError::CorruptPage {
                    block_id,
                    reason: format!("record {} at {}..{} outside the record area", id, loc, loc as usize + size as usize),
                });
            }
        }
        Ok(page)
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// The raw block image, suitable for writing back to the block store.
    pub fn data(&self) -> &[u8; BLOCK_SIZE] {
        &self.data
    }

    pub fn num_records(&self) -> u16 {
        self.num_records
    }

    /// Bytes available for a new record after accounting for its header entry.
    pub fn free_space(&self) -> usize {
        self.end_free as usize + 1 - HEADER_ENTRY_SIZE * (self.num_records as usize + 1)
    }

    /// True iff one more header entry plus `size` payload bytes fit without
    /// the free boundary crossing the header boundary.
    pub fn has_room(&self, size: usize) -> bool {
        let new_header_end = HEADER_ENTRY_SIZE * (self.num_records as usize + 2);
        let end_free = self.end_free as usize;
        if size > end_free {
            return false;
        }
        end_free + 1 - size >= new_header_end
    }

    /// Stores a record and returns its id. Ids are assigned in strictly
    /// increasing order and never reused.
    pub fn add(&mut self, record: &[u8]) -> StorageResult<RecordId> {
        if !self.has_room(record.len()) {
            return Err(StorageError::NoRoom {
                required: record.len() + HEADER_ENTRY_SIZE,
                available: self.free_space(),
            });
        }
        let id = self.num_records + 1;
        self.num_records = id;
        let size = record.len() as u16;
        self.end_free -= size;
        let loc = self.end_free + 1;
        self.data[loc as usize..loc as usize + record.len()].copy_from_slice(record);
        self.put_block_header();
        self.put_entry(id, size, loc);
        Ok(id)
    }

    /// Returns the record's bytes, or `None` if the slot is tombstoned.
    pub fn get(&self, id: RecordId) -> StorageResult<Option<&[u8]>> {
        self.check_id(id)?;
        let (size, loc) = self.get_entry(id);
        if size == DELETED_SENTINEL {
            return Ok(None);
        }
        Ok(Some(&self.data[loc as usize..loc as usize + size as usize]))
    }

    /// Replaces a live record's content in place, sliding neighbors to keep
    /// the record area packed against the end of the block.
    pub fn put(&mut self, id: RecordId, record: &[u8]) -> StorageResult<()> {
        let (old_size, old_loc) = self.live_entry(id)?;
        let new_size = record.len();

        if new_size > old_size {
            let extra = new_size - old_size;
            // No new header entry is needed, so check the raw free space
            // rather than has_room.
            if extra > self.free_space() {
                return Err(StorageError::NoRoom {
                    required: extra,
                    available: self.free_space(),
                });
            }
            self.slide(old_loc, old_loc - extra);
            let (_, loc) = self.get_entry(id);
            self.data[loc as usize..loc as usize + new_size].copy_from_slice(record);
            self.put_entry(id, new_size as u16, loc);
        } else {
            self.data[old_loc..old_loc + new_size].copy_from_slice(record);
            self.slide(old_loc + new_size, old_loc + old_size);
            let (_, loc) = self.get_entry(id);
            self.put_entry(id, new_size as u16, loc);
        }
        Ok(())
    }

    /// Tombstones the slot and compacts the freed bytes out of the record
    /// area. The tombstone keeps the freed region's tail as its location.
    pub fn del(&mut self, id: RecordId) -> StorageResult<()> {
        let (size, loc) = self.live_entry(id)?;
        self.put_entry(id, DELETED_SENTINEL, (loc + size) as u16);
        self.slide(loc, loc + size);
        Ok(())
    }

    /// All live record ids in ascending order.
    pub fn ids(&self) -> Vec<RecordId> {
        (1..=self.num_records)
            .filter(|&id| self.get_entry(id).0 != DELETED_SENTINEL)
            .collect()
    }

    /// Moves the packed bytes `[end_free+1, start)` so the range ends at
    /// `end` instead of `start`, then adjusts every header entry whose
    /// location is at or below `start` by the same shift. `end < start`
    /// opens a gap (record growth); `end > start` closes one (shrink or
    /// delete).
    fn slide(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let shift = end as isize - start as isize;
        let lo = self.end_free as usize + 1;
        self.data.copy_within(lo..start, (lo as isize + shift) as usize);

        for id in 1..=self.num_records {
            let (size, loc) = self.get_entry(id);
            if loc as usize <= start {
                self.put_entry(id, size, (loc as isize + shift) as u16);
            }
        }
        self.end_free = (self.end_free as isize + shift) as u16;
        self.put_block_header();
    }

    fn check_id(&self, id: RecordId) -> StorageResult<()> {
        if id == 0 || id > self.num_records {
            return Err(StorageError::InvalidRecordId {
                record_id: id,
                max: self.num_records,
            });
        }
        Ok(())
    }

    /// Header entry for a record that must be live, as usize offsets.
    fn live_entry(&self, id: RecordId) -> StorageResult<(usize, usize)> {
        self.check_id(id)?;
        let (size, loc) = self.get_entry(id);
        if size == DELETED_SENTINEL {
            return Err(StorageError::InvalidRecordId {
                record_id: id,
                max: self.num_records,
            });
        }
        Ok((size as usize, loc as usize))
    }

    fn get_n(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    fn put_n(&mut self, offset: usize, n: u16) {
        self.data[offset..offset + 2].copy_from_slice(&n.to_le_bytes());
    }

    fn get_entry(&self, id: RecordId) -> (u16, u16) {
        let offset = HEADER_ENTRY_SIZE * id as usize;
        (self.get_n(offset), self.get_n(offset + 2))
    }

    fn put_entry(&mut self, id: RecordId, size: u16, loc: u16) {
        let offset = HEADER_ENTRY_SIZE * id as usize;
        self.put_n(offset, size);
        self.put_n(offset + 2, loc);
    }

    fn put_block_header(&mut self) {
        let num_records = self.num_records;
        let end_free = self.end_free;
        self.put_n(NUM_RECORDS_OFFSET, num_records);
        self.put_n(END_FREE_OFFSET, end_free);
    }
}
