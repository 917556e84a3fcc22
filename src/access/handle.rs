use crate::storage::page::{BlockId, RecordId};
use std::fmt;

/// Unique, permanent identifier of a stored row: which block and which
/// record slot within it. Derived ordering compares block first, then
/// record, matching scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    pub block_id: BlockId,
    pub record_id: RecordId,
}

impl Handle {
    pub fn new(block_id: BlockId, record_id: RecordId) -> Self {
        Self {
            block_id,
            record_id,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(block {}, record {})", self.block_id, self.record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality() {
        let h1 = Handle::new(BlockId(1), 2);
        let h2 = Handle::new(BlockId(1), 2);
        let h3 = Handle::new(BlockId(1), 3);
        let h4 = Handle::new(BlockId(2), 2);

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_ne!(h1, h4);
    }

    #[test]
    fn test_handle_ordering() {
        let h1 = Handle::new(BlockId(1), 5);
        let h2 = Handle::new(BlockId(1), 10);
        let h3 = Handle::new(BlockId(2), 3);

        assert!(h1 < h2);
        assert!(h2 < h3);
        assert!(h1 < h3);
    }
}
