pub mod slotted;

use std::fmt;

/// 1-based identifier of a block within one heap file. Block ids are
/// assigned monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based, page-local record number. Strictly increasing per page and
/// never reassigned, even after deletion.
pub type RecordId = u16;

pub use slotted::SlottedPage;
