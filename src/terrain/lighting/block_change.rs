use crate::terrain::{block::BlockId, position_types::GlobalBlockPos};

/// An edit that has already been applied to the world and whose lighting is now stale
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockChange {
    pub position: GlobalBlockPos,
    pub from: BlockId,
    pub to: BlockId,
}

impl BlockChange {
    pub fn new(position: GlobalBlockPos, from: BlockId, to: BlockId) -> Self {
        Self { position, from, to }
    }

    /// True if the edit replaced a block with the same block
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}
