use glam::IVec3;

use super::rules::PropagationRules;
use crate::terrain::{
    block::{Block, BlockId},
    chunk::Chunk,
    position_types::{ChunkPos, GlobalBlockPos, LocalBlockPos},
    provider::ChunkProvider,
};

/// Number of chunks in a 3x3x3 neighbourhood
pub const NEIGHBOURHOOD_LEN: usize = 27;
/// Slot of the centre chunk in a neighbourhood
pub const NEIGHBOURHOOD_CENTRE: usize = 13;

/// Slot of the chunk at `offset` from the centre of a 3x3x3 neighbourhood, ordered by x then y
/// then z. Returns None if any component of the offset is outside -1..=1
pub fn neighbourhood_index(offset: IVec3) -> Option<usize> {
    if offset.abs().max_element() > 1 {
        return None;
    }

    let shifted = offset + IVec3::ONE;
    Some((shifted.x * 9 + shifted.y * 3 + shifted.z) as usize)
}

/// Inverse of `neighbourhood_index`
pub fn neighbourhood_offset(index: usize) -> IVec3 {
    let index = index as i32;
    IVec3::new(index / 9, (index / 3) % 3, index % 3) - IVec3::ONE
}

/// Read/write access to one light channel, scoped to some set of chunks.
/// Positions outside the scope are unavailable
pub trait PropagatorWorldView {
    fn value_at(&self, pos: GlobalBlockPos) -> Option<u8>;

    /// Writes to unavailable positions are ignored
    fn set_value_at(&mut self, pos: GlobalBlockPos, value: u8);

    fn block_at(&self, pos: GlobalBlockPos) -> Option<BlockId>;

    /// Fixed value of the channel at the given position, for a voxel holding `block`
    fn fixed_value_at(&self, block: Block, pos: GlobalBlockPos) -> u8;
}

fn read<R: PropagationRules>(
    rules: R,
    located: Option<(&Chunk, LocalBlockPos)>,
) -> Option<u8> {
    located.map(|(chunk, local_pos)| rules.value(chunk, local_pos))
}

fn write<R: PropagationRules>(
    rules: R,
    located: Option<(&mut Chunk, LocalBlockPos)>,
    pos: GlobalBlockPos,
    value: u8,
) {
    match located {
        Some((chunk, local_pos)) => rules.set_value(chunk, local_pos, value),
        None => log::warn!("ignored light write outside of the view at {pos:?}"),
    }
}

fn fixed<R: PropagationRules>(
    rules: R,
    located: Option<(&Chunk, LocalBlockPos)>,
    block: Block,
) -> u8 {
    located.map_or(0, |(chunk, local_pos)| {
        rules.fixed_value(block, chunk, local_pos)
    })
}

/// View of a single chunk, with no knowledge of its neighbours
pub struct SingleChunkView<'c, R> {
    rules: R,
    chunk: &'c mut Chunk,
}

impl<'c, R: PropagationRules> SingleChunkView<'c, R> {
    pub fn new(rules: R, chunk: &'c mut Chunk) -> Self {
        Self { rules, chunk }
    }

    fn locate(&self, pos: GlobalBlockPos) -> Option<(&Chunk, LocalBlockPos)> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        (chunk_pos == self.chunk.position()).then_some((&*self.chunk, local_pos))
    }

    fn locate_mut(&mut self, pos: GlobalBlockPos) -> Option<(&mut Chunk, LocalBlockPos)> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        (chunk_pos == self.chunk.position()).then_some((&mut *self.chunk, local_pos))
    }
}

impl<R: PropagationRules> PropagatorWorldView for SingleChunkView<'_, R> {
    fn value_at(&self, pos: GlobalBlockPos) -> Option<u8> {
        read(self.rules, self.locate(pos))
    }

    fn set_value_at(&mut self, pos: GlobalBlockPos, value: u8) {
        let rules = self.rules;
        write(rules, self.locate_mut(pos), pos, value)
    }

    fn block_at(&self, pos: GlobalBlockPos) -> Option<BlockId> {
        self.locate(pos)
            .map(|(chunk, local_pos)| chunk.block(local_pos))
    }

    fn fixed_value_at(&self, block: Block, pos: GlobalBlockPos) -> u8 {
        fixed(self.rules, self.locate(pos), block)
    }
}

/// View of a 3x3x3 neighbourhood of chunks around a centre chunk.
/// Slots are laid out by `neighbourhood_index`; empty slots are unavailable
pub struct LocalChunkView<'c, R> {
    rules: R,
    chunks: &'c mut [Option<Chunk>],
    centre: ChunkPos,
}

impl<'c, R: PropagationRules> LocalChunkView<'c, R> {
    pub fn new(rules: R, chunks: &'c mut [Option<Chunk>], centre: ChunkPos) -> Self {
        Self {
            rules,
            chunks,
            centre,
        }
    }

    fn slot(&self, chunk_pos: ChunkPos) -> Option<usize> {
        neighbourhood_index((chunk_pos - self.centre).as_ivec3())
    }

    fn locate(&self, pos: GlobalBlockPos) -> Option<(&Chunk, LocalBlockPos)> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        let slot = self.slot(chunk_pos)?;
        self.chunks
            .get(slot)?
            .as_ref()
            .map(|chunk| (chunk, local_pos))
    }

    fn locate_mut(&mut self, pos: GlobalBlockPos) -> Option<(&mut Chunk, LocalBlockPos)> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        let slot = self.slot(chunk_pos)?;
        self.chunks
            .get_mut(slot)?
            .as_mut()
            .map(|chunk| (chunk, local_pos))
    }
}

impl<R: PropagationRules> PropagatorWorldView for LocalChunkView<'_, R> {
    fn value_at(&self, pos: GlobalBlockPos) -> Option<u8> {
        read(self.rules, self.locate(pos))
    }

    fn set_value_at(&mut self, pos: GlobalBlockPos, value: u8) {
        let rules = self.rules;
        write(rules, self.locate_mut(pos), pos, value)
    }

    fn block_at(&self, pos: GlobalBlockPos) -> Option<BlockId> {
        self.locate(pos)
            .map(|(chunk, local_pos)| chunk.block(local_pos))
    }

    fn fixed_value_at(&self, block: Block, pos: GlobalBlockPos) -> u8 {
        fixed(self.rules, self.locate(pos), block)
    }
}

/// View of every chunk a provider has loaded
pub struct FullWorldView<'p, R, P> {
    rules: R,
    provider: &'p mut P,
}

impl<'p, R: PropagationRules, P: ChunkProvider> FullWorldView<'p, R, P> {
    pub fn new(rules: R, provider: &'p mut P) -> Self {
        Self { rules, provider }
    }

    fn locate(&self, pos: GlobalBlockPos) -> Option<(&Chunk, LocalBlockPos)> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        self.provider
            .chunk(chunk_pos)
            .map(|chunk| (chunk, local_pos))
    }

    fn locate_mut(&mut self, pos: GlobalBlockPos) -> Option<(&mut Chunk, LocalBlockPos)> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        self.provider
            .chunk_mut(chunk_pos)
            .map(|chunk| (chunk, local_pos))
    }
}

impl<R: PropagationRules, P: ChunkProvider> PropagatorWorldView for FullWorldView<'_, R, P> {
    fn value_at(&self, pos: GlobalBlockPos) -> Option<u8> {
        read(self.rules, self.locate(pos))
    }

    fn set_value_at(&mut self, pos: GlobalBlockPos, value: u8) {
        let rules = self.rules;
        write(rules, self.locate_mut(pos), pos, value)
    }

    fn block_at(&self, pos: GlobalBlockPos) -> Option<BlockId> {
        self.locate(pos)
            .map(|(chunk, local_pos)| chunk.block(local_pos))
    }

    fn fixed_value_at(&self, block: Block, pos: GlobalBlockPos) -> u8 {
        fixed(self.rules, self.locate(pos), block)
    }
}
