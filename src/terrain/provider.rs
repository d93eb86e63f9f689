use rustc_hash::FxHashMap;

use super::{
    block::{BlockId, BlockRegistry},
    chunk::Chunk,
    lighting::{
        batch_propagator::BatchPropagator,
        block_change::BlockChange,
        merger::LightMerger,
        regen_propagator::SunlightRegenBatchPropagator,
        rules::{LightRules, SunlightRegenRules, SunlightRules},
        world_view::{neighbourhood_offset, FullWorldView, NEIGHBOURHOOD_LEN},
        LightingError,
    },
    position_types::{ChunkPos, GlobalBlockPos},
};

/// Source of loaded chunks by position
pub trait ChunkProvider {
    fn chunk(&self, pos: ChunkPos) -> Option<&Chunk>;
    fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk>;
}

/// Result of asking the store to merge a chunk with its neighbours
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// Some neighbours are not loaded yet, so the merge did not happen
    Deferred { missing: Vec<ChunkPos> },
}

/// The chunks currently loaded in memory
#[derive(Clone, Debug, Default)]
pub struct ChunkStore {
    chunks: FxHashMap<ChunkPos, Chunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk, returning the chunk it replaced if there was one
    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.position(), chunk)
    }

    pub fn remove(&mut self, pos: ChunkPos) -> Option<Chunk> {
        self.chunks.remove(&pos)
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    pub fn block_at(&self, pos: GlobalBlockPos) -> Option<BlockId> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        self.chunk(chunk_pos).map(|chunk| chunk.block(local_pos))
    }

    /// Replace the block at the given position, returning the change to hand to
    /// `update_lighting`. Returns None if the chunk is not loaded
    pub fn set_block(&mut self, pos: GlobalBlockPos, id: BlockId) -> Option<BlockChange> {
        let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
        let chunk = self.chunk_mut(chunk_pos)?;
        let from = chunk.set_block(local_pos, id);

        Some(BlockChange::new(pos, from, id))
    }

    /// Neighbours of `centre` (and `centre` itself) that are not loaded
    pub fn missing_neighbours(&self, centre: ChunkPos) -> Vec<ChunkPos> {
        (0..NEIGHBOURHOOD_LEN)
            .map(|index| centre + ChunkPos::from(neighbourhood_offset(index)))
            .filter(|pos| !self.contains(*pos))
            .collect()
    }

    /// Remove the 3x3x3 neighbourhood around `centre` from the store, in canonical order.
    /// Slots for chunks that are not loaded are empty
    pub fn take_neighbourhood(&mut self, centre: ChunkPos) -> [Option<Chunk>; NEIGHBOURHOOD_LEN] {
        array_init::array_init(|index| {
            self.chunks
                .remove(&(centre + ChunkPos::from(neighbourhood_offset(index))))
        })
    }

    /// Put back chunks taken with `take_neighbourhood`
    pub fn restore_neighbourhood(&mut self, chunks: impl IntoIterator<Item = Option<Chunk>>) {
        for chunk in chunks.into_iter().flatten() {
            self.insert(chunk);
        }
    }

    /// Merge the lighting of `centre` with its neighbours. Chunks at the edge of the loaded world
    /// are left alone until all of their neighbours are loaded
    pub fn merge(
        &mut self,
        merger: &LightMerger,
        centre: ChunkPos,
    ) -> Result<MergeOutcome, LightingError> {
        let missing = self.missing_neighbours(centre);
        if !missing.is_empty() {
            log::trace!("deferred merge of {centre:?}, {} neighbours missing", missing.len());
            return Ok(MergeOutcome::Deferred { missing });
        }

        let mut chunks = self.take_neighbourhood(centre);
        let result = merger.merge(&mut chunks);
        self.restore_neighbourhood(chunks);

        result.map(|()| MergeOutcome::Merged)
    }

    /// Relight around edits that have already been applied to the store
    pub fn update_lighting(&mut self, registry: &BlockRegistry, changes: &[BlockChange]) {
        let mut light = BatchPropagator::new(LightRules, registry);
        light.process_changes(&mut FullWorldView::new(LightRules, self), changes);

        let mut regen = SunlightRegenBatchPropagator::new(registry);
        regen.process_changes(&mut FullWorldView::new(SunlightRegenRules, self), changes);

        let mut view = FullWorldView::new(SunlightRules, self);
        let mut sunlight = BatchPropagator::new(SunlightRules, registry);
        regen.apply_seeds(&mut sunlight, &mut view);
        sunlight.process_changes(&mut view, changes);

        log::debug!("relit around {} block changes", changes.len());
    }
}

impl ChunkProvider for ChunkStore {
    fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }
}
