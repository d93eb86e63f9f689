use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::{
    batch_propagator::BatchPropagator,
    block_change::BlockChange,
    rules::{PropagationRules, SunlightRegenRules, SunlightRules},
    world_view::PropagatorWorldView,
};
use crate::{
    terrain::{
        block::{Block, BlockRegistry},
        chunk::{face_positions, MAX_SUNLIGHT_REGEN, SUNLIGHT_REGEN_THRESHOLD},
        position_types::{ChunkPos, GlobalBlockPos},
    },
    util::face::Side,
};

/// A change to the fixed sunlight value of a voxel, caused by its regeneration value changing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SunlightSeed {
    /// The fixed value rose to the given value
    Raise(GlobalBlockPos, u8),
    /// The fixed value fell, and whatever was lit from the old value must be darkened
    Regenerate(GlobalBlockPos),
}

/// Propagator for the sunlight regeneration channel.
///
/// Regeneration only travels downwards and each voxel's value is a function of the voxel
/// directly above it, so instead of a flood fill this walks down columns recomputing values until
/// they stop changing. This handles values going down as well as up.
/// Sunlight depends on regeneration, so every change that moves a voxel's fixed sunlight value
/// is recorded as a seed for the sunlight propagator
pub struct SunlightRegenBatchPropagator<'r> {
    rules: SunlightRegenRules,
    registry: &'r BlockRegistry,
    scale: u8,
    queue: VecDeque<GlobalBlockPos>,
    queued: FxHashSet<GlobalBlockPos>,
    seeds: Vec<SunlightSeed>,
}

impl<'r> SunlightRegenBatchPropagator<'r> {
    pub fn new(registry: &'r BlockRegistry) -> Self {
        Self::with_scale(registry, 1)
    }

    pub fn with_scale(registry: &'r BlockRegistry, scale: u8) -> Self {
        Self {
            rules: SunlightRegenRules,
            registry,
            scale: scale.max(1),
            queue: VecDeque::new(),
            queued: FxHashSet::default(),
            seeds: Vec::new(),
        }
    }

    /// Queue a voxel to have its value recomputed from the voxel above
    pub fn recompute(&mut self, pos: GlobalBlockPos) {
        if self.queued.insert(pos) {
            self.queue.push_back(pos);
        }
    }

    /// Queue the top layer of the chunk below `chunk_pos`. Regeneration only crosses the bottom
    /// face of a chunk, so any other side does nothing
    pub fn propagate_between<W: PropagatorWorldView>(
        &mut self,
        world: &W,
        chunk_pos: ChunkPos,
        side: Side,
    ) {
        if side != Side::Bottom {
            return;
        }

        for local_pos in face_positions(Side::Bottom) {
            let below = GlobalBlockPos::from_local_and_chunk_pos(local_pos, chunk_pos)
                .adjacent(Side::Bottom);
            if world.value_at(below).is_some() {
                self.recompute(below);
            }
        }
    }

    /// Recompute every queued voxel and everything below it whose value changes as a result
    pub fn process<W: PropagatorWorldView>(&mut self, world: &mut W) {
        let mut changed = 0usize;

        while let Some(pos) = self.queue.pop_front() {
            self.queued.remove(&pos);

            let Some(current) = world.value_at(pos) else {
                continue;
            };
            let Some(new) = self.value_from_above(world, pos) else {
                continue;
            };
            if new == current {
                continue;
            }

            world.set_value_at(pos, new);
            changed += 1;

            let old_fixed = current.saturating_sub(SUNLIGHT_REGEN_THRESHOLD);
            let new_fixed = new.saturating_sub(SUNLIGHT_REGEN_THRESHOLD);
            if new_fixed > old_fixed {
                self.seeds.push(SunlightSeed::Raise(pos, new_fixed));
            } else if new_fixed < old_fixed {
                self.seeds.push(SunlightSeed::Regenerate(pos));
            }

            self.recompute(pos.adjacent(Side::Bottom));
        }

        log::trace!(
            "regeneration changed at {changed} voxels, {} sunlight seeds",
            self.seeds.len()
        );
    }

    /// Recompute around edits that have already been applied to the world
    pub fn process_changes<W: PropagatorWorldView>(
        &mut self,
        world: &mut W,
        changes: &[BlockChange],
    ) {
        for change in changes.iter().filter(|change| !change.is_noop()) {
            self.recompute(change.position);
            self.recompute(change.position.adjacent(Side::Bottom));
        }

        self.process(world);
    }

    pub fn seeds(&self) -> &[SunlightSeed] {
        &self.seeds
    }

    pub fn take_seeds(&mut self) -> Vec<SunlightSeed> {
        std::mem::take(&mut self.seeds)
    }

    /// Hand the collected seeds to a sunlight propagator. `world` must view the sunlight channel
    /// of the same chunks this propagator ran over. The seeds are only queued; the caller decides
    /// when to process them
    pub fn apply_seeds<W: PropagatorWorldView>(
        &mut self,
        sunlight: &mut BatchPropagator<'_, SunlightRules>,
        world: &mut W,
    ) {
        for seed in self.take_seeds() {
            match seed {
                SunlightSeed::Raise(pos, value) => sunlight.raise(world, pos, value),
                SunlightSeed::Regenerate(pos) => {
                    if let Some(existing) = world.value_at(pos) {
                        sunlight.regenerate(pos, existing);
                    }
                }
            }
        }
    }

    /// Value at `pos` given the voxel above it, or None if `pos` is unavailable. Anything above
    /// the available world is open sky
    fn value_from_above<W: PropagatorWorldView>(
        &self,
        world: &W,
        pos: GlobalBlockPos,
    ) -> Option<u8> {
        let block = self.block_at(world, pos)?;
        let above = pos.adjacent(Side::Top);
        let (above_value, above_block) =
            match (world.value_at(above), self.block_at(world, above)) {
                (Some(value), Some(block)) => (value, block),
                _ => (MAX_SUNLIGHT_REGEN, Block::AIR),
            };

        let open = self.rules.can_spread_out_of(above_block, Side::Bottom)
            && self.rules.can_spread_into(block, Side::Top);

        Some(if open {
            self.rules
                .propagate_value(above_value, Side::Bottom, above_block, self.scale)
        } else {
            0
        })
    }

    fn block_at<W: PropagatorWorldView>(&self, world: &W, pos: GlobalBlockPos) -> Option<Block> {
        world.block_at(pos).map(|id| self.registry.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{
        block::{BlockId, BLOCK_AIR},
        chunk::Chunk,
        lighting::world_view::SingleChunkView,
        position_types::LocalBlockPos,
    };

    fn open_sky_chunk() -> Chunk {
        let mut chunk = Chunk::new(ChunkPos::ZERO);
        for y in 0..64 {
            for (x, z) in [(5, 5), (5, 6), (6, 5)] {
                chunk.set_sunlight_regen(LocalBlockPos::new(x, y, z), MAX_SUNLIGHT_REGEN);
            }
        }
        chunk
    }

    fn stone(registry: &mut BlockRegistry) -> BlockId {
        registry.register("stone", Block::SOLID).unwrap()
    }

    #[test]
    fn occluder_resets_the_column_below() {
        let mut registry = BlockRegistry::new();
        let stone = stone(&mut registry);
        let mut chunk = open_sky_chunk();
        chunk.set_block(LocalBlockPos::new(5, 40, 5), stone);

        let mut propagator = SunlightRegenBatchPropagator::new(&registry);
        let mut view = SingleChunkView::new(SunlightRegenRules, &mut chunk);
        propagator.process_changes(
            &mut view,
            &[BlockChange::new(GlobalBlockPos::new(5, 40, 5), BLOCK_AIR, stone)],
        );

        // every voxel of the column from the stone down lost its sunlight
        assert_eq!(41, propagator.seeds().len());
        assert!(propagator
            .seeds()
            .iter()
            .all(|seed| matches!(seed, SunlightSeed::Regenerate(_))));

        assert_eq!(MAX_SUNLIGHT_REGEN, chunk.sunlight_regen(LocalBlockPos::new(5, 41, 5)));
        assert_eq!(0, chunk.sunlight_regen(LocalBlockPos::new(5, 40, 5)));
        assert_eq!(0, chunk.sunlight_regen(LocalBlockPos::new(5, 39, 5)));
        assert_eq!(1, chunk.sunlight_regen(LocalBlockPos::new(5, 38, 5)));
        assert_eq!(39, chunk.sunlight_regen(LocalBlockPos::new(5, 0, 5)));
        assert_eq!(MAX_SUNLIGHT_REGEN, chunk.sunlight_regen(LocalBlockPos::new(5, 0, 6)));
    }

    #[test]
    fn removing_the_occluder_restores_the_column() {
        let mut registry = BlockRegistry::new();
        let stone = stone(&mut registry);
        let mut chunk = open_sky_chunk();
        let pos = GlobalBlockPos::new(5, 40, 5);

        chunk.set_block(LocalBlockPos::new(5, 40, 5), stone);
        let mut propagator = SunlightRegenBatchPropagator::new(&registry);
        {
            let mut view = SingleChunkView::new(SunlightRegenRules, &mut chunk);
            propagator.process_changes(&mut view, &[BlockChange::new(pos, BLOCK_AIR, stone)]);
        }
        propagator.take_seeds();

        chunk.set_block(LocalBlockPos::new(5, 40, 5), BLOCK_AIR);
        let mut view = SingleChunkView::new(SunlightRegenRules, &mut chunk);
        propagator.process_changes(&mut view, &[BlockChange::new(pos, stone, BLOCK_AIR)]);

        assert_eq!(41, propagator.seeds().len());
        assert!(propagator
            .seeds()
            .iter()
            .all(|seed| matches!(seed, SunlightSeed::Raise(_, 15))));
        for y in 0..64 {
            assert_eq!(MAX_SUNLIGHT_REGEN, chunk.sunlight_regen(LocalBlockPos::new(5, y, 5)));
        }
    }

    #[test]
    fn unchanged_values_stop_the_walk() {
        let registry = BlockRegistry::new();
        let mut chunk = open_sky_chunk();
        let mut propagator = SunlightRegenBatchPropagator::new(&registry);
        let mut view = SingleChunkView::new(SunlightRegenRules, &mut chunk);

        propagator.recompute(GlobalBlockPos::new(5, 30, 5));
        propagator.process(&mut view);
        assert!(propagator.seeds().is_empty());
    }

    #[test]
    fn only_the_bottom_face_carries_regeneration() {
        let registry = BlockRegistry::new();
        let mut chunk = Chunk::new(ChunkPos::ZERO);
        let view = SingleChunkView::new(SunlightRegenRules, &mut chunk);
        let mut propagator = SunlightRegenBatchPropagator::new(&registry);

        propagator.propagate_between(&view, ChunkPos::new(0, 1, 0), Side::Left);
        assert!(propagator.queue.is_empty());

        propagator.propagate_between(&view, ChunkPos::new(0, 1, 0), Side::Bottom);
        assert_eq!(32 * 32, propagator.queue.len());
    }

    #[test]
    fn the_top_of_the_world_is_open_sky() {
        let mut registry = BlockRegistry::new();
        let stone = stone(&mut registry);
        let mut chunk = open_sky_chunk();
        let top = LocalBlockPos::new(5, 63, 5);
        chunk.set_block(top, stone);

        let mut propagator = SunlightRegenBatchPropagator::new(&registry);
        let mut view = SingleChunkView::new(SunlightRegenRules, &mut chunk);
        propagator.process_changes(
            &mut view,
            &[BlockChange::new(GlobalBlockPos::new(5, 63, 5), BLOCK_AIR, stone)],
        );

        assert_eq!(0, chunk.sunlight_regen(top));
        assert_eq!(0, chunk.sunlight_regen(LocalBlockPos::new(5, 62, 5)));
        assert_eq!(1, chunk.sunlight_regen(LocalBlockPos::new(5, 61, 5)));
    }
}
