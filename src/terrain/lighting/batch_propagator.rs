use rustc_hash::FxHashSet;

use super::{
    block_change::BlockChange,
    rules::{PropagationComparison, PropagationRules},
    world_view::PropagatorWorldView,
};
use crate::{
    terrain::{
        block::{Block, BlockRegistry},
        chunk::face_positions,
        position_types::{ChunkPos, GlobalBlockPos},
    },
    util::face::Side,
};

/// Worklist flood fill for one light channel.
///
/// Positions waiting to spread are bucketed by the value they spread with, strongest first,
/// so every voxel settles on its final value the first time it is written. Positions waiting
/// to be darkened are bucketed the same way by the value they used to hold, and all
/// darkening runs before any spreading.
pub struct BatchPropagator<'r, R> {
    rules: R,
    registry: &'r BlockRegistry,
    scale: u8,
    increase_queues: Vec<FxHashSet<GlobalBlockPos>>,
    reduce_queues: Vec<FxHashSet<GlobalBlockPos>>,
}

impl<'r, R: PropagationRules> BatchPropagator<'r, R> {
    pub fn new(rules: R, registry: &'r BlockRegistry) -> Self {
        Self::with_scale(rules, registry, 1)
    }

    /// `scale` is the level of detail factor: block light loses this much per voxel crossed
    pub fn with_scale(rules: R, registry: &'r BlockRegistry, scale: u8) -> Self {
        let buckets = rules.max_value() as usize;

        Self {
            rules,
            registry,
            scale: scale.max(1),
            increase_queues: vec![FxHashSet::default(); buckets],
            reduce_queues: vec![FxHashSet::default(); buckets],
        }
    }

    pub fn rules(&self) -> R {
        self.rules
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// True if nothing is waiting to be processed
    pub fn is_idle(&self) -> bool {
        self.increase_queues.iter().all(FxHashSet::is_empty)
            && self.reduce_queues.iter().all(FxHashSet::is_empty)
    }

    /// Queue a voxel to spread the given value, which must already be stored in the world
    pub fn propagate_from(&mut self, pos: GlobalBlockPos, value: u8) {
        if value > 1 && value <= self.rules.max_value() {
            self.increase_queues[(self.rules.max_value() - value) as usize].insert(pos);
        }
    }

    /// Store the fixed value of `block` at `pos` and queue it for spreading, if that raises the
    /// stored value
    pub fn propagate_from_block<W: PropagatorWorldView>(
        &mut self,
        world: &mut W,
        pos: GlobalBlockPos,
        block: Block,
    ) {
        let fixed = world.fixed_value_at(block, pos);
        self.raise(world, pos, fixed);
    }

    /// Store `value` at `pos` and queue it for spreading, if that raises the stored value
    pub fn raise<W: PropagatorWorldView>(&mut self, world: &mut W, pos: GlobalBlockPos, value: u8) {
        if world.value_at(pos).is_some_and(|existing| value > existing) {
            self.increase(world, pos, value.min(self.rules.max_value()));
        }
    }

    /// Queue a voxel that used to hold `old_value` for darkening. Everything that took its
    /// value from it is darkened on the next `process` and then refilled from whatever light
    /// remains around the darkened region
    pub fn regenerate(&mut self, pos: GlobalBlockPos, old_value: u8) {
        self.reduce(pos, old_value);
    }

    /// Review edits that have already been applied to the world and relight around them
    pub fn process_changes<W: PropagatorWorldView>(
        &mut self,
        world: &mut W,
        changes: &[BlockChange],
    ) {
        for change in changes.iter().filter(|change| !change.is_noop()) {
            self.review_change(world, change);
        }

        self.process(world);
    }

    /// Seed the voxels of the chunk across `side` of `chunk_pos` with the light leaving that face.
    /// Call with the neighbour's position and `side.reverse()` to seed in the other direction
    pub fn propagate_between<W: PropagatorWorldView>(
        &mut self,
        world: &mut W,
        chunk_pos: ChunkPos,
        side: Side,
    ) {
        let mut seeded = 0usize;

        for local_pos in face_positions(side) {
            let pos = GlobalBlockPos::from_local_and_chunk_pos(local_pos, chunk_pos);
            let Some(value) = world.value_at(pos) else {
                continue;
            };
            if value == 0 {
                continue;
            }
            let Some(block) = self.block_at(world, pos) else {
                continue;
            };

            if self.try_spread(world, pos, block, value, side) {
                seeded += 1;
            }
        }

        log::trace!("seeded {seeded} voxels across {side:?} of {chunk_pos:?}");
    }

    /// Run every queued darkening and then every queued spread to completion
    pub fn process<W: PropagatorWorldView>(&mut self, world: &mut W) {
        if self.reduce_queues.iter().any(|queue| !queue.is_empty()) {
            self.process_reduction(world);
        }
        if self.increase_queues.iter().any(|queue| !queue.is_empty()) {
            self.process_increase(world);
        }
    }

    fn review_change<W: PropagatorWorldView>(&mut self, world: &mut W, change: &BlockChange) {
        let pos = change.position;
        let Some(existing) = world.value_at(pos) else {
            return;
        };

        let from = self.registry.get(change.from);
        let to = self.registry.get(change.to);

        let new_fixed = world.fixed_value_at(to, pos);
        if new_fixed > existing {
            self.increase(world, pos, new_fixed);
        }

        let old_fixed = world.fixed_value_at(from, pos);
        if new_fixed < old_fixed {
            self.reduce(pos, old_fixed);
        }

        for side in Side::ALL {
            let adjacent = pos.adjacent(side);

            match self.rules.compare_propagation(to, from, side) {
                PropagationComparison::MoreRestricted if existing > 0 => {
                    self.reduce(pos, existing);

                    let expected = self.rules.propagate_value(existing, side, from, self.scale);
                    if let Some(adjacent_value) = world.value_at(adjacent) {
                        if adjacent_value == expected {
                            self.reduce(adjacent, adjacent_value);
                        }
                    }
                }
                PropagationComparison::MorePermissive => {
                    self.propagate_from(pos, existing);
                    if let Some(adjacent_value) = world.value_at(adjacent) {
                        self.propagate_from(adjacent, adjacent_value);
                    }
                }
                _ => (),
            }
        }
    }

    fn process_reduction<W: PropagatorWorldView>(&mut self, world: &mut W) {
        let max = self.rules.max_value();
        let mut purged = 0usize;
        let mut depth = 0;

        while depth < max as usize {
            let old_value = max - depth as u8;
            let to_process = std::mem::take(&mut self.reduce_queues[depth]);

            if to_process.is_empty() {
                depth += 1;
                continue;
            }

            purged += to_process.len();
            for pos in to_process {
                self.purge(world, pos, old_value);
            }

            if self.reduce_queues[depth].is_empty() {
                depth += 1;
            }
        }

        log::trace!("darkened {purged} voxels");
    }

    fn purge<W: PropagatorWorldView>(&mut self, world: &mut W, pos: GlobalBlockPos, old_value: u8) {
        self.increase_queues[(self.rules.max_value() - old_value) as usize].remove(&pos);

        let Some(block) = self.block_at(world, pos) else {
            return;
        };

        let fixed = world.fixed_value_at(block, pos);
        if fixed > 0 {
            self.increase(world, pos, fixed);
        } else {
            world.set_value_at(pos, 0);
        }

        for side in Side::ALL {
            if !self.rules.can_spread_out_of(block, side) {
                continue;
            }

            let adjacent = pos.adjacent(side);
            let Some(adjacent_value) = world.value_at(adjacent) else {
                continue;
            };

            let expected = self.rules.propagate_value(old_value, side, block, self.scale);
            let adjacent_receives = self
                .block_at(world, adjacent)
                .is_some_and(|adjacent_block| {
                    self.rules.can_spread_into(adjacent_block, side.reverse())
                });

            if adjacent_value == expected && adjacent_receives {
                self.reduce(adjacent, expected);
            } else if adjacent_value > 0 {
                self.propagate_from(adjacent, adjacent_value);
            }
        }
    }

    fn process_increase<W: PropagatorWorldView>(&mut self, world: &mut W) {
        let max = self.rules.max_value();
        let mut spread = 0usize;
        let mut depth = 0;

        // a value of 1 has nothing left to give
        while depth + 1 < max as usize {
            let value = max - depth as u8;
            let to_process = std::mem::take(&mut self.increase_queues[depth]);

            if to_process.is_empty() {
                depth += 1;
                continue;
            }

            spread += to_process.len();
            for pos in to_process {
                self.push(world, pos, value);
            }

            if self.increase_queues[depth].is_empty() {
                depth += 1;
            }
        }

        log::trace!("spread light from {spread} voxels");
    }

    fn push<W: PropagatorWorldView>(&mut self, world: &mut W, pos: GlobalBlockPos, value: u8) {
        let Some(block) = self.block_at(world, pos) else {
            return;
        };

        for side in Side::ALL {
            self.try_spread(world, pos, block, value, side);
        }
    }

    /// Raise the voxel across `side` of `pos` to the value arriving from `pos`, returning whether
    /// it was raised
    fn try_spread<W: PropagatorWorldView>(
        &mut self,
        world: &mut W,
        pos: GlobalBlockPos,
        block: Block,
        value: u8,
        side: Side,
    ) -> bool {
        if !self.rules.can_spread_out_of(block, side) {
            return false;
        }

        let propagated = self.rules.propagate_value(value, side, block, self.scale);
        let adjacent = pos.adjacent(side);

        let improves = world
            .value_at(adjacent)
            .is_some_and(|adjacent_value| adjacent_value < propagated);
        if !improves {
            return false;
        }

        let receives = self.block_at(world, adjacent).is_some_and(|adjacent_block| {
            self.rules.can_spread_into(adjacent_block, side.reverse())
        });
        if !receives {
            return false;
        }

        self.increase(world, adjacent, propagated);
        true
    }

    fn increase<W: PropagatorWorldView>(&mut self, world: &mut W, pos: GlobalBlockPos, value: u8) {
        world.set_value_at(pos, value);
        self.propagate_from(pos, value);
    }

    fn reduce(&mut self, pos: GlobalBlockPos, old_value: u8) {
        if old_value > 0 && old_value <= self.rules.max_value() {
            self.reduce_queues[(self.rules.max_value() - old_value) as usize].insert(pos);
        }
    }

    fn block_at<W: PropagatorWorldView>(&self, world: &W, pos: GlobalBlockPos) -> Option<Block> {
        world.block_at(pos).map(|id| self.registry.get(id))
    }
}
