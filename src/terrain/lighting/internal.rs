use itertools::iproduct;

use super::{
    batch_propagator::BatchPropagator,
    rules::{LightRules, PropagationRules, SunlightRegenRules, SunlightRules},
    world_view::SingleChunkView,
};
use crate::{
    terrain::{
        block::{Block, BlockRegistry},
        chunk::{Chunk, CHUNK_SIZE, MAX_SUNLIGHT_REGEN},
        position_types::{GlobalBlockPos, LocalBlockPos},
    },
    util::face::Side,
};

/// Lights a freshly generated chunk on its own, assuming open sky above it and nothing around it.
/// Light from neighbouring chunks is brought in afterwards by `LightMerger`
pub struct InternalLightProcessor<'r> {
    registry: &'r BlockRegistry,
    scale: u8,
}

impl<'r> InternalLightProcessor<'r> {
    pub fn new(registry: &'r BlockRegistry) -> Self {
        Self::with_scale(registry, 1)
    }

    pub fn with_scale(registry: &'r BlockRegistry, scale: u8) -> Self {
        Self {
            registry,
            scale: scale.max(1),
        }
    }

    /// Compute regeneration, then sunlight, then block light for the chunk
    pub fn generate_internal_lighting(&self, chunk: &mut Chunk) {
        self.populate_sunlight_regen(chunk);
        self.populate_sunlight(chunk);
        self.populate_light(chunk);
        chunk.deflate();

        log::trace!("lit chunk {:?} internally", chunk.position());
    }

    /// Walk every column from the top of the chunk down. Open sky above the chunk is assumed, so
    /// the run of open voxels below it holds the ceiling until the first voxel the column cannot
    /// pass into, below which regeneration starts over from zero
    pub fn populate_sunlight_regen(&self, chunk: &mut Chunk) {
        let rules = SunlightRegenRules;
        let top = CHUNK_SIZE.y as u32 - 1;

        for (x, z) in iproduct!(0..CHUNK_SIZE.x as u32, 0..CHUNK_SIZE.z as u32) {
            let mut regen = MAX_SUNLIGHT_REGEN;
            // open sky above the chunk
            let mut last_block = Block::AIR;

            for y in (0..=top).rev() {
                let pos = LocalBlockPos::new(x, y, z);
                let block = self.registry.get(chunk.block(pos));

                regen = if rules.can_spread_out_of(last_block, Side::Bottom)
                    && rules.can_spread_into(block, Side::Top)
                {
                    rules.propagate_value(regen, Side::Bottom, last_block, self.scale)
                } else {
                    0
                };

                chunk.set_sunlight_regen(pos, regen);
                last_block = block;
            }
        }
    }

    /// Store the fixed sunlight value of every voxel, then flood it out
    pub fn populate_sunlight(&self, chunk: &mut Chunk) {
        let mut propagator = BatchPropagator::with_scale(SunlightRules, self.registry, self.scale);
        self.seed_fixed_values(chunk, &mut propagator);
    }

    /// Store the luminance of every light source, then flood it out
    pub fn populate_light(&self, chunk: &mut Chunk) {
        let mut propagator = BatchPropagator::with_scale(LightRules, self.registry, self.scale);
        self.seed_fixed_values(chunk, &mut propagator);
    }

    fn seed_fixed_values<R: PropagationRules>(
        &self,
        chunk: &mut Chunk,
        propagator: &mut BatchPropagator<'_, R>,
    ) {
        let rules = propagator.rules();
        let chunk_pos = chunk.position();
        let mut sources = 0usize;

        for (y, x, z) in iproduct!(
            0..CHUNK_SIZE.y as u32,
            0..CHUNK_SIZE.x as u32,
            0..CHUNK_SIZE.z as u32
        ) {
            let pos = LocalBlockPos::new(x, y, z);
            let block = self.registry.get(chunk.block(pos));
            let fixed = rules.fixed_value(block, chunk, pos);

            if fixed > 0 {
                rules.set_value(chunk, pos, fixed);
                let global_pos = GlobalBlockPos::from_local_and_chunk_pos(pos, chunk_pos);
                propagator.propagate_from(global_pos, fixed);
                sources += 1;
            }
        }

        log::trace!("{sources} sources in {chunk_pos:?}");

        let mut view = SingleChunkView::new(rules, chunk);
        propagator.process(&mut view);
    }
}
