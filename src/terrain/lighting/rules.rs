use crate::{
    terrain::{
        block::Block,
        chunk::{Chunk, MAX_LIGHT, MAX_SUNLIGHT, MAX_SUNLIGHT_REGEN, SUNLIGHT_REGEN_THRESHOLD},
        position_types::LocalBlockPos,
    },
    util::face::Side,
};

/// How replacing one block with another changes propagation across a side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationComparison {
    Identical,
    MorePermissive,
    MoreRestricted,
}

/// Decay, occlusion and ceiling policy of one light channel
pub trait PropagationRules: Copy {
    /// Value a voxel holds by itself, regardless of its surroundings
    fn fixed_value(&self, block: Block, chunk: &Chunk, pos: LocalBlockPos) -> u8;

    /// Value that arrives in the neighbouring voxel when `existing` crosses `side` of `from`
    fn propagate_value(&self, existing: u8, side: Side, from: Block, scale: u8) -> u8;

    fn max_value(&self) -> u8;

    fn can_spread_out_of(&self, block: Block, side: Side) -> bool;

    fn can_spread_into(&self, block: Block, side: Side) -> bool;

    fn compare_propagation(
        &self,
        new_block: Block,
        old_block: Block,
        side: Side,
    ) -> PropagationComparison {
        compare_occlusion(new_block, old_block, side)
    }

    fn value(&self, chunk: &Chunk, pos: LocalBlockPos) -> u8;

    fn set_value(&self, chunk: &mut Chunk, pos: LocalBlockPos, value: u8);
}

fn compare_occlusion(new_block: Block, old_block: Block, side: Side) -> PropagationComparison {
    let new_full = new_block.is_full_side(side);
    let old_full = old_block.is_full_side(side);

    match (new_block.is_translucent(), old_block.is_translucent()) {
        (true, true) => PropagationComparison::Identical,
        (true, false) if old_full => PropagationComparison::MorePermissive,
        (false, true) if new_full => PropagationComparison::MoreRestricted,
        (false, false) if new_full && !old_full => PropagationComparison::MoreRestricted,
        (false, false) if old_full && !new_full => PropagationComparison::MorePermissive,
        _ => PropagationComparison::Identical,
    }
}

fn passes_through(block: Block, side: Side) -> bool {
    block.is_translucent() || !block.is_full_side(side)
}

/// Light emitted by luminous blocks
#[derive(Clone, Copy, Debug, Default)]
pub struct LightRules;

impl PropagationRules for LightRules {
    fn fixed_value(&self, block: Block, _chunk: &Chunk, _pos: LocalBlockPos) -> u8 {
        block.luminance()
    }

    fn propagate_value(&self, existing: u8, _side: Side, _from: Block, scale: u8) -> u8 {
        existing.saturating_sub(scale)
    }

    fn max_value(&self) -> u8 {
        MAX_LIGHT
    }

    fn can_spread_out_of(&self, block: Block, side: Side) -> bool {
        block.luminance() > 0 || passes_through(block, side)
    }

    fn can_spread_into(&self, block: Block, side: Side) -> bool {
        passes_through(block, side)
    }

    fn value(&self, chunk: &Chunk, pos: LocalBlockPos) -> u8 {
        chunk.light(pos)
    }

    fn set_value(&self, chunk: &mut Chunk, pos: LocalBlockPos, value: u8) {
        chunk.set_light(pos, value)
    }
}

/// Sunlight, sourced wherever the regeneration channel rises over its threshold
#[derive(Clone, Copy, Debug, Default)]
pub struct SunlightRules;

impl PropagationRules for SunlightRules {
    fn fixed_value(&self, _block: Block, chunk: &Chunk, pos: LocalBlockPos) -> u8 {
        chunk
            .sunlight_regen(pos)
            .saturating_sub(SUNLIGHT_REGEN_THRESHOLD)
    }

    fn propagate_value(&self, existing: u8, _side: Side, _from: Block, _scale: u8) -> u8 {
        existing.saturating_sub(1)
    }

    fn max_value(&self) -> u8 {
        MAX_SUNLIGHT
    }

    fn can_spread_out_of(&self, block: Block, side: Side) -> bool {
        passes_through(block, side)
    }

    fn can_spread_into(&self, block: Block, side: Side) -> bool {
        passes_through(block, side)
    }

    fn value(&self, chunk: &Chunk, pos: LocalBlockPos) -> u8 {
        chunk.sunlight(pos)
    }

    fn set_value(&self, chunk: &mut Chunk, pos: LocalBlockPos, value: u8) {
        chunk.set_sunlight(pos, value)
    }
}

/// Sunlight regeneration. Only ever travels downwards: pinned at the ceiling under open sky,
/// reset to zero by an occluder, and rebuilt one step per open voxel below it
#[derive(Clone, Copy, Debug, Default)]
pub struct SunlightRegenRules;

impl PropagationRules for SunlightRegenRules {
    fn fixed_value(&self, _block: Block, _chunk: &Chunk, _pos: LocalBlockPos) -> u8 {
        0
    }

    fn propagate_value(&self, existing: u8, side: Side, _from: Block, scale: u8) -> u8 {
        if side == Side::Bottom {
            existing.saturating_add(scale).min(MAX_SUNLIGHT_REGEN)
        } else {
            0
        }
    }

    fn max_value(&self) -> u8 {
        MAX_SUNLIGHT_REGEN
    }

    fn can_spread_out_of(&self, block: Block, side: Side) -> bool {
        passes_through(block, side)
    }

    fn can_spread_into(&self, block: Block, side: Side) -> bool {
        passes_through(block, side)
    }

    fn value(&self, chunk: &Chunk, pos: LocalBlockPos) -> u8 {
        chunk.sunlight_regen(pos)
    }

    fn set_value(&self, chunk: &mut Chunk, pos: LocalBlockPos, value: u8) {
        chunk.set_sunlight_regen(pos, value)
    }
}
