use std::ops::RangeInclusive;

use glam::IVec3;
use itertools::iproduct;

use self::light_store::LightLayer;
use super::{
    block::{BlockId, BLOCK_AIR},
    position_types::{ChunkPos, LocalBlockPos},
};
use crate::util::{face::Side, size::Size3};

pub mod light_store;

pub const CHUNK_SIZE: Size3 = Size3::new(32, 64, 32);
pub const CHUNK_SIZE_IVEC3: IVec3 = CHUNK_SIZE.as_ivec3();
pub const CHUNK_VOLUME: usize = CHUNK_SIZE.product();

/// Ceiling of the block light channel
pub const MAX_LIGHT: u8 = 15;
/// Ceiling of the sunlight channel
pub const MAX_SUNLIGHT: u8 = 15;
/// Ceiling of the sunlight regeneration channel
pub const MAX_SUNLIGHT_REGEN: u8 = 63;
/// Regeneration values above this produce sunlight
pub const SUNLIGHT_REGEN_THRESHOLD: u8 = MAX_SUNLIGHT_REGEN - MAX_SUNLIGHT;

/// Every local position on the face of a chunk toward the given side
pub fn face_positions(side: Side) -> impl Iterator<Item = LocalBlockPos> {
    let normal = side.direction();
    let last = CHUNK_SIZE_IVEC3 - IVec3::ONE;
    let range = |axis: usize| -> RangeInclusive<u32> {
        match normal[axis] {
            1 => last[axis] as u32..=last[axis] as u32,
            -1 => 0..=0,
            _ => 0..=last[axis] as u32,
        }
    };

    iproduct!(range(0), range(1), range(2)).map(|(x, y, z)| LocalBlockPos::new(x, y, z))
}

#[derive(Clone, Debug)]
pub struct Chunk {
    position: ChunkPos,
    blocks: Box<[BlockId]>,
    light: LightLayer,
    sunlight: LightLayer,
    sunlight_regen: LightLayer,
}

impl Chunk {
    /// A chunk filled with air and no light
    pub fn new(position: ChunkPos) -> Self {
        Self::filled(position, BLOCK_AIR)
    }

    pub fn filled(position: ChunkPos, block: BlockId) -> Self {
        Self {
            position,
            blocks: vec![block; CHUNK_VOLUME].into_boxed_slice(),
            light: LightLayer::new(MAX_LIGHT),
            sunlight: LightLayer::new(MAX_SUNLIGHT),
            sunlight_regen: LightLayer::new(MAX_SUNLIGHT_REGEN),
        }
    }

    /// Returns this chunk's position
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    pub fn block(&self, pos: LocalBlockPos) -> BlockId {
        self.blocks[pos.get_array_index()]
    }

    /// Replace the block at the given position, returning the previous block.
    /// Lighting is not updated
    pub fn set_block(&mut self, pos: LocalBlockPos, id: BlockId) -> BlockId {
        std::mem::replace(&mut self.blocks[pos.get_array_index()], id)
    }

    pub fn light(&self, pos: LocalBlockPos) -> u8 {
        self.light.get(pos)
    }

    pub fn set_light(&mut self, pos: LocalBlockPos, value: u8) {
        self.light.set(pos, value)
    }

    pub fn sunlight(&self, pos: LocalBlockPos) -> u8 {
        self.sunlight.get(pos)
    }

    pub fn set_sunlight(&mut self, pos: LocalBlockPos, value: u8) {
        self.sunlight.set(pos, value)
    }

    pub fn sunlight_regen(&self, pos: LocalBlockPos) -> u8 {
        self.sunlight_regen.get(pos)
    }

    pub fn set_sunlight_regen(&mut self, pos: LocalBlockPos, value: u8) {
        self.sunlight_regen.set(pos, value)
    }

    /// Compact the sunlight layer if it turned out to hold a single value
    pub fn deflate_sunlight(&mut self) {
        self.sunlight.deflate();
    }

    /// Compact every light layer
    pub fn deflate(&mut self) {
        self.light.deflate();
        self.sunlight.deflate();
        self.sunlight_regen.deflate();
    }

    pub fn light_layers(&self) -> [&LightLayer; 3] {
        [&self.light, &self.sunlight, &self.sunlight_regen]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regen_threshold() {
        assert_eq!(48, SUNLIGHT_REGEN_THRESHOLD);
        assert_eq!(32 * 64 * 32, CHUNK_VOLUME);
    }

    #[test]
    fn face_positions_cover_one_layer() {
        let top: Vec<_> = face_positions(Side::Top).collect();
        assert_eq!(CHUNK_SIZE.x * CHUNK_SIZE.z, top.len());
        assert!(top.iter().all(|pos| pos.as_uvec3().y == 63));

        let left: Vec<_> = face_positions(Side::Left).collect();
        assert_eq!(CHUNK_SIZE.y * CHUNK_SIZE.z, left.len());
        assert!(left.iter().all(|pos| pos.as_uvec3().x == 0));
    }

    #[test]
    fn set_block_returns_previous() {
        let mut chunk = Chunk::new(ChunkPos::new(1, 0, -1));
        let pos = LocalBlockPos::new(4, 4, 4);
        assert_eq!(BLOCK_AIR, chunk.set_block(pos, BlockId(2)));
        assert_eq!(BlockId(2), chunk.set_block(pos, BLOCK_AIR));
    }

    #[test]
    fn channels_are_independent() {
        let mut chunk = Chunk::new(ChunkPos::ZERO);
        let pos = LocalBlockPos::new(0, 63, 0);
        chunk.set_light(pos, 3);
        chunk.set_sunlight(pos, 9);
        chunk.set_sunlight_regen(pos, 63);

        assert_eq!(3, chunk.light(pos));
        assert_eq!(9, chunk.sunlight(pos));
        assert_eq!(63, chunk.sunlight_regen(pos));
    }

    #[test]
    fn deflate_keeps_values() {
        let mut chunk = Chunk::new(ChunkPos::ZERO);
        let pos = LocalBlockPos::new(10, 20, 30);
        chunk.set_sunlight(pos, 15);
        chunk.deflate();
        assert_eq!(15, chunk.sunlight(pos));
        assert_eq!(0, chunk.sunlight(LocalBlockPos::ZERO));
    }
}
