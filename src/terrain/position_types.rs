use derive_more::{Add, From, Sub};
use glam::{IVec3, UVec3};

use super::chunk::{CHUNK_SIZE, CHUNK_SIZE_IVEC3};
use crate::util::face::Side;

/// Position of a block in the world
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Add, From, Sub)]
pub struct GlobalBlockPos(IVec3);

impl GlobalBlockPos {
    pub const ZERO: Self = Self(IVec3::ZERO);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(IVec3::new(x, y, z))
    }

    pub fn from_local_and_chunk_pos(local_pos: LocalBlockPos, chunk_pos: ChunkPos) -> Self {
        (local_pos.0.as_ivec3() + chunk_pos.0 * CHUNK_SIZE_IVEC3).into()
    }

    /// Given a global block position, return the position of the block within its chunk and the
    /// position of the chunk containing it
    pub fn get_local_and_chunk_pos(&self) -> (LocalBlockPos, ChunkPos) {
        let local_pos = self.0.rem_euclid(CHUNK_SIZE_IVEC3).as_uvec3().into();
        let chunk_pos = self.0.div_euclid(CHUNK_SIZE_IVEC3).into();

        (local_pos, chunk_pos)
    }

    /// The position one block away across the given side
    pub fn adjacent(&self, side: Side) -> Self {
        Self(self.0 + side.direction())
    }

    /// Sum of the absolute per-axis distances to `other`
    pub fn manhattan_distance(&self, other: GlobalBlockPos) -> u32 {
        let d = (self.0 - other.0).abs();
        (d.x + d.y + d.z) as u32
    }

    pub fn as_ivec3(&self) -> IVec3 {
        self.0
    }
}

/// Position of a block in a chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, From)]
pub struct LocalBlockPos(UVec3);

impl LocalBlockPos {
    pub const ZERO: Self = Self(UVec3::ZERO);

    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self(UVec3::new(x, y, z))
    }

    pub fn from_array_index(block_index: usize) -> Self {
        Self(CHUNK_SIZE.unflatten(block_index))
    }

    pub fn get_array_index(&self) -> usize {
        CHUNK_SIZE.flatten(self.0)
    }

    pub fn as_uvec3(&self) -> UVec3 {
        self.0
    }

    pub fn as_ivec3(&self) -> IVec3 {
        self.0.as_ivec3()
    }
}

/// Position of a chunk in the world
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Add, From, Sub)]
pub struct ChunkPos(IVec3);

impl ChunkPos {
    pub const ZERO: Self = Self(IVec3::ZERO);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(IVec3::new(x, y, z))
    }

    /// The position of the chunk sharing the given face of this one
    pub fn adjacent(&self, side: Side) -> Self {
        Self(self.0 + side.direction())
    }

    pub fn as_ivec3(&self) -> IVec3 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_to_local_and_back() {
        for global in [
            GlobalBlockPos::new(0, 0, 0),
            GlobalBlockPos::new(-1, -1, -1),
            GlobalBlockPos::new(31, 63, 31),
            GlobalBlockPos::new(32, 64, 32),
            GlobalBlockPos::new(-33, 130, 7),
        ] {
            let (local, chunk) = global.get_local_and_chunk_pos();
            assert!(local.as_uvec3().cmplt(CHUNK_SIZE.as_uvec3()).all());
            assert_eq!(global, GlobalBlockPos::from_local_and_chunk_pos(local, chunk));
        }
    }

    #[test]
    fn negative_positions_belong_to_negative_chunks() {
        let (local, chunk) = GlobalBlockPos::new(-1, 0, 0).get_local_and_chunk_pos();
        assert_eq!(ChunkPos::new(-1, 0, 0), chunk);
        assert_eq!(LocalBlockPos::new(CHUNK_SIZE.x as u32 - 1, 0, 0), local);
    }
}
