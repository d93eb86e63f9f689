use bracket_noise::prelude::*;
use glam::IVec3;
use itertools::iproduct;

use super::{
    block::BlockId,
    chunk::{Chunk, CHUNK_SIZE},
    position_types::{ChunkPos, GlobalBlockPos, LocalBlockPos},
};

const DIRT_DEPTH: IVec3 = IVec3::new(0, 4, 0);

/// Blocks placed by the generator
#[derive(Clone, Copy, Debug)]
pub struct TerrainBlocks {
    pub stone: BlockId,
    pub dirt: BlockId,
    pub grass: BlockId,
}

/// Density based terrain: a voxel is solid where the noise exceeds a threshold that rises with
/// height, so the world is solid far below zero and open far above it
pub struct TerrainGenerator {
    noise: FastNoise,
    blocks: TerrainBlocks,
}

impl TerrainGenerator {
    pub fn new(seed: u64, blocks: TerrainBlocks) -> Self {
        let mut noise = FastNoise::seeded(seed);
        noise.set_noise_type(NoiseType::SimplexFractal);
        noise.set_fractal_octaves(5);
        noise.set_frequency(0.01);

        Self { noise, blocks }
    }

    pub fn generate_chunk(&self, pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(pos);

        for (x, y, z) in iproduct!(
            0..CHUNK_SIZE.x as u32,
            0..CHUNK_SIZE.y as u32,
            0..CHUNK_SIZE.z as u32
        ) {
            let local_pos = LocalBlockPos::new(x, y, z);
            let global_pos = GlobalBlockPos::from_local_and_chunk_pos(local_pos, pos);

            if self.is_solid(global_pos) {
                let above = global_pos + GlobalBlockPos::from(IVec3::Y);
                let dirt_limit = global_pos + GlobalBlockPos::from(DIRT_DEPTH);

                let block = if !self.is_solid(above) {
                    self.blocks.grass
                } else if !self.is_solid(dirt_limit) {
                    self.blocks.dirt
                } else {
                    self.blocks.stone
                };
                chunk.set_block(local_pos, block);
            }
        }

        chunk
    }

    fn is_solid(&self, pos: GlobalBlockPos) -> bool {
        let pos = pos.as_ivec3().as_vec3();
        self.noise.get_noise3d(pos.x, pos.y, pos.z) > pos.y * 0.01
    }
}
