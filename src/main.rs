use clap::Parser;
use itertools::iproduct;
use rayon::prelude::*;
use voxel_lighting::{
    measure_time,
    terrain::{
        block::{Block, BlockId, BlockRegistry, BlockRegistryError, BLOCK_AIR},
        chunk::{Chunk, CHUNK_SIZE, CHUNK_VOLUME},
        lighting::{
            block_change::BlockChange, internal::InternalLightProcessor, merger::LightMerger,
            LightingError,
        },
        position_types::{ChunkPos, GlobalBlockPos, LocalBlockPos},
        provider::{ChunkProvider, ChunkStore, MergeOutcome},
        temporary_generation::{TerrainBlocks, TerrainGenerator},
    },
    util::face::Side,
};

const MAX_LAMPS: i64 = 4096;

/// Generate a patch of terrain, light it, then relight it around some edits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Horizontal radius of the loaded area, in chunks
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(i32).range(0..=64))]
    radius: i32,
    /// Number of chunk layers, starting one layer below zero
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(i32).range(1..=16))]
    height: i32,
    /// Terrain seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of lamps to place on the surface once the terrain is lit
    #[arg(
        long,
        default_value_t = 16,
        value_parser = clap::value_parser!(u16).range(..=MAX_LAMPS),
    )]
    lamps: u16,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Registry(#[from] BlockRegistryError),
    #[error(transparent)]
    Lighting(#[from] LightingError),
}

struct DemoBlocks {
    terrain: TerrainBlocks,
    lamp: BlockId,
}

fn register_blocks(registry: &mut BlockRegistry) -> Result<DemoBlocks, BlockRegistryError> {
    let terrain = TerrainBlocks {
        stone: registry.register("stone", Block::SOLID)?,
        dirt: registry.register("dirt", Block::SOLID)?,
        grass: registry.register("grass", Block::SOLID)?,
    };
    let lamp = registry.register("lamp", Block::light_source(15))?;

    Ok(DemoBlocks { terrain, lamp })
}

/// Generate and internally light every chunk of the area on the rayon pool
fn generate(args: &Args, registry: &BlockRegistry, blocks: &DemoBlocks) -> Vec<Chunk> {
    let generator = TerrainGenerator::new(args.seed, blocks.terrain);
    let processor = InternalLightProcessor::new(registry);

    let positions: Vec<_> = iproduct!(
        -args.radius..=args.radius,
        -1..args.height - 1,
        -args.radius..=args.radius
    )
    .map(|(x, y, z)| ChunkPos::new(x, y, z))
    .collect();

    positions
        .par_iter()
        .map(|&pos| {
            let mut chunk = generator.generate_chunk(pos);
            processor.generate_internal_lighting(&mut chunk);
            chunk
        })
        .collect()
}

/// Merge every chunk whose neighbourhood is loaded. Regeneration only flows downwards, so
/// higher chunks are merged first
fn merge_all(
    store: &mut ChunkStore,
    merger: &LightMerger,
) -> Result<(usize, usize), LightingError> {
    let mut positions: Vec<_> = store.positions().collect();
    positions.sort_by_key(|pos| -pos.as_ivec3().y);

    let mut merged = 0;
    let mut deferred = 0;
    for pos in positions {
        match store.merge(merger, pos)? {
            MergeOutcome::Merged => merged += 1,
            MergeOutcome::Deferred { .. } => deferred += 1,
        }
    }

    Ok((merged, deferred))
}

/// Position just above the highest solid block of the column, if the column has one
fn surface_above(
    store: &ChunkStore,
    x: i32,
    z: i32,
    top: i32,
    bottom: i32,
) -> Option<GlobalBlockPos> {
    (bottom..top)
        .rev()
        .map(|y| GlobalBlockPos::new(x, y, z))
        .find(|&pos| store.block_at(pos).is_some_and(|id| id != BLOCK_AIR))
        .map(|pos| pos.adjacent(Side::Top))
}

/// Columns to place lamps in, spread over the loaded area
fn lamp_columns(args: &Args) -> impl Iterator<Item = (i32, i32)> {
    let span = (2 * args.radius + 1) * CHUNK_SIZE.x as i32;
    let min = -args.radius * CHUNK_SIZE.x as i32;
    let offset = (args.seed % span as u64) as i32;

    (0..i32::from(args.lamps)).map(move |i| {
        let x = min + (i * 37 + offset).rem_euclid(span);
        let z = min + (i * 61 + 11).rem_euclid(span);
        (x, z)
    })
}

fn place_lamps(store: &mut ChunkStore, args: &Args, lamp: BlockId) -> Vec<BlockChange> {
    let bottom = -(CHUNK_SIZE.y as i32);
    let top = (args.height - 1) * CHUNK_SIZE.y as i32 - 1;

    lamp_columns(args)
        .filter_map(|(x, z)| {
            let pos = surface_above(store, x, z, top, bottom)?;
            store.set_block(pos, lamp)
        })
        .collect()
}

fn light_at(store: &ChunkStore, pos: GlobalBlockPos) -> Option<(u8, u8, u8)> {
    let (local_pos, chunk_pos) = pos.get_local_and_chunk_pos();
    store.chunk(chunk_pos).map(|chunk| {
        (
            chunk.light(local_pos),
            chunk.sunlight(local_pos),
            chunk.sunlight_regen(local_pos),
        )
    })
}

/// Number of voxels with any block light and with any sunlight
fn lit_voxels(store: &ChunkStore) -> (usize, usize) {
    store
        .chunks()
        .flat_map(|chunk| {
            (0..CHUNK_VOLUME).map(move |index| {
                let pos = LocalBlockPos::from_array_index(index);
                (chunk.light(pos) > 0, chunk.sunlight(pos) > 0)
            })
        })
        .fold((0, 0), |(light, sunlight), (lit, sunlit)| {
            (light + lit as usize, sunlight + sunlit as usize)
        })
}

fn run(args: &Args) -> Result<(), DemoError> {
    let mut registry = BlockRegistry::new();
    let blocks = register_blocks(&mut registry)?;

    let chunks = measure_time!(generate(args, &registry, &blocks));
    log::info!("generated and lit {} chunks", chunks.len());

    let mut store = ChunkStore::new();
    for chunk in chunks {
        store.insert(chunk);
    }

    let merger = LightMerger::new(&registry);
    let (merged, deferred) = measure_time!(merge_all(&mut store, &merger))?;
    log::info!("merged {merged} chunks, {deferred} at the edge of the world were deferred");

    let changes = place_lamps(&mut store, args, blocks.lamp);
    measure_time!(store.update_lighting(&registry, &changes));
    log::info!("placed {} lamps", changes.len());

    let (light, sunlight) = lit_voxels(&store);
    log::info!("{light} voxels have block light, {sunlight} have sunlight");

    if let Some(change) = changes.first() {
        let pos = change.position;
        let above = pos.adjacent(Side::Top);
        log::info!("light above lamp at {pos:?}: {:?}", light_at(&store, above));

        let removal: Vec<_> = store.set_block(pos, BLOCK_AIR).into_iter().collect();
        measure_time!(store.update_lighting(&registry, &removal));
        log::info!("light there after removing it: {:?}", light_at(&store, above));
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
