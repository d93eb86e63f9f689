use crate::terrain::position_types::ChunkPos;

pub mod batch_propagator;
pub mod block_change;
pub mod internal;
pub mod merger;
pub mod regen_propagator;
pub mod rules;
pub mod world_view;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LightingError {
    #[error("a neighbourhood is 27 chunks, got {0}")]
    NeighbourhoodSize(usize),
    #[error("neighbourhood slot {0} is empty")]
    MissingChunk(usize),
    #[error("neighbourhood slot {index} should hold chunk {expected:?}, found {found:?}")]
    MisplacedChunk {
        index: usize,
        expected: ChunkPos,
        found: ChunkPos,
    },
}
