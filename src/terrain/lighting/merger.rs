use super::{
    batch_propagator::BatchPropagator,
    regen_propagator::SunlightRegenBatchPropagator,
    rules::{LightRules, SunlightRegenRules, SunlightRules},
    world_view::{
        neighbourhood_offset, LocalChunkView, NEIGHBOURHOOD_CENTRE, NEIGHBOURHOOD_LEN,
    },
    LightingError,
};
use crate::{
    measure_time,
    terrain::{
        block::BlockRegistry,
        chunk::Chunk,
        position_types::ChunkPos,
    },
    util::face::Side,
};

/// Reconciles the lighting of a chunk that was lit on its own with its 26 already lit neighbours
pub struct LightMerger<'r> {
    registry: &'r BlockRegistry,
    scale: u8,
}

impl<'r> LightMerger<'r> {
    pub fn new(registry: &'r BlockRegistry) -> Self {
        Self::with_scale(registry, 1)
    }

    pub fn with_scale(registry: &'r BlockRegistry, scale: u8) -> Self {
        Self {
            registry,
            scale: scale.max(1),
        }
    }

    /// Merge the centre of a 3x3x3 neighbourhood, laid out by `neighbourhood_index`, with the
    /// chunks around it. Light flows both ways: into the centre from its neighbours, and out of
    /// the centre into neighbours that were lit without it.
    ///
    /// The neighbourhood is checked before anything is touched; a malformed neighbourhood is
    /// returned as an error and left unchanged
    pub fn merge(&self, chunks: &mut [Option<Chunk>]) -> Result<(), LightingError> {
        let centre = validate(chunks)?;

        measure_time!(self.merge_light(chunks, centre));
        measure_time!(self.merge_sunlight(chunks, centre));

        for chunk in chunks.iter_mut().flatten() {
            chunk.deflate_sunlight();
        }

        log::debug!("merged lighting of {centre:?}");
        Ok(())
    }

    fn merge_light(&self, chunks: &mut [Option<Chunk>], centre: ChunkPos) {
        let mut view = LocalChunkView::new(LightRules, chunks, centre);
        let mut propagator = BatchPropagator::with_scale(LightRules, self.registry, self.scale);

        for side in Side::ALL {
            propagator.propagate_between(&mut view, centre.adjacent(side), side.reverse());
            propagator.propagate_between(&mut view, centre, side);
        }
        propagator.process(&mut view);
    }

    fn merge_sunlight(&self, chunks: &mut [Option<Chunk>], centre: ChunkPos) {
        let mut regen = SunlightRegenBatchPropagator::with_scale(self.registry, self.scale);
        {
            let mut view = LocalChunkView::new(SunlightRegenRules, chunks, centre);
            regen.propagate_between(&view, centre.adjacent(Side::Top), Side::Bottom);
            regen.propagate_between(&view, centre, Side::Bottom);
            regen.process(&mut view);
        }

        let mut view = LocalChunkView::new(SunlightRules, chunks, centre);
        let mut sunlight = BatchPropagator::with_scale(SunlightRules, self.registry, self.scale);

        regen.apply_seeds(&mut sunlight, &mut view);
        for side in Side::ALL {
            sunlight.propagate_between(&mut view, centre.adjacent(side), side.reverse());
            sunlight.propagate_between(&mut view, centre, side);
        }
        sunlight.process(&mut view);
    }
}

/// Check the neighbourhood is complete and in canonical order, returning the centre position
fn validate(chunks: &[Option<Chunk>]) -> Result<ChunkPos, LightingError> {
    if chunks.len() != NEIGHBOURHOOD_LEN {
        return Err(LightingError::NeighbourhoodSize(chunks.len()));
    }

    let centre = chunks[NEIGHBOURHOOD_CENTRE]
        .as_ref()
        .map(Chunk::position)
        .ok_or(LightingError::MissingChunk(NEIGHBOURHOOD_CENTRE))?;

    for (index, slot) in chunks.iter().enumerate() {
        let chunk = slot.as_ref().ok_or(LightingError::MissingChunk(index))?;
        let expected = centre + ChunkPos::from(neighbourhood_offset(index));

        if chunk.position() != expected {
            return Err(LightingError::MisplacedChunk {
                index,
                expected,
                found: chunk.position(),
            });
        }
    }

    Ok(centre)
}
