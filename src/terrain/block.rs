use bitflags::bitflags;
use rustc_hash::FxHashMap;

use super::chunk::MAX_LIGHT;
use crate::util::face::Side;

/// Numeric identifier for a `Block`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockId(pub u16);

impl BlockId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

pub const BLOCK_AIR: BlockId = BlockId(0);

bitflags! {
    /// Set of block sides
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const FRONT = 1 << 4;
        const BACK = 1 << 5;
    }
}

impl From<Side> for Sides {
    fn from(side: Side) -> Self {
        Sides::from_bits_truncate(1 << side.as_usize())
    }
}

/// The light-relevant attributes of a kind of block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    luminance: u8,
    translucent: bool,
    full_sides: Sides,
}

impl Block {
    /// Empty space
    pub const AIR: Block = Block {
        luminance: 0,
        translucent: true,
        full_sides: Sides::empty(),
    };

    /// Opaque full cube
    pub const SOLID: Block = Block {
        luminance: 0,
        translucent: false,
        full_sides: Sides::all(),
    };

    /// Luminance is clamped to the block light ceiling
    pub const fn new(luminance: u8, translucent: bool, full_sides: Sides) -> Self {
        Self {
            luminance: if luminance > MAX_LIGHT {
                MAX_LIGHT
            } else {
                luminance
            },
            translucent,
            full_sides,
        }
    }

    /// Full cube that emits light
    pub const fn light_source(luminance: u8) -> Self {
        Self::new(luminance, false, Sides::all())
    }

    pub fn luminance(&self) -> u8 {
        self.luminance
    }

    pub fn is_translucent(&self) -> bool {
        self.translucent
    }

    /// True if the given face of the block completely covers the face of the voxel
    pub fn is_full_side(&self, side: Side) -> bool {
        self.full_sides.contains(side.into())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BlockRegistryError {
    #[error("a block named {0:?} is already registered")]
    DuplicateName(String),
    #[error("no block ids left ({0} blocks registered)")]
    Exhausted(usize),
}

/// Maps block ids to their attributes.
/// Id 0 is always air; ids that were never registered resolve to an opaque solid block
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
    names: Vec<String>,
    ids_by_name: FxHashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        let mut ids_by_name = FxHashMap::default();
        ids_by_name.insert("air".to_owned(), BLOCK_AIR);

        Self {
            blocks: vec![Block::AIR],
            names: vec!["air".to_owned()],
            ids_by_name,
        }
    }

    /// Register a new kind of block, returning its id
    pub fn register(
        &mut self,
        name: impl Into<String>,
        block: Block,
    ) -> Result<BlockId, BlockRegistryError> {
        let name = name.into();
        if self.ids_by_name.contains_key(&name) {
            return Err(BlockRegistryError::DuplicateName(name));
        }

        let id = u16::try_from(self.blocks.len())
            .map(BlockId)
            .map_err(|_| BlockRegistryError::Exhausted(self.blocks.len()))?;

        log::trace!("registered block {name:?} as {id:?}");

        self.blocks.push(block);
        self.names.push(name.clone());
        self.ids_by_name.insert(name, id);

        Ok(id)
    }

    pub fn get(&self, id: BlockId) -> Block {
        self.blocks
            .get(id.as_usize())
            .copied()
            .unwrap_or(Block::SOLID)
    }

    pub fn id_of(&self, name: &str) -> Option<BlockId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn name_of(&self, id: BlockId) -> Option<&str> {
        self.names.get(id.as_usize()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_always_registered() {
        let registry = BlockRegistry::new();
        assert_eq!(Some(BLOCK_AIR), registry.id_of("air"));
        assert_eq!(Block::AIR, registry.get(BLOCK_AIR));
    }

    #[test]
    fn register_and_look_up() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register("stone", Block::SOLID).unwrap();
        let torch = registry
            .register("torch", Block::new(15, true, Sides::empty()))
            .unwrap();

        assert_eq!(BlockId(1), stone);
        assert_eq!(Some("torch"), registry.name_of(torch));
        assert_eq!(15, registry.get(torch).luminance());
        assert!(!registry.get(stone).is_translucent());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = BlockRegistry::new();
        registry.register("stone", Block::SOLID).unwrap();
        assert_eq!(
            Err(BlockRegistryError::DuplicateName("stone".to_owned())),
            registry.register("stone", Block::AIR)
        );
    }

    #[test]
    fn unknown_ids_are_opaque() {
        let registry = BlockRegistry::new();
        let block = registry.get(BlockId(1234));
        assert!(!block.is_translucent());
        assert!(Side::ALL.iter().all(|&side| block.is_full_side(side)));
    }

    #[test]
    fn luminance_is_clamped() {
        assert_eq!(MAX_LIGHT, Block::light_source(200).luminance());
    }

    #[test]
    fn full_sides() {
        let slab = Block::new(0, false, Sides::BOTTOM);
        assert!(slab.is_full_side(Side::Bottom));
        assert!(!slab.is_full_side(Side::Top));
    }
}
