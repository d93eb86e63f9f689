use super::CHUNK_VOLUME;
use crate::terrain::position_types::LocalBlockPos;

/// Per-voxel storage for one light channel of a chunk.
/// Starts out uniform and is only promoted to dense storage when a voxel is given a value
/// different from the rest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightLayer {
    max: u8,
    data: LightData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LightData {
    Uniform(u8),
    /// Two voxels per byte, even indices in the lower nibble
    Nibbles(Box<[u8]>),
    Bytes(Box<[u8]>),
}

impl LightLayer {
    pub fn new(max: u8) -> Self {
        Self::uniform(max, 0)
    }

    pub fn uniform(max: u8, value: u8) -> Self {
        Self {
            max,
            data: LightData::Uniform(value.min(max)),
        }
    }

    pub fn get(&self, pos: LocalBlockPos) -> u8 {
        self.get_index(pos.get_array_index())
    }

    /// Values above the channel ceiling are clamped
    pub fn set(&mut self, pos: LocalBlockPos, value: u8) {
        self.set_index(pos.get_array_index(), value.min(self.max))
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self.data, LightData::Uniform(_))
    }

    /// Collapse dense storage back to a single value if every voxel holds the same value
    pub fn deflate(&mut self) {
        let first = self.get_index(0);
        let all_equal = match &self.data {
            LightData::Uniform(_) => return,
            LightData::Nibbles(nibbles) => {
                let packed = first | (first << 4);
                nibbles.iter().all(|&byte| byte == packed)
            }
            LightData::Bytes(bytes) => bytes.iter().all(|&byte| byte == first),
        };

        if all_equal {
            self.data = LightData::Uniform(first);
        }
    }

    fn get_index(&self, index: usize) -> u8 {
        match &self.data {
            LightData::Uniform(value) => *value,
            LightData::Nibbles(nibbles) => {
                let byte = nibbles[index >> 1];
                if index & 1 == 0 {
                    byte & 0b1111
                } else {
                    byte >> 4
                }
            }
            LightData::Bytes(bytes) => bytes[index],
        }
    }

    fn set_index(&mut self, index: usize, value: u8) {
        match &mut self.data {
            LightData::Uniform(uniform) if *uniform == value => (),
            LightData::Uniform(_) => {
                self.promote();
                self.set_index(index, value);
            }
            LightData::Nibbles(nibbles) => {
                let byte = &mut nibbles[index >> 1];
                if index & 1 == 0 {
                    *byte = (*byte & 0b11110000) | value;
                } else {
                    *byte = (*byte & 0b00001111) | (value << 4);
                }
            }
            LightData::Bytes(bytes) => bytes[index] = value,
        }
    }

    fn promote(&mut self) {
        if let LightData::Uniform(value) = self.data {
            self.data = if self.max <= 0b1111 {
                LightData::Nibbles(vec![value | (value << 4); CHUNK_VOLUME / 2].into_boxed_slice())
            } else {
                LightData::Bytes(vec![value; CHUNK_VOLUME].into_boxed_slice())
            };
        }
    }
}
