use glam::{IVec3, UVec3};

/// Size of a 3D grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Size3 {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub const fn as_uvec3(&self) -> UVec3 {
        UVec3::new(self.x as u32, self.y as u32, self.z as u32)
    }

    pub const fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }

    /// Returns the product of the three components of the size
    pub const fn product(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Flatten a 3D grid position into an index into a 1D array ordered by z then y then x
    pub const fn flatten(&self, pos: UVec3) -> usize {
        let x = pos.x as usize;
        let y = pos.y as usize;
        let z = pos.z as usize;
        self.x * (self.y * z + y) + x
    }

    /// Inverse of `flatten`
    pub const fn unflatten(&self, index: usize) -> UVec3 {
        let x = index % self.x;
        let y = (index / self.x) % self.y;
        let z = index / (self.x * self.y);
        UVec3::new(x as u32, y as u32, z as u32)
    }
}
