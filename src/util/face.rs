use glam::IVec3;

/// One of the six axis-aligned directions a block face can point in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl Side {
    /// All sides, in index order
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Bottom,
        Side::Left,
        Side::Right,
        Side::Front,
        Side::Back,
    ];

    /// Returns the opposite side, e.g. top -> bottom
    pub fn reverse(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    /// Unit vector pointing out of this side
    pub fn direction(self) -> IVec3 {
        SIDE_NORMALS[self.as_usize()]
    }

    pub fn as_usize(self) -> usize {
        self as usize
    }
}

pub const SIDE_NORMALS: [IVec3; 6] = [
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::NEG_X,
    IVec3::X,
    IVec3::NEG_Z,
    IVec3::Z,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_an_involution() {
        for side in Side::ALL {
            assert_ne!(side, side.reverse());
            assert_eq!(side, side.reverse().reverse());
            assert_eq!(side.direction(), -side.reverse().direction());
        }
    }
}
