//! Grid coordinates and adjacency helpers

use serde::{Deserialize, Serialize};

/// Cell position in the grid. Signed so that neighbour arithmetic at the
/// border can produce out-of-range coordinates that lookups then reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance between two positions
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The up-to-8 surrounding positions, dx outer and dy inner, unclipped.
    pub fn surrounding(self) -> impl Iterator<Item = GridPos> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| self.offset(dx, dy))
    }

    /// Every position of the square of the given radius centred here.
    pub fn square(self, radius: i32) -> impl Iterator<Item = GridPos> {
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dy| self.offset(dx, dy)))
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 8-connectivity, dx outer and dy inner.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
