use thiserror::Error;

use crate::spatial::GridPos;

/// Why a civilization could not be added to the world.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoundingError {
    #[error("no valid starting position for {name} after {attempts} attempts")]
    NoValidPosition { name: String, attempts: u32 },

    #[error("cannot found {name} at {pos}: {reason}")]
    InvalidPosition {
        name: String,
        pos: GridPos,
        reason: PlacementRejection,
    },

    #[error("a civilization named {0} already exists")]
    DuplicateName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementRejection {
    #[error("outside the world")]
    OutOfBounds,
    #[error("terrain is impassable")]
    Impassable,
    #[error("cell is already owned")]
    Owned,
    #[error("within {distance} of the capital of another civilization")]
    TooClose { distance: u32 },
}
