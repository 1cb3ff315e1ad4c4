use thiserror::Error;

use crate::{MineId, RoverId, RoverStatus};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoverError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Grid rows do not match declared size")]
    InvalidGridShape,
    #[error("Grid must have at least one row and one column")]
    EmptyGrid,
    #[error("A mine already exists at the given coordinates")]
    CellOccupied,
    #[error("Invalid command {found:?} at index {index}")]
    InvalidCommand { index: usize, found: char },
    #[error("Invalid orientation {0:?}")]
    InvalidOrientation(char),
    #[error("Rover with id {0} not found")]
    RoverNotFound(RoverId),
    #[error("Mine with id {0} not found")]
    MineNotFound(MineId),
    #[error("Mine with id {0} already exists")]
    DuplicateMine(MineId),
    #[error("Map not found")]
    MapNotFound,
    #[error("Rover was eliminated, no further commands are accepted")]
    AlreadyEliminated,
    #[error("Rover cannot receive new commands while {status}")]
    CommandsLocked { status: RoverStatus },
}

pub type Result<T> = core::result::Result<T, RoverError>;
