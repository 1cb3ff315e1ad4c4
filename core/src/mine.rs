use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::*;

pub type MineId = u32;

/// Registry entry for a mine placed on the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineRecord {
    pub id: MineId,
    pub x: Coord,
    pub y: Coord,
    pub serial_number: String,
}

impl MineRecord {
    pub fn new(id: MineId, (x, y): Coord2, serial_number: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            serial_number: serial_number.into(),
        }
    }

    pub const fn position(&self) -> Coord2 {
        (self.x, self.y)
    }
}
