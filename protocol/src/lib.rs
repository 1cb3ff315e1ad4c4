//! Document shapes exchanged with the map, mine and rover endpoints.

use rover_core::{
    Coord, Extent, Grid, MineId, MineRecord, OverlayCell, PathOverlay, Rover, RoverError,
    RoverId, RoverStatus, Size2,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error(transparent)]
    Rover(#[from] RoverError),
    #[error("Field has {rows} row(s) of widths {widths:?}, expected {height}x{width}")]
    FieldShape {
        height: Extent,
        width: Extent,
        rows: usize,
        widths: Vec<usize>,
    },
    #[error("Invalid field value {value} at ({x}, {y})")]
    InvalidCell { x: usize, y: usize, value: u8 },
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

pub fn to_json<T: Serialize>(doc: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn from_json<T: DeserializeOwned>(input: &str) -> Result<T> {
    Ok(serde_json::from_str(input)?)
}

fn check_shape<T>(height: Extent, width: Extent, field: &[Vec<T>]) -> Result<()> {
    let fits = field.len() == usize::from(height)
        && field.iter().all(|row| row.len() == usize::from(width));
    if fits {
        Ok(())
    } else {
        Err(ProtocolError::FieldShape {
            height,
            width,
            rows: field.len(),
            widths: field.iter().map(Vec::len).collect(),
        })
    }
}

/// Occupancy map: `0` empty, `1` mined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocument {
    pub height: Extent,
    pub width: Extent,
    pub field: Vec<Vec<u8>>,
}

impl MapDocument {
    pub fn from_grid(grid: &Grid) -> Self {
        let (height, width) = grid.size();
        let field = grid
            .to_rows()
            .into_iter()
            .map(|row| row.into_iter().map(u8::from).collect())
            .collect();
        Self {
            height,
            width,
            field,
        }
    }

    /// An empty field of the declared size.
    pub fn blank(size: Size2) -> Self {
        Self {
            height: size.0,
            width: size.1,
            field: vec![vec![0; usize::from(size.1)]; usize::from(size.0)],
        }
    }

    pub fn to_grid(&self) -> Result<Grid> {
        check_shape(self.height, self.width, &self.field)?;
        let rows = self
            .field
            .iter()
            .enumerate()
            .map(|(x, row)| {
                row.iter()
                    .enumerate()
                    .map(|(y, &value)| match value {
                        0 => Ok(false),
                        1 => Ok(true),
                        value => Err(ProtocolError::InvalidCell { x, y, value }),
                    })
                    .collect::<Result<Vec<bool>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Grid::from_rows(&rows)?)
    }
}

/// Cell of a mines field: empty, or the serial number of the mine there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldCell {
    Flag(u8),
    Serial(String),
}

/// Map-shaped view of the mine registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinesDocument {
    pub height: Extent,
    pub width: Extent,
    pub field: Vec<Vec<FieldCell>>,
}

impl MinesDocument {
    pub fn from_records<'a>(
        size: Size2,
        mines: impl IntoIterator<Item = &'a MineRecord>,
    ) -> Result<Self> {
        let (height, width) = size;
        let row = vec![FieldCell::Flag(0); usize::from(width)];
        let mut field = vec![row; usize::from(height)];
        for mine in mines {
            let (x, y) = (usize::try_from(mine.x), usize::try_from(mine.y));
            let cell = match (x, y) {
                (Ok(x), Ok(y)) => field.get_mut(x).and_then(|row| row.get_mut(y)),
                _ => None,
            };
            let cell = cell.ok_or(RoverError::InvalidCoords)?;
            *cell = FieldCell::Serial(mine.serial_number.clone());
        }
        Ok(Self {
            height,
            width,
            field,
        })
    }

    /// Mine records for every serial number in the field, row-major, with
    /// ids counting up from `first_id`.
    pub fn mines(&self, first_id: MineId) -> Result<Vec<MineRecord>> {
        check_shape(self.height, self.width, &self.field)?;
        let serials = self.field.iter().enumerate().flat_map(|(x, row)| {
            row.iter().enumerate().filter_map(move |(y, cell)| match cell {
                FieldCell::Serial(serial) => Some(((x as Coord, y as Coord), serial)),
                FieldCell::Flag(_) => None,
            })
        });
        Ok(serials
            .zip(first_id..)
            .map(|((coords, serial), id)| MineRecord::new(id, coords, serial.as_str()))
            .collect())
    }
}

/// Path overlay cell on the wire: `0`, `1` or `"*"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathCell {
    Flag(u8),
    Mark(char),
}

impl From<OverlayCell> for PathCell {
    fn from(cell: OverlayCell) -> Self {
        match cell {
            OverlayCell::Empty => Self::Flag(0),
            OverlayCell::Mine => Self::Flag(1),
            OverlayCell::Visited => Self::Mark(cell.as_char()),
        }
    }
}

pub fn path_grid(overlay: &PathOverlay) -> Vec<Vec<PathCell>> {
    overlay
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(PathCell::from).collect())
        .collect()
}

/// Rover as returned to clients. After a dispatch, `commands` holds the
/// executed prefix and `grid` the path overlay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoverDocument {
    pub id: RoverId,
    pub status: RoverStatus,
    pub position: [Coord; 2],
    pub commands: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<Vec<PathCell>>>,
}

impl RoverDocument {
    pub fn from_rover(rover: &Rover) -> Self {
        Self {
            id: rover.id,
            status: rover.status,
            position: [rover.position.0, rover.position.1],
            commands: rover.commands.clone(),
            grid: None,
        }
    }

    /// Document for a rover record that was just updated by a dispatch.
    pub fn from_dispatch(rover: &Rover, overlay: &PathOverlay) -> Self {
        Self {
            commands: rover.executed_commands.clone(),
            grid: Some(path_grid(overlay)),
            ..Self::from_rover(rover)
        }
    }
}
