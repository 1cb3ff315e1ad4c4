use alloc::vec::Vec;
use core::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Occupancy snapshot of a map: which cells hold a mine.
///
/// The first array axis is the row (`x`, bounded by the height) and the second
/// is the column (`y`, bounded by the width).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    mine_mask: Array2<bool>,
    size: Size2,
    mine_count: CellCount,
}

impl Grid {
    pub fn empty(size: Size2) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(RoverError::EmptyGrid);
        }
        Ok(Self {
            mine_mask: Array2::default(size.to_nd_index()),
            size,
            mine_count: 0,
        })
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (height, width) = mine_mask.dim();
        if height == 0 || width == 0 {
            return Err(RoverError::EmptyGrid);
        }
        let size = (
            Extent::try_from(height).map_err(|_| RoverError::InvalidGridShape)?,
            Extent::try_from(width).map_err(|_| RoverError::InvalidGridShape)?,
        );
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Ok(Self {
            mine_mask,
            size,
            mine_count,
        })
    }

    /// Builds a grid from rows of occupancy flags. Every row must have the
    /// same length.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if rows.iter().any(|row| row.as_ref().len() != width) {
            return Err(RoverError::InvalidGridShape);
        }

        let cells: Vec<bool> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        let mine_mask = Array2::from_shape_vec((height, width), cells)
            .map_err(|_| RoverError::InvalidGridShape)?;
        Self::from_mine_mask(mine_mask)
    }

    pub fn from_mine_coords(size: Size2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut grid = Self::empty(size)?;
        for &coords in mine_coords {
            let index = grid.validate_coords(coords)?;
            if !grid.mine_mask[index] {
                grid.mine_mask[index] = true;
                grid.mine_count += 1;
            }
        }
        Ok(grid)
    }

    pub fn size(&self) -> Size2 {
        self.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    /// `0 <= x < height` and `0 <= y < width`.
    pub fn is_valid_position(&self, coords: Coord2) -> bool {
        nd_index_within(coords, self.size).is_some()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<[usize; 2]> {
        nd_index_within(coords, self.size).ok_or(RoverError::InvalidCoords)
    }

    /// Out-of-bounds coordinates never hold a mine.
    pub fn contains_mine(&self, coords: Coord2) -> bool {
        nd_index_within(coords, self.size).is_some_and(|index| self.mine_mask[index])
    }

    pub fn place_mine(&mut self, coords: Coord2) -> Result<()> {
        let index = self.validate_coords(coords)?;
        if self.mine_mask[index] {
            return Err(RoverError::CellOccupied);
        }
        self.mine_mask[index] = true;
        self.mine_count += 1;
        Ok(())
    }

    /// Clears the cell, returning whether a mine was there.
    pub fn clear_mine(&mut self, coords: Coord2) -> Result<bool> {
        let index = self.validate_coords(coords)?;
        let had_mine = core::mem::replace(&mut self.mine_mask[index], false);
        if had_mine {
            self.mine_count -= 1;
        }
        Ok(had_mine)
    }

    /// Mined cells in row-major order.
    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((x, y), _)| (x as Coord, y as Coord))
    }

    /// Copy of this grid cut or extended to `size`. Cells that exist in both
    /// keep their occupancy, new cells are empty.
    pub fn resized(&self, size: Size2) -> Result<Self> {
        let mut resized = Self::empty(size)?;
        let rows = usize::from(self.size.0.min(size.0));
        let cols = usize::from(self.size.1.min(size.1));
        for x in 0..rows {
            for y in 0..cols {
                if self.mine_mask[[x, y]] {
                    resized.mine_mask[[x, y]] = true;
                    resized.mine_count += 1;
                }
            }
        }
        Ok(resized)
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.mine_mask
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect()
    }
}

/// Cell of a rendered path overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayCell {
    Empty,
    Mine,
    Visited,
}

impl OverlayCell {
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Mine => '1',
            Self::Visited => '*',
        }
    }
}

/// Visited cells drawn over the occupancy a dispatch started with.
///
/// Unvisited mined cells stay visible as mines, including those removed later
/// in the run by a disarm elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathOverlay {
    cells: Array2<OverlayCell>,
    size: Size2,
}

impl PathOverlay {
    pub fn from_grid(grid: &Grid) -> Self {
        let cells = grid.mine_mask.mapv(|is_mine| {
            if is_mine {
                OverlayCell::Mine
            } else {
                OverlayCell::Empty
            }
        });
        Self {
            cells,
            size: grid.size(),
        }
    }

    pub fn size(&self) -> Size2 {
        self.size
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<OverlayCell> {
        nd_index_within(coords, self.size).map(|index| self.cells[index])
    }

    pub fn is_visited(&self, coords: Coord2) -> bool {
        self.cell_at(coords) == Some(OverlayCell::Visited)
    }

    /// Marks `coords` visited, out-of-bounds coordinates are ignored.
    pub fn mark_visited(&mut self, coords: Coord2) {
        if let Some(index) = nd_index_within(coords, self.size) {
            self.cells[index] = OverlayCell::Visited;
        }
    }

    pub fn visited_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == OverlayCell::Visited)
            .count()
    }

    pub fn to_rows(&self) -> Vec<Vec<OverlayCell>> {
        self.cells
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect()
    }
}

impl fmt::Display for PathOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            let mut first = true;
            for cell in row {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}", cell.as_char())?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
