/// Single coordinate axis of a rover position.
///
/// Signed, so a step off the top or left edge is still a value that can be
/// checked against the grid afterwards.
pub type Coord = i32;

/// Two-dimensional coordinates `(x, y)`, `x` is the row and `y` the column.
pub type Coord2 = (Coord, Coord);

/// Grid extent along one axis.
pub type Extent = u16;

/// Grid size as `(height, width)`.
pub type Size2 = (Extent, Extent);

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Size2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Converts `coords` into an ndarray index when it lies inside `size`.
///
/// Rows are bounded by the height and columns by the width, the same axis
/// order the occupancy array uses.
pub fn nd_index_within(coords: Coord2, size: Size2) -> Option<[usize; 2]> {
    let (x, y) = coords;
    let x = usize::try_from(x).ok()?;
    let y = usize::try_from(y).ok()?;
    if x < usize::from(size.0) && y < usize::from(size.1) {
        Some([x, y])
    } else {
        None
    }
}
