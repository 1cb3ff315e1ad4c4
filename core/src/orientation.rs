use core::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

/// Compass heading of a rover.
///
/// Headings form the cycle North, East, South, West. Turning right advances
/// one step along it and turning left retreats one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::South
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Right,
    Left,
}

impl Orientation {
    /// Headings in clockwise order, starting from North.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit displacement `(dx, dy)` of one step along this heading.
    pub const fn delta(self) -> Coord2 {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }

    /// Applies one unit step to `coords`.
    ///
    /// Does no bounds checking, the result may lie outside any grid.
    pub const fn step(self, coords: Coord2) -> Coord2 {
        let (dx, dy) = self.delta();
        (coords.0 + dx, coords.1 + dy)
    }

    pub const fn right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    pub const fn left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    pub const fn turn(self, turn: Turn) -> Self {
        match turn {
            Turn::Right => self.right(),
            Turn::Left => self.left(),
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }
}

impl TryFrom<char> for Orientation {
    type Error = RoverError;

    fn try_from(value: char) -> Result<Self> {
        match value {
            'N' => Ok(Self::North),
            'E' => Ok(Self::East),
            'S' => Ok(Self::South),
            'W' => Ok(Self::West),
            other => Err(RoverError::InvalidOrientation(other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_applies_unit_displacement() {
        assert_eq!(Orientation::North.step((3, 3)), (2, 3));
        assert_eq!(Orientation::South.step((3, 3)), (4, 3));
        assert_eq!(Orientation::East.step((3, 3)), (3, 4));
        assert_eq!(Orientation::West.step((3, 3)), (3, 2));
    }

    #[test]
    fn step_does_not_clamp() {
        assert_eq!(Orientation::North.step((0, 0)), (-1, 0));
        assert_eq!(Orientation::West.step((0, 0)), (0, -1));
    }

    #[test]
    fn four_turns_in_one_direction_are_identity() {
        for start in Orientation::ALL {
            let mut right = start;
            let mut left = start;
            for _ in 0..4 {
                right = right.turn(Turn::Right);
                left = left.turn(Turn::Left);
            }
            assert_eq!(right, start);
            assert_eq!(left, start);
        }
    }

    #[test]
    fn left_undoes_right() {
        for start in Orientation::ALL {
            assert_eq!(start.right().left(), start);
        }
        assert_eq!(Orientation::South.right(), Orientation::West);
        assert_eq!(Orientation::North.left(), Orientation::West);
    }

    #[test]
    fn parses_compass_letters() {
        assert_eq!(Orientation::try_from('E'), Ok(Orientation::East));
        assert_eq!(
            Orientation::try_from('x'),
            Err(RoverError::InvalidOrientation('x'))
        );
    }
}
