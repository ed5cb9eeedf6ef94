//! Compass headings. The eight directions are numbered 0..7 clockwise from
//! north so that rotation is plain integer arithmetic modulo 8.

use crate::vector2::Vector2;
use serde::ser::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const ORDINALS: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    pub fn value(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::SouthEast => 3,
            Direction::South => 4,
            Direction::SouthWest => 5,
            Direction::West => 6,
            Direction::NorthWest => 7,
        }
    }

    pub fn from_value(value: u8) -> Option<Direction> {
        Direction::ALL.get(value as usize).copied()
    }

    /// The unit step this heading takes on the board. North is towards
    /// lower row numbers.
    pub fn offset(self) -> Vector2 {
        match self {
            Direction::North => Vector2::new(-1, 0),
            Direction::NorthEast => Vector2::new(-1, 1),
            Direction::East => Vector2::new(0, 1),
            Direction::SouthEast => Vector2::new(1, 1),
            Direction::South => Vector2::new(1, 0),
            Direction::SouthWest => Vector2::new(1, -1),
            Direction::West => Vector2::new(0, -1),
            Direction::NorthWest => Vector2::new(-1, -1),
        }
    }

    /// Rotates the heading by `n` eighth turns.
    pub fn rotate(self, n: i32, counter_clockwise: bool) -> Direction {
        let delta = if counter_clockwise { n } else { -n };
        let value = (self.value() as i32 + delta).rem_euclid(8) as u8;
        // rem_euclid keeps the value in 0..8, so the lookup cannot miss.
        Direction::ALL[value as usize]
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

/// The unique heading pointing from `from` to `to`, if the two points are
/// coaligned on a cardinal or ordinal axis.
pub fn axis_direction(from: Vector2, to: Vector2) -> Option<Direction> {
    let diff = to - from;
    if diff == Vector2::new(0, 0) {
        return None;
    }

    let aligned = diff.row == 0 || diff.col == 0 || diff.row.abs() == diff.col.abs();
    if !aligned {
        return None;
    }

    let step = Vector2::new(diff.row.signum(), diff.col.signum());
    Direction::ALL.iter().copied().find(|d| d.offset() == step)
}

/// Walks from `start` to `end` one unit at a time along the implied axis.
/// Returns `None` if the points are not coaligned.
pub fn board_range(
    start: Vector2,
    end: Vector2,
    include_start: bool,
    include_end: bool,
) -> Option<Vec<Vector2>> {
    let direction = axis_direction(start, end)?;
    let step = direction.offset();

    let mut result = Vec::new();
    if include_start {
        result.push(start);
    }

    let mut current = start + step;
    while current != end {
        result.push(current);
        current = current + step;
    }

    if include_end {
        result.push(end);
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_modulo_eight() {
        assert_eq!(Direction::North.rotate(1, true), Direction::NorthEast);
        assert_eq!(Direction::North.rotate(1, false), Direction::NorthWest);
        assert_eq!(Direction::West.rotate(4, true), Direction::East);
        assert_eq!(Direction::South.rotate(16, false), Direction::South);
    }

    #[test]
    fn axis_direction_requires_alignment() {
        let origin = Vector2::new(4, 4);
        assert_eq!(
            axis_direction(origin, Vector2::new(0, 4)),
            Some(Direction::North)
        );
        assert_eq!(
            axis_direction(origin, Vector2::new(6, 6)),
            Some(Direction::SouthEast)
        );
        assert_eq!(axis_direction(origin, Vector2::new(5, 7)), None);
        assert_eq!(axis_direction(origin, origin), None);
    }

    #[test]
    fn board_range_walks_the_axis() {
        let range = board_range(Vector2::new(7, 4), Vector2::new(7, 7), false, false).unwrap();
        assert_eq!(range, vec![Vector2::new(7, 5), Vector2::new(7, 6)]);

        let range = board_range(Vector2::new(0, 0), Vector2::new(2, 2), true, true).unwrap();
        assert_eq!(
            range,
            vec![Vector2::new(0, 0), Vector2::new(1, 1), Vector2::new(2, 2)]
        );

        assert_eq!(
            board_range(Vector2::new(0, 0), Vector2::new(1, 2), false, false),
            None
        );
    }
}
