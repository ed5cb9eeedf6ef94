//! Integer grid positions. Arithmetic is total over all integer pairs;
//! negative or out-of-bounds positions are representable, bounds checking
//! happens at the session kernel boundary.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::ops::{Add, Sub};

/// A `(row, col)` position or offset on a board.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Vector2 {
    pub row: i32,
    pub col: i32,
}

impl Vector2 {
    pub const fn new(row: i32, col: i32) -> Vector2 {
        Vector2 { row, col }
    }

    /// Component-wise absolute value, handy for distance checks.
    pub fn abs(self) -> Vector2 {
        Vector2::new(self.row.abs(), self.col.abs())
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, other: Vector2) -> Vector2 {
        Vector2::new(self.row + other.row, self.col + other.col)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.row - other.row, self.col - other.col)
    }
}

/// Positions travel as `[row, col]` pairs on the wire.
impl Serialize for Vector2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.row, self.col).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vector2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Vector2, D::Error> {
        let (row, col) = <(i32, i32)>::deserialize(deserializer)?;
        Ok(Vector2::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn arithmetic() {
        let a = Vector2::new(2, 3);
        let b = Vector2::new(-1, 4);
        assert_eq!(a + b, Vector2::new(1, 7));
        assert_eq!(a - b, Vector2::new(3, -1));
        assert_eq!((b - a).abs(), Vector2::new(3, 1));
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Vector2::new(0, 0), "a");
        map.insert(Vector2::new(0, 1), "b");
        assert_eq!(map.get(&Vector2::new(0, 0)), Some(&"a"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn wire_form_is_a_pair() {
        let json = serde_json::to_value(Vector2::new(6, 0)).unwrap();
        assert_eq!(json, serde_json::json!([6, 0]));
        let back: Vector2 = serde_json::from_value(json).unwrap();
        assert_eq!(back, Vector2::new(6, 0));
    }
}
