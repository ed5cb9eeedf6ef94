//! Player colors. The wire value is the integer 0..8, where 8 is the
//! neutral sentinel used by pieces that belong to nobody.

use serde::ser::{Serialize, Serializer};

/// The eight player colors plus the neutral sentinel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    White,
    Black,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    None,
}

impl Color {
    /// Every color a player can actually sit down as.
    pub const PLAYABLE: [Color; 8] = [
        Color::White,
        Color::Black,
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Purple,
    ];

    pub fn value(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 1,
            Color::Red => 2,
            Color::Orange => 3,
            Color::Yellow => 4,
            Color::Green => 5,
            Color::Blue => 6,
            Color::Purple => 7,
            Color::None => 8,
        }
    }

    pub fn from_value(value: u8) -> Option<Color> {
        match value {
            0 => Some(Color::White),
            1 => Some(Color::Black),
            2 => Some(Color::Red),
            3 => Some(Color::Orange),
            4 => Some(Color::Yellow),
            5 => Some(Color::Green),
            6 => Some(Color::Blue),
            7 => Some(Color::Purple),
            8 => Some(Color::None),
            _ => None,
        }
    }

    /// Display name for info texts and winner reasons.
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::Blue => "Blue",
            Color::Purple => "Purple",
            Color::None => "None",
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip() {
        for value in 0..=8 {
            let color = Color::from_value(value).unwrap();
            assert_eq!(color.value(), value);
        }
        assert_eq!(Color::from_value(9), None);
    }
}
