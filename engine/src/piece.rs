//! The piece interface. Each concrete kind is a stateless singleton behind
//! [`PieceBehavior`]; a [`Piece`] on the board is that singleton plus its
//! per-instance color, heading and move counter.

use crate::color::Color;
use crate::direction::Direction;
use crate::ply::{NoMovesError, Ply};
use crate::state::GameData;
use crate::vector2::Vector2;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// The per-kind capability set of a piece.
///
/// `plies` returns the candidate plies the piece is intrinsically capable of
/// performing: movement geometry, blocking along the path, capture by
/// destruction at the destination. It must not consult turn order, check
/// legality, promotion or any rule whose scope is larger than a single
/// piece; those live in the rule module's processor chain. A kind may signal
/// "geometrically impossible" with a [`NoMovesError`] so the rule module can
/// surface a precise reason to the client.
pub trait PieceBehavior: Sync {
    fn name(&self) -> &'static str;

    /// The id of the pack this kind ships in.
    fn pack(&self) -> &'static str;

    /// SVG payload sent to clients with the pack data.
    fn image(&self) -> &'static str;

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError>;
}

/// A piece on the board.
#[derive(Clone, Copy)]
pub struct Piece {
    pub behavior: &'static dyn PieceBehavior,
    pub color: Color,
    pub direction: Direction,
    /// Incremented only by the state reducer when a move action moves this
    /// piece.
    pub moves_made: u32,
}

impl Piece {
    pub fn new(behavior: &'static dyn PieceBehavior, color: Color, direction: Direction) -> Piece {
        Piece {
            behavior,
            color,
            direction,
            moves_made: 0,
        }
    }

    /// A fresh instance of the same kind, color and heading with the move
    /// counter reset. This is what a create action places on the board.
    pub fn fresh(&self) -> Piece {
        Piece::new(self.behavior, self.color, self.direction)
    }

    pub fn is_kind(&self, kind: &'static dyn PieceBehavior) -> bool {
        self.behavior.pack() == kind.pack() && self.behavior.name() == kind.name()
    }

    pub fn plies(
        &self,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        self.behavior.plies(self, from_pos, to_pos, data)
    }
}

/// Wire identity: kind, color and heading. The move counter is a runtime
/// attribute and does not participate.
impl PartialEq for Piece {
    fn eq(&self, other: &Piece) -> bool {
        self.behavior.pack() == other.behavior.pack()
            && self.behavior.name() == other.behavior.name()
            && self.color == other.color
            && self.direction == other.direction
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {} facing {:?}>",
            self.color.name(),
            self.behavior.name(),
            self.direction
        )
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("pack_id", self.behavior.pack())?;
        map.serialize_entry("piece_type_id", self.behavior.name())?;
        map.serialize_entry("color", &self.color)?;
        map.serialize_entry("direction", &self.direction)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{NULL, SCOUT};

    #[test]
    fn equality_ignores_move_counter() {
        let mut a = Piece::new(&SCOUT, Color::White, Direction::North);
        let b = Piece::new(&SCOUT, Color::White, Direction::North);
        a.moves_made = 3;
        assert_eq!(a, b);
        assert_ne!(a, Piece::new(&SCOUT, Color::Black, Direction::North));
        assert_ne!(a, Piece::new(&NULL, Color::White, Direction::North));
    }

    #[test]
    fn fresh_resets_the_move_counter() {
        let mut piece = Piece::new(&SCOUT, Color::White, Direction::North);
        piece.moves_made = 5;
        let copy = piece.fresh();
        assert_eq!(copy.moves_made, 0);
        assert_eq!(copy, piece);
    }

    #[test]
    fn wire_form() {
        let piece = Piece::new(&SCOUT, Color::Black, Direction::South);
        assert_eq!(
            serde_json::to_value(piece).unwrap(),
            serde_json::json!({
                "pack_id": "testing",
                "piece_type_id": "Scout",
                "color": 1,
                "direction": 4,
            })
        );
    }
}
