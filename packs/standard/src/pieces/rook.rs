use crate::helpers::capture_or_move_if_empty;
use engine::direction::axis_direction;
use engine::{Direction, GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

pub struct Rook;

pub static ROOK: Rook = Rook;

impl PieceBehavior for Rook {
    fn name(&self) -> &'static str {
        "Rook"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/rook.svg")
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        match axis_direction(from_pos, to_pos) {
            Some(direction) if Direction::CARDINALS.contains(&direction) => Ok(
                capture_or_move_if_empty(data.board(), piece.color, from_pos, to_pos),
            ),
            _ => Err(NoMovesError::new(
                "That piece can only move in cardinal directions.",
            )),
        }
    }
}
