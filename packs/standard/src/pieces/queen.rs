use crate::helpers::capture_or_move_if_empty;
use engine::direction::axis_direction;
use engine::{GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

pub struct Queen;

pub static QUEEN: Queen = Queen;

impl PieceBehavior for Queen {
    fn name(&self) -> &'static str {
        "Queen"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/queen.svg")
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        if axis_direction(from_pos, to_pos).is_none() {
            return Err(NoMovesError::new(
                "That piece can only move along straight lines.",
            ));
        }

        Ok(capture_or_move_if_empty(
            data.board(),
            piece.color,
            from_pos,
            to_pos,
        ))
    }
}
