use crate::pieces::king::move_or_capture;
use engine::{Direction, GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

/// An uncrowned piece: moves like a king, but only away from its home
/// rank.
pub struct Man;

pub static MAN: Man = Man;

impl PieceBehavior for Man {
    fn name(&self) -> &'static str {
        "Man"
    }

    fn pack(&self) -> &'static str {
        "checkers"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/man.svg")
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let row_diff = to_pos.row - from_pos.row;

        let backwards = (piece.direction == Direction::North && row_diff > 0)
            || (piece.direction == Direction::South && row_diff < 0);
        if backwards {
            return Ok(Vec::new());
        }

        Ok(move_or_capture(from_pos, to_pos, data))
    }
}
