use crate::helpers::capture_or_move;
use engine::{GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

pub struct Knight;

pub static KNIGHT: Knight = Knight;

impl PieceBehavior for Knight {
    fn name(&self) -> &'static str {
        "Knight"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/knight.svg")
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let distance = (to_pos - from_pos).abs();

        if (distance.row == 2 && distance.col == 1) || (distance.row == 1 && distance.col == 2) {
            Ok(capture_or_move(data.board(), piece.color, from_pos, to_pos))
        } else {
            Err(NoMovesError::new(
                "That piece must move two spaces in one cardinal axis, and one in another.",
            ))
        }
    }
}
