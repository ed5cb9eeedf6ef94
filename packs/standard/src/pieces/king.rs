use crate::helpers::{capture_or_move, closest_piece_along_axis};
use crate::pieces::ROOK;
use engine::direction::axis_direction;
use engine::{Action, GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

pub struct King;

pub static KING: King = King;

impl PieceBehavior for King {
    fn name(&self) -> &'static str {
        "King"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/king.svg")
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let distance = (to_pos - from_pos).abs();

        // Anything further than one square can only be a castle attempt.
        if from_pos == to_pos || distance.row > 1 || distance.col > 1 {
            let castle_shape = (distance.row == 2 && distance.col == 0)
                || (distance.row == 0 && distance.col == 2)
                || (distance.row == 2 && distance.col == 2);
            if !castle_shape {
                return Ok(Vec::new());
            }

            let Some(direction) = axis_direction(from_pos, to_pos) else {
                return Ok(Vec::new());
            };
            if piece.moves_made > 0 {
                return Ok(Vec::new());
            }

            let Some((rook, rook_pos)) = closest_piece_along_axis(data, from_pos, direction)
            else {
                return Ok(Vec::new());
            };
            if !rook.is_kind(&ROOK) || rook.moves_made > 0 {
                return Ok(Vec::new());
            }

            // The rook lands on the square the king steps over.
            return Ok(vec![Ply::new(
                "Castle",
                vec![
                    Action::Move { from_pos, to_pos },
                    Action::Move {
                        from_pos: rook_pos,
                        to_pos: from_pos + direction.offset(),
                    },
                ],
            )]);
        }

        Ok(capture_or_move(data.board(), piece.color, from_pos, to_pos))
    }
}
