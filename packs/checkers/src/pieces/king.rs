use engine::{Action, GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

/// A crowned piece: one square diagonally in any direction, or a jump over
/// an adjacent enemy.
pub struct King;

pub static KING: King = King;

/// The shared checkers move shape, also used by [`Man`](crate::pieces::Man)
/// after its direction filter.
pub fn move_or_capture(from_pos: Vector2, to_pos: Vector2, data: &GameData) -> Vec<Ply> {
    let row_diff = to_pos.row - from_pos.row;
    let col_diff = to_pos.col - from_pos.col;

    if row_diff.abs() == 1 && col_diff.abs() == 1 {
        if !data.board().contains_key(&to_pos) {
            return vec![Ply::new(
                "Move",
                vec![Action::Move { from_pos, to_pos }],
            )];
        }
    } else if row_diff.abs() == 2 && col_diff.abs() == 2 {
        let capture_pos = Vector2::new(from_pos.row + row_diff / 2, from_pos.col + col_diff / 2);
        let jumper = data.board().get(&from_pos);
        let victim = data.board().get(&capture_pos);
        if !data.board().contains_key(&to_pos)
            && let (Some(jumper), Some(victim)) = (jumper, victim)
            && victim.color != jumper.color
        {
            return vec![Ply::new(
                "Capture",
                vec![
                    Action::Destroy { pos: capture_pos },
                    Action::Move { from_pos, to_pos },
                ],
            )];
        }
    }

    Vec::new()
}

impl PieceBehavior for King {
    fn name(&self) -> &'static str {
        "King"
    }

    fn pack(&self) -> &'static str {
        "checkers"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/king.svg")
    }

    fn plies(
        &self,
        _piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        Ok(move_or_capture(from_pos, to_pos, data))
    }
}
