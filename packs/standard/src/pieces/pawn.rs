use crate::helpers::n_state_by_color;
use engine::{Action, Direction, GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

pub struct Pawn;

pub static PAWN: Pawn = Pawn;

impl PieceBehavior for Pawn {
    fn name(&self) -> &'static str {
        "Pawn"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/pawn.svg")
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let row_diff = to_pos.row - from_pos.row;
        let col_diff = to_pos.col - from_pos.col;

        // Pawns only know how to face north or south.
        let forward = match piece.direction {
            Direction::North => -1,
            Direction::South => 1,
            _ => return Ok(Vec::new()),
        };

        let mut result = Vec::new();

        match data.board().get(&to_pos) {
            None => {
                // Check for single advance.
                if col_diff == 0 && row_diff == forward {
                    result.push(Ply::new(
                        "Single Advance",
                        vec![Action::Move { from_pos, to_pos }],
                    ));
                }

                // Check for en passant: the victim sits behind the target
                // square and its newest move was the double advance onto it.
                if col_diff.abs() == 1 {
                    let captured_pos = Vector2::new(to_pos.row - forward, to_pos.col);
                    if let Some(captured) = data.board().get(&captured_pos)
                        && captured.is_kind(&PAWN)
                        && captured.color != piece.color
                        && let Some(event) = n_state_by_color(data, captured.color, 1, true)
                        && let Some(ply) = &event.ply
                        && ply.actions.contains(&Action::Move {
                            from_pos: Vector2::new(to_pos.row + forward, to_pos.col),
                            to_pos: captured_pos,
                        })
                    {
                        result.push(Ply::new(
                            "En Passant",
                            vec![
                                Action::Destroy { pos: captured_pos },
                                Action::Move { from_pos, to_pos },
                            ],
                        ));
                    }
                }
            }
            // Check for diagonal capture.
            Some(occupant) => {
                if row_diff == forward && col_diff.abs() == 1 && occupant.color != piece.color {
                    result.push(Ply::new(
                        "Capture",
                        vec![
                            Action::Destroy { pos: to_pos },
                            Action::Move { from_pos, to_pos },
                        ],
                    ));
                }
            }
        }

        Ok(result)
    }
}
