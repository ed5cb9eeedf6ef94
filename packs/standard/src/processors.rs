//! The concrete ply processors the standard controllers compose their
//! legality policy from. Each one is a single-responsibility filter over
//! the candidate list; the chain wiring decides whether its refusal stops
//! the request or is ignored.

use crate::helpers::{
    empty_along_axis, find_pieces, next_color, opposite, pawn_promotions, threatened,
};
use crate::pieces::{KING, PAWN};
use engine::direction::board_range;
use engine::{Action, Color, GameData, NoMovesError, Ply, PlyProcessor, Vector2};

/// Refuses the request outright when the source piece does not belong to
/// the asking color.
pub struct OnlyPieceOwner<'a> {
    pub data: &'a GameData,
    pub color: Color,
    pub from_pos: Vector2,
}

impl PlyProcessor for OnlyPieceOwner<'_> {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        match self.data.board().get(&self.from_pos) {
            Some(piece) if piece.color == self.color => Ok(plies),
            _ => Err(NoMovesError::new("That is not your piece.")),
        }
    }
}

/// Refuses the request when it is not the asking color's turn.
pub struct OnlyOnOwnTurn<'a> {
    pub data: &'a GameData,
    pub color: Color,
}

impl PlyProcessor for OnlyOnOwnTurn<'_> {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        if self.color != next_color(self.data) {
            return Err(NoMovesError::new("It is not your turn."));
        }
        Ok(plies)
    }
}

/// Replaces a pawn's arrival at the last rank with the four promotion
/// choices.
pub struct AllowPawnPromotion<'a> {
    pub data: &'a GameData,
    pub from_pos: Vector2,
    pub to_pos: Vector2,
}

impl PlyProcessor for AllowPawnPromotion<'_> {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        match self.data.board().get(&self.from_pos) {
            Some(piece) if piece.is_kind(&PAWN) && [0, 7].contains(&self.to_pos.row) => {
                Ok(pawn_promotions(piece, self.from_pos, self.to_pos))
            }
            _ => Ok(plies),
        }
    }
}

/// Injects the two-square opening advance for pawns still on their home
/// rank, and names the reason when a two-square request does not qualify.
pub struct AllowPawnDoubleAdvance<'a> {
    pub data: &'a GameData,
    pub color: Color,
    pub from_pos: Vector2,
    pub to_pos: Vector2,
}

impl PlyProcessor for AllowPawnDoubleAdvance<'_> {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        let Some(piece) = self.data.board().get(&self.from_pos) else {
            return Ok(plies);
        };
        if !piece.is_kind(&PAWN) {
            return Ok(plies);
        }

        let distance = (self.to_pos - self.from_pos).abs();
        let qualifies = distance.col == 0
            && empty_along_axis(self.data.board(), self.from_pos, self.to_pos, true)
            && ((self.color == Color::White && self.from_pos.row == 6 && self.to_pos.row == 4)
                || (self.color == Color::Black && self.from_pos.row == 1 && self.to_pos.row == 3));

        if qualifies {
            let mut result = vec![Ply::new(
                "Double Advance",
                vec![Action::Move {
                    from_pos: self.from_pos,
                    to_pos: self.to_pos,
                }],
            )];
            result.extend(plies);
            Ok(result)
        } else if distance.row == 2 {
            Err(NoMovesError::new(
                "This piece cannot double advance in this position.",
            ))
        } else {
            Ok(plies)
        }
    }
}

/// Refuses a castle whose king would pass through an attacked square.
pub struct ProhibitCastlingOverCheck<'a> {
    pub data: &'a GameData,
    pub color: Color,
    pub from_pos: Vector2,
    pub to_pos: Vector2,
}

impl ProhibitCastlingOverCheck<'_> {
    fn threatened_across_range(&self) -> Result<(), NoMovesError> {
        let range = board_range(self.from_pos, self.to_pos, false, false).unwrap_or_default();
        for pos in range {
            let probe = Ply::new(
                "Move",
                vec![Action::Move {
                    from_pos: self.from_pos,
                    to_pos: pos,
                }],
            );
            let Ok(state) = self.data.next_state(Some(self.color), &probe) else {
                continue;
            };
            if threatened(self.data, pos, &[opposite(self.color)], Some(&state)) {
                return Err(NoMovesError::new("You cannot castle over check."));
            }
        }
        Ok(())
    }
}

impl PlyProcessor for ProhibitCastlingOverCheck<'_> {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        for ply in &plies {
            if ply.name == "Castle" {
                self.threatened_across_range()?;
            }
        }
        Ok(plies)
    }
}

/// Refuses any ply that would leave the mover's own king attacked.
pub struct ProhibitEndingInCheck<'a> {
    pub data: &'a GameData,
    pub color: Color,
}

impl PlyProcessor for ProhibitEndingInCheck<'_> {
    fn process(&self, plies: Vec<Ply>) -> Result<Vec<Ply>, NoMovesError> {
        for ply in &plies {
            let Ok(state) = self.data.next_state(Some(self.color), ply) else {
                continue;
            };
            let Some((king_pos, _)) = find_pieces(&state.board, Some(&KING), Some(self.color))
                .into_iter()
                .next()
            else {
                continue;
            };
            if threatened(self.data, king_pos, &[opposite(self.color)], Some(&state)) {
                return Err(NoMovesError::new("That move leaves you in check."));
            }
        }
        Ok(plies)
    }
}
