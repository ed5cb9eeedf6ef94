//! The append-only game history and its pure state reducer.

use crate::color::Color;
use crate::piece::Piece;
use crate::ply::{Action, Ply};
use crate::vector2::Vector2;
use std::collections::HashMap;
use thiserror::Error;

pub type Board = HashMap<Vector2, Piece>;

/// One entry of a game's history. `ply_color` and `ply` record the move
/// that produced this state; both are `None` on the initial state.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub ply_color: Option<Color>,
    pub ply: Option<Ply>,
}

/// Errors from the state reducer. A ply whose actions cannot all apply is
/// rejected entirely; clients see this as stale state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReducerError {
    #[error("move source {0:?} is empty")]
    MoveFromEmpty(Vector2),
    #[error("move from {0:?} onto itself")]
    MoveOntoItself(Vector2),
    #[error("destroy target {0:?} is empty")]
    DestroyEmpty(Vector2),
}

/// The board history plus the static board dimensions and color roster.
#[derive(Clone, Debug)]
pub struct GameData {
    /// Never empty: the head is the initial board and never mutates after
    /// the controller has placed its starting pieces.
    pub history: Vec<GameState>,
    pub board_size: Vector2,
    pub colors: Vec<Color>,
}

impl GameData {
    pub fn new(board_size: Vector2, colors: Vec<Color>) -> GameData {
        GameData {
            history: vec![GameState {
                board: Board::new(),
                ply_color: None,
                ply: None,
            }],
            board_size,
            colors,
        }
    }

    /// The current board, i.e. the board of the newest history entry.
    pub fn board(&self) -> &Board {
        &self.last_state().board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        let last = self.history.len() - 1;
        &mut self.history[last].board
    }

    pub fn last_state(&self) -> &GameState {
        // History is never empty by construction.
        &self.history[self.history.len() - 1]
    }

    pub fn in_bounds(&self, pos: Vector2) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.board_size.row && pos.col < self.board_size.col
    }

    /// The pure state transition: applies the ply's actions in order to a
    /// copy of the current board.
    ///
    /// Every action must see the position state left behind by the actions
    /// before it; a move from an empty square or a destroy of an empty
    /// square fails the whole ply.
    pub fn next_state(&self, color: Option<Color>, ply: &Ply) -> Result<GameState, ReducerError> {
        let mut board = self.board().clone();

        for action in &ply.actions {
            match action {
                Action::Move { from_pos, to_pos } => {
                    if from_pos == to_pos {
                        return Err(ReducerError::MoveOntoItself(*from_pos));
                    }
                    let mut piece = board
                        .remove(from_pos)
                        .ok_or(ReducerError::MoveFromEmpty(*from_pos))?;
                    piece.moves_made += 1;
                    board.insert(*to_pos, piece);
                }
                Action::Destroy { pos } => {
                    board.remove(pos).ok_or(ReducerError::DestroyEmpty(*pos))?;
                }
                Action::Create { piece, pos } => {
                    board.insert(*pos, piece.fresh());
                }
            }
        }

        Ok(GameState {
            board,
            ply_color: color,
            ply: Some(ply.clone()),
        })
    }

    /// A scratch copy of this history with `state` appended, for probing
    /// hypothetical positions (threat checks and the like).
    pub fn with_state(&self, state: GameState) -> GameData {
        let mut data = self.clone();
        data.history.push(state);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::testing::SCOUT;

    fn data_with_scout(pos: Vector2) -> GameData {
        let mut data = GameData::new(Vector2::new(8, 8), vec![Color::White, Color::Black]);
        data.board_mut()
            .insert(pos, Piece::new(&SCOUT, Color::White, Direction::North));
        data
    }

    #[test]
    fn move_increments_the_counter_and_relocates() {
        let data = data_with_scout(Vector2::new(6, 0));
        let ply = Ply::new(
            "Advance",
            vec![Action::Move {
                from_pos: Vector2::new(6, 0),
                to_pos: Vector2::new(5, 0),
            }],
        );

        let state = data.next_state(Some(Color::White), &ply).unwrap();
        assert!(!state.board.contains_key(&Vector2::new(6, 0)));
        assert_eq!(state.board[&Vector2::new(5, 0)].moves_made, 1);
        assert_eq!(state.ply_color, Some(Color::White));

        // The predecessor board is untouched.
        assert!(data.board().contains_key(&Vector2::new(6, 0)));
    }

    #[test]
    fn move_overwrites_the_destination() {
        let mut data = data_with_scout(Vector2::new(6, 0));
        data.board_mut().insert(
            Vector2::new(5, 0),
            Piece::new(&SCOUT, Color::Black, Direction::South),
        );

        let ply = Ply::new(
            "Advance",
            vec![Action::Move {
                from_pos: Vector2::new(6, 0),
                to_pos: Vector2::new(5, 0),
            }],
        );
        let state = data.next_state(Some(Color::White), &ply).unwrap();
        assert_eq!(state.board.len(), 1);
        assert_eq!(state.board[&Vector2::new(5, 0)].color, Color::White);
    }

    #[test]
    fn actions_see_the_effects_of_earlier_actions() {
        let mut data = data_with_scout(Vector2::new(3, 1));
        data.board_mut().insert(
            Vector2::new(3, 0),
            Piece::new(&SCOUT, Color::Black, Direction::South),
        );

        // Destroy first, then move onto the vacated square.
        let ply = Ply::new(
            "Capture",
            vec![
                Action::Destroy {
                    pos: Vector2::new(3, 0),
                },
                Action::Move {
                    from_pos: Vector2::new(3, 1),
                    to_pos: Vector2::new(3, 0),
                },
            ],
        );
        let state = data.next_state(Some(Color::White), &ply).unwrap();
        assert_eq!(state.board.len(), 1);
        assert_eq!(state.board[&Vector2::new(3, 0)].color, Color::White);
    }

    #[test]
    fn destroy_of_an_empty_square_rejects_the_whole_ply() {
        let data = data_with_scout(Vector2::new(6, 0));
        let ply = Ply::new(
            "Bad",
            vec![Action::Destroy {
                pos: Vector2::new(0, 0),
            }],
        );
        assert_eq!(
            data.next_state(Some(Color::White), &ply),
            Err(ReducerError::DestroyEmpty(Vector2::new(0, 0)))
        );
    }

    #[test]
    fn create_places_a_fresh_copy() {
        let data = GameData::new(Vector2::new(8, 8), vec![Color::White]);
        let mut template = Piece::new(&SCOUT, Color::White, Direction::North);
        template.moves_made = 7;

        let ply = Ply::new(
            "Create",
            vec![Action::Create {
                piece: template,
                pos: Vector2::new(4, 4),
            }],
        );
        let state = data.next_state(Some(Color::White), &ply).unwrap();
        assert_eq!(state.board[&Vector2::new(4, 4)].moves_made, 0);
    }

    #[test]
    fn move_onto_itself_is_rejected() {
        let data = data_with_scout(Vector2::new(6, 0));
        let ply = Ply::new(
            "Bad",
            vec![Action::Move {
                from_pos: Vector2::new(6, 0),
                to_pos: Vector2::new(6, 0),
            }],
        );
        assert_eq!(
            data.next_state(Some(Color::White), &ply),
            Err(ReducerError::MoveOntoItself(Vector2::new(6, 0)))
        );
    }
}
