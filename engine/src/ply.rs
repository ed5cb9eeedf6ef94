//! Plies and the primitive board actions they are made of.

use crate::piece::Piece;
use crate::vector2::Vector2;
use serde::Serialize;
use thiserror::Error;

/// Raised by piece kinds and ply processors when a request is impossible
/// for a precise, client-presentable reason.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct NoMovesError(pub String);

impl NoMovesError {
    pub fn new(reason: impl Into<String>) -> NoMovesError {
        NoMovesError(reason.into())
    }
}

/// A primitive mutation to the board.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Relocates the piece at `from_pos` to `to_pos`, overwriting any
    /// occupant there.
    Move { from_pos: Vector2, to_pos: Vector2 },
    /// Removes the piece at `pos`.
    Destroy { pos: Vector2 },
    /// Places a fresh copy of `piece` at `pos`, overwriting any occupant.
    Create { piece: Piece, pos: Vector2 },
}

/// One atomic turn's worth of actions by one player. The actions apply in
/// order and stand or fall together.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ply {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Ply {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Ply {
        Ply {
            name: name.into(),
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_forms() {
        let action = Action::Move {
            from_pos: Vector2::new(6, 0),
            to_pos: Vector2::new(5, 0),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            serde_json::json!({"type": "move", "from_pos": [6, 0], "to_pos": [5, 0]})
        );

        let action = Action::Destroy {
            pos: Vector2::new(1, 1),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            serde_json::json!({"type": "destroy", "pos": [1, 1]})
        );
    }

    #[test]
    fn ply_wire_form_carries_name_and_actions() {
        let ply = Ply::new(
            "Single Advance",
            vec![Action::Move {
                from_pos: Vector2::new(6, 0),
                to_pos: Vector2::new(5, 0),
            }],
        );
        let json = serde_json::to_value(&ply).unwrap();
        assert_eq!(json["name"], "Single Advance");
        assert_eq!(json["actions"][0]["type"], "move");
    }
}
