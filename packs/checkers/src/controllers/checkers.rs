//! Checkers with an optional forced-capture rule, multi-jump turns and
//! kinging on the far rank.

use crate::pieces::{KING, MAN};
use engine::{
    Action, Color, Controller, ControllerSpec, Direction, GameCore, GameData, InfoElement,
    NoMovesError, OptionSpec, OptionValues, Piece, Ply, Vector2,
};
use standard_pack::helpers::move_to_promotion;

const MOVES_NORTH: [Vector2; 2] = [Vector2::new(-1, 1), Vector2::new(-1, -1)];
const JUMPS_NORTH: [Vector2; 2] = [Vector2::new(-2, 2), Vector2::new(-2, -2)];
const MOVES_SOUTH: [Vector2; 2] = [Vector2::new(1, 1), Vector2::new(1, -1)];
const JUMPS_SOUTH: [Vector2; 2] = [Vector2::new(2, 2), Vector2::new(2, -2)];
const MOVES_KING: [Vector2; 4] = [
    Vector2::new(1, 1),
    Vector2::new(1, -1),
    Vector2::new(-1, 1),
    Vector2::new(-1, -1),
];
const JUMPS_KING: [Vector2; 4] = [
    Vector2::new(2, 2),
    Vector2::new(2, -2),
    Vector2::new(-2, 2),
    Vector2::new(-2, -2),
];

/// The single-step and jump offsets a piece owns, by kind and heading.
fn offsets(piece: &Piece) -> (&'static [Vector2], &'static [Vector2]) {
    if piece.is_kind(&KING) {
        return (&MOVES_KING, &JUMPS_KING);
    }
    match piece.direction {
        Direction::North => (&MOVES_NORTH, &JUMPS_NORTH),
        Direction::South => (&MOVES_SOUTH, &JUMPS_SOUTH),
        _ => (&[], &[]),
    }
}

fn has_capture(ply: &Ply) -> bool {
    ply.actions
        .iter()
        .any(|action| matches!(action, Action::Destroy { .. }))
}

pub struct CheckersSpec;

pub static CHECKERS: CheckersSpec = CheckersSpec;

impl ControllerSpec for CheckersSpec {
    fn name(&self) -> &'static str {
        "Checkers"
    }

    fn board_size(&self) -> Vector2 {
        Vector2::new(8, 8)
    }

    fn colors(&self) -> &'static [Color] {
        &[Color::Black, Color::Red]
    }

    fn options(&self) -> Vec<(&'static str, OptionSpec)> {
        vec![("Force Capture", OptionSpec::Bool { default: true })]
    }

    fn create(&self, options: OptionValues) -> Box<dyn Controller> {
        Box::new(Checkers {
            force_capture: options.bool("Force Capture").unwrap_or(true),
        })
    }
}

pub struct Checkers {
    force_capture: bool,
}

impl Checkers {
    /// The color whose turn it is, plus the position of a piece that just
    /// jumped and may continue jumping.
    fn current_color(&self, data: &GameData) -> (Color, Option<Vector2>) {
        let last = data.last_state();
        let Some(last_color) = last.ply_color else {
            // Black opens the game.
            return (Color::Black, None);
        };

        if let Some(ply) = &last.ply
            && let [Action::Destroy { .. }, Action::Move { to_pos, .. }, ..] = &ply.actions[..]
            && let Some(jumper) = data.board().get(to_pos)
            && self.piece_can_jump(data, *to_pos, jumper)
        {
            return (last_color, Some(*to_pos));
        }

        let other = if last_color == Color::Red {
            Color::Black
        } else {
            Color::Red
        };
        (other, None)
    }

    fn piece_can_jump(&self, data: &GameData, pos: Vector2, piece: &Piece) -> bool {
        let (_, jumps) = offsets(piece);
        for offset in jumps {
            let target = pos + *offset;
            if !data.in_bounds(target) {
                continue;
            }
            let Ok(plies) = piece.plies(pos, target, data) else {
                continue;
            };
            if plies.iter().any(has_capture) {
                return true;
            }
        }
        false
    }

    fn color_can_jump(&self, data: &GameData, color: Color) -> bool {
        data.board()
            .iter()
            .filter(|(_, piece)| piece.color == color)
            .any(|(pos, piece)| self.piece_can_jump(data, *pos, piece))
    }

    fn has_legal_move(&self, data: &GameData, color: Color) -> bool {
        for (pos, piece) in data.board() {
            if piece.color != color {
                continue;
            }
            let (moves, jumps) = offsets(piece);
            for offset in moves.iter().chain(jumps) {
                let target = *pos + *offset;
                if !data.in_bounds(target) {
                    continue;
                }
                let Ok(plies) = piece.plies(*pos, target, data) else {
                    continue;
                };
                if !plies.is_empty() {
                    return true;
                }
            }
        }
        false
    }

    /// Rewrites any man's arrival at the far rank into a kinging.
    fn promote_arrivals(&self, data: &GameData, ply: Ply) -> Ply {
        let mut actions = Vec::with_capacity(ply.actions.len());
        for action in ply.actions {
            let crowned = match &action {
                Action::Move { from_pos, to_pos } if [0, 7].contains(&to_pos.row) => {
                    data.board()
                        .get(from_pos)
                        .filter(|mover| mover.is_kind(&MAN))
                        .map(|mover| Piece::new(&KING, mover.color, mover.direction))
                }
                _ => None,
            };

            match crowned {
                Some(replacement) => actions.extend(move_to_promotion(&action, replacement)),
                None => actions.push(action),
            }
        }
        Ply::new(ply.name, actions)
    }

    fn update_info(&self, game: &mut GameCore) {
        let (color, _) = self.current_color(game.data());
        game.update_public_info(vec![InfoElement::text(format!(
            "Current Turn: {}",
            color.name()
        ))]);
    }
}

impl Controller for Checkers {
    fn init_board(&mut self, game: &mut GameCore) {
        for row in [0, 1, 2, 5, 6, 7] {
            for col in (0..8).step_by(2) {
                let col = col + row % 2;
                let (color, direction) = if row > 2 {
                    (Color::Black, Direction::North)
                } else {
                    (Color::Red, Direction::South)
                };
                game.board_mut().insert(
                    Vector2::new(row, col),
                    Piece::new(&MAN, color, direction),
                );
            }
        }

        self.update_info(game);
    }

    fn get_plies(
        &self,
        game: &GameCore,
        color: Color,
        from_pos: Vector2,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let data = game.data();
        let Some(piece) = data.board().get(&from_pos) else {
            return Ok(Vec::new());
        };
        if piece.color != color {
            return Ok(Vec::new());
        }

        let (current_color, continuing) = self.current_color(data);
        if color != current_color {
            return Ok(Vec::new());
        }

        let candidates = piece.plies(from_pos, to_pos, data)?;

        let chosen: Vec<Ply> = if let Some(jumper_pos) = continuing {
            // Mid multi-jump only the jumping piece may act, and only by
            // jumping again.
            if from_pos != jumper_pos {
                return Ok(Vec::new());
            }
            candidates.into_iter().filter(has_capture).take(1).collect()
        } else if self.force_capture && self.color_can_jump(data, color) {
            candidates.into_iter().filter(has_capture).collect()
        } else {
            candidates
        };

        Ok(chosen
            .into_iter()
            .map(|ply| self.promote_arrivals(data, ply))
            .collect())
    }

    fn after_ply(&mut self, game: &mut GameCore) {
        for color in [Color::Black, Color::Red] {
            if !self.has_legal_move(game.data(), color) {
                let other = if color == Color::Red {
                    Color::Black
                } else {
                    Color::Red
                };
                game.winner(vec![other], "No Remaining Moves");
            }
        }

        self.update_info(game);
    }
}
