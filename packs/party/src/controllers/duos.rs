//! Duos: two-versus-two chess. Each team fields one king; the king's
//! owner answers for check, and teammates can never capture each other.

use engine::{
    Action, Color, Controller, ControllerSpec, Direction, GameCore, GameData, InfoElement,
    NoMovesError, OptionValues, Piece, PieceBehavior, Ply, Vector2,
};
use standard_pack::helpers::{
    find_pieces, next_color_skipping, pawn_promotions, players_without_pieces, threatened,
};
use standard_pack::pieces::{BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK};

/// The teammate who fields the king, per color.
fn king_owner(color: Color) -> Color {
    match color {
        Color::Red | Color::Orange => Color::Orange,
        _ => Color::Purple,
    }
}

fn opponents(color: Color) -> &'static [Color] {
    match color {
        Color::Red | Color::Orange => &[Color::Blue, Color::Purple],
        _ => &[Color::Red, Color::Orange],
    }
}

pub struct DuosSpec;

pub static DUOS: DuosSpec = DuosSpec;

impl ControllerSpec for DuosSpec {
    fn name(&self) -> &'static str {
        "Duos"
    }

    fn board_size(&self) -> Vector2 {
        Vector2::new(8, 8)
    }

    fn colors(&self) -> &'static [Color] {
        &[Color::Orange, Color::Purple, Color::Red, Color::Blue]
    }

    fn create(&self, _options: OptionValues) -> Box<dyn Controller> {
        Box::new(Duos)
    }
}

pub struct Duos;

impl Duos {
    fn turn(&self, data: &GameData) -> Color {
        next_color_skipping(data, &players_without_pieces(data))
    }

    fn update_info(&self, game: &mut GameCore) {
        let mut elements = Vec::new();

        for king_color in [Color::Orange, Color::Purple] {
            if let Some((king_pos, _)) =
                find_pieces(game.board(), Some(&KING), Some(king_color))
                    .into_iter()
                    .next()
                && threatened(game.data(), king_pos, opponents(king_color), None)
            {
                elements.push(InfoElement::text(format!(
                    "{} is in check!",
                    king_color.name()
                )));
            }
        }

        elements.push(InfoElement::text(format!(
            "Current Turn: {}",
            self.turn(game.data()).name()
        )));
        game.update_public_info(elements);
    }
}

impl Controller for Duos {
    fn init_board(&mut self, game: &mut GameCore) {
        for (color, direction, row) in [
            (Color::Red, Direction::North, 7),
            (Color::Blue, Direction::South, 0),
        ] {
            let files: [(i32, &'static dyn PieceBehavior); 5] = [
                (0, &ROOK),
                (1, &KNIGHT),
                (2, &BISHOP),
                (3, &QUEEN),
                (6, &KNIGHT),
            ];
            for (col, kind) in files {
                game.board_mut()
                    .insert(Vector2::new(row, col), Piece::new(kind, color, direction));
            }
        }

        for (color, direction, row) in [
            (Color::Orange, Direction::North, 7),
            (Color::Purple, Direction::South, 0),
        ] {
            let files: [(i32, &'static dyn PieceBehavior); 3] =
                [(4, &KING), (5, &BISHOP), (7, &ROOK)];
            for (col, kind) in files {
                game.board_mut()
                    .insert(Vector2::new(row, col), Piece::new(kind, color, direction));
            }
        }

        for (color, direction, row) in [
            (Color::Orange, Direction::North, 6),
            (Color::Purple, Direction::South, 1),
        ] {
            for col in 0..8 {
                game.board_mut()
                    .insert(Vector2::new(row, col), Piece::new(&PAWN, color, direction));
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

        // Make sure it is their piece and their turn.
        if color != piece.color || color != self.turn(data) {
            return Ok(Vec::new());
        }

        let promoting = piece.is_kind(&PAWN)
            && ((to_pos.row == 0 && matches!(color, Color::Red | Color::Orange))
                || (to_pos.row == 7 && matches!(color, Color::Blue | Color::Purple)));
        let candidates = if promoting {
            pawn_promotions(piece, from_pos, to_pos)
        } else {
            piece.plies(from_pos, to_pos, data)?
        };

        let mut result = Vec::new();
        for ply in candidates {
            // Capturing your teammate is not a move.
            let friendly_fire = ply.actions.iter().any(|action| {
                matches!(action, Action::Destroy { pos }
                    if data.board().get(pos).is_some_and(|victim| !opponents(color).contains(&victim.color)))
            });
            if friendly_fire {
                continue;
            }

            // The king's owner must not end their ply in check.
            if color == king_owner(color) {
                let Ok(state) = data.next_state(Some(color), &ply) else {
                    continue;
                };
                if let Some((king_pos, _)) =
                    find_pieces(&state.board, Some(&KING), Some(color))
                        .into_iter()
                        .next()
                    && threatened(data, king_pos, opponents(color), Some(&state))
                {
                    continue;
                }
            }

            result.push(ply);
        }

        Ok(result)
    }

    fn after_ply(&mut self, game: &mut GameCore) {
        let color = self.turn(game.data());

        if matches!(color, Color::Orange | Color::Purple) && !has_legal_move(game.data(), color) {
            let king = find_pieces(game.board(), Some(&KING), Some(color))
                .into_iter()
                .next();
            if let Some((king_pos, _)) = king
                && threatened(game.data(), king_pos, opponents(color), None)
            {
                game.winner(opponents(color).to_vec(), "Checkmate");
            } else {
                game.winner(Vec::new(), "Stalemate");
            }
        }

        self.update_info(game);
    }
}

fn is_legal(data: &GameData, from_pos: Vector2, to_pos: Vector2) -> bool {
    if !data.in_bounds(to_pos) {
        return false;
    }
    let Some(piece) = data.board().get(&from_pos) else {
        return false;
    };
    let Ok(plies) = piece.plies(from_pos, to_pos, data) else {
        return false;
    };

    for ply in plies {
        let friendly_fire = ply.actions.iter().any(|action| {
            matches!(action, Action::Destroy { pos }
                if data.board().get(pos).is_some_and(|victim| !opponents(piece.color).contains(&victim.color)))
        });
        if friendly_fire {
            continue;
        }

        let Ok(state) = data.next_state(Some(piece.color), &ply) else {
            continue;
        };
        match find_pieces(&state.board, Some(&KING), Some(piece.color))
            .into_iter()
            .next()
        {
            Some((king_pos, _)) => {
                if !threatened(data, king_pos, opponents(piece.color), Some(&state)) {
                    return true;
                }
            }
            None => return true,
        }
    }
    false
}

fn has_legal_move(data: &GameData, color: Color) -> bool {
    const KNIGHT_OFFSETS: [Vector2; 8] = [
        Vector2::new(1, 2),
        Vector2::new(2, 1),
        Vector2::new(1, -2),
        Vector2::new(2, -1),
        Vector2::new(-1, 2),
        Vector2::new(-2, 1),
        Vector2::new(-1, -2),
        Vector2::new(-2, -1),
    ];

    for (pos, piece) in find_pieces(data.board(), None, Some(color)) {
        if piece.is_kind(&PAWN) {
            let forward = match piece.direction {
                Direction::North => -1,
                Direction::South => 1,
                _ => continue,
            };
            let probes = [
                Vector2::new(forward, 0),
                Vector2::new(forward * 2, 0),
                Vector2::new(forward, 1),
                Vector2::new(forward, -1),
            ];
            if probes.iter().any(|probe| is_legal(data, pos, pos + *probe)) {
                return true;
            }
        }

        if piece.is_kind(&ROOK) || piece.is_kind(&QUEEN) {
            for direction in Direction::CARDINALS {
                if is_legal(data, pos, pos + direction.offset()) {
                    return true;
                }
            }
        }

        if piece.is_kind(&BISHOP) || piece.is_kind(&QUEEN) {
            for direction in Direction::ORDINALS {
                if is_legal(data, pos, pos + direction.offset()) {
                    return true;
                }
            }
        }

        if piece.is_kind(&KNIGHT)
            && KNIGHT_OFFSETS
                .iter()
                .any(|offset| is_legal(data, pos, pos + *offset))
        {
            return true;
        }

        if piece.is_kind(&KING) {
            for direction in Direction::ALL {
                if is_legal(data, pos, pos + direction.offset()) {
                    return true;
                }
            }
        }
    }

    false
}
