//! Standard chess: full piece movement with castling, en passant and
//! promotion, check enforcement through the processor chain, and
//! checkmate/stalemate resolution after every ply.

use crate::helpers::{find_pieces, next_color, opposite, threatened};
use crate::pieces::{BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK};
use crate::processors::{
    AllowPawnDoubleAdvance, AllowPawnPromotion, OnlyOnOwnTurn, OnlyPieceOwner,
    ProhibitCastlingOverCheck, ProhibitEndingInCheck,
};
use engine::{
    Color, Controller, ControllerSpec, Direction, GameCore, GameData, InfoElement, NoMovesError,
    OptionValues, Piece, PieceBehavior, Ply, PlyProcessorChain, Processor, Vector2,
};

pub struct ChessSpec;

pub static CHESS: ChessSpec = ChessSpec;

impl ControllerSpec for ChessSpec {
    fn name(&self) -> &'static str {
        "Chess"
    }

    fn board_size(&self) -> Vector2 {
        Vector2::new(8, 8)
    }

    fn colors(&self) -> &'static [Color] {
        &[Color::White, Color::Black]
    }

    fn create(&self, _options: OptionValues) -> Box<dyn Controller> {
        Box::new(Chess)
    }
}

pub struct Chess;

impl Chess {
    pub(crate) fn update_info(&self, game: &mut GameCore) {
        let color = next_color(game.data());
        let mut elements = vec![InfoElement::text(format!("Current Turn: {}", color.name()))];

        if let Some((king_pos, _)) = find_pieces(game.board(), Some(&KING), Some(color))
            .into_iter()
            .next()
            && threatened(game.data(), king_pos, &[opposite(color)], None)
        {
            elements.push(InfoElement::text(format!("{} is in check!", color.name())));
        }

        game.update_public_info(elements);
    }
}

impl Controller for Chess {
    fn init_board(&mut self, game: &mut GameCore) {
        for (color, direction, row) in [
            (Color::White, Direction::North, 7),
            (Color::Black, Direction::South, 0),
        ] {
            let back_rank: [&'static dyn PieceBehavior; 8] =
                [&ROOK, &KNIGHT, &BISHOP, &QUEEN, &KING, &BISHOP, &KNIGHT, &ROOK];
            for (col, kind) in back_rank.into_iter().enumerate() {
                game.board_mut()
                    .insert(Vector2::new(row, col as i32), Piece::new(kind, color, direction));
            }
        }

        for (color, direction, row) in [
            (Color::White, Direction::North, 6),
            (Color::Black, Direction::South, 1),
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

        // The piece's own geometry complaint is held back until the chain
        // has had its say; ownership and turn order outrank it.
        let (candidates, geometry_error) = match piece.plies(from_pos, to_pos, data) {
            Ok(plies) => (plies, None),
            Err(error) => (Vec::new(), Some(error)),
        };

        let chain = PlyProcessorChain::new(vec![
            Processor::new(
                OnlyPieceOwner {
                    data,
                    color,
                    from_pos,
                },
                true,
            ),
            Processor::new(OnlyOnOwnTurn { data, color }, true),
            Processor::new(
                AllowPawnPromotion {
                    data,
                    from_pos,
                    to_pos,
                },
                false,
            ),
            Processor::new(
                AllowPawnDoubleAdvance {
                    data,
                    color,
                    from_pos,
                    to_pos,
                },
                true,
            ),
            Processor::new(
                ProhibitCastlingOverCheck {
                    data,
                    color,
                    from_pos,
                    to_pos,
                },
                true,
            ),
            Processor::new(ProhibitEndingInCheck { data, color }, true),
        ]);

        let plies = chain.process(candidates)?;
        if plies.is_empty() && let Some(error) = geometry_error {
            return Err(error);
        }
        Ok(plies)
    }

    fn after_ply(&mut self, game: &mut GameCore) {
        // You cannot put yourself in checkmate, so only the side to move
        // needs checking.
        let color = next_color(game.data());

        if !has_legal_move(game.data(), color) {
            let king = find_pieces(game.board(), Some(&KING), Some(color))
                .into_iter()
                .next();
            if let Some((king_pos, _)) = king
                && threatened(game.data(), king_pos, &[opposite(color)], None)
            {
                game.winner(vec![opposite(color)], "Checkmate");
            } else {
                game.winner(Vec::new(), "Stalemate");
            }
        }

        self.update_info(game);
    }
}

/// Whether the given candidate move is playable without leaving one's own
/// king attacked.
pub(crate) fn is_legal(data: &GameData, from_pos: Vector2, to_pos: Vector2) -> bool {
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
        let Ok(state) = data.next_state(Some(piece.color), &ply) else {
            continue;
        };
        let king = find_pieces(&state.board, Some(&KING), Some(piece.color))
            .into_iter()
            .next();
        match king {
            Some((king_pos, _)) => {
                if !threatened(data, king_pos, &[opposite(piece.color)], Some(&state)) {
                    return true;
                }
            }
            None => return true,
        }
    }
    false
}

/// Probes one step of every movement shape each piece owns. For sliding
/// pieces a legal long move always implies a legal single step, so the
/// short probes are enough.
pub(crate) fn has_legal_move(data: &GameData, color: Color) -> bool {
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
