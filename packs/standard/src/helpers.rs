//! Shared rule-module building blocks: turn rotation, threat detection and
//! the common move/capture shapes sliding pieces are built from.

use crate::pieces::{BISHOP, KNIGHT, QUEEN, ROOK};
use engine::direction::board_range;
use engine::{
    Action, Board, Color, Direction, GameData, GameState, Piece, PieceBehavior, Ply, Vector2,
};

/// The color that moves next: the roster entry after the last recorded
/// mover, wrapping around; the first entry opens the game.
pub fn next_color(data: &GameData) -> Color {
    next_color_skipping(data, &[])
}

/// Turn rotation that passes over the given colors (players that lost all
/// their pieces, for example).
pub fn next_color_skipping(data: &GameData, skip: &[Color]) -> Color {
    let colors = &data.colors;
    let mut color = match data.last_state().ply_color {
        None => colors[0],
        Some(last) => {
            let index = colors.iter().position(|c| *c == last).unwrap_or(0);
            colors[(index + 1) % colors.len()]
        }
    };

    for _ in 0..colors.len() {
        if !skip.contains(&color) {
            return color;
        }
        let index = colors.iter().position(|c| *c == color).unwrap_or(0);
        color = colors[(index + 1) % colors.len()];
    }
    color
}

pub fn opposite(color: Color) -> Color {
    match color {
        Color::White => Color::Black,
        Color::Black => Color::White,
        other => other,
    }
}

/// All pieces on the board matching the given kind and color filters.
pub fn find_pieces(
    board: &Board,
    kind: Option<&'static dyn PieceBehavior>,
    color: Option<Color>,
) -> Vec<(Vector2, Piece)> {
    board
        .iter()
        .filter(|(_, piece)| kind.is_none_or(|kind| piece.is_kind(kind)))
        .filter(|(_, piece)| color.is_none_or(|color| piece.color == color))
        .map(|(position, piece)| (*position, *piece))
        .collect()
}

/// Whether every square strictly between `from` and `to` (and the
/// destination too, with `include_end`) is empty. Misaligned points are
/// never empty.
pub fn empty_along_axis(board: &Board, from: Vector2, to: Vector2, include_end: bool) -> bool {
    match board_range(from, to, false, include_end) {
        Some(range) => range.iter().all(|pos| !board.contains_key(pos)),
        None => false,
    }
}

/// A plain move onto an empty square, or a capture of an enemy occupant.
/// A friendly occupant yields nothing.
pub fn capture_or_move(board: &Board, color: Color, from_pos: Vector2, to_pos: Vector2) -> Vec<Ply> {
    match board.get(&to_pos) {
        None => vec![Ply::new(
            "Move",
            vec![Action::Move { from_pos, to_pos }],
        )],
        Some(occupant) if occupant.color != color => vec![Ply::new(
            "Capture",
            vec![
                Action::Destroy { pos: to_pos },
                Action::Move { from_pos, to_pos },
            ],
        )],
        Some(_) => Vec::new(),
    }
}

/// [`capture_or_move`] for sliding pieces: the path up to the destination
/// must be clear.
pub fn capture_or_move_if_empty(
    board: &Board,
    color: Color,
    from_pos: Vector2,
    to_pos: Vector2,
) -> Vec<Ply> {
    if empty_along_axis(board, from_pos, to_pos, false) {
        capture_or_move(board, color, from_pos, to_pos)
    } else {
        Vec::new()
    }
}

/// The first piece met walking from `from` in the given heading.
pub fn closest_piece_along_axis(
    data: &GameData,
    from: Vector2,
    direction: Direction,
) -> Option<(Piece, Vector2)> {
    let step = direction.offset();
    let mut pos = from + step;
    while data.in_bounds(pos) {
        if let Some(piece) = data.board().get(&pos) {
            return Some((*piece, pos));
        }
        pos = pos + step;
    }
    None
}

/// Whether any piece of the given colors could land on or destroy `pos`.
/// With `state`, the check runs against that hypothetical position instead
/// of the current board.
pub fn threatened(data: &GameData, pos: Vector2, by: &[Color], state: Option<&GameState>) -> bool {
    let scratch;
    let data = match state {
        Some(state) => {
            scratch = data.with_state(state.clone());
            &scratch
        }
        None => data,
    };

    for (&from, piece) in data.board() {
        if !by.contains(&piece.color) {
            continue;
        }
        // A piece that cannot even express the geometry is no threat.
        let Ok(plies) = piece.plies(from, pos, data) else {
            continue;
        };
        for ply in plies {
            for action in &ply.actions {
                match action {
                    Action::Move { to_pos, .. } if *to_pos == pos => return true,
                    Action::Destroy { pos: target } if *target == pos => return true,
                    _ => {}
                }
            }
        }
    }
    false
}

/// The nth state (1-based) produced by the given color, searched from the
/// newest entry backwards when `reverse` is set.
pub fn n_state_by_color(
    data: &GameData,
    color: Color,
    n: usize,
    reverse: bool,
) -> Option<&GameState> {
    let states: Box<dyn Iterator<Item = &GameState>> = if reverse {
        Box::new(data.history.iter().rev())
    } else {
        Box::new(data.history.iter())
    };

    states
        .filter(|state| state.ply_color == Some(color))
        .nth(n.saturating_sub(1))
}

/// Splices a promotion into a move: the mover is destroyed at its source
/// and the replacement appears at the destination.
pub fn move_to_promotion(action: &Action, replacement: Piece) -> Vec<Action> {
    match action {
        Action::Move { from_pos, to_pos } => vec![
            Action::Destroy { pos: *from_pos },
            Action::Create {
                piece: replacement,
                pos: *to_pos,
            },
        ],
        other => vec![other.clone()],
    }
}

/// The four standard promotion choices for a pawn arriving at its last
/// rank.
pub fn pawn_promotions(piece: &Piece, from_pos: Vector2, to_pos: Vector2) -> Vec<Ply> {
    let choices: [(&str, &'static dyn PieceBehavior); 4] = [
        ("Promote to Queen", &QUEEN),
        ("Promote to Knight", &KNIGHT),
        ("Promote to Rook", &ROOK),
        ("Promote to Bishop", &BISHOP),
    ];

    choices
        .iter()
        .map(|(name, kind)| {
            Ply::new(
                *name,
                vec![
                    Action::Destroy { pos: from_pos },
                    Action::Create {
                        piece: Piece::new(*kind, piece.color, piece.direction),
                        pos: to_pos,
                    },
                ],
            )
        })
        .collect()
}

/// Colors on the roster with no pieces left on the board.
pub fn players_without_pieces(data: &GameData) -> Vec<Color> {
    data.colors
        .iter()
        .copied()
        .filter(|color| !data.board().values().any(|piece| piece.color == *color))
        .collect()
}
