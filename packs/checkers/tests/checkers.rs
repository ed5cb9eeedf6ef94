//! Checkers rule tests, driven through the session kernel.

use engine::options::bind_options;
use engine::testing::{TestGame, make_test_game, no_options};
use engine::{Color, Direction, OptionValues, Piece, Vector2};
use checkers_pack::controllers::CHECKERS;
use checkers_pack::pieces::{KING, MAN};
use engine::ControllerSpec;
use serde_json::json;

fn options(force_capture: bool) -> OptionValues {
    let supplied = json!({"Force Capture": force_capture});
    bind_options(&CHECKERS.options(), supplied.as_object().unwrap()).unwrap()
}

fn man(color: Color) -> Piece {
    let direction = if color == Color::Black {
        Direction::North
    } else {
        Direction::South
    };
    Piece::new(&MAN, color, direction)
}

fn small_game(force_capture: bool, pieces: &[((i32, i32), Piece)]) -> TestGame {
    let mut harness = make_test_game(&CHECKERS, options(force_capture));
    let board = harness.game.core.board_mut();
    board.clear();
    for ((row, col), piece) in pieces {
        board.insert(Vector2::new(*row, *col), *piece);
    }
    harness
}

#[test]
fn opening_board_has_twelve_men_per_side() {
    let harness = make_test_game(&CHECKERS, no_options());
    let board = harness.game.core.board();

    let black = board.values().filter(|p| p.color == Color::Black).count();
    let red = board.values().filter(|p| p.color == Color::Red).count();
    assert_eq!((black, red), (12, 12));

    // Men sit on the dark squares only.
    assert!(board.keys().all(|pos| (pos.row + pos.col) % 2 == 0));
}

#[test]
fn force_capture_hides_plain_moves() {
    let harness = small_game(
        true,
        &[
            ((5, 2), man(Color::Black)),
            ((4, 3), man(Color::Red)),
            ((0, 7), man(Color::Red)),
        ],
    );
    let black = harness.connections[0].connection.clone();

    // The jump is available, so the plain move yields nothing.
    let plies = harness
        .game
        .get_plies(&black, Vector2::new(5, 2), Vector2::new(4, 1));
    assert!(plies.is_empty());

    let plies = harness
        .game
        .get_plies(&black, Vector2::new(5, 2), Vector2::new(3, 4));
    assert_eq!(plies.len(), 1);
    assert_eq!(plies[0].name, "Capture");
}

#[test]
fn plain_moves_return_when_force_capture_is_off() {
    let harness = small_game(
        false,
        &[((5, 2), man(Color::Black)), ((4, 3), man(Color::Red))],
    );
    let black = harness.connections[0].connection.clone();

    let plies = harness
        .game
        .get_plies(&black, Vector2::new(5, 2), Vector2::new(4, 1));
    assert_eq!(plies.len(), 1);
    assert_eq!(plies[0].name, "Move");
}

#[test]
fn a_jumper_with_another_jump_keeps_the_turn() {
    let mut harness = small_game(
        true,
        &[
            ((5, 2), man(Color::Black)),
            ((4, 3), man(Color::Red)),
            ((2, 5), man(Color::Red)),
            ((6, 6), man(Color::Black)),
        ],
    );
    let black = harness.connections[0].connection.clone();
    let red = harness.connections[1].connection.clone();

    let plies = harness
        .game
        .get_plies(&black, Vector2::new(5, 2), Vector2::new(3, 4));
    assert_eq!(plies.len(), 1);
    harness
        .game
        .apply_ply(Some(Color::Black), &plies[0].clone())
        .unwrap();

    // Red cannot move during the continuation.
    assert!(
        harness.game
            .get_plies(&red, Vector2::new(2, 5), Vector2::new(3, 6))
            .is_empty()
    );
    // Neither can another black piece.
    assert!(
        harness.game
            .get_plies(&black, Vector2::new(6, 6), Vector2::new(5, 7))
            .is_empty()
    );

    // The jumper continues, taking red's last piece.
    let plies = harness
        .game
        .get_plies(&black, Vector2::new(3, 4), Vector2::new(1, 6));
    assert_eq!(plies.len(), 1);
    assert_eq!(plies[0].name, "Capture");
    harness
        .game
        .apply_ply(Some(Color::Black), &plies[0].clone())
        .unwrap();

    let winners = harness.game.core.winners().expect("red is out of pieces");
    assert_eq!(winners.colors, vec![Color::Black]);
    assert_eq!(winners.reason, "No Remaining Moves");
}

#[test]
fn men_reaching_the_far_rank_are_crowned() {
    let mut harness = small_game(
        true,
        &[((1, 1), man(Color::Black)), ((3, 3), man(Color::Red))],
    );
    let black = harness.connections[0].connection.clone();

    let plies = harness
        .game
        .get_plies(&black, Vector2::new(1, 1), Vector2::new(0, 2));
    assert_eq!(plies.len(), 1);

    harness
        .game
        .apply_ply(Some(Color::Black), &plies[0].clone())
        .unwrap();

    let crowned = harness.game.core.board()[&Vector2::new(0, 2)];
    assert!(crowned.is_kind(&KING));
    assert_eq!(crowned.color, Color::Black);
    assert!(!harness.game.core.board().contains_key(&Vector2::new(1, 1)));
}

#[test]
fn men_cannot_move_backwards() {
    let harness = small_game(
        true,
        &[((3, 3), man(Color::Black)), ((0, 0), man(Color::Red))],
    );
    let black = harness.connections[0].connection.clone();

    assert!(
        harness.game
            .get_plies(&black, Vector2::new(3, 3), Vector2::new(4, 4))
            .is_empty()
    );
    assert_eq!(
        harness
            .game
            .get_plies(&black, Vector2::new(3, 3), Vector2::new(2, 4))
            .len(),
        1
    );
}
