//! In-memory test doubles: channel-backed connections, a tiny piece kind
//! and a two-seat rule module. Used by this crate's own tests and by the
//! pack crates.

use crate::color::Color;
use crate::connection::Connection;
use crate::controller::{Controller, ControllerSpec};
use crate::direction::Direction;
use crate::game::{Game, GameCore};
use crate::info::InfoElement;
use crate::options::OptionValues;
use crate::piece::{Piece, PieceBehavior};
use crate::ply::{Action, NoMovesError, Ply};
use crate::state::GameData;
use crate::subscribers::SharedSubscribers;
use crate::vector2::Vector2;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// A connection whose outbound frames land in a channel the test can read.
pub struct TestConnection {
    pub connection: Arc<Connection>,
    rx: UnboundedReceiver<String>,
}

impl TestConnection {
    pub fn next_frame(&mut self) -> Option<Value> {
        let raw = self.rx.try_recv().ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Drains every pending frame.
    pub fn frames(&mut self) -> Vec<Value> {
        let mut result = Vec::new();
        while let Some(frame) = self.next_frame() {
            result.push(frame);
        }
        result
    }

    /// Drains every pending frame and keeps only the command names.
    pub fn drain_commands(&mut self) -> Vec<String> {
        self.frames()
            .into_iter()
            .filter_map(|frame| frame["command"].as_str().map(str::to_string))
            .collect()
    }
}

pub fn test_connection(display_name: &str) -> TestConnection {
    let (tx, rx) = mpsc::unbounded_channel();
    TestConnection {
        connection: Arc::new(Connection::new(display_name, tx)),
        rx,
    }
}

pub fn no_options() -> OptionValues {
    OptionValues::default()
}

/// A piece that moves a single square in any direction and captures by
/// destruction.
pub struct Scout;

pub static SCOUT: Scout = Scout;

impl PieceBehavior for Scout {
    fn name(&self) -> &'static str {
        "Scout"
    }

    fn pack(&self) -> &'static str {
        "testing"
    }

    fn image(&self) -> &'static str {
        "<svg/>"
    }

    fn plies(
        &self,
        piece: &Piece,
        from_pos: Vector2,
        to_pos: Vector2,
        data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let distance = (to_pos - from_pos).abs();
        if from_pos == to_pos || distance.row > 1 || distance.col > 1 {
            return Err(NoMovesError::new("That piece can only move one square."));
        }

        match data.board().get(&to_pos) {
            None => Ok(vec![Ply::new(
                "Move",
                vec![Action::Move { from_pos, to_pos }],
            )]),
            Some(occupant) if occupant.color != piece.color => Ok(vec![Ply::new(
                "Capture",
                vec![
                    Action::Destroy { pos: to_pos },
                    Action::Move { from_pos, to_pos },
                ],
            )]),
            Some(_) => Ok(Vec::new()),
        }
    }
}

/// A cell overlay for decorator tests.
pub struct Marker;

pub static MARKER: Marker = Marker;

impl crate::decorator::DecoratorBehavior for Marker {
    fn name(&self) -> &'static str {
        "Marker"
    }

    fn pack(&self) -> &'static str {
        "testing"
    }

    fn image(&self) -> &'static str {
        "<svg/>"
    }
}

/// A piece with no moves at all.
pub struct Null;

pub static NULL: Null = Null;

impl PieceBehavior for Null {
    fn name(&self) -> &'static str {
        "Null"
    }

    fn pack(&self) -> &'static str {
        "testing"
    }

    fn image(&self) -> &'static str {
        "<svg/>"
    }

    fn plies(
        &self,
        _piece: &Piece,
        _from_pos: Vector2,
        _to_pos: Vector2,
        _data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        Ok(Vec::new())
    }
}

/// Two scouts in opposite corners and one public button. Just enough rule
/// module to exercise the session kernel.
pub struct ScoutDuelSpec;

pub static SCOUT_DUEL: ScoutDuelSpec = ScoutDuelSpec;

impl ControllerSpec for ScoutDuelSpec {
    fn name(&self) -> &'static str {
        "Scout Duel"
    }

    fn board_size(&self) -> Vector2 {
        Vector2::new(8, 8)
    }

    fn colors(&self) -> &'static [Color] {
        &[Color::White, Color::Black]
    }

    fn create(&self, _options: OptionValues) -> Box<dyn Controller> {
        Box::new(ScoutDuel { wave_button_id: None })
    }
}

struct ScoutDuel {
    wave_button_id: Option<String>,
}

impl Controller for ScoutDuel {
    fn init_board(&mut self, game: &mut GameCore) {
        game.board_mut().insert(
            Vector2::new(7, 0),
            Piece::new(&SCOUT, Color::White, Direction::North),
        );
        game.board_mut().insert(
            Vector2::new(0, 7),
            Piece::new(&SCOUT, Color::Black, Direction::South),
        );

        let button = InfoElement::button("Wave");
        self.wave_button_id = button.button_id().map(str::to_string);
        game.update_public_info(vec![button]);
    }

    fn after_ply(&mut self, game: &mut GameCore) {
        for color in [Color::White, Color::Black] {
            if !game.board().values().any(|piece| piece.color == color) {
                let survivor = if color == Color::White {
                    Color::Black
                } else {
                    Color::White
                };
                game.winner(vec![survivor], "Last Scout Standing");
                return;
            }
        }
    }

    fn on_button(&mut self, game: &mut GameCore, button_id: &str, _color: Color) {
        if self.wave_button_id.as_deref() == Some(button_id) {
            game.update_public_info(vec![InfoElement::text("Scouts waved")]);
        }
    }
}

/// A ready-to-drive game with every seat taken and every player watching.
pub struct TestGame {
    pub game: Game,
    pub connections: Vec<TestConnection>,
    pub subscribers: SharedSubscribers,
}

pub fn make_test_game(spec: &'static dyn ControllerSpec, options: OptionValues) -> TestGame {
    let subscribers = SharedSubscribers::new();

    let mut connections: Vec<TestConnection> = spec
        .colors()
        .iter()
        .enumerate()
        .map(|(index, _)| test_connection(&format!("Player {}", index + 1)))
        .collect();

    let owner = connections[0].connection.clone();
    let mut game = Game::new(
        "Test Game",
        owner,
        "testing",
        spec,
        options,
        subscribers.clone(),
    );
    game.init();

    for (color, harness) in spec.colors().iter().zip(connections.iter()) {
        game.core.players.set(*color, harness.connection.clone());
        subscribers.set(&game.core.id, harness.connection.clone());
    }

    // Board setup happened before anyone subscribed; drop the frames the
    // seating produced so tests start from a clean slate.
    for connection in &mut connections {
        connection.frames();
    }

    TestGame {
        game,
        connections,
        subscribers,
    }
}
