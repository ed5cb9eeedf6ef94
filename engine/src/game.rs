//! The session kernel. A [`Game`] owns its rule module and everything the
//! clients see: the append-only history, the player seats, the info and
//! inventory surfaces, the winner record and the background tasks the rule
//! module schedules. Handlers reach a game through its [`SharedGame`]
//! mutex; every mutation happens under that lock.

use crate::color::Color;
use crate::connection::Connection;
use crate::controller::{Controller, ControllerSpec};
use crate::decorator::Decorator;
use crate::info::InfoElement;
use crate::inventory::InventoryItem;
use crate::options::OptionValues;
use crate::piece::Piece;
use crate::ply::{NoMovesError, Ply};
use crate::state::{Board, GameData, GameState, ReducerError};
use crate::subscribers::SharedSubscribers;
use crate::vector2::Vector2;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub type SharedGame = Arc<Mutex<Game>>;

/// The invertible seat map between colors and connections. Removal on one
/// side always removes the paired entry on the other.
#[derive(Default)]
pub struct ColorConnections {
    color_to_connection: HashMap<Color, Arc<Connection>>,
    connection_to_color: HashMap<Uuid, Color>,
}

impl ColorConnections {
    pub fn len(&self) -> usize {
        self.color_to_connection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color_to_connection.is_empty()
    }

    pub fn set(&mut self, color: Color, connection: Arc<Connection>) {
        self.connection_to_color.insert(connection.id, color);
        self.color_to_connection.insert(color, connection);
    }

    pub fn remove_connection(&mut self, connection_id: Uuid) {
        if let Some(color) = self.connection_to_color.remove(&connection_id) {
            self.color_to_connection.remove(&color);
        }
    }

    pub fn get_color(&self, connection_id: Uuid) -> Option<Color> {
        self.connection_to_color.get(&connection_id).copied()
    }

    pub fn get_connection(&self, color: Color) -> Option<&Arc<Connection>> {
        self.color_to_connection.get(&color)
    }

    pub fn contains_color(&self, color: Color) -> bool {
        self.color_to_connection.contains_key(&color)
    }

    pub fn contains_connection(&self, connection_id: Uuid) -> bool {
        self.connection_to_color.contains_key(&connection_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, &Arc<Connection>)> {
        self.color_to_connection
            .iter()
            .map(|(color, connection)| (*color, connection))
    }
}

/// A non-nil winner record marks the game terminal.
#[derive(Clone, Debug, Serialize)]
pub struct WinnerData {
    pub colors: Vec<Color>,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
    pub sender_id: Uuid,
    pub text: String,
}

/// Everything of a game except its rule module. Controller hooks receive a
/// `&mut GameCore`, which keeps the controller and the state it operates on
/// as disjoint borrows.
pub struct GameCore {
    pub id: String,
    pub name: String,
    pub owner: Arc<Connection>,
    pub players: ColorConnections,
    controller_pack_id: String,
    controller_id: &'static str,
    data: GameData,
    decorator_layers: BTreeMap<i32, HashMap<Vector2, Decorator>>,
    public_info: Vec<InfoElement>,
    private_info: HashMap<Color, Vec<InfoElement>>,
    inventories: HashMap<Color, Vec<InventoryItem>>,
    winners: Option<WinnerData>,
    chat: Vec<ChatMessage>,
    subscribers: SharedSubscribers,
    tasks: Vec<JoinHandle<()>>,
    handle: Weak<Mutex<Game>>,
    active: bool,
}

impl GameCore {
    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn board(&self) -> &Board {
        self.data.board()
    }

    /// Direct board access for `init_board`; after the first ply the board
    /// only changes through the reducer.
    pub fn board_mut(&mut self) -> &mut Board {
        self.data.board_mut()
    }

    pub fn winners(&self) -> Option<&WinnerData> {
        self.winners.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// A weak handle background tasks use to re-enter the game later.
    pub fn handle(&self) -> Weak<Mutex<Game>> {
        self.handle.clone()
    }

    pub fn next_state(&self, color: Option<Color>, ply: &Ply) -> Result<GameState, ReducerError> {
        self.data.next_state(color, ply)
    }

    pub fn available_colors(&self) -> Vec<Color> {
        self.data
            .colors
            .iter()
            .copied()
            .filter(|color| !self.players.contains_color(*color))
            .collect()
    }

    fn subscriber_connections(&self) -> Vec<Arc<Connection>> {
        self.subscribers.get_connections(&self.id)
    }

    /// The catalog entry every client sees in the game list.
    pub fn get_metadata(&self) -> Value {
        let players: serde_json::Map<String, Value> = self
            .players
            .iter()
            .map(|(color, connection)| (color.value().to_string(), json!(connection.id)))
            .collect();

        json!({
            "display_name": self.name,
            "creator": self.owner.id,
            "controller_pack_id": self.controller_pack_id,
            "controller_id": self.controller_id,
            "players": players,
            "available_colors": self.available_colors(),
            "total_players": self.data.colors.len(),
        })
    }

    /// The caller-specific full projection: pieces, decorators by layer,
    /// info elements, the caller's inventory, winners and chat.
    pub fn get_full_data(&self, connection: &Connection) -> Value {
        let color = self.players.get_color(connection.id);

        let pieces: Vec<Value> = self
            .board()
            .iter()
            .map(|(position, piece)| {
                json!({
                    "row": position.row,
                    "col": position.col,
                    "pack_id": piece.behavior.pack(),
                    "piece_type_id": piece.behavior.name(),
                    "color": piece.color,
                    "direction": piece.direction,
                })
            })
            .collect();

        let inventory_items = match color {
            Some(color) => self.inventories.get(&color).cloned().unwrap_or_default(),
            None => Vec::new(),
        };

        let mut result = json!({
            "id": self.id,
            "pieces": pieces,
            "decorators": decorator_layers_json(&self.decorator_layers),
            "public_info_elements": self.public_info,
            "inventory_items": inventory_items,
            "chat_messages": self.chat,
            "winners": self.winners,
        });

        if let Some(color) = color
            && let Some(private) = self.private_info.get(&color)
        {
            result["private_info_elements"] = json!(private);
        }

        result
    }

    pub fn send_update_to_subscribers(&self) {
        for connection in self.subscriber_connections() {
            connection.update_game_data(self.get_full_data(&connection));
        }
    }

    /// Merges the given layers into the decorator surface and pushes the
    /// delta to every watcher.
    pub fn update_decorator_layers(&mut self, layers: BTreeMap<i32, HashMap<Vector2, Decorator>>) {
        let delta = decorator_layers_json(&layers);
        self.decorator_layers.extend(layers);

        for connection in self.subscriber_connections() {
            connection.update_decorators(&self.id, delta.clone());
        }
    }

    pub fn update_public_info(&mut self, elements: Vec<InfoElement>) {
        self.public_info = elements;

        for connection in self.subscriber_connections() {
            connection.update_info_elements(&self.id, &self.public_info, true);
        }
    }

    pub fn update_private_info(&mut self, color: Color, elements: Vec<InfoElement>) {
        if let Some(connection) = self.players.get_connection(color) {
            connection.update_info_elements(&self.id, &elements, false);
        }
        self.private_info.insert(color, elements);
    }

    pub fn update_inventory(&mut self, color: Color, items: Vec<InventoryItem>) {
        if let Some(connection) = self.players.get_connection(color) {
            connection.update_inventory_items(&self.id, &items);
        }
        self.inventories.insert(color, items);
    }

    pub fn find_inventory_item(&self, color: Color, item_id: &str) -> Option<InventoryItem> {
        self.inventories
            .get(&color)?
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
    }

    pub fn send_error(&self, color: Color, message: &str) {
        if let Some(connection) = self.players.get_connection(color) {
            connection.show_error(message);
        }
    }

    /// Appends a chat line and replays it to every watcher. The log is part
    /// of the full snapshot, so late subscribers still see it.
    pub fn send_chat(&mut self, sender: &Connection, text: &str) {
        self.chat.push(ChatMessage {
            sender_id: sender.id,
            text: text.to_string(),
        });

        for connection in self.subscriber_connections() {
            connection.receive_game_chat_message(&self.id, sender.id, text);
        }
    }

    /// Marks the game terminal. The first call broadcasts the winners and
    /// cancels the pending tasks; later calls are ignored so every watcher
    /// sees at most one winner frame.
    pub fn winner(&mut self, colors: Vec<Color>, reason: impl Into<String>) {
        if self.winners.is_some() {
            return;
        }

        let winners = WinnerData {
            colors,
            reason: reason.into(),
        };
        let payload = json!(winners);
        self.winners = Some(winners);

        for connection in self.subscriber_connections() {
            connection.update_winners(&self.id, payload.clone());
        }

        self.shutdown();
    }

    /// Schedules a background task tied to this game's lifetime. A panic
    /// inside the task is logged without taking the game down; `shutdown`
    /// aborts whatever is still pending.
    pub fn run_async(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        let handle = tokio::spawn(async move {
            if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
                let message = if let Some(text) = panic.downcast_ref::<&str>() {
                    (*text).to_string()
                } else if let Some(text) = panic.downcast_ref::<String>() {
                    text.clone()
                } else {
                    "unknown panic".to_string()
                };
                tracing::error!(message, "Background game task failed.");
            }
        });
        self.tasks.push(handle);
    }

    pub fn shutdown(&mut self) {
        if self.active {
            for task in self.tasks.drain(..) {
                task.abort();
            }
            self.active = false;
        }
    }

    /// Pops the newest history entry and refreshes every watcher. The
    /// initial state stays put, and a terminal game is not resurrected.
    pub fn undo_ply(&mut self) {
        if self.winners.is_some() || self.data.history.len() <= 1 {
            return;
        }
        self.data.history.pop();
        self.send_update_to_subscribers();
    }

    fn apply_state(&mut self, color: Option<Color>, ply: &Ply) -> Result<(), ReducerError> {
        let state = self.data.next_state(color, ply)?;
        self.data.history.push(state);

        for connection in self.subscriber_connections() {
            connection.apply_ply(&self.id, ply);
        }

        Ok(())
    }
}

fn decorator_layers_json(layers: &BTreeMap<i32, HashMap<Vector2, Decorator>>) -> Value {
    let map: serde_json::Map<String, Value> = layers
        .iter()
        .map(|(layer, decorators)| {
            let entries: Vec<Value> = decorators
                .iter()
                .map(|(position, decorator)| {
                    json!({
                        "row": position.row,
                        "col": position.col,
                        "pack_id": decorator.behavior.pack(),
                        "decorator_type_id": decorator.behavior.name(),
                    })
                })
                .collect();
            (layer.to_string(), json!(entries))
        })
        .collect();
    json!(map)
}

/// A hosted game: the rule module plus the session state it drives.
pub struct Game {
    controller: Box<dyn Controller>,
    pub core: GameCore,
}

impl Game {
    pub fn new(
        name: impl Into<String>,
        owner: Arc<Connection>,
        controller_pack_id: impl Into<String>,
        spec: &'static dyn ControllerSpec,
        options: OptionValues,
        subscribers: SharedSubscribers,
    ) -> Game {
        let colors = spec.colors().to_vec();
        let core = GameCore {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            owner,
            players: ColorConnections::default(),
            controller_pack_id: controller_pack_id.into(),
            controller_id: spec.name(),
            data: GameData::new(spec.board_size(), colors.clone()),
            decorator_layers: BTreeMap::new(),
            public_info: Vec::new(),
            private_info: colors.iter().map(|color| (*color, Vec::new())).collect(),
            inventories: colors.iter().map(|color| (*color, Vec::new())).collect(),
            winners: None,
            chat: Vec::new(),
            subscribers,
            tasks: Vec::new(),
            handle: Weak::new(),
            active: true,
        };

        Game {
            controller: spec.create(options),
            core,
        }
    }

    /// Builds a shared game and runs the controller's board initialization
    /// with the weak self-handle already attached, so `init_board` may
    /// schedule background tasks.
    pub fn create(
        name: impl Into<String>,
        owner: Arc<Connection>,
        controller_pack_id: impl Into<String>,
        spec: &'static dyn ControllerSpec,
        options: OptionValues,
        subscribers: SharedSubscribers,
    ) -> SharedGame {
        let game = Game::new(name, owner, controller_pack_id, spec, options, subscribers);
        let shared = Arc::new(Mutex::new(game));

        // The mutex is fresh, so the lock cannot be contended yet.
        if let Ok(mut game) = shared.try_lock() {
            game.core.handle = Arc::downgrade(&shared);
            game.init();
        }

        shared
    }

    /// Runs the controller's one-time board initialization.
    pub fn init(&mut self) {
        self.controller.init_board(&mut self.core);
    }

    /// Candidate plies for a move request. Terminal games and stale
    /// positions answer with an empty list and no error; a rule-level
    /// refusal is turned into an error frame for the asking player.
    pub fn get_plies(&self, connection: &Connection, from_pos: Vector2, to_pos: Vector2) -> Vec<Ply> {
        if self.core.winners.is_some()
            || !self.core.board().contains_key(&from_pos)
            || !self.core.data.in_bounds(to_pos)
        {
            // The client must have sent stale data.
            return Vec::new();
        }

        let Some(color) = self.core.players.get_color(connection.id) else {
            return Vec::new();
        };

        match self.controller.get_plies(&self.core, color, from_pos, to_pos) {
            Ok(plies) => plies,
            Err(NoMovesError(reason)) => {
                self.core.send_error(color, &reason);
                Vec::new()
            }
        }
    }

    /// Candidate plies for materializing an inventory piece.
    pub fn get_inventory_plies(&self, piece: &Piece, to_pos: Vector2) -> Vec<Ply> {
        if self.core.winners.is_some() || !self.core.data.in_bounds(to_pos) {
            return Vec::new();
        }

        let color = piece.color;
        match self
            .controller
            .get_inventory_plies(&self.core, color, piece, to_pos)
        {
            Ok(plies) => plies,
            Err(NoMovesError(reason)) => {
                self.core.send_error(color, &reason);
                Vec::new()
            }
        }
    }

    /// The move submission policy: nothing to do for zero candidates, an
    /// immediate apply for exactly one, and an offer frame the client
    /// answers with `submit_ply` when there are several.
    pub fn apply_or_offer_choices(
        &mut self,
        from_pos: Vector2,
        to_pos: Vector2,
        plies: Vec<Ply>,
        connection: &Arc<Connection>,
    ) -> Result<(), ReducerError> {
        match plies.len() {
            0 => Ok(()),
            1 => {
                let color = self.core.players.get_color(connection.id);
                self.apply_ply(color, &plies[0])
            }
            _ => {
                connection.offer_plies(&self.core.id, from_pos, to_pos, &plies);
                Ok(())
            }
        }
    }

    /// Appends the ply to history, broadcasts it, then gives the rule
    /// module its post-ply hook. A terminal game ignores the call.
    pub fn apply_ply(&mut self, color: Option<Color>, ply: &Ply) -> Result<(), ReducerError> {
        if self.core.winners.is_some() {
            return Ok(());
        }

        self.core.apply_state(color, ply)?;
        self.controller.after_ply(&mut self.core);
        Ok(())
    }

    /// Resolves a button click: the id is looked up in the public list and
    /// then in the caller's private list, and only a hit reaches the rule
    /// module.
    pub fn click_button(&mut self, connection: &Connection, button_id: &str) {
        let Some(color) = self.core.players.get_color(connection.id) else {
            return;
        };

        let known = self
            .core
            .public_info
            .iter()
            .chain(self.core.private_info.get(&color).into_iter().flatten())
            .any(|element| element.button_id() == Some(button_id));

        if known {
            self.controller.on_button(&mut self.core, button_id, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply::Action;
    use crate::testing::{SCOUT_DUEL, make_test_game, no_options};

    #[test]
    fn reducer_round_trip_matches_history() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());
        let ply = Ply::new(
            "Move",
            vec![Action::Move {
                from_pos: Vector2::new(7, 0),
                to_pos: Vector2::new(6, 0),
            }],
        );

        let expected = harness
            .game
            .core
            .next_state(Some(Color::White), &ply)
            .unwrap();
        harness.game.apply_ply(Some(Color::White), &ply).unwrap();

        let appended = harness.game.core.data().last_state();
        assert_eq!(appended.board, expected.board);
        assert_eq!(appended.ply_color, Some(Color::White));
        assert_eq!(harness.game.core.data().history.len(), 2);
    }

    #[test]
    fn single_candidate_applies_immediately() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());
        let white = harness.connections[0].connection.clone();

        let plies = harness
            .game
            .get_plies(&white, Vector2::new(7, 0), Vector2::new(6, 0));
        assert_eq!(plies.len(), 1);

        harness
            .game
            .apply_or_offer_choices(Vector2::new(7, 0), Vector2::new(6, 0), plies, &white)
            .unwrap();

        assert_eq!(harness.game.core.data().history.len(), 2);
        let commands = harness.connections[0].drain_commands();
        assert!(commands.contains(&"apply_ply".to_string()));
        assert!(!commands.contains(&"offer_plies".to_string()));
    }

    #[test]
    fn multiple_candidates_become_an_offer() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());
        let white = harness.connections[0].connection.clone();

        let plies = vec![
            Ply::new(
                "A",
                vec![Action::Move {
                    from_pos: Vector2::new(7, 0),
                    to_pos: Vector2::new(6, 0),
                }],
            ),
            Ply::new(
                "B",
                vec![Action::Move {
                    from_pos: Vector2::new(7, 0),
                    to_pos: Vector2::new(6, 1),
                }],
            ),
        ];

        harness
            .game
            .apply_or_offer_choices(Vector2::new(7, 0), Vector2::new(6, 0), plies, &white)
            .unwrap();

        assert_eq!(harness.game.core.data().history.len(), 1);
        let frame = harness.connections[0]
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "offer_plies")
            .unwrap();
        assert_eq!(frame["parameters"]["plies"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn out_of_bounds_and_stale_requests_are_silently_empty() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());
        let white = harness.connections[0].connection.clone();

        // Destination outside the board.
        assert!(
            harness
                .game
                .get_plies(&white, Vector2::new(7, 0), Vector2::new(8, 0))
                .is_empty()
        );
        // Unoccupied source square.
        assert!(
            harness
                .game
                .get_plies(&white, Vector2::new(4, 4), Vector2::new(4, 5))
                .is_empty()
        );
        assert!(
            !harness.connections[0]
                .drain_commands()
                .contains(&"show_error".to_string())
        );
    }

    #[test]
    fn winner_broadcasts_once_and_freezes_history() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());

        harness.game.core.winner(vec![Color::White], "Test");
        harness.game.core.winner(vec![Color::Black], "Again");

        for connection in &mut harness.connections {
            let winner_frames = connection
                .frames()
                .iter()
                .filter(|frame| frame["command"] == "update_winners")
                .count();
            assert_eq!(winner_frames, 1);
        }
        assert_eq!(
            harness.game.core.winners().unwrap().colors,
            vec![Color::White]
        );

        // No ply is appended after the game went terminal.
        let ply = Ply::new(
            "Move",
            vec![Action::Move {
                from_pos: Vector2::new(7, 0),
                to_pos: Vector2::new(6, 0),
            }],
        );
        harness.game.apply_ply(Some(Color::White), &ply).unwrap();
        assert_eq!(harness.game.core.data().history.len(), 1);

        // And undo does not resurrect play.
        harness.game.core.undo_ply();
        assert_eq!(harness.game.core.data().history.len(), 1);
    }

    #[test]
    fn click_button_reaches_the_controller_only_for_known_ids() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());
        let white = harness.connections[0].connection.clone();

        let button_id = harness.game.core.public_info[0]
            .button_id()
            .unwrap()
            .to_string();

        harness.game.click_button(&white, "bogus-id");
        assert!(harness.game.core.public_info[0].button_id().is_some());

        harness.game.click_button(&white, &button_id);
        assert_eq!(
            harness.game.core.public_info[0],
            InfoElement::text("Scouts waved")
        );
    }

    #[test]
    fn private_surfaces_reach_only_their_color() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());

        harness
            .game
            .core
            .update_private_info(Color::Black, vec![InfoElement::text("secret")]);

        assert!(
            !harness.connections[0]
                .drain_commands()
                .contains(&"update_info_elements".to_string())
        );
        let frame = harness.connections[1]
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "update_info_elements")
            .unwrap();
        assert_eq!(frame["parameters"]["is_public"], false);

        // The full projection carries it for black and nobody else.
        let black = harness.connections[1].connection.clone();
        let data = harness.game.core.get_full_data(&black);
        assert_eq!(data["private_info_elements"][0]["text"], "secret");

        let white = harness.connections[0].connection.clone();
        let data = harness.game.core.get_full_data(&white);
        assert!(data["private_info_elements"][0]["text"].is_null());
    }

    #[test]
    fn decorator_layers_merge_and_push_deltas() {
        use crate::decorator::Decorator;
        use crate::testing::MARKER;

        let mut harness = make_test_game(&SCOUT_DUEL, no_options());

        let mut layers = BTreeMap::new();
        layers.insert(
            1,
            HashMap::from([(Vector2::new(2, 2), Decorator::new(&MARKER))]),
        );
        harness.game.core.update_decorator_layers(layers);

        let frame = harness.connections[0]
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "update_decorators")
            .unwrap();
        assert_eq!(
            frame["parameters"]["decorators"]["1"][0]["decorator_type_id"],
            "Marker"
        );

        let white = harness.connections[0].connection.clone();
        let data = harness.game.core.get_full_data(&white);
        assert_eq!(data["decorators"]["1"][0]["row"], 2);
    }

    #[test]
    fn undo_pops_the_tail_and_refreshes_watchers() {
        let mut harness = make_test_game(&SCOUT_DUEL, no_options());
        let ply = Ply::new(
            "Move",
            vec![Action::Move {
                from_pos: Vector2::new(7, 0),
                to_pos: Vector2::new(6, 0),
            }],
        );
        harness.game.apply_ply(Some(Color::White), &ply).unwrap();
        harness.connections[0].frames();

        harness.game.core.undo_ply();
        assert_eq!(harness.game.core.data().history.len(), 1);
        assert!(
            harness.game
                .core
                .board()
                .contains_key(&Vector2::new(7, 0))
        );
        let commands = harness.connections[0].drain_commands();
        assert!(commands.contains(&"update_game_data".to_string()));
    }
}
