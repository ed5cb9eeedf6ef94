//! The server façade: the games catalog, the handler set and the wiring
//! between the dispatcher, the session kernels and the subscription
//! fabric. Each handler is a policy function — validate the request
//! against the catalog and the game's predicates, delegate to the kernel,
//! and re-broadcast whatever catalog-visible state changed.

use crate::dispatcher::{Dispatcher, ParamKind, Params, UserError};
use crate::registry::SharedRegistry;
use engine::options::bind_options;
use engine::pack::pack_data_json;
use engine::{Color, Connection, Game, Pack, SharedGame, SharedSubscribers, Vector2};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Server {
    pub packs: BTreeMap<String, Pack>,
    pack_data: Value,
    games: Mutex<HashMap<String, SharedGame>>,
    pub subscribers: SharedSubscribers,
    pub registry: SharedRegistry,
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new(packs: BTreeMap<String, Pack>) -> Arc<Server> {
        let pack_data = pack_data_json(&packs);

        let mut dispatcher = Dispatcher::new();
        register_commands(&mut dispatcher);

        Arc::new(Server {
            packs,
            pack_data,
            games: Mutex::new(HashMap::new()),
            subscribers: SharedSubscribers::new(),
            registry: SharedRegistry::new(),
            dispatcher,
        })
    }

    pub async fn handle_frame(self: &Arc<Self>, connection: &Arc<Connection>, raw: &str) {
        self.dispatcher.dispatch(self, connection, raw).await;
    }

    /// Greets a freshly attached socket with its identity, the pack data
    /// and the current catalog.
    pub async fn on_connect(self: &Arc<Self>, connection: &Arc<Connection>) {
        self.broadcast_players();
        connection.set_player();
        connection.update_pack_data(&self.pack_data);
        connection.update_game_metadata(&self.game_metadata().await);
    }

    /// Marks the record inactive and detaches it from whatever game it was
    /// watching. Player seats stay taken so a reconnect resumes them.
    pub async fn on_disconnect(self: &Arc<Self>, connection: &Arc<Connection>) {
        connection.mark_inactive();
        self.subscribers.remove_connection(connection.id);
        self.broadcast_players();
    }

    async fn find_game(&self, game_id: &str) -> Result<SharedGame, UserError> {
        self.games
            .lock()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| UserError::new("Game does not exist."))
    }

    async fn game_metadata(&self) -> Value {
        let games: Vec<SharedGame> = self.games.lock().await.values().cloned().collect();

        let mut metadata = serde_json::Map::new();
        for game in games {
            let game = game.lock().await;
            metadata.insert(game.core.id.clone(), game.core.get_metadata());
        }
        Value::Object(metadata)
    }

    /// Must not be called while holding any game lock.
    async fn broadcast_metadata(&self) {
        let metadata = self.game_metadata().await;
        for connection in self.registry.all() {
            connection.update_game_metadata(&metadata);
        }
    }

    fn broadcast_players(&self) {
        let players = self.registry.players_json();
        for connection in self.registry.all() {
            connection.update_players(&players);
        }
    }
}

fn register_commands(dispatcher: &mut Dispatcher) {
    use ParamKind::{Int, Object, Str};

    dispatcher.register("login", vec![("display_name", Str)], |server, connection, params| {
        Box::pin(on_login(server, connection, params))
    });
    dispatcher.register(
        "create_game",
        vec![
            ("name", Str),
            ("controller_pack_id", Str),
            ("controller_id", Str),
            ("options", Object),
        ],
        |server, connection, params| Box::pin(on_create_game(server, connection, params)),
    );
    dispatcher.register("delete_game", vec![("game_id", Str)], |server, connection, params| {
        Box::pin(on_delete_game(server, connection, params))
    });
    dispatcher.register("show_game", vec![("game_id", Str)], |server, connection, params| {
        Box::pin(on_show_game(server, connection, params))
    });
    dispatcher.register(
        "join_game",
        vec![("game_id", Str), ("color", Int)],
        |server, connection, params| Box::pin(on_join_game(server, connection, params)),
    );
    dispatcher.register("leave_game", vec![("game_id", Str)], |server, connection, params| {
        Box::pin(on_leave_game(server, connection, params))
    });
    dispatcher.register(
        "plies",
        vec![
            ("game_id", Str),
            ("from_row", Int),
            ("from_col", Int),
            ("to_row", Int),
            ("to_col", Int),
        ],
        |server, connection, params| Box::pin(on_plies(server, connection, params)),
    );
    dispatcher.register(
        "inventory_plies",
        vec![
            ("game_id", Str),
            ("inventory_item_id", Str),
            ("to_row", Int),
            ("to_col", Int),
        ],
        |server, connection, params| Box::pin(on_inventory_plies(server, connection, params)),
    );
    dispatcher.register(
        "submit_ply",
        vec![
            ("game_id", Str),
            ("from_row", Int),
            ("from_col", Int),
            ("to_row", Int),
            ("to_col", Int),
            ("ply", Object),
        ],
        |server, connection, params| Box::pin(on_submit_ply(server, connection, params)),
    );
    dispatcher.register(
        "click_button",
        vec![("game_id", Str), ("button_id", Str)],
        |server, connection, params| Box::pin(on_click_button(server, connection, params)),
    );
    dispatcher.register(
        "send_chat_message",
        vec![("text", Str), ("game_id", Str)],
        |server, connection, params| Box::pin(on_send_chat_message(server, connection, params)),
    );
}

async fn on_login(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let requested = params.str("display_name")?;
    let display_name = server.registry.rename(&connection, requested);
    tracing::info!(display_name, "Player logged in.");

    // A rename is a fresh identity; resend the same catalog state the
    // initial handshake delivers.
    connection.set_player();
    connection.update_pack_data(&server.pack_data);
    connection.update_game_metadata(&server.game_metadata().await);
    server.broadcast_players();
    Ok(())
}

async fn on_create_game(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let name = params.str("name")?;
    let pack_id = params.str("controller_pack_id")?;
    let controller_id = params.str("controller_id")?;
    let options = params.object("options")?;

    let pack = server
        .packs
        .get(pack_id)
        .ok_or_else(|| UserError::new("Package does not exist."))?;
    let spec = pack
        .find_controller(controller_id)
        .ok_or_else(|| UserError::new("Controller does not exist."))?;

    let options = bind_options(&spec.options(), options)
        .map_err(|error| UserError::new(error.to_string()))?;

    let game = Game::create(
        name,
        connection.clone(),
        pack_id,
        spec,
        options,
        server.subscribers.clone(),
    );
    let game_id = game.lock().await.core.id.clone();
    server.games.lock().await.insert(game_id.clone(), game);

    tracing::info!(game_id, controller_id, "Game created.");
    server.broadcast_metadata().await;
    connection.focus_game(&game_id);
    Ok(())
}

async fn on_delete_game(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let game = server.find_game(game_id).await?;

    {
        let mut game = game.lock().await;
        if game.core.owner.display_name() != connection.display_name() {
            return Err(UserError::new("Only the owner of this game can delete it."));
        }
        game.core.shutdown();
    }

    server.subscribers.remove_game(game_id);
    server.games.lock().await.remove(game_id);
    tracing::info!(game_id, "Game deleted.");
    server.broadcast_metadata().await;
    Ok(())
}

async fn on_show_game(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let game = server.find_game(game_id).await?;

    server.subscribers.set(game_id, connection.clone());

    let game = game.lock().await;
    connection.update_game_data(game.core.get_full_data(&connection));
    Ok(())
}

async fn on_join_game(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let color_value = params.int("color")?;
    let game = server.find_game(game_id).await?;

    {
        let mut game = game.lock().await;
        if game.core.players.contains_connection(connection.id) {
            return Err(UserError::new("Player is already in this game."));
        }

        let color = u8::try_from(color_value)
            .ok()
            .and_then(Color::from_value)
            .filter(|color| game.core.data().colors.contains(color))
            .ok_or_else(|| UserError::new("Color does not exist."))?;

        if game.core.players.contains_color(color) {
            return Err(UserError::new("That color is already taken in this game."));
        }

        game.core.players.set(color, connection.clone());
        game.core.send_update_to_subscribers();
    }

    server.broadcast_metadata().await;
    Ok(())
}

async fn on_leave_game(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let game = server.find_game(game_id).await?;

    {
        let mut game = game.lock().await;
        if !game.core.players.contains_connection(connection.id) {
            return Err(UserError::new("Player is not in this game."));
        }

        game.core.players.remove_connection(connection.id);
        game.core.send_update_to_subscribers();
    }

    server.broadcast_metadata().await;
    Ok(())
}

async fn on_plies(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let from_pos = Vector2::new(params.int("from_row")? as i32, params.int("from_col")? as i32);
    let to_pos = Vector2::new(params.int("to_row")? as i32, params.int("to_col")? as i32);
    let game = server.find_game(game_id).await?;

    let mut game = game.lock().await;
    if !game.core.players.contains_connection(connection.id) {
        return Err(UserError::new("Player is not in this game."));
    }

    let plies = game.get_plies(&connection, from_pos, to_pos);
    game.apply_or_offer_choices(from_pos, to_pos, plies, &connection)
        .map_err(|error| {
            tracing::warn!(%error, game_id, "Rejected a ply the reducer could not apply.");
            UserError::new("That move is no longer valid.")
        })
}

async fn on_inventory_plies(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let item_id = params.str("inventory_item_id")?;
    let to_pos = Vector2::new(params.int("to_row")? as i32, params.int("to_col")? as i32);
    let game = server.find_game(game_id).await?;

    let mut game = game.lock().await;
    let color = game
        .core
        .players
        .get_color(connection.id)
        .ok_or_else(|| UserError::new("Player is not in this game."))?;

    let item = game
        .core
        .find_inventory_item(color, item_id)
        .ok_or_else(|| UserError::new("You do not have that item in your inventory."))?;

    let plies = game.get_inventory_plies(&item.piece, to_pos);
    game.apply_or_offer_choices(Vector2::new(-1, -1), to_pos, plies, &connection)
        .map_err(|error| {
            tracing::warn!(%error, game_id, "Rejected an inventory ply the reducer could not apply.");
            UserError::new("That move is no longer valid.")
        })
}

async fn on_submit_ply(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let from_pos = Vector2::new(params.int("from_row")? as i32, params.int("from_col")? as i32);
    let to_pos = Vector2::new(params.int("to_row")? as i32, params.int("to_col")? as i32);
    let submitted = Value::Object(params.object("ply")?.clone());
    let game = server.find_game(game_id).await?;

    let mut game = game.lock().await;
    let color = game
        .core
        .players
        .get_color(connection.id)
        .ok_or_else(|| UserError::new("Player is not in this game."))?;

    // The submitted ply must match one of the candidates the game would
    // offer for these positions right now; anything else is stale or
    // forged.
    let plies = game.get_plies(&connection, from_pos, to_pos);
    let chosen = plies
        .into_iter()
        .find(|ply| serde_json::json!(ply) == submitted)
        .ok_or_else(|| UserError::new("Ply not available."))?;

    game.apply_ply(Some(color), &chosen).map_err(|error| {
        tracing::warn!(%error, game_id, "Rejected a submitted ply the reducer could not apply.");
        UserError::new("That move is no longer valid.")
    })
}

async fn on_click_button(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let game_id = params.str("game_id")?;
    let button_id = params.str("button_id")?;
    let game = server.find_game(game_id).await?;

    game.lock().await.click_button(&connection, button_id);
    Ok(())
}

async fn on_send_chat_message(
    server: Arc<Server>,
    connection: Arc<Connection>,
    params: Params,
) -> Result<(), UserError> {
    let text = params.str("text")?;
    let game_id = params.str("game_id")?;

    if game_id == "server" {
        for other in server.registry.all() {
            other.receive_server_chat_message(connection.id, text);
        }
        return Ok(());
    }

    let game = server.find_game(game_id).await?;
    game.lock().await.core.send_chat(&connection, text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::testing::{TestConnection, test_connection};
    use serde_json::json;

    fn test_server() -> Arc<Server> {
        let content = standard_pack::content();
        let pack = Pack {
            id: "standard".to_string(),
            display_name: "Standard".to_string(),
            description: "The classics.".to_string(),
            author: None,
            source: None,
            depends_on: Vec::new(),
            controllers: content.controllers,
            pieces: content.pieces,
            decorators: content.decorators,
        };
        Server::new(BTreeMap::from([("standard".to_string(), pack)]))
    }

    async fn created_game_id(server: &Arc<Server>, owner: &mut TestConnection) -> String {
        server
            .handle_frame(
                &owner.connection,
                &json!({
                    "command": "create_game",
                    "parameters": {
                        "name": "Lunch Game",
                        "controller_pack_id": "standard",
                        "controller_id": "Chess",
                        "options": {},
                    },
                })
                .to_string(),
            )
            .await;

        owner
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "focus_game")
            .expect("create_game should answer with focus_game")["parameters"]["game_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn join(server: &Arc<Server>, connection: &Arc<Connection>, game_id: &str, color: u8) {
        server
            .handle_frame(
                connection,
                &json!({
                    "command": "join_game",
                    "parameters": {"game_id": game_id, "color": color},
                })
                .to_string(),
            )
            .await;
    }

    #[tokio::test]
    async fn dispatcher_rejects_malformed_envelopes() {
        let server = test_server();
        let mut client = test_connection("Alice");

        server.handle_frame(&client.connection, "not json").await;
        server.handle_frame(&client.connection, "{}").await;
        server
            .handle_frame(&client.connection, r#"{"command": "warp"}"#)
            .await;
        server
            .handle_frame(&client.connection, r#"{"command": "show_game"}"#)
            .await;
        server
            .handle_frame(
                &client.connection,
                r#"{"command": "show_game", "parameters": {"game_id": 7}}"#,
            )
            .await;

        let messages: Vec<String> = client
            .frames()
            .into_iter()
            .filter(|frame| frame["command"] == "show_error")
            .map(|frame| frame["parameters"]["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Invalid JSON",
                "Command Not Specified",
                "Command Not Found",
                "This command requires the following parameters: game_id.",
                "\"game_id\" parameter needs to be of type str.",
            ]
        );
    }

    #[tokio::test]
    async fn single_advance_applies_without_an_offer() {
        let server = test_server();
        let mut alice = test_connection("Alice");
        let bob = test_connection("Bob");

        let game_id = created_game_id(&server, &mut alice).await;
        join(&server, &alice.connection, &game_id, 0).await;
        join(&server, &bob.connection, &game_id, 1).await;

        // Watch the game so the apply frame is observable.
        server
            .handle_frame(
                &alice.connection,
                &json!({"command": "show_game", "parameters": {"game_id": game_id}}).to_string(),
            )
            .await;
        alice.frames();

        server
            .handle_frame(
                &alice.connection,
                &json!({
                    "command": "plies",
                    "parameters": {
                        "game_id": game_id,
                        "from_row": 6, "from_col": 0,
                        "to_row": 5, "to_col": 0,
                    },
                })
                .to_string(),
            )
            .await;

        let frames = alice.frames();
        let apply = frames
            .iter()
            .find(|frame| frame["command"] == "apply_ply")
            .expect("the single candidate should apply immediately");
        assert_eq!(apply["parameters"]["ply"]["name"], "Single Advance");
        assert!(!frames.iter().any(|frame| frame["command"] == "offer_plies"));
    }

    #[tokio::test]
    async fn submitted_plies_must_match_a_candidate() {
        let server = test_server();
        let mut alice = test_connection("Alice");
        let bob = test_connection("Bob");

        let game_id = created_game_id(&server, &mut alice).await;
        join(&server, &alice.connection, &game_id, 0).await;
        join(&server, &bob.connection, &game_id, 1).await;

        server
            .handle_frame(
                &alice.connection,
                &json!({
                    "command": "submit_ply",
                    "parameters": {
                        "game_id": game_id,
                        "from_row": 6, "from_col": 0,
                        "to_row": 5, "to_col": 0,
                        "ply": {
                            "name": "Single Advance",
                            "actions": [
                                {"type": "move", "from_pos": [6, 0], "to_pos": [5, 0]},
                            ],
                        },
                    },
                })
                .to_string(),
            )
            .await;

        let game = server.find_game(&game_id).await.unwrap();
        assert_eq!(game.lock().await.core.data().history.len(), 2);

        // A forged ply is refused.
        server
            .handle_frame(
                &alice.connection,
                &json!({
                    "command": "submit_ply",
                    "parameters": {
                        "game_id": game_id,
                        "from_row": 1, "from_col": 0,
                        "to_row": 3, "to_col": 0,
                        "ply": {"name": "Teleport", "actions": []},
                    },
                })
                .to_string(),
            )
            .await;
        assert_eq!(game.lock().await.core.data().history.len(), 2);
    }

    #[tokio::test]
    async fn taken_colors_cannot_be_joined() {
        let server = test_server();
        let mut alice = test_connection("Alice");
        let mut bob = test_connection("Bob");

        let game_id = created_game_id(&server, &mut alice).await;
        join(&server, &alice.connection, &game_id, 0).await;
        join(&server, &bob.connection, &game_id, 0).await;

        let error = bob
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "show_error")
            .unwrap();
        assert_eq!(
            error["parameters"]["message"],
            "That color is already taken in this game."
        );
    }

    #[tokio::test]
    async fn login_renames_and_resends_catalog_state() {
        let server = test_server();

        let (tx, _alice_rx) = tokio::sync::mpsc::unbounded_channel();
        let _alice = server.registry.attach("Alice", tx);

        let (tx, mut bob_rx) = tokio::sync::mpsc::unbounded_channel();
        let bob = server.registry.attach("Bob", tx);

        server
            .handle_frame(
                &bob,
                &json!({"command": "login", "parameters": {"display_name": "Alice"}}).to_string(),
            )
            .await;

        let frames: Vec<Value> = std::iter::from_fn(|| bob_rx.try_recv().ok())
            .filter_map(|raw| serde_json::from_str(&raw).ok())
            .collect();

        // The rename was uniquified against the live Alice.
        let set_player = frames
            .iter()
            .find(|frame| frame["command"] == "set_player")
            .expect("login should answer with set_player");
        assert_eq!(set_player["parameters"]["display_name"], "Alice (2)");
        assert_eq!(bob.display_name(), "Alice (2)");

        // The caller gets the catalog state again, everyone gets the roster.
        assert!(frames.iter().any(|frame| frame["command"] == "update_pack_data"));
        assert!(
            frames
                .iter()
                .any(|frame| frame["command"] == "update_game_metadata")
        );
        assert!(frames.iter().any(|frame| frame["command"] == "update_players"));
    }

    #[tokio::test]
    async fn game_chat_reaches_watchers_and_the_log() {
        let server = test_server();
        let mut alice = test_connection("Alice");
        let mut bob = test_connection("Bob");

        let game_id = created_game_id(&server, &mut alice).await;
        server
            .handle_frame(
                &bob.connection,
                &json!({"command": "show_game", "parameters": {"game_id": game_id}}).to_string(),
            )
            .await;
        bob.frames();

        server
            .handle_frame(
                &alice.connection,
                &json!({
                    "command": "send_chat_message",
                    "parameters": {"text": "good luck", "game_id": game_id},
                })
                .to_string(),
            )
            .await;

        let frame = bob
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "receive_game_chat_message")
            .expect("watchers should hear the chat");
        assert_eq!(frame["parameters"]["text"], "good luck");

        // Late subscribers read the log out of the full snapshot.
        server
            .handle_frame(
                &bob.connection,
                &json!({"command": "show_game", "parameters": {"game_id": game_id}}).to_string(),
            )
            .await;
        let snapshot = bob
            .frames()
            .into_iter()
            .find(|frame| frame["command"] == "update_game_data")
            .unwrap();
        assert_eq!(
            snapshot["parameters"]["chat_messages"][0]["text"],
            "good luck"
        );
    }

    #[tokio::test]
    async fn a_dropped_player_keeps_their_seat() {
        let server = test_server();
        let mut alice = test_connection("Alice");

        let game_id = created_game_id(&server, &mut alice).await;
        join(&server, &alice.connection, &game_id, 0).await;

        server.on_disconnect(&alice.connection).await;
        assert!(!alice.connection.is_active());

        let game = server.find_game(&game_id).await.unwrap();
        let guard = game.lock().await;
        assert_eq!(
            guard.core.players.get_color(alice.connection.id),
            Some(Color::White)
        );
    }

    #[tokio::test]
    async fn only_the_owner_deletes_a_game() {
        let server = test_server();
        let mut alice = test_connection("Alice");
        let mut bob = test_connection("Bob");

        let game_id = created_game_id(&server, &mut alice).await;

        server
            .handle_frame(
                &bob.connection,
                &json!({"command": "delete_game", "parameters": {"game_id": game_id}}).to_string(),
            )
            .await;
        assert_eq!(
            bob.frames()
                .into_iter()
                .find(|frame| frame["command"] == "show_error")
                .unwrap()["parameters"]["message"],
            "Only the owner of this game can delete it."
        );

        server
            .handle_frame(
                &alice.connection,
                &json!({"command": "delete_game", "parameters": {"game_id": game_id}}).to_string(),
            )
            .await;
        assert!(server.find_game(&game_id).await.is_err());
    }
}
