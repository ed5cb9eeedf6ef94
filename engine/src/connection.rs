//! The connection abstraction. A connection record outlives its socket: on
//! close it is only marked inactive, so the same identity can be rebound
//! when the player reconnects under the same display name. Outbound frames
//! are enqueued on an unbounded channel that a per-socket writer task
//! drains in order.

use crate::info::InfoElement;
use crate::inventory::InventoryItem;
use crate::ply::Ply;
use crate::vector2::Vector2;
use serde_json::{Value, json};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

struct ConnectionState {
    display_name: String,
    active: bool,
    outbound: UnboundedSender<String>,
}

pub struct Connection {
    pub id: Uuid,
    state: Mutex<ConnectionState>,
}

impl Connection {
    pub fn new(display_name: impl Into<String>, outbound: UnboundedSender<String>) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            state: Mutex::new(ConnectionState {
                display_name: display_name.into(),
                active: true,
                outbound,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn display_name(&self) -> String {
        self.state().display_name.clone()
    }

    pub fn set_display_name(&self, display_name: impl Into<String>) {
        self.state().display_name = display_name.into();
    }

    pub fn is_active(&self) -> bool {
        self.state().active
    }

    pub fn mark_inactive(&self) {
        self.state().active = false;
    }

    /// Reattaches this record to a fresh socket after a reconnect.
    pub fn rebind(&self, outbound: UnboundedSender<String>) {
        let mut state = self.state();
        state.outbound = outbound;
        state.active = true;
    }

    /// Enqueues one framed message. A closed socket just drops the frame;
    /// the record stays usable for the next rebind.
    fn send(&self, command: &str, parameters: Value) {
        let frame = json!({"command": command, "parameters": parameters});
        let _ = self.state().outbound.send(frame.to_string());
    }

    // Typed emitters for the complete outbound vocabulary.

    pub fn set_player(&self) {
        self.send(
            "set_player",
            json!({"id": self.id, "display_name": self.display_name()}),
        );
    }

    pub fn focus_game(&self, game_id: &str) {
        self.send("focus_game", json!({"game_id": game_id}));
    }

    pub fn update_pack_data(&self, pack_data: &Value) {
        self.send("update_pack_data", json!({"pack_data": pack_data}));
    }

    pub fn update_players(&self, players: &Value) {
        self.send("update_players", json!({"players": players}));
    }

    pub fn update_game_metadata(&self, game_metadata: &Value) {
        self.send(
            "update_game_metadata",
            json!({"game_metadata": game_metadata}),
        );
    }

    /// The caller-specific full projection of one game.
    pub fn update_game_data(&self, game_data: Value) {
        self.send("update_game_data", game_data);
    }

    pub fn update_decorators(&self, game_id: &str, decorators: Value) {
        self.send(
            "update_decorators",
            json!({"game_id": game_id, "decorators": decorators}),
        );
    }

    pub fn update_info_elements(&self, game_id: &str, elements: &[InfoElement], is_public: bool) {
        self.send(
            "update_info_elements",
            json!({
                "game_id": game_id,
                "info_elements": elements,
                "is_public": is_public,
            }),
        );
    }

    pub fn update_inventory_items(&self, game_id: &str, items: &[InventoryItem]) {
        self.send(
            "update_inventory_items",
            json!({"game_id": game_id, "inventory_items": items}),
        );
    }

    pub fn apply_ply(&self, game_id: &str, ply: &Ply) {
        self.send("apply_ply", json!({"game_id": game_id, "ply": ply}));
    }

    pub fn update_winners(&self, game_id: &str, winners: Value) {
        self.send(
            "update_winners",
            json!({"game_id": game_id, "winners": winners}),
        );
    }

    pub fn receive_game_chat_message(&self, game_id: &str, sender_id: Uuid, text: &str) {
        self.send(
            "receive_game_chat_message",
            json!({"game_id": game_id, "sender_id": sender_id, "text": text}),
        );
    }

    pub fn receive_server_chat_message(&self, sender_id: Uuid, text: &str) {
        self.send(
            "receive_server_chat_message",
            json!({"sender_id": sender_id, "text": text}),
        );
    }

    pub fn show_error(&self, message: &str) {
        self.send("show_error", json!({"message": message}));
    }

    pub fn offer_plies(&self, game_id: &str, from_pos: Vector2, to_pos: Vector2, plies: &[Ply]) {
        self.send(
            "offer_plies",
            json!({
                "game_id": game_id,
                "from_pos": from_pos,
                "to_pos": to_pos,
                "plies": plies,
            }),
        );
    }
}

/// Identity follows the record, not the socket behind it, so a connection
/// participates in sets and maps consistently across rebinds.
impl PartialEq for Connection {
    fn eq(&self, other: &Connection) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

impl Hash for Connection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::test_connection;

    #[test]
    fn frames_carry_command_and_parameters() {
        let mut harness = test_connection("Alice");
        harness.connection.show_error("Command Not Found");

        let frame = harness.next_frame().unwrap();
        assert_eq!(frame["command"], "show_error");
        assert_eq!(frame["parameters"]["message"], "Command Not Found");
    }

    #[test]
    fn rebind_swaps_the_outbound_channel() {
        let mut harness = test_connection("Alice");
        harness.connection.mark_inactive();
        assert!(!harness.connection.is_active());

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        harness.connection.rebind(tx);
        assert!(harness.connection.is_active());

        harness.connection.focus_game("g1");
        let frame: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame["command"], "focus_game");
        assert!(harness.next_frame().is_none());
    }
}
