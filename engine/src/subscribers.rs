//! The subscription fabric: a bidirectional map between connections and
//! the at most one game each connection is watching. Both directions are
//! kept symmetric so that removing either side never leaves a dangling
//! entry in the other.

use crate::connection::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
pub struct GameSubscribers {
    connection_to_game: HashMap<Uuid, String>,
    game_to_connections: HashMap<String, HashMap<Uuid, Arc<Connection>>>,
}

impl GameSubscribers {
    pub fn new() -> GameSubscribers {
        GameSubscribers::default()
    }

    /// Subscribes `connection` to `game_id`, removing it from whichever
    /// game it was watching before.
    pub fn set(&mut self, game_id: &str, connection: Arc<Connection>) {
        if let Some(previous) = self.connection_to_game.remove(&connection.id)
            && let Some(watchers) = self.game_to_connections.get_mut(&previous)
        {
            watchers.remove(&connection.id);
        }

        self.connection_to_game
            .insert(connection.id, game_id.to_string());
        self.game_to_connections
            .entry(game_id.to_string())
            .or_default()
            .insert(connection.id, connection);
    }

    pub fn get_connections(&self, game_id: &str) -> Vec<Arc<Connection>> {
        match self.game_to_connections.get(game_id) {
            Some(watchers) => watchers.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn get_game(&self, connection_id: Uuid) -> Option<String> {
        self.connection_to_game.get(&connection_id).cloned()
    }

    /// Drops a game and every forward-map entry of its watchers.
    pub fn remove_game(&mut self, game_id: &str) {
        if let Some(watchers) = self.game_to_connections.remove(game_id) {
            for id in watchers.keys() {
                self.connection_to_game.remove(id);
            }
        }
    }

    pub fn remove_connection(&mut self, connection_id: Uuid) {
        if let Some(game_id) = self.connection_to_game.remove(&connection_id)
            && let Some(watchers) = self.game_to_connections.get_mut(&game_id)
        {
            watchers.remove(&connection_id);
        }
    }
}

/// The fabric handle shared between the server and every game. All
/// operations are short, non-suspending critical sections.
#[derive(Clone, Default)]
pub struct SharedSubscribers(Arc<Mutex<GameSubscribers>>);

impl SharedSubscribers {
    pub fn new() -> SharedSubscribers {
        SharedSubscribers::default()
    }

    fn lock(&self) -> MutexGuard<'_, GameSubscribers> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, game_id: &str, connection: Arc<Connection>) {
        self.lock().set(game_id, connection);
    }

    pub fn get_connections(&self, game_id: &str) -> Vec<Arc<Connection>> {
        self.lock().get_connections(game_id)
    }

    pub fn get_game(&self, connection_id: Uuid) -> Option<String> {
        self.lock().get_game(connection_id)
    }

    pub fn remove_game(&self, game_id: &str) {
        self.lock().remove_game(game_id);
    }

    pub fn remove_connection(&self, connection_id: Uuid) {
        self.lock().remove_connection(connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_connection;

    #[test]
    fn forward_and_reverse_maps_stay_inverse() {
        let mut fabric = GameSubscribers::new();
        let alice = test_connection("Alice");
        let bob = test_connection("Bob");

        fabric.set("g1", alice.connection.clone());
        fabric.set("g1", bob.connection.clone());
        assert_eq!(fabric.get_game(alice.connection.id).as_deref(), Some("g1"));
        assert_eq!(fabric.get_connections("g1").len(), 2);

        // Moving a connection removes it from the previous game's set.
        fabric.set("g2", alice.connection.clone());
        assert_eq!(fabric.get_game(alice.connection.id).as_deref(), Some("g2"));
        assert_eq!(fabric.get_connections("g1").len(), 1);
        assert_eq!(fabric.get_connections("g2").len(), 1);
    }

    #[test]
    fn removing_a_game_clears_forward_entries() {
        let mut fabric = GameSubscribers::new();
        let alice = test_connection("Alice");
        fabric.set("g1", alice.connection.clone());

        fabric.remove_game("g1");
        assert_eq!(fabric.get_game(alice.connection.id), None);
        assert!(fabric.get_connections("g1").is_empty());
    }

    #[test]
    fn removing_a_connection_clears_reverse_entries() {
        let mut fabric = GameSubscribers::new();
        let alice = test_connection("Alice");
        fabric.set("g1", alice.connection.clone());

        fabric.remove_connection(alice.connection.id);
        assert!(fabric.get_connections("g1").is_empty());
        assert_eq!(fabric.get_game(alice.connection.id), None);
    }
}
