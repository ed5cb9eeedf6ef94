//! The connection roster. Records are created on socket accept and kept
//! forever so a player can reconnect under the same display name; a name
//! collision with a live connection gets a " (2)" suffix instead.

use engine::Connection;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<Uuid, Arc<Connection>>,
}

impl ConnectionRegistry {
    fn find_by_name(&self, display_name: &str) -> Option<Arc<Connection>> {
        self.connections
            .values()
            .find(|connection| connection.display_name() == display_name)
            .cloned()
    }

    /// Resolves a fresh socket to a connection record: an inactive record
    /// with the requested name is rebound, a live one forces a uniquified
    /// name, anything else gets a new record.
    fn attach(&mut self, display_name: &str, outbound: UnboundedSender<String>) -> Arc<Connection> {
        match self.find_by_name(display_name) {
            Some(existing) if !existing.is_active() => {
                existing.rebind(outbound);
                existing
            }
            Some(_) => {
                let mut name = format!("{display_name} (2)");
                while self.find_by_name(&name).is_some() {
                    name.push_str(" (2)");
                }
                self.insert(Connection::new(name, outbound))
            }
            None => self.insert(Connection::new(display_name, outbound)),
        }
    }

    fn insert(&mut self, connection: Connection) -> Arc<Connection> {
        let connection = Arc::new(connection);
        self.connections.insert(connection.id, connection.clone());
        connection
    }

    /// Renames a connection, uniquifying against every other record.
    fn rename(&self, connection: &Connection, display_name: &str) -> String {
        let taken = |name: &str| {
            self.connections
                .values()
                .any(|other| other.id != connection.id && other.display_name() == name)
        };

        let mut name = display_name.to_string();
        while taken(&name) {
            name.push_str(" (2)");
        }

        connection.set_display_name(&name);
        name
    }

    fn all(&self) -> Vec<Arc<Connection>> {
        self.connections.values().cloned().collect()
    }

    fn players_json(&self) -> Value {
        let players: Vec<Value> = self
            .connections
            .values()
            .map(|connection| {
                json!({
                    "id": connection.id,
                    "display_name": connection.display_name(),
                    "active": connection.is_active(),
                })
            })
            .collect();
        json!(players)
    }
}

/// Shared roster handle. All operations are short, non-suspending critical
/// sections.
#[derive(Clone, Default)]
pub struct SharedRegistry(Arc<Mutex<ConnectionRegistry>>);

impl SharedRegistry {
    pub fn new() -> SharedRegistry {
        SharedRegistry::default()
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionRegistry> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn attach(
        &self,
        display_name: &str,
        outbound: UnboundedSender<String>,
    ) -> Arc<Connection> {
        self.lock().attach(display_name, outbound)
    }

    pub fn rename(&self, connection: &Connection, display_name: &str) -> String {
        self.lock().rename(connection, display_name)
    }

    pub fn all(&self) -> Vec<Arc<Connection>> {
        self.lock().all()
    }

    pub fn players_json(&self) -> Value {
        self.lock().players_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn reconnect_reuses_the_inactive_record() {
        let registry = SharedRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = registry.attach("Alice", tx);
        alice.mark_inactive();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let reconnected = registry.attach("Alice", tx);
        assert_eq!(reconnected.id, alice.id);
        assert!(reconnected.is_active());

        // Frames reach the new socket.
        reconnected.focus_game("g1");
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn name_collisions_with_live_connections_are_uniquified() {
        let registry = SharedRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = registry.attach("Alice", tx);

        let (tx, _rx) = mpsc::unbounded_channel();
        let second = registry.attach("Alice", tx);
        assert_ne!(second.id, alice.id);
        assert_eq!(second.display_name(), "Alice (2)");

        let (tx, _rx) = mpsc::unbounded_channel();
        let third = registry.attach("Alice", tx);
        assert_eq!(third.display_name(), "Alice (2) (2)");
    }

    #[test]
    fn rename_uniquifies_against_everyone_else() {
        let registry = SharedRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let alice = registry.attach("Alice", tx);
        let (tx, _rx) = mpsc::unbounded_channel();
        let bob = registry.attach("Bob", tx);

        assert_eq!(registry.rename(&bob, "Alice"), "Alice (2)");
        // Renaming to your own current name stays put.
        assert_eq!(registry.rename(&alice, "Alice"), "Alice");
    }
}
