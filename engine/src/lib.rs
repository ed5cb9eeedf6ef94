//! The game engine and session kernel for the grid-game server.
//!
//! This crate carries everything a rule module or the network layer needs to
//! host a game: the grid value types, the piece and controller interfaces,
//! the append-only game history with its pure state reducer, the ply
//! processor chain, the session kernel and the subscription fabric that
//! couples connections to games. The network binary and the rule-module
//! packs are separate crates built on top of these types.

pub mod color;
pub mod connection;
pub mod controller;
pub mod decorator;
pub mod direction;
pub mod game;
pub mod info;
pub mod inventory;
pub mod options;
pub mod pack;
pub mod piece;
pub mod ply;
pub mod processor;
pub mod state;
pub mod subscribers;
pub mod testing;
pub mod vector2;

pub use color::Color;
pub use connection::Connection;
pub use controller::{Controller, ControllerSpec};
pub use decorator::{Decorator, DecoratorBehavior};
pub use direction::Direction;
pub use game::{ChatMessage, ColorConnections, Game, GameCore, SharedGame, WinnerData};
pub use info::InfoElement;
pub use inventory::InventoryItem;
pub use options::{OptionSpec, OptionValue, OptionValues};
pub use pack::{Pack, PackContent, PackError};
pub use piece::{Piece, PieceBehavior};
pub use ply::{Action, NoMovesError, Ply};
pub use processor::{PlyProcessor, PlyProcessorChain, Processor};
pub use state::{Board, GameData, GameState, ReducerError};
pub use subscribers::{GameSubscribers, SharedSubscribers};
pub use vector2::Vector2;
