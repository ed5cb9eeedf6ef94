pub mod checkers;

pub use checkers::{CHECKERS, Checkers, CheckersSpec};
