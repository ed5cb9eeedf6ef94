//! The checkers pack: men, kings, forced captures and multi-jump turns.

pub mod controllers;
pub mod pieces;

use engine::PackContent;

pub fn content() -> PackContent {
    PackContent {
        controllers: vec![&controllers::CHECKERS],
        pieces: vec![&pieces::MAN, &pieces::KING],
        decorators: Vec::new(),
    }
}
