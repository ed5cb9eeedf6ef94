//! The party pack: free-for-all variants built on the standard pieces.

pub mod controllers;

use engine::PackContent;

pub fn content() -> PackContent {
    PackContent {
        controllers: vec![&controllers::JOUSTING, &controllers::DUOS],
        pieces: Vec::new(),
        decorators: Vec::new(),
    }
}
