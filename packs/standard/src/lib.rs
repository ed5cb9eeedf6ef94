//! The standard pack: classic chess pieces, the processor chain the Chess
//! controller is built from, and the Crazy House and Creative variants.

pub mod controllers;
pub mod decorators;
pub mod helpers;
pub mod pieces;
pub mod processors;

use engine::PackContent;

pub fn content() -> PackContent {
    PackContent {
        controllers: vec![
            &controllers::CHESS,
            &controllers::CRAZY_HOUSE,
            &controllers::CREATIVE_8X8,
            &controllers::CREATIVE_32X32,
        ],
        pieces: vec![
            &pieces::PAWN,
            &pieces::KNIGHT,
            &pieces::BISHOP,
            &pieces::ROOK,
            &pieces::QUEEN,
            &pieces::KING,
            &pieces::WALL,
        ],
        decorators: vec![&decorators::WALL],
    }
}
