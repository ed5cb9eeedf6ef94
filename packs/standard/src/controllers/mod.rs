pub mod chess;
pub mod crazyhouse;
pub mod creative;

pub use chess::{CHESS, Chess, ChessSpec};
pub use crazyhouse::{CRAZY_HOUSE, CrazyHouse, CrazyHouseSpec};
pub use creative::{CREATIVE_8X8, CREATIVE_32X32, Creative, CreativeSpec};
