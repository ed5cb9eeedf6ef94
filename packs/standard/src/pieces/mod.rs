pub mod bishop;
pub mod king;
pub mod knight;
pub mod pawn;
pub mod queen;
pub mod rook;
pub mod wall;

pub use bishop::{BISHOP, Bishop};
pub use king::{KING, King};
pub use knight::{KNIGHT, Knight};
pub use pawn::{PAWN, Pawn};
pub use queen::{QUEEN, Queen};
pub use rook::{ROOK, Rook};
pub use wall::{WALL, Wall};
