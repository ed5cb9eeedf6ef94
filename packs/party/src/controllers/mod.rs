pub mod duos;
pub mod jousting;

pub use duos::{DUOS, Duos, DuosSpec};
pub use jousting::{JOUSTING, Jousting, JoustingSpec};
