pub mod king;
pub mod man;

pub use king::{KING, King};
pub use man::{MAN, Man};
