use engine::{GameData, NoMovesError, Piece, PieceBehavior, Ply, Vector2};

/// An immovable blocker, used by creative boards.
pub struct Wall;

pub static WALL: Wall = Wall;

impl PieceBehavior for Wall {
    fn name(&self) -> &'static str {
        "Wall"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../../images/wall.svg")
    }

    fn plies(
        &self,
        _piece: &Piece,
        _from_pos: Vector2,
        _to_pos: Vector2,
        _data: &GameData,
    ) -> Result<Vec<Ply>, NoMovesError> {
        Ok(Vec::new())
    }
}
