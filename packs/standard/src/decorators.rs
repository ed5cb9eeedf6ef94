use engine::DecoratorBehavior;

/// A wall overlay for creative boards.
pub struct Wall;

pub static WALL: Wall = Wall;

impl DecoratorBehavior for Wall {
    fn name(&self) -> &'static str {
        "Wall"
    }

    fn pack(&self) -> &'static str {
        "standard"
    }

    fn image(&self) -> &'static str {
        include_str!("../images/wall.svg")
    }
}
