//! Decorators are non-piece visual overlays placed on board cells (a wall
//! marker, a highlight), stored in integer layers.

/// The per-kind identity of a decorator. Kinds are stateless singletons,
/// like piece kinds.
pub trait DecoratorBehavior: Sync {
    fn name(&self) -> &'static str;

    /// The id of the pack this kind ships in.
    fn pack(&self) -> &'static str;

    /// SVG payload sent to clients with the pack data.
    fn image(&self) -> &'static str;
}

/// A decorator placed on a cell.
#[derive(Clone, Copy)]
pub struct Decorator {
    pub behavior: &'static dyn DecoratorBehavior,
}

impl Decorator {
    pub fn new(behavior: &'static dyn DecoratorBehavior) -> Decorator {
        Decorator { behavior }
    }
}
