//! The rule module interface. A pack registers one [`ControllerSpec`] per
//! game variant; the spec carries the static metadata clients browse and
//! acts as the factory for per-game [`Controller`] instances. The instance
//! lives exactly as long as its game and is only ever invoked by the
//! session kernel.

use crate::color::Color;
use crate::game::GameCore;
use crate::options::{OptionSpec, OptionValues};
use crate::piece::Piece;
use crate::ply::{NoMovesError, Ply};
use crate::vector2::Vector2;

/// Static metadata and factory for a game variant.
pub trait ControllerSpec: Sync {
    fn name(&self) -> &'static str;

    fn board_size(&self) -> Vector2;

    /// The seats this variant offers, in turn order.
    fn colors(&self) -> &'static [Color];

    /// The option schema the creation handler validates against.
    fn options(&self) -> Vec<(&'static str, OptionSpec)> {
        Vec::new()
    }

    /// Builds the per-game instance. The option values were validated
    /// against [`ControllerSpec::options`] before this is called.
    fn create(&self, options: OptionValues) -> Box<dyn Controller>;
}

/// The per-game rule module instance.
pub trait Controller: Send {
    /// Places the starting pieces. Invoked exactly once, before any state
    /// is visible to a client.
    fn init_board(&mut self, game: &mut GameCore);

    /// The legal plies `color` can play from `from_pos` to `to_pos`. The
    /// default forwards to the piece at the source square, which is all a
    /// variant without global rules needs.
    fn get_plies(
        &self,
        game: &GameCore,
        color: Color,
        from_pos: Vector2,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let _ = color;
        match game.board().get(&from_pos) {
            Some(piece) => piece.plies(from_pos, to_pos, game.data()),
            None => Ok(Vec::new()),
        }
    }

    /// The legal plies for materializing `piece` from the inventory at
    /// `to_pos`.
    fn get_inventory_plies(
        &self,
        game: &GameCore,
        color: Color,
        piece: &Piece,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        let _ = (game, color, piece, to_pos);
        Ok(Vec::new())
    }

    /// Invoked once after each successful apply. May resolve winners or
    /// update the info and inventory surfaces.
    fn after_ply(&mut self, game: &mut GameCore) {
        let _ = game;
    }

    /// Invoked when a player clicks one of this game's info buttons. The
    /// id is one the controller handed out through its info elements.
    fn on_button(&mut self, game: &mut GameCore, button_id: &str, color: Color) {
        let _ = (game, button_id, color);
    }
}
