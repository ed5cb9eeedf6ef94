//! Creative mode: every color, an infinite inventory of every piece, no
//! rules beyond "put things places". Ships in two board sizes.

use crate::decorators;
use crate::pieces::{BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK, WALL};
use engine::{
    Action, Color, Controller, ControllerSpec, Decorator, Direction, GameCore, InfoElement,
    InventoryItem, NoMovesError, OptionValues, Piece, PieceBehavior, Ply, Vector2,
};
use std::collections::{BTreeMap, HashMap};

pub struct CreativeSpec {
    name: &'static str,
    board_size: Vector2,
}

pub static CREATIVE_8X8: CreativeSpec = CreativeSpec {
    name: "Creative 8x8",
    board_size: Vector2::new(8, 8),
};

pub static CREATIVE_32X32: CreativeSpec = CreativeSpec {
    name: "Creative 32x32",
    board_size: Vector2::new(32, 32),
};

impl ControllerSpec for CreativeSpec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn board_size(&self) -> Vector2 {
        self.board_size
    }

    fn colors(&self) -> &'static [Color] {
        &Color::PLAYABLE
    }

    fn create(&self, _options: OptionValues) -> Box<dyn Controller> {
        let stock: [&'static dyn PieceBehavior; 7] =
            [&PAWN, &KNIGHT, &BISHOP, &ROOK, &QUEEN, &KING, &WALL];
        let inventories = Color::PLAYABLE
            .iter()
            .map(|color| {
                let items = stock
                    .iter()
                    .map(|kind| {
                        InventoryItem::new(Piece::new(*kind, *color, Direction::North), "∞")
                    })
                    .collect();
                (*color, items)
            })
            .collect();

        Box::new(Creative {
            inventories,
            rotate_button_id: None,
        })
    }
}

pub struct Creative {
    inventories: HashMap<Color, Vec<InventoryItem>>,
    rotate_button_id: Option<String>,
}

impl Controller for Creative {
    fn init_board(&mut self, game: &mut GameCore) {
        // A wall frame marks the edge of the arena.
        let size = game.data().board_size;
        let mut frame = HashMap::new();
        for row in 0..size.row {
            for col in 0..size.col {
                if row == 0 || col == 0 || row == size.row - 1 || col == size.col - 1 {
                    frame.insert(Vector2::new(row, col), Decorator::new(&decorators::WALL));
                }
            }
        }
        game.update_decorator_layers(BTreeMap::from([(0, frame)]));

        for color in Color::PLAYABLE {
            let items = self.inventories.get(&color).cloned().unwrap_or_default();
            game.update_inventory(color, items);
        }

        let button = InfoElement::button("Rotate Pieces");
        self.rotate_button_id = button.button_id().map(str::to_string);
        game.update_public_info(vec![button]);
    }

    fn get_plies(
        &self,
        _game: &GameCore,
        _color: Color,
        from_pos: Vector2,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        Ok(vec![Ply::new(
            "Move",
            vec![Action::Move { from_pos, to_pos }],
        )])
    }

    fn get_inventory_plies(
        &self,
        _game: &GameCore,
        _color: Color,
        piece: &Piece,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        Ok(vec![Ply::new(
            "Create",
            vec![Action::Create {
                piece: *piece,
                pos: to_pos,
            }],
        )])
    }

    fn on_button(&mut self, game: &mut GameCore, button_id: &str, color: Color) {
        if self.rotate_button_id.as_deref() != Some(button_id) {
            return;
        }

        if let Some(items) = self.inventories.get_mut(&color) {
            for item in items.iter_mut() {
                item.piece.direction = item.piece.direction.rotate(1, true);
            }
        }

        let items = self.inventories.get(&color).cloned().unwrap_or_default();
        game.update_inventory(color, items);
    }
}
