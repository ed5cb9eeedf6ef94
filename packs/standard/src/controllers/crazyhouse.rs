//! Crazy House: chess where captured pieces switch sides and can be
//! dropped back onto the board from the capturer's inventory.

use crate::controllers::chess::Chess;
use crate::helpers::next_color;
use engine::{
    Action, Color, Controller, ControllerSpec, Direction, GameCore, InventoryItem, NoMovesError,
    OptionValues, Piece, Ply, Vector2,
};
use std::collections::HashMap;

pub struct CrazyHouseSpec;

pub static CRAZY_HOUSE: CrazyHouseSpec = CrazyHouseSpec;

impl ControllerSpec for CrazyHouseSpec {
    fn name(&self) -> &'static str {
        "Crazy House"
    }

    fn board_size(&self) -> Vector2 {
        Vector2::new(8, 8)
    }

    fn colors(&self) -> &'static [Color] {
        &[Color::White, Color::Black]
    }

    fn create(&self, _options: OptionValues) -> Box<dyn Controller> {
        Box::new(CrazyHouse {
            chess: Chess,
            inventories: HashMap::from([(Color::White, Vec::new()), (Color::Black, Vec::new())]),
        })
    }
}

pub struct CrazyHouse {
    chess: Chess,
    inventories: HashMap<Color, Vec<InventoryItem>>,
}

impl CrazyHouse {
    fn existing_item_index(&self, color: Color, piece: &Piece) -> Option<usize> {
        self.inventories
            .get(&color)?
            .iter()
            .position(|item| item.piece == *piece)
    }

    fn bump_label(item: &mut InventoryItem, delta: i64) {
        let count = item.label.parse::<i64>().unwrap_or(0) + delta;
        item.label = count.to_string();
    }
}

impl Controller for CrazyHouse {
    fn init_board(&mut self, game: &mut GameCore) {
        self.chess.init_board(game);
    }

    fn get_plies(
        &self,
        game: &GameCore,
        color: Color,
        from_pos: Vector2,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        self.chess.get_plies(game, color, from_pos, to_pos)
    }

    fn get_inventory_plies(
        &self,
        game: &GameCore,
        color: Color,
        piece: &Piece,
        to_pos: Vector2,
    ) -> Result<Vec<Ply>, NoMovesError> {
        if color != next_color(game.data()) {
            return Err(NoMovesError::new("It is not your turn."));
        }

        Ok(vec![Ply::new(
            "Create",
            vec![Action::Create {
                piece: *piece,
                pos: to_pos,
            }],
        )])
    }

    fn after_ply(&mut self, game: &mut GameCore) {
        self.chess.after_ply(game);

        if game.data().history.len() < 2 {
            return;
        }

        // What the last ply captured and dropped, read against the board
        // it was played on.
        let history = &game.data().history;
        let state = &history[history.len() - 1];
        let previous = &history[history.len() - 2];
        let (Some(ply), Some(ply_color)) = (&state.ply, state.ply_color) else {
            return;
        };

        let facing = if ply_color == Color::White {
            Direction::North
        } else {
            Direction::South
        };

        let mut gained: Vec<Piece> = Vec::new();
        let mut dropped: Vec<Piece> = Vec::new();
        for action in &ply.actions {
            match action {
                Action::Destroy { pos } => {
                    if let Some(captured) = previous.board.get(pos) {
                        gained.push(Piece::new(captured.behavior, ply_color, facing));
                    }
                }
                Action::Create { piece, .. } => dropped.push(*piece),
                Action::Move { .. } => {}
            }
        }

        for piece in gained {
            match self.existing_item_index(ply_color, &piece) {
                Some(index) => {
                    if let Some(items) = self.inventories.get_mut(&ply_color) {
                        Self::bump_label(&mut items[index], 1);
                    }
                }
                None => {
                    if let Some(items) = self.inventories.get_mut(&ply_color) {
                        items.push(InventoryItem::new(piece, "1"));
                    }
                }
            }
        }

        for piece in dropped {
            if let Some(index) = self.existing_item_index(ply_color, &piece)
                && let Some(items) = self.inventories.get_mut(&ply_color)
            {
                Self::bump_label(&mut items[index], -1);
                if items[index].label == "0" {
                    items.remove(index);
                }
            }
        }

        let items = self.inventories.get(&ply_color).cloned().unwrap_or_default();
        game.update_inventory(ply_color, items);
    }
}
