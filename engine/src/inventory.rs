//! Off-board piece inventories, used by rule modules that let players
//! materialize pieces (Crazy House drops, Creative placement).

use crate::piece::Piece;
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

/// One inventory slot. The label is free text ("∞", "3", …); the id is a
/// server-assigned opaque identifier the client uses to reference the slot.
#[derive(Clone, Debug)]
pub struct InventoryItem {
    pub piece: Piece,
    pub label: String,
    pub id: String,
}

impl InventoryItem {
    pub fn new(piece: Piece, label: impl Into<String>) -> InventoryItem {
        InventoryItem {
            piece,
            label: label.into(),
            id: Uuid::new_v4().to_string(),
        }
    }
}

/// The wire form flattens the piece fields next to the id and label.
impl Serialize for InventoryItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("label", &self.label)?;
        map.serialize_entry("pack_id", self.piece.behavior.pack())?;
        map.serialize_entry("piece_type_id", self.piece.behavior.name())?;
        map.serialize_entry("color", &self.piece.color)?;
        map.serialize_entry("direction", &self.piece.direction)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::direction::Direction;
    use crate::testing::SCOUT;

    #[test]
    fn wire_form_flattens_the_piece() {
        let item = InventoryItem::new(Piece::new(&SCOUT, Color::White, Direction::North), "∞");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], item.id);
        assert_eq!(json["label"], "∞");
        assert_eq!(json["piece_type_id"], "Scout");
        assert_eq!(json["color"], 0);
    }
}
