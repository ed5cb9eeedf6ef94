//! Info elements shown next to the board: plain texts and clickable
//! buttons. Buttons carry an opaque server-assigned id; the client refers
//! to it when the user clicks, and the owning controller resolves the id
//! back to an action.

use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InfoElement {
    Text { text: String },
    Button { id: String, text: String },
}

impl InfoElement {
    pub fn text(text: impl Into<String>) -> InfoElement {
        InfoElement::Text { text: text.into() }
    }

    /// A button with a fresh opaque id. The creating controller keeps the
    /// id to recognize the click later.
    pub fn button(text: impl Into<String>) -> InfoElement {
        InfoElement::Button {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }

    pub fn button_id(&self) -> Option<&str> {
        match self {
            InfoElement::Button { id, .. } => Some(id),
            InfoElement::Text { .. } => None,
        }
    }
}
