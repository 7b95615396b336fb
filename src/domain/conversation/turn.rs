use serde::{Deserialize, Serialize};

use super::DocumentRef;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// Content part of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnPart {
    Text { text: String },
    Document { document: DocumentRef },
}

/// A single turn in a remote conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<TurnPart>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![TurnPart::Text { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![TurnPart::Text { text: text.into() }],
        }
    }

    /// User turn that attaches a document ahead of the text
    pub fn user_with_document(document: DocumentRef, text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![
                TurnPart::Document { document },
                TurnPart::Text { text: text.into() },
            ],
        }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                TurnPart::Text { text } => Some(text.as_str()),
                TurnPart::Document { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentRef> {
        self.parts.iter().filter_map(|p| match p {
            TurnPart::Document { document } => Some(document),
            TurnPart::Text { .. } => None,
        })
    }
}
