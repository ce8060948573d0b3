//! Undo stack for reviewer deletions.
//!
//! Only deletions are recorded. Each entry carries the full item as it was
//! before removal so the host can replay it to the backend's restore endpoint.
//! The stack is never persisted; a fresh workspace starts empty.

#[cfg(test)]
#[path = "undo_test.rs"]
mod undo_test;

use serde::Serialize;

use crate::item::{DetectedItem, ItemKind};

/// A reversible reviewer action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UndoAction {
    /// An item was deleted from the given list.
    Delete {
        item: DetectedItem,
        #[serde(rename = "itemType")]
        kind: ItemKind,
    },
}

impl UndoAction {
    #[must_use]
    pub fn item(&self) -> &DetectedItem {
        match self {
            Self::Delete { item, .. } => item,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Delete { kind, .. } => *kind,
        }
    }
}

/// Strict LIFO stack of [`UndoAction`]s.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<UndoAction>,
}

impl UndoStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: UndoAction) {
        self.entries.push(action);
    }

    /// The action the next undo would revert.
    #[must_use]
    pub fn peek(&self) -> Option<&UndoAction> {
        self.entries.last()
    }

    pub fn pop(&mut self) -> Option<UndoAction> {
        self.entries.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
