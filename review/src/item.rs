//! Detected items: strokes ("palos") and interval marks.
//!
//! SYSTEM CONTEXT
//! ==============
//! Items arrive from the backend detections endpoint and are identified by the
//! id the backend assigned. Bounding boxes are `[x, y, width, height]` in
//! source-image pixels. Fields this client does not interpret are carried in
//! `extra` so a restored item round-trips exactly as it was deleted.

#[cfg(test)]
#[path = "item_test.rs"]
mod item_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ReviewError;
use crate::geometry::Rect;

/// Backend-assigned item identity. Palos historically use integers, marks strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl ItemId {
    /// Parse a user-supplied id, preferring the integer form.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(trimmed.to_owned()),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Which list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A single handwritten stroke.
    Palo,
    /// A reviewer-visible interval boundary mark.
    Mark,
}

impl ItemKind {
    /// Wire name used in the `type` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Palo => "palo",
            Self::Mark => "mark",
        }
    }

    /// Human label used in notifications.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Palo => "Palo",
            Self::Mark => "Interval mark",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "palo" => Ok(Self::Palo),
            "mark" => Ok(Self::Mark),
            other => Err(ReviewError::UnknownKind(other.to_owned())),
        }
    }
}

/// One detected stroke or mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub id: ItemId,
    /// `[x, y, width, height]` in source-image pixels, in the number form the
    /// backend sent (integers stay integers when the item is replayed).
    pub bbox: [Number; 4],
    /// Backend fields not interpreted here (angle, confidence, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DetectedItem {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, bbox: [f64; 4]) -> Self {
        Self { id: id.into(), bbox: bbox.map(to_number), extra: Map::new() }
    }

    /// The bounding box as floats; a non-numeric entry reads as 0.
    #[must_use]
    pub fn bbox_f64(&self) -> [f64; 4] {
        self.bbox.each_ref().map(|n| n.as_f64().unwrap_or(0.0))
    }

    /// The bounding box as a rectangle in image space.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let [x, y, width, height] = self.bbox_f64();
        Rect::new(x, y, width, height)
    }
}

/// Whole values become JSON integers, matching what the backend emits.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn to_number(value: f64) -> Number {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Number::from(value as i64)
    } else {
        Number::from_f64(value).unwrap_or_else(|| Number::from(0))
    }
}

/// The two item lists of one case, in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSet {
    pub palos: Vec<DetectedItem>,
    pub marks: Vec<DetectedItem>,
}

impl ItemSet {
    #[must_use]
    pub fn new(palos: Vec<DetectedItem>, marks: Vec<DetectedItem>) -> Self {
        Self { palos, marks }
    }

    #[must_use]
    pub fn list(&self, kind: ItemKind) -> &[DetectedItem] {
        match kind {
            ItemKind::Palo => &self.palos,
            ItemKind::Mark => &self.marks,
        }
    }

    fn list_mut(&mut self, kind: ItemKind) -> &mut Vec<DetectedItem> {
        match kind {
            ItemKind::Palo => &mut self.palos,
            ItemKind::Mark => &mut self.marks,
        }
    }

    /// Look up an item by id within one list.
    #[must_use]
    pub fn find(&self, id: &ItemId, kind: ItemKind) -> Option<&DetectedItem> {
        self.list(kind).iter().find(|item| &item.id == id)
    }

    /// Remove an item, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId, kind: ItemKind) -> Option<DetectedItem> {
        let list = self.list_mut(kind);
        let pos = list.iter().position(|item| &item.id == id)?;
        Some(list.remove(pos))
    }

    /// Append an item unless one with the same id already exists.
    ///
    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, item: DetectedItem, kind: ItemKind) -> bool {
        if self.find(&item.id, kind).is_some() {
            return false;
        }
        self.list_mut(kind).push(item);
        true
    }

    #[must_use]
    pub fn len(&self, kind: ItemKind) -> usize {
        self.list(kind).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.palos.is_empty() && self.marks.is_empty()
    }
}
