//! Metrics snapshot as reported by the backend.
//!
//! The backend may report `"N/A"` in place of any number when the sheet's
//! region of interest was uncertain, so statistics are kept as raw JSON and
//! read through typed accessors.

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::INTERVAL_COUNT;

/// Aggregate statistics for one case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub total_count: i64,
    #[serde(default)]
    pub by_interval: Map<String, Value>,
    #[serde(default)]
    pub stats: Map<String, Value>,
    #[serde(default)]
    pub confidence_level: String,
}

impl Metrics {
    /// Per-interval counts normalized to exactly [`INTERVAL_COUNT`] entries.
    ///
    /// Missing or non-numeric entries become 0; extra entries are dropped.
    #[must_use]
    pub fn interval_counts(&self) -> [i64; INTERVAL_COUNT] {
        let mut out = [0; INTERVAL_COUNT];
        let Some(counts) = self.by_interval.get("counts").and_then(Value::as_array) else {
            return out;
        };
        for (slot, value) in out.iter_mut().zip(counts) {
            *slot = value_as_count(value);
        }
        out
    }

    /// A numeric statistic, if present and numeric.
    #[must_use]
    pub fn stat(&self, key: &str) -> Option<f64> {
        self.stats.get(key).and_then(Value::as_f64)
    }

    /// A statistic rendered for display; `"N/A"` when absent or null.
    #[must_use]
    pub fn stat_display(&self, key: &str) -> String {
        match self.stats.get(key) {
            None | Some(Value::Null) => "N/A".to_owned(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Whether the backend flagged possible tremor.
    #[must_use]
    pub fn tremor_suggested(&self) -> bool {
        self.stats
            .get("tremor_suggested")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the current counts came from a manual override.
    #[must_use]
    pub fn is_manual_override(&self) -> bool {
        self.stats
            .get("is_manual_override")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn is_high_confidence(&self) -> bool {
        self.confidence_level == "High"
    }
}

fn value_as_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(truncate_to_i64))
            .unwrap_or(0),
        Value::String(s) => crate::overrides::parse_count(s),
        _ => 0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_to_i64(f: f64) -> i64 {
    f.trunc() as i64
}
