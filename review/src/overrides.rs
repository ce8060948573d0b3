//! Manual per-interval count overrides.
//!
//! The editor always holds exactly [`INTERVAL_COUNT`] values. Outside override
//! mode it mirrors the backend counts; inside it accepts free-form edits until
//! the host persists them or the reviewer cancels.

#[cfg(test)]
#[path = "overrides_test.rs"]
mod overrides_test;

use crate::consts::INTERVAL_COUNT;
use crate::error::ReviewError;

/// Parse a free-form count the way the review form does: leading whitespace
/// and an optional sign, then as many digits as are present. Anything without
/// leading digits is 0.
#[must_use]
pub fn parse_count(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(0);
    if negative { -magnitude } else { magnitude }
}

#[derive(Debug, Clone, Default)]
pub struct OverrideEditor {
    active: bool,
    counts: [i64; INTERVAL_COUNT],
    baseline: [i64; INTERVAL_COUNT],
}

impl OverrideEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both the working and baseline counts with freshly loaded backend values.
    pub fn load(&mut self, counts: [i64; INTERVAL_COUNT]) {
        self.counts = counts;
        self.baseline = counts;
    }

    /// Take freshly loaded backend values without clobbering an edit in progress.
    ///
    /// Outside override mode this is [`OverrideEditor::load`]. Inside it only
    /// the values restored on cancel move.
    pub fn rebase(&mut self, counts: [i64; INTERVAL_COUNT]) {
        if !self.active {
            self.counts = counts;
        }
        self.baseline = counts;
    }

    /// Enter override mode.
    pub fn begin(&mut self) {
        self.active = true;
    }

    /// Leave override mode and discard unsaved edits.
    pub fn cancel(&mut self) {
        self.active = false;
        self.counts = self.baseline;
    }

    /// Leave override mode keeping the edited values (after a successful save).
    pub fn finish(&mut self) {
        self.active = false;
        self.baseline = self.counts;
    }

    /// Set one interval's count.
    ///
    /// # Errors
    ///
    /// Fails when override mode is off or `index` is out of range.
    pub fn set(&mut self, index: usize, value: i64) -> Result<(), ReviewError> {
        if !self.active {
            return Err(ReviewError::OverrideInactive);
        }
        let slot = self
            .counts
            .get_mut(index)
            .ok_or(ReviewError::IntervalOutOfRange { index, count: INTERVAL_COUNT })?;
        *slot = value;
        Ok(())
    }

    /// Set one interval's count from raw text input, see [`parse_count`].
    ///
    /// # Errors
    ///
    /// Same as [`OverrideEditor::set`].
    pub fn set_from_input(&mut self, index: usize, raw: &str) -> Result<(), ReviewError> {
        self.set(index, parse_count(raw))
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The full set of counts to transmit on save.
    #[must_use]
    pub fn counts(&self) -> [i64; INTERVAL_COUNT] {
        self.counts
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.counts != self.baseline
    }
}
