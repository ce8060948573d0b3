//! Transient notifications ("toasts").
//!
//! One notification is visible at a time; a newer one replaces it. Expiry is
//! evaluated against a caller-supplied instant so tests need no clock.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::time::{Duration, Instant};

use review::consts::{ITEM_TOAST_MS, LONG_TOAST_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

/// Holds the current notification.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Notification>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message` for `ttl`, replacing whatever is visible.
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind, ttl: Duration, now: Instant) {
        let message = message.into();
        match kind {
            NotificationKind::Success => tracing::info!(%message, "notification"),
            NotificationKind::Error => tracing::warn!(%message, "notification"),
        }
        self.current = Some(Notification { message, kind, expires_at: now + ttl });
    }

    /// Short success toast used for item deletion and undo.
    pub fn item_success(&mut self, message: impl Into<String>, now: Instant) {
        self.show(message, NotificationKind::Success, Duration::from_millis(ITEM_TOAST_MS), now);
    }

    /// Success toast for longer-lived outcomes such as saved overrides.
    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.show(message, NotificationKind::Success, Duration::from_millis(LONG_TOAST_MS), now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.show(message, NotificationKind::Error, Duration::from_millis(LONG_TOAST_MS), now);
    }

    /// The visible notification at `now`; expired ones are dropped.
    pub fn current(&mut self, now: Instant) -> Option<&Notification> {
        if self.current.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.current = None;
        }
        self.current.as_ref()
    }

    /// Remove and return the visible notification at `now`.
    pub fn take(&mut self, now: Instant) -> Option<Notification> {
        self.current(now);
        self.current.take()
    }
}
