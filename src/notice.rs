//! Transient status notices shown after user actions.

use std::time::{Duration, Instant};

/// Whether a notice reports success or a rejected action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message that dismisses itself after a fixed interval
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, NoticeKind::Success)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, NoticeKind::Error)
    }

    fn new(text: impl Into<String>, kind: NoticeKind) -> Self {
        Notice {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    /// True once the notice has been visible for `ttl`
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires_after_ttl() {
        let notice = Notice::success("Expense added successfully!");
        let ttl = Duration::from_secs(3);
        assert!(!notice.is_expired(ttl, notice.shown_at));
        assert!(!notice.is_expired(ttl, notice.shown_at + Duration::from_millis(2999)));
        assert!(notice.is_expired(ttl, notice.shown_at + ttl));
    }

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(Notice::success("ok").kind, NoticeKind::Success);
        assert_eq!(Notice::error("no").kind, NoticeKind::Error);
    }
}
