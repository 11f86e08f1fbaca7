//! Transient notifications and event-coalescing timers.
//!
//! Everything here is deterministic: the caller passes the current instant
//! in, and expiry is decided by comparison rather than by an ambient
//! timer. A later trigger replacing an earlier pending deadline is the
//! only cancellation primitive the pages need.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub token: String,
    pub message: String,
    pub level: Level,
    pub expires_at: DateTime<Utc>,
}

/// Active transient messages, each auto-dismissed a fixed delay after it
/// was pushed.
#[derive(Debug)]
pub struct NotificationCenter {
    dismiss_after: Duration,
    active: Vec<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        // the pages dismiss after three seconds
        Self::new(Duration::milliseconds(3000))
    }
}

impl NotificationCenter {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            dismiss_after,
            active: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        message: impl Into<String>,
        level: Level,
        now: DateTime<Utc>,
    ) -> Notification {
        let notification = Notification {
            token: Uuid::new_v4().to_string(),
            message: message.into(),
            level,
            expires_at: now + self.dismiss_after,
        };
        self.active.push(notification.clone());
        notification
    }

    /// Dismiss one notification early.
    pub fn dismiss(&mut self, token: &str) {
        self.active.retain(|n| n.token != token);
    }

    /// Remove and return every notification whose dismiss deadline has
    /// passed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        let (expired, live) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|n| n.expires_at <= now);
        self.active = live;
        expired
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }
}

/// Coalesces rapid-fire triggers: the wrapped action fires once the wait
/// has elapsed since the latest trigger.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    /// (Re)arm the deadline; an earlier pending deadline is replaced.
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.wait);
    }

    /// True exactly once after the armed deadline passes.
    pub fn fire(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Passes the first call and suppresses the rest until the window has
/// elapsed. Used for scroll-style event streams.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    window: Duration,
    open_after: Option<DateTime<Utc>>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            open_after: None,
        }
    }

    pub fn allow(&mut self, now: DateTime<Utc>) -> bool {
        match self.open_after {
            Some(open_after) if now < open_after => false,
            _ => {
                self.open_after = Some(now + self.window);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        "2025-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_notifications_auto_dismiss() {
        let mut center = NotificationCenter::default();
        let now = t0();
        center.push("Product saved successfully!", Level::Success, now);

        assert!(center.sweep(now + Duration::milliseconds(2999)).is_empty());
        assert_eq!(center.active().len(), 1);

        let expired = center.sweep(now + Duration::milliseconds(3000));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].message, "Product saved successfully!");
        assert!(center.active().is_empty());
    }

    #[test]
    fn test_sweep_only_takes_expired_entries() {
        let mut center = NotificationCenter::default();
        let now = t0();
        center.push("first", Level::Info, now);
        center.push("second", Level::Info, now + Duration::seconds(2));

        let expired = center.sweep(now + Duration::seconds(3));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].message, "first");
        assert_eq!(center.active().len(), 1);
    }

    #[test]
    fn test_dismiss_by_token() {
        let mut center = NotificationCenter::default();
        let note = center.push("bye", Level::Warning, t0());
        center.dismiss(&note.token);
        assert!(center.active().is_empty());
    }

    #[test]
    fn test_debounce_retrigger_resets_the_deadline() {
        let mut debouncer = Debouncer::new(Duration::milliseconds(300));
        let now = t0();

        debouncer.trigger(now);
        debouncer.trigger(now + Duration::milliseconds(200));

        // the first deadline was replaced, so nothing fires at +300ms
        assert!(!debouncer.fire(now + Duration::milliseconds(300)));
        assert!(debouncer.fire(now + Duration::milliseconds(500)));
        // one trigger, one fire
        assert!(!debouncer.fire(now + Duration::milliseconds(600)));
    }

    #[test]
    fn test_debounce_cancel() {
        let mut debouncer = Debouncer::new(Duration::milliseconds(300));
        debouncer.trigger(t0());
        assert!(debouncer.pending());
        debouncer.cancel();
        assert!(!debouncer.fire(t0() + Duration::seconds(1)));
    }

    #[test]
    fn test_throttle_window() {
        let mut throttle = Throttle::new(Duration::milliseconds(100));
        let now = t0();

        assert!(throttle.allow(now));
        assert!(!throttle.allow(now + Duration::milliseconds(50)));
        assert!(throttle.allow(now + Duration::milliseconds(100)));
        assert!(!throttle.allow(now + Duration::milliseconds(150)));
    }
}
