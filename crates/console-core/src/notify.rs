//! Single-slot transient notifications.
//!
//! Showing a notification replaces whatever is displayed and schedules its own
//! hide timer. Every notification gets a fresh id and a timer only clears the
//! slot while the id it was scheduled for is still the one shown.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Danger,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NoticeKind,
    pub text: String,
    pub expires_after_ms: u64,
    /// Time left before the auto-hide, as of the read that produced this value.
    pub remaining_ms: u64,
}

#[derive(Debug, Default)]
struct Slot {
    next_id: u64,
    current: Option<Notification>,
    shown_at: Option<Instant>,
}

#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            ttl,
        }
    }

    pub async fn success(&self, text: impl Into<String>) -> NotificationId {
        self.show(NoticeKind::Success, text).await
    }

    pub async fn danger(&self, text: impl Into<String>) -> NotificationId {
        self.show(NoticeKind::Danger, text).await
    }

    /// Displays `text`, pre-empting the current notification, and schedules
    /// its auto-hide. Must be called from within a tokio runtime.
    pub async fn show(&self, kind: NoticeKind, text: impl Into<String>) -> NotificationId {
        let id = {
            let mut slot = self.slot.lock().await;
            let id = NotificationId(slot.next_id);
            slot.next_id += 1;
            let ttl_ms = self.ttl.as_millis() as u64;
            slot.current = Some(Notification {
                id,
                kind,
                text: text.into(),
                expires_after_ms: ttl_ms,
                remaining_ms: ttl_ms,
            });
            slot.shown_at = Some(Instant::now());
            id
        };

        let notifier = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(notifier.ttl).await;
            notifier.hide(id).await;
        });

        id
    }

    /// Clears the slot if `id` is still displayed. Returns whether it was.
    pub async fn hide(&self, id: NotificationId) -> bool {
        let mut slot = self.slot.lock().await;
        match &slot.current {
            Some(current) if current.id == id => {
                slot.current = None;
                slot.shown_at = None;
                true
            }
            _ => {
                debug!(?id, "stale notification timer ignored");
                false
            }
        }
    }

    pub async fn current(&self) -> Option<Notification> {
        let slot = self.slot.lock().await;
        let mut notification = slot.current.clone()?;
        if let Some(shown_at) = slot.shown_at {
            let left = self.ttl.saturating_sub(shown_at.elapsed());
            notification.remaining_ms = left.as_millis() as u64;
        }
        Some(notification)
    }
}
