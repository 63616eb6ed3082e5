/**
 * Notification Dispatcher
 *
 * Implements the trigger contract the messaging core depends on:
 * `{ recipient, sender?, kind, related? }` → a durable notification row,
 * plus best-effort external delivery.
 *
 * Durability and delivery are deliberately split: the row is always
 * written (unread counts depend on it), while the external notifier is
 * only offered events that pass a per-(recipient, sender) quiet window.
 * Callers must not assume a dispatch produced an email — only that the
 * record exists.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::ChatError;
use crate::backend::notifications::db;
use crate::shared::messaging::{NotificationKind, NotificationView};

/// Input of the trigger contract
#[derive(Debug, Clone)]
pub struct NotificationInput {
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub related_id: Option<Uuid>,
}

/// External delivery boundary (email, push). Implementations must not
/// block for long; delivery failures are the collaborator's problem.
pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: &NotificationView);
}

/// Default notifier: logs instead of emailing
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notification: &NotificationView) {
        tracing::info!(
            "[Notify] {} notification for {} (related: {:?})",
            notification.kind.as_str(),
            notification.recipient_id,
            notification.related_id
        );
    }
}

/// Dispatcher combining the durable store with debounced delivery
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    /// Last external delivery per (recipient, sender) pair
    recent: Arc<Mutex<HashMap<(Uuid, Option<Uuid>), Instant>>>,
    window: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, window: Duration) -> Self {
        Self {
            notifier,
            recent: Arc::new(Mutex::new(HashMap::new())),
            window,
        }
    }

    /// Persist a notification and offer it to the external notifier.
    ///
    /// The row insert is the only fallible part; delivery is
    /// fire-and-forget from the caller's perspective.
    pub async fn dispatch(
        &self,
        pool: &SqlitePool,
        input: NotificationInput,
    ) -> Result<NotificationView, ChatError> {
        let notification = db::insert_notification(
            pool,
            input.recipient_id,
            input.sender_id,
            input.kind,
            input.related_id,
        )
        .await?;

        if self.should_deliver(input.recipient_id, input.sender_id) {
            self.notifier.deliver(&notification);
        } else {
            tracing::debug!(
                "[Notify] Delivery debounced for {} from {:?}",
                input.recipient_id,
                input.sender_id
            );
        }

        Ok(notification)
    }

    /// Check the quiet window, recording this delivery if it passes
    fn should_deliver(&self, recipient: Uuid, sender: Option<Uuid>) -> bool {
        let mut recent = self.recent.lock().unwrap();
        let key = (recipient, sender);
        let now = Instant::now();
        match recent.get(&key) {
            Some(last) if now.duration_since(*last) < self.window => false,
            _ => {
                recent.insert(key, now);
                true
            }
        }
    }
}
