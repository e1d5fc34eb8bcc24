use chrono::Utc;
use uuid::Uuid;
use crate::core::EngineError;
use crate::models::{Match, Notification, NotificationKind};
use crate::services::StoreTransaction;

/// Marker appended to truncated payloads
pub const ELLIPSIS: &str = "...";

const NEW_MATCH_PAYLOAD: &str = "You have a new match!";

/// Shorten `text` to at most `limit` characters, appending an ellipsis when
/// anything was cut. Counts Unicode scalar values, not bytes.
pub fn truncate_payload(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Writes notification rows for the external delivery service
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Queue a notification for `recipient_id`
    ///
    /// Returns `None` without writing when the recipient is the originator
    /// of the event.
    pub async fn emit<T: StoreTransaction>(
        &self,
        tx: &mut T,
        recipient_id: Uuid,
        originator_id: Uuid,
        kind: NotificationKind,
        payload: &str,
    ) -> Result<Option<Notification>, EngineError> {
        if recipient_id == originator_id {
            tracing::debug!("Suppressed {:?} notification to its own originator {}", kind, recipient_id);
            return Ok(None);
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            payload: truncate_payload(payload, kind.payload_limit()),
            read: false,
            created_at: Utc::now(),
        };

        tx.insert_notification(&notification).await?;
        tracing::debug!("Queued {:?} notification {} for {}", kind, notification.id, recipient_id);

        Ok(Some(notification))
    }

    /// Tell the other member of a freshly created match
    pub async fn notify_new_match<T: StoreTransaction>(
        &self,
        tx: &mut T,
        record: &Match,
        originator_id: Uuid,
    ) -> Result<Option<Notification>, EngineError> {
        let Some(recipient_id) = record.pair.counterpart(originator_id) else {
            return Ok(None);
        };
        self.emit(tx, recipient_id, originator_id, NotificationKind::NewMatch, NEW_MATCH_PAYLOAD)
            .await
    }
}
