use uuid::Uuid;
use crate::core::EngineError;
use crate::models::{DecisionKind, QueueEntry};
use crate::services::StoreTransaction;

/// Remove the entry for a decided target. Absent entries are not an error.
pub async fn remove_from_queue<T: StoreTransaction>(
    tx: &mut T,
    actor_id: Uuid,
    target_id: Uuid,
    kind: DecisionKind,
) -> Result<bool, EngineError> {
    let removed = tx.delete_queue_entry(actor_id, target_id, kind).await?;
    if removed == 0 {
        tracing::trace!("No queue entry for {} -> {} ({})", actor_id, target_id, kind);
    }
    Ok(removed > 0)
}

/// Remove every entry for an actor, optionally scoped to one kind
pub async fn clear_queue<T: StoreTransaction>(
    tx: &mut T,
    actor_id: Uuid,
    kind: Option<DecisionKind>,
) -> Result<u64, EngineError> {
    Ok(tx.delete_queue(actor_id, kind).await?)
}

pub async fn pending_entries<T: StoreTransaction>(
    tx: &mut T,
    actor_id: Uuid,
    kind: DecisionKind,
) -> Result<Vec<QueueEntry>, EngineError> {
    Ok(tx.list_queue(actor_id, kind).await?)
}
