use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;
use crate::models::{ChatRoom, Decision, DecisionKind, Match, MatchPair, Notification, QueueEntry};
use crate::services::store::{StorageError, Store, StoreTransaction};

type TripleKey = (Uuid, Uuid, DecisionKind);

#[derive(Debug, Clone, Default)]
struct Tables {
    decisions: HashMap<TripleKey, Decision>,
    queue: HashMap<TripleKey, QueueEntry>,
    matches: HashMap<MatchPair, Match>,
    notifications: Vec<Notification>,
    chat_rooms: HashMap<Uuid, ChatRoom>,
}

/// In-process store with the same key constraints as the PostgreSQL schema
///
/// Transactions take an exclusive lock on the tables and stage their writes
/// on a copy, so concurrent transactions run one at a time and an
/// uncommitted transaction leaves no trace. Used by tests and benches.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_commits: Arc<AtomicBool>,
    commit_delay_ms: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent commit fail until reset
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Apply each commit and then hold back its acknowledgement for `delay`
    pub fn delay_commits(&self, delay: Duration) {
        self.commit_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Offer a candidate to an actor, as candidate generation would
    pub async fn seed_queue_entry(&self, actor_id: Uuid, target_id: Uuid, kind: DecisionKind) {
        let mut tables = self.tables.lock().await;
        tables.queue.entry((actor_id, target_id, kind)).or_insert(QueueEntry {
            actor_id,
            target_id,
            kind,
            inserted_at: Utc::now(),
        });
    }

    /// Register a chat room, as the chat service would
    pub async fn seed_chat_room(&self, room: ChatRoom) {
        let mut tables = self.tables.lock().await;
        tables.chat_rooms.insert(room.id, room);
    }

    pub async fn decisions(&self) -> Vec<Decision> {
        self.tables.lock().await.decisions.values().cloned().collect()
    }

    pub async fn queue_entries(&self) -> Vec<QueueEntry> {
        self.tables.lock().await.queue.values().cloned().collect()
    }

    pub async fn matches(&self) -> Vec<Match> {
        self.tables.lock().await.matches.values().cloned().collect()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.tables.lock().await.notifications.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StorageError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTransaction {
            guard,
            staged,
            fail_commits: self.fail_commits.clone(),
            commit_delay_ms: self.commit_delay_ms.clone(),
        })
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    fail_commits: Arc<AtomicBool>,
    commit_delay_ms: Arc<AtomicU64>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert_decision(&mut self, decision: &Decision) -> Result<bool, StorageError> {
        let key = (decision.actor_id, decision.target_id, decision.kind);
        if self.staged.decisions.contains_key(&key) {
            return Ok(false);
        }
        self.staged.decisions.insert(key, decision.clone());
        Ok(true)
    }

    async fn find_decision(
        &mut self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Option<Decision>, StorageError> {
        Ok(self.staged.decisions.get(&(actor_id, target_id, kind)).cloned())
    }

    async fn delete_queue_entry(
        &mut self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    ) -> Result<u64, StorageError> {
        Ok(self.staged.queue.remove(&(actor_id, target_id, kind)).map_or(0, |_| 1))
    }

    async fn delete_queue(
        &mut self,
        actor_id: Uuid,
        kind: Option<DecisionKind>,
    ) -> Result<u64, StorageError> {
        let before = self.staged.queue.len();
        self.staged.queue.retain(|(actor, _, entry_kind), _| {
            *actor != actor_id || kind.map_or(false, |k| k != *entry_kind)
        });
        Ok((before - self.staged.queue.len()) as u64)
    }

    async fn list_queue(
        &mut self,
        actor_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Vec<QueueEntry>, StorageError> {
        let mut entries: Vec<QueueEntry> = self
            .staged
            .queue
            .values()
            .filter(|entry| entry.actor_id == actor_id && entry.kind == kind)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.inserted_at);
        Ok(entries)
    }

    async fn lock_pair(&mut self, _pair: &MatchPair) -> Result<(), StorageError> {
        // The whole store is already held exclusively by this transaction
        Ok(())
    }

    async fn insert_match(&mut self, record: &Match) -> Result<bool, StorageError> {
        if self.staged.matches.contains_key(&record.pair) {
            return Ok(false);
        }
        self.staged.matches.insert(record.pair, record.clone());
        Ok(true)
    }

    async fn find_match(&mut self, pair: &MatchPair) -> Result<Option<Match>, StorageError> {
        Ok(self.staged.matches.get(pair).cloned())
    }

    async fn list_matches(&mut self, user_id: Uuid) -> Result<Vec<Match>, StorageError> {
        let mut matches: Vec<Match> = self
            .staged
            .matches
            .values()
            .filter(|record| record.pair.contains(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_chat_room(&mut self, room_id: Uuid) -> Result<Option<ChatRoom>, StorageError> {
        Ok(self.staged.chat_rooms.get(&room_id).cloned())
    }

    async fn insert_notification(&mut self, notification: &Notification) -> Result<(), StorageError> {
        self.staged.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_unread_notifications(
        &mut self,
        recipient_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, StorageError> {
        let mut unread: Vec<Notification> = self
            .staged
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .cloned()
            .collect();
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        unread.truncate(limit);
        Ok(unread)
    }

    async fn commit(self) -> Result<(), StorageError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("commit rejected".to_string()));
        }
        let MemoryTransaction { mut guard, staged, commit_delay_ms, .. } = self;
        *guard = staged;
        drop(guard);

        let delay_ms = commit_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    fn decision(actor_id: Uuid, target_id: Uuid) -> Decision {
        Decision {
            actor_id,
            target_id,
            kind: DecisionKind::Person,
            direction: Direction::Right,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        {
            let mut tx = store.begin().await.unwrap();
            assert!(tx.insert_decision(&decision(a, b)).await.unwrap());
        }

        assert!(store.decisions().await.is_empty());
    }

    #[tokio::test]
    async fn test_decision_key_is_unique() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_decision(&decision(a, b)).await.unwrap());
        assert!(!tx.insert_decision(&decision(a, b)).await.unwrap());
        tx.commit().await.unwrap();

        assert_eq!(store.decisions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_queue_scoped_by_kind() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.seed_queue_entry(actor, Uuid::new_v4(), DecisionKind::Person).await;
        store.seed_queue_entry(actor, Uuid::new_v4(), DecisionKind::Product).await;
        store.seed_queue_entry(other, Uuid::new_v4(), DecisionKind::Person).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.delete_queue(actor, Some(DecisionKind::Person)).await.unwrap(), 1);
        tx.commit().await.unwrap();

        let remaining = store.queue_entries().await;
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|e| e.actor_id != actor || e.kind == DecisionKind::Product));
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_previous_state() {
        let store = MemoryStore::new();
        store.fail_commits(true);

        let mut tx = store.begin().await.unwrap();
        tx.insert_decision(&decision(Uuid::new_v4(), Uuid::new_v4())).await.unwrap();
        assert!(matches!(tx.commit().await, Err(StorageError::Unavailable(_))));

        assert!(store.decisions().await.is_empty());
    }
}
