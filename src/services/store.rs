use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use crate::models::{ChatRoom, Decision, DecisionKind, Match, MatchPair, Notification, QueueEntry};

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Inconsistent state: {0}")]
    Inconsistent(String),
}

/// Handle to the shared decision, queue, match and notification tables
///
/// Created once at startup and shared by every request worker. All reads and
/// writes go through a [`StoreTransaction`]; dropping a transaction without
/// calling `commit` discards every write made through it.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Tx: StoreTransaction;

    async fn begin(&self) -> Result<Self::Tx, StorageError>;

    async fn health_check(&self) -> Result<bool, StorageError>;
}

/// A single unit of work against the store
#[async_trait]
pub trait StoreTransaction: Send + Sized {
    /// Insert a decision unless one already exists for its
    /// (actor, target, kind) key. Returns whether a row was written.
    async fn insert_decision(&mut self, decision: &Decision) -> Result<bool, StorageError>;

    async fn find_decision(
        &mut self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Option<Decision>, StorageError>;

    async fn delete_queue_entry(
        &mut self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    ) -> Result<u64, StorageError>;

    /// Delete every queue entry for an actor, optionally scoped to one kind
    async fn delete_queue(
        &mut self,
        actor_id: Uuid,
        kind: Option<DecisionKind>,
    ) -> Result<u64, StorageError>;

    /// Pending entries for an actor, oldest first
    async fn list_queue(
        &mut self,
        actor_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Vec<QueueEntry>, StorageError>;

    /// Serialize against other transactions touching the same pair until
    /// this transaction ends
    async fn lock_pair(&mut self, pair: &MatchPair) -> Result<(), StorageError>;

    /// Insert a match unless the pair already has one. Returns whether a row
    /// was written.
    async fn insert_match(&mut self, record: &Match) -> Result<bool, StorageError>;

    async fn find_match(&mut self, pair: &MatchPair) -> Result<Option<Match>, StorageError>;

    /// Matches the user belongs to, newest first
    async fn list_matches(&mut self, user_id: Uuid) -> Result<Vec<Match>, StorageError>;

    async fn find_chat_room(&mut self, room_id: Uuid) -> Result<Option<ChatRoom>, StorageError>;

    async fn insert_notification(&mut self, notification: &Notification) -> Result<(), StorageError>;

    /// Unread notifications for a recipient, newest first
    async fn list_unread_notifications(
        &mut self,
        recipient_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, StorageError>;

    async fn commit(self) -> Result<(), StorageError>;
}
