use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use crate::core::{
    decisions::{DecisionStore, DuplicatePolicy},
    detector::MatchDetector,
    notifications::NotificationDispatcher,
    queue, EngineError,
};
use crate::models::{
    ChatMessageCommand, DecisionKind, MatchPair, Notification, NotificationKind, QueueEntry,
    SwipeCommand, SwipeResult,
};
use crate::services::{StorageError, Store, StoreTransaction};

/// Tunables for [`SwipeEngine`]
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Upper bound for one operation, including waiting for locks
    pub operation_timeout: Duration,
    /// Default and maximum number of notifications returned per poll
    pub notification_page_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            operation_timeout: Duration::from_secs(5),
            notification_page_size: 50,
        }
    }
}

/// Swipe orchestrator
///
/// Every mutating operation runs in a single store transaction. If the
/// operation fails, times out, or its future is dropped before commit, the
/// transaction is rolled back and no partial state is observable. The
/// operation timeout stops at the commit: once a commit has been issued its
/// outcome is always reported as-is.
///
/// # Swipe pipeline
/// 1. Take the pair lock (person likes only)
/// 2. Record the decision
/// 3. Remove the matching queue entry
/// 4. Detect a reciprocal like and create the match
/// 5. Notify the other member of a new match
pub struct SwipeEngine<S: Store> {
    store: Arc<S>,
    decisions: DecisionStore,
    detector: MatchDetector,
    dispatcher: NotificationDispatcher,
    options: EngineOptions,
}

impl<S: Store> Clone for SwipeEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            decisions: self.decisions,
            detector: self.detector,
            dispatcher: self.dispatcher,
            options: self.options,
        }
    }
}

impl<S: Store> SwipeEngine<S> {
    pub fn new(store: Arc<S>, options: EngineOptions) -> Self {
        Self {
            store,
            decisions: DecisionStore::new(options.duplicate_policy),
            detector: MatchDetector::new(),
            dispatcher: NotificationDispatcher::new(),
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a swipe and report whether it completed a match
    pub async fn swipe(&self, command: SwipeCommand) -> Result<SwipeResult, EngineError> {
        if command.actor_id == command.target_id {
            return Err(EngineError::InvalidInput(
                "actorId and targetId must differ".to_string(),
            ));
        }

        let result = self.bounded("swipe", self.swipe_in_transaction(command)).await?;

        tracing::info!(
            "Swipe {} -> {} ({}, {}): matched={} duplicate={}",
            command.actor_id,
            command.target_id,
            command.kind,
            command.direction,
            result.matched,
            result.duplicate
        );

        Ok(result)
    }

    async fn swipe_in_transaction(
        &self,
        command: SwipeCommand,
    ) -> Result<(S::Tx, SwipeResult), EngineError> {
        let mut tx = self.store.begin().await?;

        // Reciprocal likes must not both miss each other's uncommitted decision
        if command.triggers_match_check() {
            tx.lock_pair(&MatchPair::new(command.actor_id, command.target_id)).await?;
        }

        let recorded = self.decisions.record(&mut tx, &command).await?;
        queue::remove_from_queue(&mut tx, command.actor_id, command.target_id, command.kind).await?;

        let mut result = SwipeResult {
            matched: false,
            match_id: None,
            duplicate: !recorded.created,
        };

        let decision = &recorded.decision;
        if decision.kind == DecisionKind::Person && decision.is_positive() {
            let outcome = self
                .detector
                .check_and_create_match(&mut tx, decision.actor_id, decision.target_id)
                .await?;

            if let Some(outcome) = outcome {
                if outcome.created {
                    self.dispatcher
                        .notify_new_match(&mut tx, &outcome.record, decision.actor_id)
                        .await?;
                }
                result.matched = true;
                result.match_id = Some(outcome.record.id);
            }
        }

        Ok((tx, result))
    }

    /// Drop every pending candidate for an actor. Returns the number removed.
    pub async fn clear_queue(
        &self,
        actor_id: Uuid,
        kind: Option<DecisionKind>,
    ) -> Result<u64, EngineError> {
        let removed = self
            .bounded("clear_queue", async {
                let mut tx = self.store.begin().await?;
                let removed = queue::clear_queue(&mut tx, actor_id, kind).await?;
                Ok::<_, EngineError>((tx, removed))
            })
            .await?;

        tracing::info!("Cleared {} queue entries for actor {} (kind: {:?})", removed, actor_id, kind);
        Ok(removed)
    }

    /// Candidates still awaiting a decision, oldest first
    pub async fn pending_queue(
        &self,
        actor_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Vec<QueueEntry>, EngineError> {
        self.bounded("pending_queue", async {
            let mut tx = self.store.begin().await?;
            let entries = queue::pending_entries(&mut tx, actor_id, kind).await?;
            Ok::<_, EngineError>((tx, entries))
        })
        .await
    }

    /// Users the actor has matched with, most recent match first
    pub async fn matched_user_ids(&self, actor_id: Uuid) -> Result<Vec<Uuid>, EngineError> {
        self.bounded("matched_users", async {
            let mut tx = self.store.begin().await?;
            let matches = tx.list_matches(actor_id).await?;

            let user_ids: Vec<Uuid> = matches
                .iter()
                .filter_map(|record| record.pair.counterpart(actor_id))
                .collect();
            Ok::<_, EngineError>((tx, user_ids))
        })
        .await
    }

    /// Queue a chat-message notification for the other room participant
    ///
    /// Returns `None` when the recipient resolves to the sender.
    pub async fn notify_chat_message(
        &self,
        command: ChatMessageCommand,
    ) -> Result<Option<Notification>, EngineError> {
        self.bounded("notify_chat_message", async {
            let mut tx = self.store.begin().await?;

            let room = tx
                .find_chat_room(command.chat_room_id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("chat room {}", command.chat_room_id)))?;

            let recipient_id = room.recipient_for(command.sender_id).ok_or_else(|| {
                EngineError::InvalidInput(format!(
                    "sender {} is not a participant of chat room {}",
                    command.sender_id, room.id
                ))
            })?;

            let notification = self
                .dispatcher
                .emit(
                    &mut tx,
                    recipient_id,
                    command.sender_id,
                    NotificationKind::ChatMessage,
                    &command.content,
                )
                .await?;

            Ok::<_, EngineError>((tx, notification))
        })
        .await
    }

    /// Unread notifications for a recipient, newest first
    pub async fn unread_notifications(
        &self,
        recipient_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, EngineError> {
        let page_size = self.options.notification_page_size;
        let limit = limit.unwrap_or(page_size).clamp(1, page_size.max(1));

        self.bounded("unread_notifications", async {
            let mut tx = self.store.begin().await?;
            let notifications = tx.list_unread_notifications(recipient_id, limit).await?;
            Ok::<_, EngineError>((tx, notifications))
        })
        .await
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }

    /// Run `work` under the operation timeout, then commit the transaction
    /// it hands back.
    ///
    /// On expiry `work` is dropped together with its uncommitted
    /// transaction. The commit is not bounded, so a timeout error always
    /// means nothing was written.
    async fn bounded<T, F>(&self, operation: &str, work: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<(S::Tx, T), EngineError>>,
    {
        let (tx, value) = match tokio::time::timeout(self.options.operation_timeout, work).await {
            Ok(result) => result?,
            Err(_) => {
                let millis = self.options.operation_timeout.as_millis() as u64;
                tracing::error!("{} timed out after {}ms and was rolled back", operation, millis);
                return Err(StorageError::Timeout(millis).into());
            }
        };

        tx.commit().await?;
        Ok(value)
    }
}
