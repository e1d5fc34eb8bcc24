use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::core::EngineError;
use crate::models::{Decision, SwipeCommand};
use crate::services::{StorageError, StoreTransaction};

/// What to do when an actor swipes a target they already decided on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateDecision`
    #[default]
    Reject,
    /// Keep the first decision and report success
    Ignore,
}

/// Decision returned by [`DecisionStore::record`]
#[derive(Debug, Clone)]
pub struct RecordedDecision {
    pub decision: Decision,
    /// False when an earlier decision was kept under [`DuplicatePolicy::Ignore`]
    pub created: bool,
}

/// Append-only decision log
#[derive(Debug, Clone, Copy)]
pub struct DecisionStore {
    policy: DuplicatePolicy,
}

impl DecisionStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    /// Record a decision inside the caller's transaction
    ///
    /// Relies on the store's key constraint rather than a prior lookup, so
    /// concurrent duplicates cannot both be written. Does not touch the queue.
    /// Self-decisions are rejected by the engine before a transaction opens.
    pub async fn record<T: StoreTransaction>(
        &self,
        tx: &mut T,
        command: &SwipeCommand,
    ) -> Result<RecordedDecision, EngineError> {
        let decision = Decision {
            actor_id: command.actor_id,
            target_id: command.target_id,
            kind: command.kind,
            direction: command.direction,
            created_at: Utc::now(),
        };

        if tx.insert_decision(&decision).await? {
            tracing::debug!(
                "Recorded decision: {} -> {} ({}, {})",
                decision.actor_id,
                decision.target_id,
                decision.kind,
                decision.direction
            );
            return Ok(RecordedDecision { decision, created: true });
        }

        match self.policy {
            DuplicatePolicy::Reject => Err(EngineError::DuplicateDecision {
                actor_id: command.actor_id,
                target_id: command.target_id,
                kind: command.kind,
            }),
            DuplicatePolicy::Ignore => {
                let existing = tx
                    .find_decision(command.actor_id, command.target_id, command.kind)
                    .await?
                    .ok_or_else(|| {
                        StorageError::Inconsistent(format!(
                            "decision {} -> {} conflicted but was not found",
                            command.actor_id, command.target_id
                        ))
                    })?;
                tracing::debug!(
                    "Kept existing decision: {} -> {} ({})",
                    existing.actor_id,
                    existing.target_id,
                    existing.direction
                );
                Ok(RecordedDecision { decision: existing, created: false })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionKind, Direction};
    use crate::services::{MemoryStore, Store};
    use uuid::Uuid;

    fn command(direction: Direction) -> SwipeCommand {
        SwipeCommand {
            actor_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            kind: DecisionKind::Product,
            direction,
        }
    }

    #[tokio::test]
    async fn test_reject_policy_fails_second_decision() {
        let store = MemoryStore::new();
        let decisions = DecisionStore::new(DuplicatePolicy::Reject);
        let first = command(Direction::Left);
        let second = SwipeCommand { direction: Direction::Right, ..first };

        let mut tx = store.begin().await.unwrap();
        assert!(decisions.record(&mut tx, &first).await.unwrap().created);
        let err = decisions.record(&mut tx, &second).await.unwrap_err();
        assert!(matches!(err, EngineError::DuplicateDecision { .. }));
    }

    #[tokio::test]
    async fn test_ignore_policy_keeps_first_decision() {
        let store = MemoryStore::new();
        let decisions = DecisionStore::new(DuplicatePolicy::Ignore);
        let first = command(Direction::Left);
        let second = SwipeCommand { direction: Direction::Right, ..first };

        let mut tx = store.begin().await.unwrap();
        decisions.record(&mut tx, &first).await.unwrap();
        let recorded = decisions.record(&mut tx, &second).await.unwrap();

        assert!(!recorded.created);
        assert_eq!(recorded.decision.direction, Direction::Left);
    }
}
