use uuid::Uuid;
use crate::core::EngineError;
use crate::models::{DecisionKind, Direction, Match, MatchPair};
use crate::services::{StorageError, StoreTransaction};

/// Match found or created by the detector
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub record: Match,
    /// True only for the invocation that inserted the row
    pub created: bool,
}

/// Detects reciprocal likes between two people and materializes the match
///
/// Only person-kind decisions are consulted; products never reciprocate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchDetector;

impl MatchDetector {
    pub fn new() -> Self {
        Self
    }

    /// Called after `liker` has liked `liked`
    ///
    /// Returns `None` while `liked` has not liked back. Otherwise returns the
    /// match for the canonical pair, creating it if this is the first time
    /// the pair was seen. A concurrent insert that loses on the unique key
    /// resolves to the winner's row.
    pub async fn check_and_create_match<T: StoreTransaction>(
        &self,
        tx: &mut T,
        liker: Uuid,
        liked: Uuid,
    ) -> Result<Option<MatchOutcome>, EngineError> {
        let reciprocal = tx.find_decision(liked, liker, DecisionKind::Person).await?;
        if !matches!(reciprocal, Some(ref d) if d.direction == Direction::Right) {
            return Ok(None);
        }

        let pair = MatchPair::new(liker, liked);
        let candidate = Match::new(pair);

        if tx.insert_match(&candidate).await? {
            tracing::info!(
                "Match created: {} <-> {} ({})",
                pair.user_a(),
                pair.user_b(),
                candidate.id
            );
            return Ok(Some(MatchOutcome { record: candidate, created: true }));
        }

        let existing = tx.find_match(&pair).await?.ok_or_else(|| {
            StorageError::Inconsistent(format!(
                "match for {} <-> {} conflicted but was not found",
                pair.user_a(),
                pair.user_b()
            ))
        })?;

        tracing::debug!("Match already exists: {}", existing.id);
        Ok(Some(MatchOutcome { record: existing, created: false }))
    }
}
