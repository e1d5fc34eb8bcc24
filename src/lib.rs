//! Lume Swipe - Swipe queue and matching engine for Lume dating app
//!
//! Records swipe decisions, keeps each user's candidate queue consistent with
//! those decisions, materializes mutual matches exactly once and queues
//! notifications for an external delivery service.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{DuplicatePolicy, EngineError, EngineOptions, SwipeEngine};
pub use models::{Decision, DecisionKind, Direction, Match, MatchPair, Notification, SwipeCommand, SwipeResult};
pub use services::{MemoryStore, PostgresStore, Store};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let a = uuid::Uuid::new_v4();
        let b = uuid::Uuid::new_v4();
        assert_eq!(MatchPair::new(a, b), MatchPair::new(b, a));
        assert_eq!(EngineOptions::default().duplicate_policy, DuplicatePolicy::Reject);
    }
}
