// Core engine exports
pub mod decisions;
pub mod detector;
pub mod engine;
pub mod error;
pub mod notifications;
pub mod queue;

pub use decisions::{DecisionStore, DuplicatePolicy, RecordedDecision};
pub use detector::{MatchDetector, MatchOutcome};
pub use engine::{EngineOptions, SwipeEngine};
pub use error::EngineError;
pub use notifications::{truncate_payload, NotificationDispatcher, ELLIPSIS};
