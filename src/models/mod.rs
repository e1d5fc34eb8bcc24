// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ChatMessageCommand, ChatRoom, Decision, DecisionKind, Direction, Match, MatchPair, Notification,
    NotificationKind, PublicProfile, QueueEntry, SwipeCommand, SwipeResult,
};
pub use requests::{ChatMessageRequest, ClearQueueRequest, QueueQuery, SwipeRequest, UserQuery};
pub use responses::{
    ChatNotificationResponse, ClearQueueResponse, ErrorResponse, HealthResponse, MatchedUsersResponse,
    NotificationsResponse, QueueResponse, SwipeResponse,
};
