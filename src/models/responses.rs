use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::models::domain::{Notification, PublicProfile, QueueEntry};

/// Response for the swipe endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub success: bool,
    pub matched: bool,
    #[serde(rename = "matchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
    /// True when an earlier decision for the same target was kept
    pub duplicate: bool,
}

/// Response for the clear queue endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearQueueResponse {
    pub success: bool,
    pub removed: u64,
}

/// Pending queue for an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    #[serde(rename = "actorId")]
    pub actor_id: Uuid,
    pub kind: String,
    pub entries: Vec<QueueEntry>,
    pub count: usize,
}

/// Profiles of everyone the user has matched with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedUsersResponse {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub users: Vec<PublicProfile>,
    pub count: usize,
}

/// Response for a forwarded chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatNotificationResponse {
    pub success: bool,
    pub notified: bool,
    #[serde(rename = "notificationId", skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub notifications: Vec<Notification>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default)]
    pub retryable: bool,
}
