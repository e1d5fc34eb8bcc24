use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which decision flow a swipe belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "decision_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Person,
    Product,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Person => "person",
            DecisionKind::Product => "product",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "person" => Ok(DecisionKind::Person),
            "product" => Ok(DecisionKind::Product),
            other => Err(format!("Kind must be one of: person, product (got {:?})", other)),
        }
    }
}

/// Swipe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("Direction must be one of: left, right (got {:?})", other)),
        }
    }
}

/// An irrevocable choice by an actor about a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "actorId")]
    pub actor_id: Uuid,
    #[serde(rename = "targetId")]
    pub target_id: Uuid,
    pub kind: DecisionKind,
    pub direction: Direction,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Decision {
    pub fn is_positive(&self) -> bool {
        self.direction == Direction::Right
    }
}

/// A pending, undecided candidate offered to an actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    #[serde(rename = "actorId")]
    pub actor_id: Uuid,
    #[serde(rename = "targetId")]
    pub target_id: Uuid,
    pub kind: DecisionKind,
    #[serde(rename = "insertedAt")]
    pub inserted_at: DateTime<Utc>,
}

/// Unordered pair of users, stored with the smaller identity first
///
/// Both swipe orders canonicalize to the same value, which is what the
/// unique key on the matches table relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPair {
    user_a: Uuid,
    user_b: Uuid,
}

impl MatchPair {
    pub fn new(first: Uuid, second: Uuid) -> Self {
        if first <= second {
            Self { user_a: first, user_b: second }
        } else {
            Self { user_a: second, user_b: first }
        }
    }

    pub fn user_a(&self) -> Uuid {
        self.user_a
    }

    pub fn user_b(&self) -> Uuid {
        self.user_b
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    /// The other member of the pair, if `user_id` is a member
    pub fn counterpart(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_a == user_id {
            Some(self.user_b)
        } else if self.user_b == user_id {
            Some(self.user_a)
        } else {
            None
        }
    }

    /// Key used for pair-scoped advisory locking
    pub fn lock_key(&self) -> String {
        format!("match:{}:{}", self.user_a, self.user_b)
    }
}

/// Mutual positive decision between two person-kind actors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub pair: MatchPair,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn new(pair: MatchPair) -> Self {
        Self {
            id: Uuid::new_v4(),
            pair,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMatch,
    ChatMessage,
}

impl NotificationKind {
    /// Maximum payload length in characters before truncation
    pub fn payload_limit(&self) -> usize {
        match self {
            NotificationKind::ChatMessage => 60,
            NotificationKind::NewMatch => 200,
        }
    }
}

/// A fact queued for delivery to a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "recipientId")]
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub payload: String,
    pub read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Chat room as seen by the engine. Owned by the chat service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: Uuid,
    pub user_one: Uuid,
    pub user_two: Uuid,
}

impl ChatRoom {
    /// Resolve the participant who did not send the message
    ///
    /// Returns `None` when the sender is not a member of the room. In a
    /// degenerate room where both seats hold the sender, the sender is
    /// returned and the dispatcher suppresses the notification.
    pub fn recipient_for(&self, sender_id: Uuid) -> Option<Uuid> {
        if self.user_one == sender_id {
            Some(self.user_two)
        } else if self.user_two == sender_id {
            Some(self.user_one)
        } else {
            None
        }
    }
}

/// Validated swipe command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeCommand {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub kind: DecisionKind,
    pub direction: Direction,
}

impl SwipeCommand {
    pub fn triggers_match_check(&self) -> bool {
        self.kind == DecisionKind::Person && self.direction == Direction::Right
    }
}

/// Validated chat message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessageCommand {
    pub chat_room_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
}

/// Outcome of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeResult {
    pub matched: bool,
    #[serde(rename = "matchId")]
    pub match_id: Option<Uuid>,
    /// Set when a prior decision already existed and was kept
    pub duplicate: bool,
}

/// Public profile summary fetched from the profile store for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(rename = "imageFileIds", default)]
    pub image_file_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "isVerified", default)]
    pub is_verified: Option<bool>,
}

impl PublicProfile {
    pub fn verified(&self) -> bool {
        self.is_verified.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(MatchPair::new(a, b), MatchPair::new(b, a));
        assert!(MatchPair::new(a, b).user_a() <= MatchPair::new(a, b).user_b());
    }

    #[test]
    fn test_pair_counterpart() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pair = MatchPair::new(a, b);
        assert_eq!(pair.counterpart(a), Some(b));
        assert_eq!(pair.counterpart(b), Some(a));
        assert_eq!(pair.counterpart(Uuid::new_v4()), None);
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("PERSON".parse::<DecisionKind>(), Ok(DecisionKind::Person));
        assert_eq!(" right ".parse::<Direction>(), Ok(Direction::Right));
        assert!("up".parse::<Direction>().is_err());
        assert!("place".parse::<DecisionKind>().is_err());
    }

    #[test]
    fn test_room_recipient() {
        let one = Uuid::new_v4();
        let two = Uuid::new_v4();
        let room = ChatRoom { id: Uuid::new_v4(), user_one: one, user_two: two };
        assert_eq!(room.recipient_for(one), Some(two));
        assert_eq!(room.recipient_for(two), Some(one));
        assert_eq!(room.recipient_for(Uuid::new_v4()), None);
    }
}
