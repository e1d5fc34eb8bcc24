use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::core::EngineError;
use crate::models::domain::{ChatMessageCommand, DecisionKind, Direction, SwipeCommand};

/// Request to record a swipe decision
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: String,
    #[validate(length(min = 1))]
    pub kind: String,
    #[validate(length(min = 1))]
    pub direction: String,
}

impl SwipeRequest {
    /// Validate the payload and convert it into a typed command
    pub fn into_command(self) -> Result<SwipeCommand, EngineError> {
        self.validate()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        let actor_id = parse_identity("actorId", &self.actor_id)?;
        let target_id = parse_identity("targetId", &self.target_id)?;
        let kind = self.kind.parse::<DecisionKind>().map_err(EngineError::InvalidInput)?;
        let direction = self.direction.parse::<Direction>().map_err(EngineError::InvalidInput)?;

        Ok(SwipeCommand {
            actor_id,
            target_id,
            kind,
            direction,
        })
    }
}

/// Request to clear an actor's candidate queue
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClearQueueRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl ClearQueueRequest {
    pub fn parse(&self) -> Result<(Uuid, Option<DecisionKind>), EngineError> {
        self.validate()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        let actor_id = parse_identity("actorId", &self.actor_id)?;
        let kind = parse_optional_kind(self.kind.as_deref())?;
        Ok((actor_id, kind))
    }
}

/// Query for an actor's pending queue
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueueQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[serde(default = "default_queue_kind")]
    pub kind: String,
}

fn default_queue_kind() -> String {
    DecisionKind::Person.as_str().to_string()
}

impl QueueQuery {
    pub fn parse(&self) -> Result<(Uuid, DecisionKind), EngineError> {
        self.validate()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        let actor_id = parse_identity("actorId", &self.actor_id)?;
        let kind = self.kind.parse::<DecisionKind>().map_err(EngineError::InvalidInput)?;
        Ok((actor_id, kind))
    }
}

/// Query keyed by a single user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = 1, max = 200))]
    #[serde(default)]
    pub limit: Option<u16>,
}

impl UserQuery {
    pub fn parse(&self) -> Result<Uuid, EngineError> {
        self.validate()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        parse_identity("userId", &self.user_id)
    }
}

/// Chat message event forwarded by the chat service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatMessageRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "chat_room_id", rename = "chatRoomId")]
    pub chat_room_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "sender_id", rename = "senderId")]
    pub sender_id: String,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

impl ChatMessageRequest {
    pub fn into_command(self) -> Result<ChatMessageCommand, EngineError> {
        self.validate()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        Ok(ChatMessageCommand {
            chat_room_id: parse_identity("chatRoomId", &self.chat_room_id)?,
            sender_id: parse_identity("senderId", &self.sender_id)?,
            content: self.content,
        })
    }
}

fn parse_identity(field: &str, value: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| EngineError::InvalidInput(format!("{} is not a valid identifier: {:?}", field, value)))
}

fn parse_optional_kind(value: Option<&str>) -> Result<Option<DecisionKind>, EngineError> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .parse::<DecisionKind>()
            .map(Some)
            .map_err(EngineError::InvalidInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe_request(actor: &str, target: &str, kind: &str, direction: &str) -> SwipeRequest {
        SwipeRequest {
            actor_id: actor.to_string(),
            target_id: target.to_string(),
            kind: kind.to_string(),
            direction: direction.to_string(),
        }
    }

    #[test]
    fn test_swipe_request_parses() {
        let actor = Uuid::new_v4();
        let target = Uuid::new_v4();
        let command = swipe_request(&actor.to_string(), &target.to_string(), "person", "RIGHT")
            .into_command()
            .unwrap();

        assert_eq!(command.actor_id, actor);
        assert_eq!(command.target_id, target);
        assert_eq!(command.kind, DecisionKind::Person);
        assert_eq!(command.direction, Direction::Right);
    }

    #[test]
    fn test_swipe_request_rejects_bad_identity() {
        let target = Uuid::new_v4().to_string();
        let err = swipe_request("not-a-uuid", &target, "person", "left")
            .into_command()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_swipe_request_rejects_bad_enums() {
        let actor = Uuid::new_v4().to_string();
        let target = Uuid::new_v4().to_string();

        let err = swipe_request(&actor, &target, "place", "left").into_command().unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = swipe_request(&actor, &target, "person", "up").into_command().unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_clear_queue_kind_is_optional() {
        let actor = Uuid::new_v4();
        let request = ClearQueueRequest { actor_id: actor.to_string(), kind: None };
        assert_eq!(request.parse().unwrap(), (actor, None));

        let request = ClearQueueRequest {
            actor_id: actor.to_string(),
            kind: Some("product".to_string()),
        };
        assert_eq!(request.parse().unwrap(), (actor, Some(DecisionKind::Product)));
    }

    #[test]
    fn test_chat_message_requires_content() {
        let request = ChatMessageRequest {
            chat_room_id: Uuid::new_v4().to_string(),
            sender_id: Uuid::new_v4().to_string(),
            content: String::new(),
        };
        assert!(matches!(request.into_command(), Err(EngineError::InvalidInput(_))));
    }
}
