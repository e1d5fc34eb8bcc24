use actix_web::{web, HttpResponse, Responder};
use crate::models::{ChatMessageRequest, ChatNotificationResponse, NotificationsResponse, UserQuery};
use crate::routes::{engine_error_response, AppState};
use crate::services::Store;

/// Configure notification routes
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/notifications", web::get().to(unread_notifications::<S>))
        .route("/notifications/chat-message", web::post().to(chat_message::<S>));
}

/// Chat message event from the chat service
///
/// POST /api/v1/notifications/chat-message
///
/// Request body:
/// ```json
/// { "chatRoomId": "uuid", "senderId": "uuid", "content": "string" }
/// ```
async fn chat_message<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<ChatMessageRequest>,
) -> impl Responder {
    let command = match req.into_inner().into_command() {
        Ok(command) => command,
        Err(e) => return engine_error_response("Rejected chat message event", &e),
    };

    match state.engine.notify_chat_message(command).await {
        Ok(notification) => HttpResponse::Ok().json(ChatNotificationResponse {
            success: true,
            notified: notification.is_some(),
            notification_id: notification.map(|n| n.id),
        }),
        Err(e) => engine_error_response("Chat message notification failed", &e),
    }
}

/// Unread notifications, polled by the delivery service
///
/// GET /api/v1/notifications?userId={userId}&limit={limit}
async fn unread_notifications<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    let user_id = match query.parse() {
        Ok(id) => id,
        Err(e) => return engine_error_response("Rejected notifications query", &e),
    };

    let limit = query.limit.map(usize::from);

    match state.engine.unread_notifications(user_id, limit).await {
        Ok(notifications) => HttpResponse::Ok().json(NotificationsResponse {
            user_id,
            count: notifications.len(),
            notifications,
        }),
        Err(e) => engine_error_response("Notification lookup failed", &e),
    }
}
