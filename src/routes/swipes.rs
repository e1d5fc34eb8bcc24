use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use crate::models::{
    ClearQueueRequest, ClearQueueResponse, HealthResponse, MatchedUsersResponse, PublicProfile,
    QueueQuery, QueueResponse, SwipeRequest, SwipeResponse, UserQuery,
};
use crate::routes::{engine_error_response, AppState};
use crate::services::{AppwriteClient, CacheKey, CacheManager, Store};

/// Configure swipe, queue and match routes
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check::<S>))
        .route("/swipes", web::post().to(swipe::<S>))
        .route("/queue", web::get().to(pending_queue::<S>))
        .route("/queue/clear", web::post().to(clear_queue::<S>))
        .route("/matches", web::get().to(matched_users::<S>));
}

/// Health check endpoint
async fn health_check<S: Store>(state: web::Data<AppState<S>>) -> impl Responder {
    let db_healthy = state.engine.health_check().await;

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Record a swipe
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "actorId": "uuid",
///   "targetId": "uuid",
///   "kind": "person|product",
///   "direction": "left|right"
/// }
/// ```
///
/// `duplicate` in the response marks a re-swipe kept as a no-op under the
/// `ignore` policy.
async fn swipe<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<SwipeRequest>,
) -> impl Responder {
    let command = match req.into_inner().into_command() {
        Ok(command) => command,
        Err(e) => return engine_error_response("Rejected swipe request", &e),
    };

    match state.engine.swipe(command).await {
        Ok(result) => HttpResponse::Ok().json(SwipeResponse {
            success: true,
            matched: result.matched,
            match_id: result.match_id,
            duplicate: result.duplicate,
        }),
        Err(e) => engine_error_response("Swipe failed", &e),
    }
}

/// Clear an actor's candidate queue
///
/// POST /api/v1/queue/clear
///
/// Request body:
/// ```json
/// { "actorId": "uuid", "kind": "person|product" }
/// ```
/// `kind` is optional; without it every kind is cleared.
async fn clear_queue<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<ClearQueueRequest>,
) -> impl Responder {
    let (actor_id, kind) = match req.parse() {
        Ok(parsed) => parsed,
        Err(e) => return engine_error_response("Rejected clear queue request", &e),
    };

    match state.engine.clear_queue(actor_id, kind).await {
        Ok(removed) => HttpResponse::Ok().json(ClearQueueResponse { success: true, removed }),
        Err(e) => engine_error_response("Clear queue failed", &e),
    }
}

/// Pending candidates for an actor
///
/// GET /api/v1/queue?actorId={actorId}&kind={kind}
async fn pending_queue<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<QueueQuery>,
) -> impl Responder {
    let (actor_id, kind) = match query.parse() {
        Ok(parsed) => parsed,
        Err(e) => return engine_error_response("Rejected queue query", &e),
    };

    match state.engine.pending_queue(actor_id, kind).await {
        Ok(entries) => HttpResponse::Ok().json(QueueResponse {
            actor_id,
            kind: kind.to_string(),
            count: entries.len(),
            entries,
        }),
        Err(e) => engine_error_response("Queue lookup failed", &e),
    }
}

/// Public profiles of everyone the user has matched with
///
/// GET /api/v1/matches?userId={userId}
///
/// Match membership comes from the engine; display fields come from the
/// profile store. Profiles that cannot be fetched are left out.
async fn matched_users<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    let user_id = match query.parse() {
        Ok(id) => id,
        Err(e) => return engine_error_response("Rejected matches query", &e),
    };

    let matched_ids = match state.engine.matched_user_ids(user_id).await {
        Ok(ids) => ids,
        Err(e) => return engine_error_response("Match lookup failed", &e),
    };

    tracing::debug!("User {} has {} matches", user_id, matched_ids.len());

    let users = fetch_profiles(&state.profiles, &state.cache, &matched_ids).await;

    HttpResponse::Ok().json(MatchedUsersResponse {
        user_id,
        count: users.len(),
        users,
    })
}

async fn fetch_profiles(
    profiles: &AppwriteClient,
    cache: &CacheManager,
    user_ids: &[Uuid],
) -> Vec<PublicProfile> {
    let mut found = Vec::with_capacity(user_ids.len());

    for user_id in user_ids {
        let id = user_id.to_string();
        let key = CacheKey::profile(&id);

        if let Ok(profile) = cache.get::<PublicProfile>(&key).await {
            found.push(profile);
            continue;
        }

        match profiles.get_public_profile(&id).await {
            Ok(profile) => {
                if let Err(e) = cache.set(&key, &profile).await {
                    tracing::warn!("Failed to cache profile {}: {}", id, e);
                }
                found.push(profile);
            }
            Err(e) => {
                tracing::warn!("Skipping matched user {} without a profile: {}", id, e);
            }
        }
    }

    found
}
