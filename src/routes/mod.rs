// Route exports
pub mod notifications;
pub mod swipes;

use actix_web::{error, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use crate::core::{EngineError, SwipeEngine};
use crate::models::ErrorResponse;
use crate::services::{AppwriteClient, CacheManager, Store};

/// Application state shared across all handlers
pub struct AppState<S: Store> {
    pub engine: SwipeEngine<S>,
    pub profiles: Arc<AppwriteClient>,
    pub cache: Arc<CacheManager>,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            profiles: Arc::clone(&self.profiles),
            cache: Arc::clone(&self.cache),
        }
    }
}

pub fn configure_routes<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(swipes::configure::<S>)
            .configure(notifications::configure::<S>),
    );
}

/// Map an engine error onto its HTTP response
pub(crate) fn engine_error_response(context: &str, err: &EngineError) -> HttpResponse {
    match err {
        EngineError::StorageFailure(_) => tracing::error!("{}: {}", context, err),
        _ => tracing::info!("{}: {}", context, err),
    }

    let body = ErrorResponse {
        error: err.label().to_string(),
        message: err.to_string(),
        status_code: err.status_code(),
        retryable: err.is_retryable(),
    };

    match err {
        EngineError::InvalidInput(_) => HttpResponse::BadRequest().json(body),
        EngineError::DuplicateDecision { .. } => HttpResponse::Conflict().json(body),
        EngineError::NotFound(_) => HttpResponse::NotFound().json(body),
        EngineError::StorageFailure(_) => HttpResponse::InternalServerError().json(body),
    }
}

fn bad_request(label: &str, message: String) -> actix_web::Error {
    let body = ErrorResponse {
        error: label.to_string(),
        message: message.clone(),
        status_code: 400,
        retryable: false,
    };
    error::InternalError::from_response(message, HttpResponse::BadRequest().json(body)).into()
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    bad_request("invalid_json", format!("Invalid JSON: {}", err))
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    bad_request("invalid_query", format!("Invalid query: {}", err))
}

/// Extractor configs that answer malformed bodies and query strings with
/// the same [`ErrorResponse`] shape as engine errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(handle_query_payload_error)
}
