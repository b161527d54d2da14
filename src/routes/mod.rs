// Route exports
pub mod discovery;
pub mod health;
pub mod preferences;
pub mod profiles;

use crate::core::DiscoveryEngine;
use crate::models::ErrorResponse;
use crate::services::{
    DiscoveryService, PostgresClient, PreferencesRepository, PreferencesService, ProfilePolicy, ProfileRepository,
    ProfileService, ServiceError,
};
use actix_web::{http::StatusCode, web, HttpResponse};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use validator::ValidationErrors;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: ProfileService,
    pub preferences: PreferencesService,
    pub discovery: DiscoveryService,
    /// Present when running on the Postgres backend
    pub postgres: Option<Arc<PostgresClient>>,
}

impl AppState {
    /// Wire the services over a pair of repositories
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        preferences_repository: Arc<dyn PreferencesRepository>,
        policy: ProfilePolicy,
        engine: DiscoveryEngine,
    ) -> Self {
        Self {
            profiles: ProfileService::new(profile_repository.clone(), policy),
            preferences: PreferencesService::new(preferences_repository.clone()),
            discovery: DiscoveryService::new(profile_repository, preferences_repository, engine),
            postgres: None,
        }
    }

    pub fn with_postgres(mut self, client: Arc<PostgresClient>) -> Self {
        self.postgres = Some(client);
        self
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(profiles::configure)
            .configure(preferences::configure)
            .configure(discovery::configure),
    );
}

/// Map a service failure onto the JSON error body
pub(crate) fn error_response(err: &ServiceError) -> HttpResponse {
    let (status, error) = match err {
        ServiceError::EntityNotFound { .. } => (StatusCode::NOT_FOUND, "Not found"),
        ServiceError::EntityAlreadyExists { .. } => (StatusCode::CONFLICT, "Already exists"),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
        ServiceError::Repository(e) => {
            tracing::error!("Storage failure: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    };

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn validation_error(errors: &ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: {:?}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

pub(crate) fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// 200 with the value, or the mapped error
pub(crate) fn respond<T: Serialize>(result: Result<T, ServiceError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

/// Parse an optional JSON body
///
/// An empty body is `None`; anything else must deserialize or the request
/// is rejected with 400.
pub(crate) fn optional_json<T: DeserializeOwned>(body: &web::Bytes) -> Result<Option<T>, HttpResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(body).map(Some).map_err(|e| {
        tracing::info!("Rejected request body: {}", e);
        bad_request("Invalid JSON", format!("Invalid JSON: {}", e))
    })
}

/// Decode a percent-encoded path segment such as a photo URL
pub(crate) fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
