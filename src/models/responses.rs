use serde::{Deserialize, Serialize};
use crate::models::{NotificationType, Profile};

/// List of profiles returned by the discovery accessors
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListResponse {
    pub profiles: Vec<Profile>,
    pub total_results: usize,
}

impl From<Vec<Profile>> for ProfileListResponse {
    fn from(profiles: Vec<Profile>) -> Self {
        Self {
            total_results: profiles.len(),
            profiles,
        }
    }
}

/// Response for the discover endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverResponse {
    pub profiles: Vec<Profile>,
    pub total_candidates: usize,
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
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Users who have a given notification toggle switched on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUsersResponse {
    pub notification_type: NotificationType,
    pub user_ids: Vec<String>,
    pub count: usize,
}
