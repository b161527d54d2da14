use crate::models::{DomainError, NotificationType, Preferences, Profile, SearchCriteria};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a persistence backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    /// A record for this user already exists (uniqueness constraint)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Update or delete hit a record that is no longer stored
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Corrupt record: {0}")]
    Corrupt(#[from] DomainError),
}

/// Persistence port for profiles
///
/// The discovery queries return visible profiles only, exclude
/// `exclude_user_id` when given, and order by `updated_at` descending.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, RepositoryError>;
    async fn update(&self, profile: &Profile) -> Result<Profile, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn find_visible_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, RepositoryError>;
    async fn find_profiles_by_location(
        &self,
        location: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, RepositoryError>;
    async fn find_profiles_by_interests(
        &self,
        interests: &[String],
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, RepositoryError>;
    async fn find_complete_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, RepositoryError>;
    async fn search_profiles(&self, criteria: &SearchCriteria) -> Result<Vec<Profile>, RepositoryError>;
}

/// Persistence port for preferences
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    async fn create(&self, preferences: &Preferences) -> Result<Preferences, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Preferences>, RepositoryError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Preferences>, RepositoryError>;
    async fn update(&self, preferences: &Preferences) -> Result<Preferences, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// User ids with the given notification toggle switched on
    async fn find_users_with_notifications_enabled(
        &self,
        kind: NotificationType,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Preferences for many users at once; users without a record are skipped
    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<Preferences>, RepositoryError>;
}
