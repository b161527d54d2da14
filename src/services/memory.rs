use crate::core::DiscoveryEngine;
use crate::models::{NotificationType, Preferences, Profile, SearchCriteria};
use crate::services::repository::{PreferencesRepository, ProfileRepository, RepositoryError};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process profile store
///
/// Records are kept in insertion order, which is the arrival order used to
/// break `updated_at` ties. One record per user id, like the SQL unique index.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<Vec<Profile>>,
    engine: DiscoveryEngine,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn snapshot(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut profiles = self.profiles.write().await;
        if profiles.iter().any(|p| p.user_id() == profile.user_id() || p.id() == profile.id()) {
            return Err(RepositoryError::Conflict(format!(
                "profile for user {} already exists",
                profile.user_id()
            )));
        }
        profiles.push(profile.clone());
        Ok(profile.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.read().await.iter().find(|p| p.id() == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.user_id() == user_id)
            .cloned())
    }

    async fn update(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let mut profiles = self.profiles.write().await;
        let slot = profiles
            .iter_mut()
            .find(|p| p.id() == profile.id())
            .ok_or_else(|| RepositoryError::NotFound { entity: "Profile", id: profile.id() })?;
        *slot = profile.clone();
        Ok(profile.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.id() != id);
        if profiles.len() == before {
            return Err(RepositoryError::NotFound { entity: "Profile", id });
        }
        Ok(())
    }

    async fn find_visible_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.engine.visible(self.snapshot().await, exclude_user_id))
    }

    async fn find_profiles_by_location(
        &self,
        location: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.engine.by_location(self.snapshot().await, location, exclude_user_id))
    }

    async fn find_profiles_by_interests(
        &self,
        interests: &[String],
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.engine.by_interests(self.snapshot().await, interests, exclude_user_id))
    }

    async fn find_complete_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.engine.complete(self.snapshot().await, exclude_user_id))
    }

    async fn search_profiles(&self, criteria: &SearchCriteria) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.engine.search(self.snapshot().await, criteria))
    }
}

/// In-process preferences store
#[derive(Default)]
pub struct InMemoryPreferencesRepository {
    preferences: RwLock<Vec<Preferences>>,
}

impl InMemoryPreferencesRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferencesRepository for InMemoryPreferencesRepository {
    async fn create(&self, preferences: &Preferences) -> Result<Preferences, RepositoryError> {
        let mut all = self.preferences.write().await;
        if all
            .iter()
            .any(|p| p.user_id() == preferences.user_id() || p.id() == preferences.id())
        {
            return Err(RepositoryError::Conflict(format!(
                "preferences for user {} already exist",
                preferences.user_id()
            )));
        }
        all.push(preferences.clone());
        Ok(preferences.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Preferences>, RepositoryError> {
        Ok(self.preferences.read().await.iter().find(|p| p.id() == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Preferences>, RepositoryError> {
        Ok(self
            .preferences
            .read()
            .await
            .iter()
            .find(|p| p.user_id() == user_id)
            .cloned())
    }

    async fn update(&self, preferences: &Preferences) -> Result<Preferences, RepositoryError> {
        let mut all = self.preferences.write().await;
        let slot = all
            .iter_mut()
            .find(|p| p.id() == preferences.id())
            .ok_or_else(|| RepositoryError::NotFound { entity: "Preferences", id: preferences.id() })?;
        *slot = preferences.clone();
        Ok(preferences.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut all = self.preferences.write().await;
        let before = all.len();
        all.retain(|p| p.id() != id);
        if all.len() == before {
            return Err(RepositoryError::NotFound { entity: "Preferences", id });
        }
        Ok(())
    }

    async fn find_users_with_notifications_enabled(
        &self,
        kind: NotificationType,
    ) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .preferences
            .read()
            .await
            .iter()
            .filter(|p| p.notifications_enabled(kind))
            .map(|p| p.user_id().to_string())
            .collect())
    }

    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<Preferences>, RepositoryError> {
        let wanted: HashSet<&str> = user_ids.iter().map(String::as_str).collect();
        Ok(self
            .preferences
            .read()
            .await
            .iter()
            .filter(|p| wanted.contains(p.user_id()))
            .cloned()
            .collect())
    }
}
