use crate::core::{Candidate, DiscoveryEngine, DiscoveryResult, Viewer};
use crate::models::Preferences;
use crate::services::error::ServiceError;
use crate::services::repository::{PreferencesRepository, ProfileRepository};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Loads a viewer and their candidate pool, then runs the discovery engine
#[derive(Clone)]
pub struct DiscoveryService {
    profiles: Arc<dyn ProfileRepository>,
    preferences: Arc<dyn PreferencesRepository>,
    engine: DiscoveryEngine,
}

impl DiscoveryService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        preferences: Arc<dyn PreferencesRepository>,
        engine: DiscoveryEngine,
    ) -> Self {
        Self {
            profiles,
            preferences,
            engine,
        }
    }

    /// Profiles `user_id` is eligible to see
    ///
    /// `verified_user_ids` lists the users known to be verified; everyone else
    /// counts as unverified. The viewer must have a profile; missing
    /// preferences fall back to defaults on either side.
    pub async fn discover_for(
        &self,
        user_id: &str,
        verified_user_ids: &[String],
    ) -> Result<DiscoveryResult, ServiceError> {
        let profile = self
            .profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile"))?;
        let preferences = self
            .preferences
            .find_by_user_id(user_id)
            .await?
            .unwrap_or_else(|| Preferences::new(user_id));

        let pool = self.profiles.find_visible_profiles(Some(user_id)).await?;
        let pool_ids: Vec<String> = pool.iter().map(|p| p.user_id().to_string()).collect();

        let mut by_user: HashMap<String, Preferences> = self
            .preferences
            .find_by_user_ids(&pool_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id().to_string(), p))
            .collect();

        let verified: HashSet<&str> = verified_user_ids.iter().map(String::as_str).collect();

        let candidates: Vec<Candidate> = pool
            .into_iter()
            .map(|p| {
                let is_verified = verified.contains(p.user_id());
                let prefs = by_user.remove(p.user_id());
                Candidate::new(p, prefs).with_verified(is_verified)
            })
            .collect();

        let viewer = Viewer {
            profile: &profile,
            preferences: &preferences,
            verified: verified.contains(user_id),
        };

        let result = self.engine.discover(&viewer, candidates);
        info!(
            "Discovery for user {} returned {} of {} candidates",
            user_id,
            result.profiles.len(),
            result.total_candidates
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EligibilityPolicy;
    use crate::models::{BasicInfoUpdate, Gender, Profile};
    use crate::services::memory::{InMemoryPreferencesRepository, InMemoryProfileRepository};
    use chrono::Months;

    async fn seed(repo: &InMemoryProfileRepository, user_id: &str, age: u32, gender: Gender) {
        let mut profile = Profile::new(user_id);
        profile.update_basic_info(BasicInfoUpdate {
            date_of_birth: crate::core::age::today().checked_sub_months(Months::new(12 * age + 1)),
            gender: Some(gender),
            ..Default::default()
        });
        profile.add_photo(format!("{}.jpg", user_id));
        repo.create(&profile).await.unwrap();
    }

    #[tokio::test]
    async fn test_discover_requires_viewer_profile() {
        let service = DiscoveryService::new(
            Arc::new(InMemoryProfileRepository::new()),
            Arc::new(InMemoryPreferencesRepository::new()),
            DiscoveryEngine::default(),
        );

        let err = service.discover_for("ghost", &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_verified_gate() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let preferences = Arc::new(InMemoryPreferencesRepository::new());
        seed(&profiles, "viewer", 30, Gender::Male).await;
        seed(&profiles, "a", 28, Gender::Female).await;
        seed(&profiles, "b", 28, Gender::Female).await;

        let mut viewer_prefs = Preferences::new("viewer");
        viewer_prefs.update_filter_preferences(crate::models::FilterUpdate {
            show_only_verified_profiles: Some(true),
            ..Default::default()
        });
        preferences.create(&viewer_prefs).await.unwrap();

        let service = DiscoveryService::new(
            profiles,
            preferences,
            DiscoveryEngine::new(EligibilityPolicy::ViewerOnly),
        );

        let result = service.discover_for("viewer", &["b".to_string()]).await.unwrap();
        assert_eq!(result.total_candidates, 2);
        assert_eq!(result.profiles.len(), 1);
        assert_eq!(result.profiles[0].user_id(), "b");
    }
}
