use crate::models::{
    DistanceUnit, FilterUpdate, Gender, MessagingUpdate, NotificationType, NotificationUpdate, Preferences,
    PrivacyUpdate, UpdatePreferencesRequest,
};
use crate::services::error::ServiceError;
use crate::services::repository::PreferencesRepository;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const ENTITY: &str = "Preferences";

/// Application service for preferences
#[derive(Clone)]
pub struct PreferencesService {
    repository: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    pub fn new(repository: Arc<dyn PreferencesRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_preferences(&self, user_id: &str) -> Result<Preferences, ServiceError> {
        if self.repository.find_by_user_id(user_id).await?.is_some() {
            return Err(ServiceError::EntityAlreadyExists {
                entity: ENTITY,
                field: "user",
            });
        }

        let preferences = self
            .repository
            .create(&Preferences::new(user_id))
            .await
            .map_err(|e| ServiceError::from_create(ENTITY, e))?;

        info!("Created preferences {} for user {}", preferences.id(), user_id);
        Ok(preferences)
    }

    pub async fn get_preferences_by_id(&self, id: Uuid) -> Result<Preferences, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found_id(ENTITY, id))
    }

    pub async fn get_preferences_by_user_id(&self, user_id: &str) -> Result<Preferences, ServiceError> {
        self.repository
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY))
    }

    pub async fn update_gender_preferences(
        &self,
        user_id: &str,
        genders: Vec<Gender>,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_gender_preferences(genders);
            Ok(())
        })
        .await
    }

    pub async fn update_age_range(&self, user_id: &str, min_age: u32, max_age: u32) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| Ok(p.update_age_range(min_age, max_age)?))
            .await
    }

    pub async fn update_distance_preference(
        &self,
        user_id: &str,
        max_distance: u32,
        unit: DistanceUnit,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| Ok(p.update_distance_preference(max_distance, unit)?))
            .await
    }

    pub async fn update_interest_preferences(
        &self,
        user_id: &str,
        interests: Vec<String>,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_interest_preferences(interests);
            Ok(())
        })
        .await
    }

    pub async fn add_preferred_interest(&self, user_id: &str, interest: String) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.add_preferred_interest(interest);
            Ok(())
        })
        .await
    }

    pub async fn remove_preferred_interest(&self, user_id: &str, interest: &str) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.remove_preferred_interest(interest);
            Ok(())
        })
        .await
    }

    pub async fn update_deal_breakers(
        &self,
        user_id: &str,
        deal_breakers: Vec<String>,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_deal_breakers(deal_breakers);
            Ok(())
        })
        .await
    }

    pub async fn add_deal_breaker(&self, user_id: &str, deal_breaker: String) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.add_deal_breaker(deal_breaker);
            Ok(())
        })
        .await
    }

    pub async fn remove_deal_breaker(&self, user_id: &str, deal_breaker: &str) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.remove_deal_breaker(deal_breaker);
            Ok(())
        })
        .await
    }

    pub async fn update_filter_preferences(
        &self,
        user_id: &str,
        update: FilterUpdate,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_filter_preferences(update);
            Ok(())
        })
        .await
    }

    pub async fn update_messaging_preferences(
        &self,
        user_id: &str,
        update: MessagingUpdate,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_messaging_preferences(update);
            Ok(())
        })
        .await
    }

    pub async fn update_privacy_preferences(
        &self,
        user_id: &str,
        update: PrivacyUpdate,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_privacy_preferences(update);
            Ok(())
        })
        .await
    }

    pub async fn update_notification_preferences(
        &self,
        user_id: &str,
        update: NotificationUpdate,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, |p| {
            p.update_notification_preferences(update);
            Ok(())
        })
        .await
    }

    /// Apply every field present in `request` and save once
    ///
    /// A lone age bound or distance is paired with the stored counterpart.
    /// Any invariant violation aborts the whole request.
    pub async fn update_preferences(
        &self,
        user_id: &str,
        request: UpdatePreferencesRequest,
    ) -> Result<Preferences, ServiceError> {
        self.modify(user_id, move |p| {
            if let Some(genders) = request.preferred_genders {
                p.update_gender_preferences(genders);
            }
            if request.min_age.is_some() || request.max_age.is_some() {
                let (min_age, max_age) = p.age_range();
                p.update_age_range(request.min_age.unwrap_or(min_age), request.max_age.unwrap_or(max_age))?;
            }
            if request.max_distance.is_some() || request.distance_unit.is_some() {
                p.update_distance_preference(
                    request.max_distance.unwrap_or(p.max_distance()),
                    request.distance_unit.unwrap_or(p.distance_unit()),
                )?;
            }
            if let Some(interests) = request.preferred_interests {
                p.update_interest_preferences(interests);
            }
            if let Some(deal_breakers) = request.deal_breakers {
                p.update_deal_breakers(deal_breakers);
            }
            p.update_filter_preferences(FilterUpdate {
                show_only_verified_profiles: request.show_only_verified_profiles,
                show_only_with_photos: request.show_only_with_photos,
            });
            p.update_messaging_preferences(MessagingUpdate {
                allow_messages_from_matches: request.allow_messages_from_matches,
                allow_messages_from_everyone: request.allow_messages_from_everyone,
            });
            p.update_privacy_preferences(PrivacyUpdate {
                show_online_status: request.show_online_status,
                show_last_seen: request.show_last_seen,
            });
            p.update_notification_preferences(NotificationUpdate {
                push_notifications: request.push_notifications,
                email_notifications: request.email_notifications,
                match_notifications: request.match_notifications,
                message_notifications: request.message_notifications,
                like_notifications: request.like_notifications,
            });
            Ok(())
        })
        .await
    }

    pub async fn delete_preferences(&self, user_id: &str) -> Result<(), ServiceError> {
        let preferences = self.get_preferences_by_user_id(user_id).await?;
        self.repository.delete(preferences.id()).await?;

        info!("Deleted preferences {} for user {}", preferences.id(), user_id);
        Ok(())
    }

    pub async fn users_with_notifications_enabled(&self, kind: NotificationType) -> Result<Vec<String>, ServiceError> {
        Ok(self.repository.find_users_with_notifications_enabled(kind).await?)
    }

    async fn modify<F>(&self, user_id: &str, change: F) -> Result<Preferences, ServiceError>
    where
        F: FnOnce(&mut Preferences) -> Result<(), ServiceError> + Send,
    {
        let mut preferences = self.get_preferences_by_user_id(user_id).await?;
        change(&mut preferences)?;

        let saved = self.repository.update(&preferences).await?;
        debug!("Updated preferences {} for user {}", saved.id(), user_id);
        Ok(saved)
    }
}
