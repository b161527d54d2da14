use crate::core::age::{age_on, today};
use crate::models::{
    BasicInfoUpdate, Profile, RelationshipStatus, SearchCriteria, UpdateProfileRequest,
};
use crate::services::error::ServiceError;
use crate::services::repository::ProfileRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const ENTITY: &str = "Profile";

/// Cross-entity rules enforced around the profile aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePolicy {
    pub min_user_age: u32,
    pub max_photos: usize,
}

impl Default for ProfilePolicy {
    fn default() -> Self {
        Self {
            min_user_age: 18,
            max_photos: 6,
        }
    }
}

impl ProfilePolicy {
    /// Reject a date of birth that makes the user younger than the minimum age
    pub fn check_date_of_birth(&self, date_of_birth: NaiveDate, on: NaiveDate) -> Result<(), ServiceError> {
        match age_on(date_of_birth, on) {
            Some(age) if age >= self.min_user_age => Ok(()),
            _ => Err(ServiceError::InvalidInput(format!(
                "User must be at least {} years old",
                self.min_user_age
            ))),
        }
    }

    pub fn check_photo_capacity(&self, profile: &Profile) -> Result<(), ServiceError> {
        if profile.photos().len() >= self.max_photos {
            return Err(ServiceError::InvalidInput(format!(
                "Maximum of {} photos allowed",
                self.max_photos
            )));
        }
        Ok(())
    }
}

/// Application service for profiles
///
/// Every mutation is a load, one aggregate call and a save. The repository is
/// the only serialization point; concurrent writers are last-write-wins.
#[derive(Clone)]
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
    policy: ProfilePolicy,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepository>, policy: ProfilePolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &ProfilePolicy {
        &self.policy
    }

    pub async fn create_profile(&self, user_id: &str) -> Result<Profile, ServiceError> {
        if self.repository.find_by_user_id(user_id).await?.is_some() {
            return Err(ServiceError::EntityAlreadyExists {
                entity: ENTITY,
                field: "user",
            });
        }

        let profile = self
            .repository
            .create(&Profile::new(user_id))
            .await
            .map_err(|e| ServiceError::from_create(ENTITY, e))?;

        info!("Created profile {} for user {}", profile.id(), user_id);
        Ok(profile)
    }

    pub async fn get_profile_by_id(&self, id: Uuid) -> Result<Profile, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found_id(ENTITY, id))
    }

    pub async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Profile, ServiceError> {
        self.repository
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY))
    }

    pub async fn update_bio(&self, user_id: &str, bio: String) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.update_bio(bio);
            Ok(())
        })
        .await
    }

    pub async fn update_basic_info(&self, user_id: &str, update: BasicInfoUpdate) -> Result<Profile, ServiceError> {
        let policy = self.policy;
        self.modify(user_id, move |p| {
            if let Some(dob) = update.date_of_birth {
                policy.check_date_of_birth(dob, today())?;
            }
            p.update_basic_info(update);
            Ok(())
        })
        .await
    }

    pub async fn update_professional_info(
        &self,
        user_id: &str,
        occupation: Option<String>,
        education: Option<String>,
    ) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.update_professional_info(occupation, education);
            Ok(())
        })
        .await
    }

    pub async fn update_relationship_status(
        &self,
        user_id: &str,
        status: RelationshipStatus,
    ) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.update_relationship_status(status);
            Ok(())
        })
        .await
    }

    pub async fn add_interest(&self, user_id: &str, interest: String) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.add_interest(interest);
            Ok(())
        })
        .await
    }

    pub async fn remove_interest(&self, user_id: &str, interest: &str) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.remove_interest(interest);
            Ok(())
        })
        .await
    }

    pub async fn update_interests(&self, user_id: &str, interests: Vec<String>) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.replace_interests(interests);
            Ok(())
        })
        .await
    }

    pub async fn add_photo(&self, user_id: &str, photo: String) -> Result<Profile, ServiceError> {
        let policy = self.policy;
        self.modify(user_id, move |p| {
            policy.check_photo_capacity(p)?;
            p.add_photo(photo);
            Ok(())
        })
        .await
    }

    pub async fn remove_photo(&self, user_id: &str, photo: &str) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.remove_photo(photo);
            Ok(())
        })
        .await
    }

    pub async fn reorder_photos(&self, user_id: &str, order: &[String]) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.reorder_photos(order);
            Ok(())
        })
        .await
    }

    pub async fn set_visibility(&self, user_id: &str, is_visible: bool) -> Result<Profile, ServiceError> {
        self.modify(user_id, |p| {
            p.set_visibility(is_visible);
            Ok(())
        })
        .await
    }

    /// Apply every field present in `request` and save once
    ///
    /// Policy checks run before anything is written, so a rejected request
    /// leaves the stored profile untouched.
    pub async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> Result<Profile, ServiceError> {
        let policy = self.policy;
        let has_basic_info = request.has_basic_info();
        let has_professional_info = request.has_professional_info();
        self.modify(user_id, move |p| {
            if let Some(dob) = request.date_of_birth {
                policy.check_date_of_birth(dob, today())?;
            }

            if let Some(bio) = request.bio {
                p.update_bio(bio);
            }
            if has_basic_info {
                p.update_basic_info(BasicInfoUpdate {
                    date_of_birth: request.date_of_birth,
                    gender: request.gender,
                    height_cm: request.height,
                    weight_kg: request.weight,
                    location: request.location,
                });
            }
            if has_professional_info {
                p.update_professional_info(request.occupation, request.education);
            }
            if let Some(status) = request.relationship_status {
                p.update_relationship_status(status);
            }
            if let Some(interests) = request.interests {
                p.replace_interests(interests);
            }
            if let Some(is_visible) = request.is_visible {
                p.set_visibility(is_visible);
            }
            Ok(())
        })
        .await
    }

    pub async fn delete_profile(&self, user_id: &str) -> Result<(), ServiceError> {
        let profile = self.get_profile_by_user_id(user_id).await?;
        self.repository.delete(profile.id()).await?;

        info!("Deleted profile {} for user {}", profile.id(), user_id);
        Ok(())
    }

    pub async fn get_visible_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.repository.find_visible_profiles(exclude_user_id).await?)
    }

    pub async fn get_profiles_by_location(
        &self,
        location: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, ServiceError> {
        Ok(self
            .repository
            .find_profiles_by_location(location, exclude_user_id)
            .await?)
    }

    pub async fn get_profiles_by_interests(
        &self,
        interests: &[String],
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, ServiceError> {
        Ok(self
            .repository
            .find_profiles_by_interests(interests, exclude_user_id)
            .await?)
    }

    pub async fn get_complete_profiles(&self, exclude_user_id: Option<&str>) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.repository.find_complete_profiles(exclude_user_id).await?)
    }

    pub async fn search_profiles(&self, criteria: &SearchCriteria) -> Result<Vec<Profile>, ServiceError> {
        let profiles = self.repository.search_profiles(criteria).await?;
        debug!("Search matched {} profiles", profiles.len());
        Ok(profiles)
    }

    async fn modify<F>(&self, user_id: &str, change: F) -> Result<Profile, ServiceError>
    where
        F: FnOnce(&mut Profile) -> Result<(), ServiceError> + Send,
    {
        let mut profile = self.get_profile_by_user_id(user_id).await?;
        change(&mut profile)?;

        let saved = self.repository.update(&profile).await?;
        debug!("Updated profile {} for user {}", saved.id(), user_id);
        Ok(saved)
    }
}
