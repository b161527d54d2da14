use crate::core::age::{age_on, today};
use crate::models::domain::{Gender, RelationshipStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Partial update of the basic profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfoUpdate {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<u16>,
    pub weight_kg: Option<u16>,
    pub location: Option<String>,
}

impl BasicInfoUpdate {
    pub fn is_empty(&self) -> bool {
        self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.height_cm.is_none()
            && self.weight_kg.is_none()
            && self.location.is_none()
    }
}

/// Stored shape of a profile, used to rehydrate the aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: Uuid,
    pub user_id: String,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<u16>,
    pub weight_kg: Option<u16>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub relationship_status: Option<RelationshipStatus>,
    pub interests: Vec<String>,
    pub photos: Vec<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's presentable profile
///
/// Every mutation goes through a method on this type. `is_complete` is derived
/// from the other fields and is never written directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    id: Uuid,
    user_id: String,
    bio: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<Gender>,
    height_cm: Option<u16>,
    weight_kg: Option<u16>,
    location: Option<String>,
    occupation: Option<String>,
    education: Option<String>,
    relationship_status: Option<RelationshipStatus>,
    interests: BTreeSet<String>,
    photos: Vec<String>,
    is_visible: bool,
    is_complete: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create an empty, visible, incomplete profile for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            bio: None,
            date_of_birth: None,
            gender: None,
            height_cm: None,
            weight_kg: None,
            location: None,
            occupation: None,
            education: None,
            relationship_status: None,
            interests: BTreeSet::new(),
            photos: Vec::new(),
            is_visible: true,
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a profile from storage. Completeness is recomputed, not read.
    pub fn restore(record: ProfileRecord) -> Self {
        let mut photos: Vec<String> = Vec::with_capacity(record.photos.len());
        for photo in record.photos {
            if !photos.contains(&photo) {
                photos.push(photo);
            }
        }

        let mut profile = Self {
            id: record.id,
            user_id: record.user_id,
            bio: record.bio,
            date_of_birth: record.date_of_birth,
            gender: record.gender,
            height_cm: record.height_cm,
            weight_kg: record.weight_kg,
            location: record.location,
            occupation: record.occupation,
            education: record.education,
            relationship_status: record.relationship_status,
            interests: record.interests.into_iter().collect(),
            photos,
            is_visible: record.is_visible,
            is_complete: false,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        profile.recompute_completeness();
        profile
    }

    /// Snapshot for storage; sets become ordered sequences
    pub fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            id: self.id,
            user_id: self.user_id.clone(),
            bio: self.bio.clone(),
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            location: self.location.clone(),
            occupation: self.occupation.clone(),
            education: self.education.clone(),
            relationship_status: self.relationship_status,
            interests: self.interests.iter().cloned().collect(),
            photos: self.photos.clone(),
            is_visible: self.is_visible,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn height_cm(&self) -> Option<u16> {
        self.height_cm
    }

    pub fn weight_kg(&self) -> Option<u16> {
        self.weight_kg
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn occupation(&self) -> Option<&str> {
        self.occupation.as_deref()
    }

    pub fn education(&self) -> Option<&str> {
        self.education.as_deref()
    }

    pub fn relationship_status(&self) -> Option<RelationshipStatus> {
        self.relationship_status
    }

    pub fn interests(&self) -> &BTreeSet<String> {
        &self.interests
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update_bio(&mut self, bio: impl Into<String>) {
        self.bio = Some(bio.into());
        self.touch();
    }

    pub fn update_basic_info(&mut self, update: BasicInfoUpdate) {
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        if let Some(height_cm) = update.height_cm {
            self.height_cm = Some(height_cm);
        }
        if let Some(weight_kg) = update.weight_kg {
            self.weight_kg = Some(weight_kg);
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        self.touch();
    }

    pub fn update_professional_info(&mut self, occupation: Option<String>, education: Option<String>) {
        if let Some(occupation) = occupation {
            self.occupation = Some(occupation);
        }
        if let Some(education) = education {
            self.education = Some(education);
        }
        self.touch();
    }

    pub fn update_relationship_status(&mut self, status: RelationshipStatus) {
        self.relationship_status = Some(status);
        self.touch();
    }

    /// Adding a tag that is already present changes nothing
    pub fn add_interest(&mut self, interest: impl Into<String>) {
        if self.interests.insert(interest.into()) {
            self.touch();
        }
    }

    pub fn remove_interest(&mut self, interest: &str) {
        self.interests.remove(interest);
        self.touch();
    }

    pub fn replace_interests<I, S>(&mut self, interests: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self.touch();
    }

    /// Append a photo reference; duplicates are ignored
    pub fn add_photo(&mut self, photo: impl Into<String>) {
        let photo = photo.into();
        if !self.photos.contains(&photo) {
            self.photos.push(photo);
            self.touch();
        }
    }

    pub fn remove_photo(&mut self, photo: &str) {
        self.photos.retain(|p| p != photo);
        self.touch();
    }

    /// Replace the photo order with the requested one
    ///
    /// Only references already on the profile survive; unknown ones are
    /// dropped and repeats collapse to their first position.
    pub fn reorder_photos<S: AsRef<str>>(&mut self, order: &[S]) {
        let mut reordered: Vec<String> = Vec::with_capacity(self.photos.len());
        for photo in order {
            let photo = photo.as_ref();
            if self.photos.iter().any(|p| p == photo) && !reordered.iter().any(|p| p == photo) {
                reordered.push(photo.to_string());
            }
        }
        self.photos = reordered;
        self.updated_at = Utc::now();
    }

    pub fn set_visibility(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
        self.updated_at = Utc::now();
    }

    /// Age today, or `None` without a date of birth
    pub fn age(&self) -> Option<u32> {
        self.age_on(today())
    }

    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| age_on(dob, on))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.recompute_completeness();
    }

    fn recompute_completeness(&mut self) {
        self.is_complete = completeness(
            self.bio.as_deref(),
            self.date_of_birth.is_some(),
            self.gender.is_some(),
            self.location.as_deref(),
            self.photos.len(),
            self.interests.len(),
        );
    }
}

/// Basic info present, at least one photo and at least one interest
#[inline]
fn completeness(
    bio: Option<&str>,
    has_date_of_birth: bool,
    has_gender: bool,
    location: Option<&str>,
    photo_count: usize,
    interest_count: usize,
) -> bool {
    let present = |s: Option<&str>| s.is_some_and(|s| !s.is_empty());
    let has_basic_info = present(bio) && has_date_of_birth && has_gender && present(location);

    has_basic_info && photo_count > 0 && interest_count > 0
}
