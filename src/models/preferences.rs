use crate::models::domain::{DistanceUnit, DomainError, Gender, NotificationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 99;
pub const DEFAULT_MAX_DISTANCE: u32 = 50;
pub const MAX_DISTANCE: u32 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    pub show_only_verified_profiles: Option<bool>,
    pub show_only_with_photos: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingUpdate {
    pub allow_messages_from_matches: Option<bool>,
    pub allow_messages_from_everyone: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyUpdate {
    pub show_online_status: Option<bool>,
    pub show_last_seen: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUpdate {
    pub push_notifications: Option<bool>,
    pub email_notifications: Option<bool>,
    pub match_notifications: Option<bool>,
    pub message_notifications: Option<bool>,
    pub like_notifications: Option<bool>,
}

/// Stored shape of a preferences record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRecord {
    pub id: Uuid,
    pub user_id: String,
    pub preferred_genders: Vec<Gender>,
    pub min_age: u32,
    pub max_age: u32,
    pub max_distance: u32,
    pub distance_unit: DistanceUnit,
    pub preferred_interests: Vec<String>,
    pub deal_breakers: Vec<String>,
    pub show_only_verified_profiles: bool,
    pub show_only_with_photos: bool,
    pub allow_messages_from_matches: bool,
    pub allow_messages_from_everyone: bool,
    pub show_online_status: bool,
    pub show_last_seen: bool,
    pub push_notifications: bool,
    pub email_notifications: bool,
    pub match_notifications: bool,
    pub message_notifications: bool,
    pub like_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's discovery filters and notification settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    id: Uuid,
    user_id: String,
    preferred_genders: BTreeSet<Gender>,
    min_age: u32,
    max_age: u32,
    max_distance: u32,
    distance_unit: DistanceUnit,
    preferred_interests: BTreeSet<String>,
    deal_breakers: BTreeSet<String>,
    show_only_verified_profiles: bool,
    show_only_with_photos: bool,
    allow_messages_from_matches: bool,
    allow_messages_from_everyone: bool,
    show_online_status: bool,
    show_last_seen: bool,
    push_notifications: bool,
    email_notifications: bool,
    match_notifications: bool,
    message_notifications: bool,
    like_notifications: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Preferences {
    /// Preferences with the documented defaults
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            preferred_genders: BTreeSet::new(),
            min_age: MIN_AGE,
            max_age: MAX_AGE,
            max_distance: DEFAULT_MAX_DISTANCE,
            distance_unit: DistanceUnit::Kilometers,
            preferred_interests: BTreeSet::new(),
            deal_breakers: BTreeSet::new(),
            show_only_verified_profiles: false,
            show_only_with_photos: true,
            allow_messages_from_matches: true,
            allow_messages_from_everyone: false,
            show_online_status: true,
            show_last_seen: true,
            push_notifications: true,
            email_notifications: true,
            match_notifications: true,
            message_notifications: true,
            like_notifications: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild from storage, rejecting records that break the range invariants
    pub fn restore(record: PreferencesRecord) -> Result<Self, DomainError> {
        validate_age_range(record.min_age, record.max_age)?;
        validate_distance(record.max_distance)?;

        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            preferred_genders: record.preferred_genders.into_iter().collect(),
            min_age: record.min_age,
            max_age: record.max_age,
            max_distance: record.max_distance,
            distance_unit: record.distance_unit,
            preferred_interests: record.preferred_interests.into_iter().collect(),
            deal_breakers: record.deal_breakers.into_iter().collect(),
            show_only_verified_profiles: record.show_only_verified_profiles,
            show_only_with_photos: record.show_only_with_photos,
            allow_messages_from_matches: record.allow_messages_from_matches,
            allow_messages_from_everyone: record.allow_messages_from_everyone,
            show_online_status: record.show_online_status,
            show_last_seen: record.show_last_seen,
            push_notifications: record.push_notifications,
            email_notifications: record.email_notifications,
            match_notifications: record.match_notifications,
            message_notifications: record.message_notifications,
            like_notifications: record.like_notifications,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn to_record(&self) -> PreferencesRecord {
        PreferencesRecord {
            id: self.id,
            user_id: self.user_id.clone(),
            preferred_genders: self.preferred_genders.iter().copied().collect(),
            min_age: self.min_age,
            max_age: self.max_age,
            max_distance: self.max_distance,
            distance_unit: self.distance_unit,
            preferred_interests: self.preferred_interests.iter().cloned().collect(),
            deal_breakers: self.deal_breakers.iter().cloned().collect(),
            show_only_verified_profiles: self.show_only_verified_profiles,
            show_only_with_photos: self.show_only_with_photos,
            allow_messages_from_matches: self.allow_messages_from_matches,
            allow_messages_from_everyone: self.allow_messages_from_everyone,
            show_online_status: self.show_online_status,
            show_last_seen: self.show_last_seen,
            push_notifications: self.push_notifications,
            email_notifications: self.email_notifications,
            match_notifications: self.match_notifications,
            message_notifications: self.message_notifications,
            like_notifications: self.like_notifications,
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

    pub fn preferred_genders(&self) -> &BTreeSet<Gender> {
        &self.preferred_genders
    }

    /// `(min_age, max_age)`, both inclusive
    pub fn age_range(&self) -> (u32, u32) {
        (self.min_age, self.max_age)
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    pub fn distance_unit(&self) -> DistanceUnit {
        self.distance_unit
    }

    /// Maximum distance normalized to kilometers
    pub fn max_distance_km(&self) -> f64 {
        self.distance_unit.to_kilometers(self.max_distance as f64)
    }

    pub fn preferred_interests(&self) -> &BTreeSet<String> {
        &self.preferred_interests
    }

    pub fn deal_breakers(&self) -> &BTreeSet<String> {
        &self.deal_breakers
    }

    pub fn show_only_verified_profiles(&self) -> bool {
        self.show_only_verified_profiles
    }

    pub fn show_only_with_photos(&self) -> bool {
        self.show_only_with_photos
    }

    pub fn allow_messages_from_matches(&self) -> bool {
        self.allow_messages_from_matches
    }

    pub fn allow_messages_from_everyone(&self) -> bool {
        self.allow_messages_from_everyone
    }

    pub fn show_online_status(&self) -> bool {
        self.show_online_status
    }

    pub fn show_last_seen(&self) -> bool {
        self.show_last_seen
    }

    pub fn notifications_enabled(&self, kind: NotificationType) -> bool {
        match kind {
            NotificationType::PushNotifications => self.push_notifications,
            NotificationType::EmailNotifications => self.email_notifications,
            NotificationType::MatchNotifications => self.match_notifications,
            NotificationType::MessageNotifications => self.message_notifications,
            NotificationType::LikeNotifications => self.like_notifications,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update_gender_preferences<I: IntoIterator<Item = Gender>>(&mut self, genders: I) {
        self.preferred_genders = genders.into_iter().collect();
        self.touch();
    }

    pub fn update_age_range(&mut self, min_age: u32, max_age: u32) -> Result<(), DomainError> {
        validate_age_range(min_age, max_age)?;

        self.min_age = min_age;
        self.max_age = max_age;
        self.touch();
        Ok(())
    }

    pub fn update_distance_preference(
        &mut self,
        max_distance: u32,
        unit: DistanceUnit,
    ) -> Result<(), DomainError> {
        validate_distance(max_distance)?;

        self.max_distance = max_distance;
        self.distance_unit = unit;
        self.touch();
        Ok(())
    }

    pub fn update_interest_preferences<I, S>(&mut self, interests: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_interests = interests.into_iter().map(Into::into).collect();
        self.touch();
    }

    pub fn add_preferred_interest(&mut self, interest: impl Into<String>) {
        if self.preferred_interests.insert(interest.into()) {
            self.touch();
        }
    }

    pub fn remove_preferred_interest(&mut self, interest: &str) {
        self.preferred_interests.remove(interest);
        self.touch();
    }

    pub fn update_deal_breakers<I, S>(&mut self, deal_breakers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deal_breakers = deal_breakers.into_iter().map(Into::into).collect();
        self.touch();
    }

    pub fn add_deal_breaker(&mut self, deal_breaker: impl Into<String>) {
        if self.deal_breakers.insert(deal_breaker.into()) {
            self.touch();
        }
    }

    pub fn remove_deal_breaker(&mut self, deal_breaker: &str) {
        self.deal_breakers.remove(deal_breaker);
        self.touch();
    }

    pub fn update_filter_preferences(&mut self, update: FilterUpdate) {
        apply(&mut self.show_only_verified_profiles, update.show_only_verified_profiles);
        apply(&mut self.show_only_with_photos, update.show_only_with_photos);
        self.touch();
    }

    pub fn update_messaging_preferences(&mut self, update: MessagingUpdate) {
        apply(&mut self.allow_messages_from_matches, update.allow_messages_from_matches);
        apply(&mut self.allow_messages_from_everyone, update.allow_messages_from_everyone);
        self.touch();
    }

    pub fn update_privacy_preferences(&mut self, update: PrivacyUpdate) {
        apply(&mut self.show_online_status, update.show_online_status);
        apply(&mut self.show_last_seen, update.show_last_seen);
        self.touch();
    }

    pub fn update_notification_preferences(&mut self, update: NotificationUpdate) {
        apply(&mut self.push_notifications, update.push_notifications);
        apply(&mut self.email_notifications, update.email_notifications);
        apply(&mut self.match_notifications, update.match_notifications);
        apply(&mut self.message_notifications, update.message_notifications);
        apply(&mut self.like_notifications, update.like_notifications);
        self.touch();
    }

    #[inline]
    pub fn is_age_in_range(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }

    /// An empty preferred set means no restriction
    #[inline]
    pub fn is_gender_preferred(&self, gender: Gender) -> bool {
        self.preferred_genders.is_empty() || self.preferred_genders.contains(&gender)
    }

    /// True without preferred interests, otherwise on any shared tag
    pub fn has_interest_match<I>(&self, interests: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.preferred_interests.is_empty()
            || interests
                .into_iter()
                .any(|i| self.preferred_interests.contains(i.as_ref()))
    }

    pub fn has_deal_breaker<I>(&self, interests: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        interests
            .into_iter()
            .any(|i| self.deal_breakers.contains(i.as_ref()))
    }

    /// Whether a message from another user gets through
    pub fn accepts_messages_from(&self, is_match: bool) -> bool {
        self.allow_messages_from_everyone || (is_match && self.allow_messages_from_matches)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[inline]
fn apply(field: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn validate_age_range(min_age: u32, max_age: u32) -> Result<(), DomainError> {
    if min_age < MIN_AGE {
        return Err(DomainError::InvalidRange(format!(
            "Minimum age cannot be less than {}",
            MIN_AGE
        )));
    }
    if max_age > MAX_AGE {
        return Err(DomainError::InvalidRange(format!(
            "Maximum age cannot be greater than {}",
            MAX_AGE
        )));
    }
    if min_age > max_age {
        return Err(DomainError::InvalidRange(
            "Minimum age cannot be greater than maximum age".to_string(),
        ));
    }
    Ok(())
}

fn validate_distance(max_distance: u32) -> Result<(), DomainError> {
    if max_distance == 0 {
        return Err(DomainError::InvalidRange(
            "Distance must be greater than 0".to_string(),
        ));
    }
    if max_distance > MAX_DISTANCE {
        return Err(DomainError::InvalidRange(format!(
            "Distance cannot be greater than {}",
            MAX_DISTANCE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::new("user_1");
        assert_eq!(prefs.age_range(), (18, 99));
        assert_eq!(prefs.max_distance(), 50);
        assert_eq!(prefs.distance_unit(), DistanceUnit::Kilometers);
        assert!(!prefs.show_only_verified_profiles());
        assert!(prefs.show_only_with_photos());
        assert!(prefs.allow_messages_from_matches());
        assert!(!prefs.allow_messages_from_everyone());
        assert!(prefs.show_online_status());
        assert!(prefs.show_last_seen());
        for kind in NotificationType::ALL {
            assert!(prefs.notifications_enabled(kind));
        }
    }

    #[test]
    fn test_age_range_validation_leaves_state_unchanged() {
        let mut prefs = Preferences::new("user_1");
        prefs.update_age_range(25, 35).unwrap();

        assert!(prefs.update_age_range(10, 50).is_err());
        assert!(prefs.update_age_range(20, 100).is_err());
        assert!(prefs.update_age_range(40, 30).is_err());
        assert_eq!(prefs.age_range(), (25, 35));
    }

    #[test]
    fn test_distance_validation() {
        let mut prefs = Preferences::new("user_1");
        assert!(prefs.update_distance_preference(0, DistanceUnit::Miles).is_err());
        assert!(prefs.update_distance_preference(1001, DistanceUnit::Miles).is_err());
        assert_eq!(prefs.distance_unit(), DistanceUnit::Kilometers);

        prefs.update_distance_preference(1000, DistanceUnit::Miles).unwrap();
        assert_eq!(prefs.max_distance(), 1000);
        assert!((prefs.max_distance_km() - 1609.344).abs() < 1e-6);
    }

    #[test]
    fn test_partial_flag_update_distinguishes_none_from_false() {
        let mut prefs = Preferences::new("user_1");
        prefs.update_notification_preferences(NotificationUpdate {
            email_notifications: Some(false),
            ..Default::default()
        });

        assert!(!prefs.notifications_enabled(NotificationType::EmailNotifications));
        assert!(prefs.notifications_enabled(NotificationType::PushNotifications));
        assert!(prefs.notifications_enabled(NotificationType::LikeNotifications));
    }

    #[test]
    fn test_gender_preferences_deduplicate() {
        let mut prefs = Preferences::new("user_1");
        prefs.update_gender_preferences([Gender::Female, Gender::Female, Gender::NonBinary]);
        assert_eq!(prefs.preferred_genders().len(), 2);
        assert!(prefs.is_gender_preferred(Gender::NonBinary));
        assert!(!prefs.is_gender_preferred(Gender::Male));
    }

    #[test]
    fn test_messaging_gate() {
        let mut prefs = Preferences::new("user_1");
        assert!(prefs.accepts_messages_from(true));
        assert!(!prefs.accepts_messages_from(false));

        prefs.update_messaging_preferences(MessagingUpdate {
            allow_messages_from_matches: Some(false),
            allow_messages_from_everyone: None,
        });
        assert!(!prefs.accepts_messages_from(true));
    }

    #[test]
    fn test_restore_rejects_broken_ranges() {
        let mut record = Preferences::new("user_1").to_record();
        record.min_age = 50;
        record.max_age = 30;
        assert!(Preferences::restore(record).is_err());
    }
}
