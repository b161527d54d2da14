use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Invariant violations raised by the aggregates themselves
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Unknown value for {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::NonBinary => "NON_BINARY",
            Gender::PreferNotToSay => "PREFER_NOT_TO_SAY",
        }
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "NON_BINARY" => Ok(Gender::NonBinary),
            "PREFER_NOT_TO_SAY" => Ok(Gender::PreferNotToSay),
            _ => Err(DomainError::UnknownValue {
                field: "gender",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipStatus {
    Single,
    InRelationship,
    Married,
    Divorced,
    Widowed,
    Complicated,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Single => "SINGLE",
            RelationshipStatus::InRelationship => "IN_RELATIONSHIP",
            RelationshipStatus::Married => "MARRIED",
            RelationshipStatus::Divorced => "DIVORCED",
            RelationshipStatus::Widowed => "WIDOWED",
            RelationshipStatus::Complicated => "COMPLICATED",
        }
    }
}

impl FromStr for RelationshipStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(RelationshipStatus::Single),
            "IN_RELATIONSHIP" => Ok(RelationshipStatus::InRelationship),
            "MARRIED" => Ok(RelationshipStatus::Married),
            "DIVORCED" => Ok(RelationshipStatus::Divorced),
            "WIDOWED" => Ok(RelationshipStatus::Widowed),
            "COMPLICATED" => Ok(RelationshipStatus::Complicated),
            _ => Err(DomainError::UnknownValue {
                field: "relationship_status",
                value: s.to_string(),
            }),
        }
    }
}

/// Unit the maximum distance preference is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

const KM_PER_MILE: f64 = 1.609_344;

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "KILOMETERS",
            DistanceUnit::Miles => "MILES",
        }
    }

    /// Convert a distance expressed in this unit to kilometers
    #[inline]
    pub fn to_kilometers(&self, distance: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => distance,
            DistanceUnit::Miles => distance * KM_PER_MILE,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KILOMETERS" => Ok(DistanceUnit::Kilometers),
            "MILES" => Ok(DistanceUnit::Miles),
            _ => Err(DomainError::UnknownValue {
                field: "distance_unit",
                value: s.to_string(),
            }),
        }
    }
}

/// The five independent notification toggles on a preferences record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    PushNotifications,
    EmailNotifications,
    MatchNotifications,
    MessageNotifications,
    LikeNotifications,
}

impl NotificationType {
    pub const ALL: [NotificationType; 5] = [
        NotificationType::PushNotifications,
        NotificationType::EmailNotifications,
        NotificationType::MatchNotifications,
        NotificationType::MessageNotifications,
        NotificationType::LikeNotifications,
    ];

    /// Storage column backing this toggle
    pub fn column(&self) -> &'static str {
        match self {
            NotificationType::PushNotifications => "push_notifications",
            NotificationType::EmailNotifications => "email_notifications",
            NotificationType::MatchNotifications => "match_notifications",
            NotificationType::MessageNotifications => "message_notifications",
            NotificationType::LikeNotifications => "like_notifications",
        }
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    // Accepts both the wire names (`pushNotifications`) and the short form (`push`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pushNotifications" | "push" => Ok(NotificationType::PushNotifications),
            "emailNotifications" | "email" => Ok(NotificationType::EmailNotifications),
            "matchNotifications" | "match" => Ok(NotificationType::MatchNotifications),
            "messageNotifications" | "message" => Ok(NotificationType::MessageNotifications),
            "likeNotifications" | "like" => Ok(NotificationType::LikeNotifications),
            _ => Err(DomainError::UnknownValue {
                field: "notification_type",
                value: s.to_string(),
            }),
        }
    }
}

/// Optional criteria for profile search. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub interests: Option<BTreeSet<String>>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub exclude_user_id: Option<String>,
}

impl SearchCriteria {
    pub fn excluding(user_id: impl Into<String>) -> Self {
        Self {
            exclude_user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn has_age_bounds(&self) -> bool {
        self.min_age.is_some() || self.max_age.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_wire_names() {
        assert_eq!(serde_json::to_string(&Gender::NonBinary).unwrap(), "\"NON_BINARY\"");
        assert_eq!("prefer_not_to_say".parse::<Gender>().unwrap(), Gender::PreferNotToSay);
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn test_miles_to_kilometers() {
        let km = DistanceUnit::Miles.to_kilometers(10.0);
        assert!((km - 16.09344).abs() < 1e-9);
        assert_eq!(DistanceUnit::Kilometers.to_kilometers(42.0), 42.0);
    }

    #[test]
    fn test_notification_type_parsing() {
        assert_eq!(
            "likeNotifications".parse::<NotificationType>().unwrap(),
            NotificationType::LikeNotifications
        );
        assert_eq!("push".parse::<NotificationType>().unwrap(), NotificationType::PushNotifications);
        assert!("smsNotifications".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_relationship_status_round_trip_through_str() {
        let status: RelationshipStatus = "IN_RELATIONSHIP".parse().unwrap();
        assert_eq!(status.as_str(), "IN_RELATIONSHIP");
    }
}
