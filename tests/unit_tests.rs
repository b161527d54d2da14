// Unit tests for Lume Profiles

use chrono::NaiveDate;
use lume_profiles::core::{
    age::{age_on, birth_date_bounds},
    filters::satisfies_preferences,
};
use lume_profiles::models::{
    BasicInfoUpdate, DistanceUnit, DomainError, FilterUpdate, Gender, MessagingUpdate, NotificationType,
    NotificationUpdate, Preferences, Profile,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_complete_profile(user_id: &str) -> Profile {
    let mut profile = Profile::new(user_id);
    profile.update_bio("Climber and coffee snob");
    profile.update_basic_info(BasicInfoUpdate {
        date_of_birth: Some(date(1995, 3, 10)),
        gender: Some(Gender::Female),
        location: Some("Lisbon".to_string()),
        ..Default::default()
    });
    profile.add_photo("p1.jpg");
    profile.add_interest("climbing");
    profile
}

#[test]
fn test_age_around_birthday() {
    let dob = date(2000, 6, 15);
    assert_eq!(age_on(dob, date(2024, 6, 14)), Some(23));
    assert_eq!(age_on(dob, date(2024, 6, 15)), Some(24));
}

#[test]
fn test_profile_age_without_dob() {
    let profile = Profile::new("u1");
    assert_eq!(profile.age_on(date(2024, 1, 1)), None);
}

#[test]
fn test_completeness_requires_every_condition() {
    let profile = create_complete_profile("u1");
    assert!(profile.is_complete());

    let mut no_photo = profile.clone();
    no_photo.remove_photo("p1.jpg");
    assert!(!no_photo.is_complete());

    let mut no_interest = profile.clone();
    no_interest.remove_interest("climbing");
    assert!(!no_interest.is_complete());

    let mut empty_bio = profile.clone();
    empty_bio.update_bio("");
    assert!(!empty_bio.is_complete());

    let mut missing_location = Profile::new("u2");
    missing_location.update_bio("Hi");
    missing_location.update_basic_info(BasicInfoUpdate {
        date_of_birth: Some(date(1995, 3, 10)),
        gender: Some(Gender::Male),
        ..Default::default()
    });
    missing_location.add_photo("a.jpg");
    missing_location.add_interest("chess");
    assert!(!missing_location.is_complete());
}

#[test]
fn test_new_profile_defaults() {
    let profile = Profile::new("u1");
    assert!(profile.is_visible());
    assert!(!profile.is_complete());
    assert!(profile.photos().is_empty());
    assert!(profile.interests().is_empty());
}

#[test]
fn test_reorder_photos_keeps_known_refs() {
    let mut profile = Profile::new("u1");
    profile.add_photo("a");
    profile.add_photo("b");

    profile.reorder_photos(&["b", "x", "a"]);
    assert_eq!(profile.photos(), &["b".to_string(), "a".to_string()]);
}

#[test]
fn test_photo_set_semantics() {
    let mut profile = Profile::new("u1");
    profile.add_photo("a");
    profile.add_photo("a");
    assert_eq!(profile.photos().len(), 1);

    profile.remove_photo("missing");
    assert_eq!(profile.photos().len(), 1);
}

#[test]
fn test_age_range_validation() {
    let mut prefs = Preferences::new("u1");

    assert!(matches!(prefs.update_age_range(10, 50), Err(DomainError::InvalidRange(_))));
    assert!(matches!(prefs.update_age_range(40, 30), Err(DomainError::InvalidRange(_))));
    assert!(prefs.update_age_range(18, 100).is_err());
    assert_eq!(prefs.age_range(), (18, 99));

    prefs.update_age_range(20, 40).unwrap();
    assert_eq!(prefs.age_range(), (20, 40));
}

#[test]
fn test_distance_validation() {
    let mut prefs = Preferences::new("u1");

    assert!(prefs.update_distance_preference(0, DistanceUnit::Miles).is_err());
    assert!(prefs.update_distance_preference(1001, DistanceUnit::Kilometers).is_err());
    assert_eq!(prefs.max_distance(), 50);
    assert_eq!(prefs.distance_unit(), DistanceUnit::Kilometers);

    prefs.update_distance_preference(10, DistanceUnit::Miles).unwrap();
    assert!((prefs.max_distance_km() - 16.09344).abs() < 1e-9);
}

#[test]
fn test_deal_breaker_predicate() {
    let mut prefs = Preferences::new("u1");
    assert!(!prefs.has_deal_breaker(["smoking", "drinking"]));

    prefs.update_deal_breakers(["smoking", "drinking"]);

    assert!(prefs.has_deal_breaker(["smoking"]));
    assert!(!prefs.has_deal_breaker(Vec::<String>::new()));
}

#[test]
fn test_interest_match_predicate() {
    let mut prefs = Preferences::new("u1");
    assert!(prefs.has_interest_match(Vec::<String>::new()));

    prefs.update_interest_preferences(["hiking"]);
    assert!(!prefs.has_interest_match(["reading"]));
    assert!(prefs.has_interest_match(["reading", "hiking"]));
}

#[test]
fn test_gender_preferences_dedupe() {
    let mut prefs = Preferences::new("u1");
    prefs.update_gender_preferences([Gender::Female, Gender::Female, Gender::NonBinary]);

    assert_eq!(prefs.preferred_genders().len(), 2);
    assert!(prefs.is_gender_preferred(Gender::NonBinary));
    assert!(!prefs.is_gender_preferred(Gender::Male));
}

#[test]
fn test_partial_flag_updates() {
    let mut prefs = Preferences::new("u1");

    prefs.update_notification_preferences(NotificationUpdate {
        email_notifications: Some(false),
        ..Default::default()
    });
    prefs.update_messaging_preferences(MessagingUpdate {
        allow_messages_from_everyone: Some(true),
        allow_messages_from_matches: None,
    });

    assert!(!prefs.notifications_enabled(NotificationType::EmailNotifications));
    assert!(prefs.notifications_enabled(NotificationType::PushNotifications));
    assert!(prefs.allow_messages_from_everyone());
    assert!(prefs.allow_messages_from_matches());
    assert!(prefs.accepts_messages_from(false));
}

#[test]
fn test_birth_date_bounds_edges() {
    let today = date(2024, 6, 15);
    let bounds = birth_date_bounds(Some(25), Some(30), today);

    // Turns 25 today
    assert!(bounds.contains(date(1999, 6, 15)));
    // Turns 25 tomorrow
    assert!(!bounds.contains(date(1999, 6, 16)));
    // Turns 31 tomorrow, still 30 today
    assert!(bounds.contains(date(1993, 6, 16)));
    // Turned 31 today
    assert!(!bounds.contains(date(1993, 6, 15)));
}

#[test]
fn test_preference_gates() {
    let on = date(2024, 6, 15);
    let candidate = create_complete_profile("c1");
    let age = candidate.age_on(on);

    let mut prefs = Preferences::new("viewer");
    assert!(satisfies_preferences(&candidate, false, &prefs, age));

    prefs.update_filter_preferences(FilterUpdate {
        show_only_verified_profiles: Some(true),
        ..Default::default()
    });
    assert!(!satisfies_preferences(&candidate, false, &prefs, age));
    assert!(satisfies_preferences(&candidate, true, &prefs, age));

    // Unknown age never passes
    assert!(!satisfies_preferences(&Profile::new("c2"), true, &prefs, None));
}
