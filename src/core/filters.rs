use crate::core::age::BirthDateBounds;
use crate::models::{Preferences, Profile, SearchCriteria};

/// Check a profile against search criteria
///
/// Visibility and self-exclusion always apply. Age is checked through
/// pre-computed birth-date bounds so the in-memory and SQL paths agree.
#[inline]
pub fn matches_search_criteria(
    profile: &Profile,
    criteria: &SearchCriteria,
    bounds: &BirthDateBounds,
) -> bool {
    if !is_discoverable(profile, criteria.exclude_user_id.as_deref()) {
        return false;
    }

    if criteria.has_age_bounds() {
        match profile.date_of_birth() {
            Some(dob) if bounds.contains(dob) => {}
            _ => return false,
        }
    }

    if let Some(location) = criteria.location.as_deref() {
        if !matches_location(profile, location) {
            return false;
        }
    }

    if let Some(interests) = criteria.interests.as_ref() {
        if !interests.is_empty() && !shares_interest(profile, interests) {
            return false;
        }
    }

    if let Some(gender) = criteria.gender {
        if profile.gender() != Some(gender) {
            return false;
        }
    }

    true
}

/// Visible and not the excluded user
#[inline]
pub fn is_discoverable(profile: &Profile, exclude_user_id: Option<&str>) -> bool {
    profile.is_visible() && exclude_user_id.map_or(true, |id| profile.user_id() != id)
}

/// Case-insensitive substring match on the free-text location
pub fn matches_location(profile: &Profile, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    profile
        .location()
        .is_some_and(|location| location.to_lowercase().contains(&needle))
}

pub fn shares_interest<I>(profile: &Profile, interests: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    interests
        .into_iter()
        .any(|tag| profile.interests().contains(tag.as_ref()))
}

/// Check whether `preferences` would accept `candidate` in discovery
///
/// Age must be known and in range, gender preferred (an unset gender only
/// passes an unrestricted set), interests overlap, no deal-breaker present,
/// and the photo/verification gates hold.
#[inline]
pub fn satisfies_preferences(
    candidate: &Profile,
    candidate_verified: bool,
    preferences: &Preferences,
    age: Option<u32>,
) -> bool {
    match age {
        Some(age) if preferences.is_age_in_range(age) => {}
        _ => return false,
    }

    let gender_ok = match candidate.gender() {
        Some(gender) => preferences.is_gender_preferred(gender),
        None => preferences.preferred_genders().is_empty(),
    };
    if !gender_ok {
        return false;
    }

    if !preferences.has_interest_match(candidate.interests()) {
        return false;
    }

    if preferences.has_deal_breaker(candidate.interests()) {
        return false;
    }

    if preferences.show_only_with_photos() && candidate.photos().is_empty() {
        return false;
    }

    if preferences.show_only_verified_profiles() && !candidate_verified {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::age::birth_date_bounds;
    use crate::models::{BasicInfoUpdate, Gender};
    use chrono::NaiveDate;

    fn create_test_profile(user_id: &str, gender: Gender, location: &str) -> Profile {
        let mut profile = Profile::new(user_id);
        profile.update_bio("hello");
        profile.update_basic_info(BasicInfoUpdate {
            date_of_birth: NaiveDate::from_ymd_opt(1996, 5, 1),
            gender: Some(gender),
            location: Some(location.to_string()),
            ..Default::default()
        });
        profile.add_photo("photo.jpg");
        profile.add_interest("tennis");
        profile.add_interest("swimming");
        profile
    }

    #[test]
    fn test_location_match_is_case_insensitive() {
        let profile = create_test_profile("u1", Gender::Female, "Paris, France");
        assert!(matches_location(&profile, "paris"));
        assert!(matches_location(&profile, "FRANCE"));
        assert!(!matches_location(&profile, "Lyon"));
    }

    #[test]
    fn test_search_excludes_hidden_and_self() {
        let mut profile = create_test_profile("u1", Gender::Female, "Paris");
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bounds = birth_date_bounds(None, None, today);

        assert!(matches_search_criteria(&profile, &SearchCriteria::default(), &bounds));
        assert!(!matches_search_criteria(&profile, &SearchCriteria::excluding("u1"), &bounds));

        profile.set_visibility(false);
        assert!(!matches_search_criteria(&profile, &SearchCriteria::default(), &bounds));
    }

    #[test]
    fn test_search_age_requires_birth_date() {
        let profile = Profile::new("u2");
        let criteria = SearchCriteria {
            min_age: Some(18),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bounds = birth_date_bounds(criteria.min_age, criteria.max_age, today);

        assert!(!matches_search_criteria(&profile, &criteria, &bounds));
    }

    #[test]
    fn test_empty_interest_criterion_is_no_constraint() {
        let profile = create_test_profile("u1", Gender::Male, "Rome");
        let criteria = SearchCriteria {
            interests: Some(Default::default()),
            ..Default::default()
        };
        let bounds = birth_date_bounds(None, None, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert!(matches_search_criteria(&profile, &criteria, &bounds));
    }

    #[test]
    fn test_preferences_reject_deal_breaker() {
        let profile = create_test_profile("u1", Gender::Female, "Paris");
        let mut prefs = Preferences::new("viewer");
        assert!(satisfies_preferences(&profile, false, &prefs, Some(27)));

        prefs.add_deal_breaker("swimming");
        assert!(!satisfies_preferences(&profile, false, &prefs, Some(27)));
    }

    #[test]
    fn test_preferences_gates() {
        let mut profile = create_test_profile("u1", Gender::Female, "Paris");
        let mut prefs = Preferences::new("viewer");

        // Unknown age never passes
        assert!(!satisfies_preferences(&profile, true, &prefs, None));

        prefs.update_filter_preferences(crate::models::FilterUpdate {
            show_only_verified_profiles: Some(true),
            show_only_with_photos: None,
        });
        assert!(!satisfies_preferences(&profile, false, &prefs, Some(27)));
        assert!(satisfies_preferences(&profile, true, &prefs, Some(27)));

        profile.remove_photo("photo.jpg");
        assert!(!satisfies_preferences(&profile, true, &prefs, Some(27)));
    }
}
