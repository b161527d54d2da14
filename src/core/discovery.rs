use crate::core::{
    age::{birth_date_bounds, today},
    filters::{is_discoverable, matches_location, matches_search_criteria, satisfies_preferences, shares_interest},
};
use crate::models::{Preferences, Profile, SearchCriteria};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Whose preferences decide if a candidate is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// Only the viewer's preferences are checked
    ViewerOnly,
    /// The candidate's preferences must also accept the viewer
    #[default]
    Mutual,
}

/// The user doing the browsing
#[derive(Debug, Clone)]
pub struct Viewer<'a> {
    pub profile: &'a Profile,
    pub preferences: &'a Preferences,
    pub verified: bool,
}

/// A profile in the discovery pool with its owner's preferences, if any
#[derive(Debug, Clone)]
pub struct Candidate {
    pub profile: Profile,
    pub preferences: Option<Preferences>,
    pub verified: bool,
}

impl Candidate {
    pub fn new(profile: Profile, preferences: Option<Preferences>) -> Self {
        Self {
            profile,
            preferences,
            verified: false,
        }
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }
}

/// Result of a discovery pass
#[derive(Debug)]
pub struct DiscoveryResult {
    pub profiles: Vec<Profile>,
    pub total_candidates: usize,
}

/// Filters a candidate pool down to what a viewer may see
///
/// Produces yes/no eligibility only: no scoring, ranking or paging. Every
/// result list is ordered most-recently-updated first; ties keep pool order.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryEngine {
    policy: EligibilityPolicy,
}

impl DiscoveryEngine {
    pub fn new(policy: EligibilityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EligibilityPolicy {
        self.policy
    }

    /// Candidates the viewer should see
    pub fn discover(&self, viewer: &Viewer<'_>, candidates: Vec<Candidate>) -> DiscoveryResult {
        self.discover_on(viewer, candidates, today())
    }

    pub fn discover_on(
        &self,
        viewer: &Viewer<'_>,
        candidates: Vec<Candidate>,
        on: NaiveDate,
    ) -> DiscoveryResult {
        let total_candidates = candidates.len();
        let viewer_age = viewer.profile.age_on(on);

        let profiles: Vec<Profile> = candidates
            .into_iter()
            .filter(|c| is_discoverable(&c.profile, Some(viewer.profile.user_id())))
            // Viewer side
            .filter(|c| {
                satisfies_preferences(&c.profile, c.verified, viewer.preferences, c.profile.age_on(on))
            })
            // Candidate side
            .filter(|c| match self.policy {
                EligibilityPolicy::ViewerOnly => true,
                EligibilityPolicy::Mutual => {
                    let prefs = c
                        .preferences
                        .as_ref()
                        .map(Cow::Borrowed)
                        .unwrap_or_else(|| Cow::Owned(Preferences::new(c.profile.user_id())));
                    satisfies_preferences(viewer.profile, viewer.verified, &prefs, viewer_age)
                }
            })
            .map(|c| c.profile)
            .collect();

        tracing::debug!(
            "Discovery for {} kept {} of {} candidates ({:?})",
            viewer.profile.user_id(),
            profiles.len(),
            total_candidates,
            self.policy
        );

        DiscoveryResult {
            profiles: newest_first(profiles),
            total_candidates,
        }
    }

    /// Apply search criteria to a pool of profiles
    pub fn search(&self, profiles: Vec<Profile>, criteria: &SearchCriteria) -> Vec<Profile> {
        self.search_on(profiles, criteria, today())
    }

    pub fn search_on(
        &self,
        profiles: Vec<Profile>,
        criteria: &SearchCriteria,
        on: NaiveDate,
    ) -> Vec<Profile> {
        let bounds = birth_date_bounds(criteria.min_age, criteria.max_age, on);

        newest_first(
            profiles
                .into_iter()
                .filter(|p| matches_search_criteria(p, criteria, &bounds))
                .collect(),
        )
    }

    pub fn visible(&self, profiles: Vec<Profile>, exclude_user_id: Option<&str>) -> Vec<Profile> {
        self.select(profiles, exclude_user_id, |_| true)
    }

    pub fn complete(&self, profiles: Vec<Profile>, exclude_user_id: Option<&str>) -> Vec<Profile> {
        self.select(profiles, exclude_user_id, Profile::is_complete)
    }

    pub fn by_location(
        &self,
        profiles: Vec<Profile>,
        location: &str,
        exclude_user_id: Option<&str>,
    ) -> Vec<Profile> {
        self.select(profiles, exclude_user_id, |p| matches_location(p, location))
    }

    pub fn by_interests<S: AsRef<str>>(
        &self,
        profiles: Vec<Profile>,
        interests: &[S],
        exclude_user_id: Option<&str>,
    ) -> Vec<Profile> {
        self.select(profiles, exclude_user_id, |p| shares_interest(p, interests))
    }

    fn select<F>(&self, profiles: Vec<Profile>, exclude_user_id: Option<&str>, keep: F) -> Vec<Profile>
    where
        F: Fn(&Profile) -> bool,
    {
        newest_first(
            profiles
                .into_iter()
                .filter(|p| is_discoverable(p, exclude_user_id) && keep(p))
                .collect(),
        )
    }
}

/// Stable sort by `updated_at` descending
pub fn newest_first(mut profiles: Vec<Profile>) -> Vec<Profile> {
    profiles.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BasicInfoUpdate, Gender, ProfileRecord};
    use chrono::{Duration, TimeZone, Utc};

    fn on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn create_candidate(id: &str, age: i32, gender: Gender) -> Profile {
        let mut profile = Profile::new(id);
        profile.update_bio(format!("User {}", id));
        profile.update_basic_info(BasicInfoUpdate {
            date_of_birth: NaiveDate::from_ymd_opt(2024 - age, 1, 1),
            gender: Some(gender),
            location: Some("Berlin".to_string()),
            ..Default::default()
        });
        profile.add_photo(format!("{}.jpg", id));
        profile.add_interest("tennis");
        profile
    }

    fn at_offset(profile: &Profile, minutes: i64) -> Profile {
        let mut record: ProfileRecord = profile.to_record();
        record.updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        Profile::restore(record)
    }

    #[test]
    fn test_discover_basic() {
        let engine = DiscoveryEngine::new(EligibilityPolicy::ViewerOnly);
        let viewer_profile = create_candidate("viewer", 30, Gender::Male);
        let mut viewer_prefs = Preferences::new("viewer");
        viewer_prefs.update_gender_preferences([Gender::Female]);
        viewer_prefs.update_age_range(21, 35).unwrap();

        let viewer = Viewer {
            profile: &viewer_profile,
            preferences: &viewer_prefs,
            verified: false,
        };

        let candidates = vec![
            Candidate::new(create_candidate("1", 25, Gender::Female), None),
            Candidate::new(create_candidate("2", 40, Gender::Female), None),
            Candidate::new(create_candidate("3", 25, Gender::Male), None),
            Candidate::new(viewer_profile.clone(), None),
        ];

        let result = engine.discover_on(&viewer, candidates, on());

        assert_eq!(result.total_candidates, 4);
        assert_eq!(result.profiles.len(), 1);
        assert_eq!(result.profiles[0].user_id(), "1");
    }

    #[test]
    fn test_mutual_policy_checks_candidate_preferences() {
        let viewer_profile = create_candidate("viewer", 30, Gender::Male);
        let viewer_prefs = Preferences::new("viewer");
        let viewer = Viewer {
            profile: &viewer_profile,
            preferences: &viewer_prefs,
            verified: false,
        };

        let mut picky = Preferences::new("1");
        picky.update_gender_preferences([Gender::Female]);
        let candidates = vec![Candidate::new(create_candidate("1", 25, Gender::Female), Some(picky))];

        let mutual = DiscoveryEngine::new(EligibilityPolicy::Mutual);
        assert!(mutual.discover_on(&viewer, candidates.clone(), on()).profiles.is_empty());

        let one_sided = DiscoveryEngine::new(EligibilityPolicy::ViewerOnly);
        assert_eq!(one_sided.discover_on(&viewer, candidates, on()).profiles.len(), 1);
    }

    #[test]
    fn test_newest_first_is_stable() {
        let a = at_offset(&create_candidate("a", 25, Gender::Female), 5);
        let b = at_offset(&create_candidate("b", 25, Gender::Female), 10);
        let c = at_offset(&create_candidate("c", 25, Gender::Female), 5);

        let ordered = newest_first(vec![a, b, c]);
        let ids: Vec<&str> = ordered.iter().map(|p| p.user_id()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_search_by_age_bounds() {
        let engine = DiscoveryEngine::default();
        let profiles = vec![
            create_candidate("young", 20, Gender::Female),
            create_candidate("mid", 30, Gender::Female),
            create_candidate("old", 45, Gender::Female),
        ];

        let criteria = SearchCriteria {
            min_age: Some(25),
            max_age: Some(40),
            ..Default::default()
        };

        let result = engine.search_on(profiles, &criteria, on());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].user_id(), "mid");
    }

    #[test]
    fn test_complete_accessor_skips_incomplete() {
        let engine = DiscoveryEngine::default();
        let profiles = vec![create_candidate("full", 30, Gender::Female), Profile::new("empty")];

        let result = engine.complete(profiles, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].user_id(), "full");
    }
}
