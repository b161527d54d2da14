//! Lume Profiles - Profile, preferences and discovery service for the Lume dating app
//!
//! The library holds the profile and preferences aggregates, the discovery
//! engine that decides which profiles a user may see, application services
//! over pluggable persistence, and a thin HTTP adapter.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Candidate, DiscoveryEngine, DiscoveryResult, EligibilityPolicy, Viewer};
pub use models::{DomainError, Gender, NotificationType, Preferences, Profile, SearchCriteria};
pub use services::{DiscoveryService, PreferencesService, ProfilePolicy, ProfileService, ServiceError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let profile = Profile::new("user-1");
        let preferences = Preferences::new("user-1");
        assert!(!profile.is_complete());
        assert_eq!(preferences.age_range(), (18, 99));
        assert_eq!(DiscoveryEngine::default().policy(), EligibilityPolicy::Mutual);
    }
}
