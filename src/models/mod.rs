// Model exports
pub mod domain;
pub mod preferences;
pub mod profile;
pub mod requests;
pub mod responses;

pub use domain::{DistanceUnit, DomainError, Gender, NotificationType, RelationshipStatus, SearchCriteria};
pub use preferences::{FilterUpdate, MessagingUpdate, NotificationUpdate, Preferences, PreferencesRecord, PrivacyUpdate};
pub use profile::{BasicInfoUpdate, Profile, ProfileRecord};
pub use requests::{
    AddInterestRequest, AddPhotoRequest, AgeRangeRequest, DealBreakerRequest, DiscoverQuery, DistanceRequest,
    GenderPreferencesRequest, InterestsQuery, LocationQuery, ReorderPhotosRequest, UpdatePreferencesRequest,
    UpdateProfileRequest, VisibilityRequest,
};
pub use responses::{DiscoverResponse, ErrorResponse, HealthResponse, NotificationUsersResponse, ProfileListResponse};
