// Core algorithm exports
pub mod age;
pub mod discovery;
pub mod filters;

pub use age::{age_on, birth_date_bounds, BirthDateBounds};
pub use discovery::{newest_first, Candidate, DiscoveryEngine, DiscoveryResult, EligibilityPolicy, Viewer};
pub use filters::{is_discoverable, matches_search_criteria, satisfies_preferences};
