// Service exports
pub mod discovery;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod preferences;
pub mod profile;
pub mod repository;

pub use discovery::DiscoveryService;
pub use error::ServiceError;
pub use memory::{InMemoryPreferencesRepository, InMemoryProfileRepository};
pub use postgres::{PgPreferencesRepository, PgProfileRepository, PostgresClient};
pub use preferences::PreferencesService;
pub use profile::{ProfilePolicy, ProfileService};
pub use repository::{PreferencesRepository, ProfileRepository, RepositoryError};
