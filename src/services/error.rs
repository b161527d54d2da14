use crate::models::DomainError;
use crate::services::repository::RepositoryError;
use thiserror::Error;

/// Errors surfaced by the application services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} already exists for this {field}")]
    EntityAlreadyExists { entity: &'static str, field: &'static str },

    #[error("{entity} not found{}", .id.as_ref().map(|id| format!(": {}", id)).unwrap_or_default())]
    EntityNotFound { entity: &'static str, id: Option<String> },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        ServiceError::EntityNotFound { entity, id: None }
    }

    pub fn not_found_id(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::EntityNotFound {
            entity,
            id: Some(id.to_string()),
        }
    }

    /// Map a storage uniqueness conflict on create to `EntityAlreadyExists`
    pub(crate) fn from_create(entity: &'static str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => ServiceError::EntityAlreadyExists { entity, field: "user" },
            other => other.into(),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // Removed between load and save
            RepositoryError::NotFound { entity, id } => ServiceError::not_found_id(entity, id),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidRange(message) => ServiceError::InvalidInput(message),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}
