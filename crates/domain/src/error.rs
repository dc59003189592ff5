use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found")]
    NotFound,
    #[error("name already exists in this scope")]
    DuplicateName,
    #[error("member not found")]
    MemberNotFound,
    #[error("persistence failed: {0}")]
    Persistence(String),
}
