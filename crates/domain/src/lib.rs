pub mod draft;
pub mod error;
pub mod geo;
pub mod member;
pub mod ports;
pub mod profile;
pub mod util;
pub mod view;

pub type DomainResult<T> = Result<T, error::DomainError>;
