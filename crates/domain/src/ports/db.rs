use thiserror::Error;

use super::BoxFuture;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unreachable: {0}")]
    Unreachable(String),
    #[error("storage probe failed: {0}")]
    Probe(String),
}

/// Liveness probe for the backing store, surfaced by the health endpoint.
pub trait StorageAdapter: Send + Sync {
    fn engine(&self) -> &'static str;
    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>>;
}
