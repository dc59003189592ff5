use std::time::Duration;

use sanstha_domain::ports::BoxFuture;
use sanstha_domain::ports::db::{StorageAdapter, StorageError};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl DbConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.surreal_endpoint.clone(),
            namespace: config.surreal_ns.clone(),
            database: config.surreal_db.clone(),
            username: config.surreal_user.clone(),
            password: config.surreal_pass.clone(),
        }
    }
}

/// Reachability probe for the SurrealDB endpoint, used by the health route.
#[derive(Debug, Clone)]
pub struct SurrealProbe {
    config: DbConfig,
}

impl SurrealProbe {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

impl StorageAdapter for SurrealProbe {
    fn engine(&self) -> &'static str {
        "surrealdb"
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        let endpoint = self.config.endpoint.clone();
        let namespace = self.config.namespace.clone();
        let database = self.config.database.clone();

        Box::pin(async move {
            let address = endpoint_socket_address(&endpoint)?;
            let connect = timeout(Duration::from_secs(2), TcpStream::connect(address))
                .await
                .map_err(|_| {
                    StorageError::Unreachable("surreal endpoint connect timed out".to_string())
                })?;
            connect.map_err(|err| {
                StorageError::Unreachable(format!("surreal endpoint connect failed: {err}"))
            })?;

            tracing::debug!(endpoint, namespace, database, "surreal probe succeeded");
            Ok(())
        })
    }
}

fn endpoint_socket_address(endpoint: &str) -> Result<String, StorageError> {
    let normalized = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("ws://{endpoint}")
    };
    let parsed = Url::parse(&normalized).map_err(|err| {
        StorageError::Unreachable(format!("invalid surreal endpoint '{endpoint}': {err}"))
    })?;

    let scheme = parsed.scheme();
    let host = parsed.host_str().ok_or_else(|| {
        StorageError::Unreachable(format!("missing surreal host in endpoint '{endpoint}'"))
    })?;
    let port = parsed.port_or_known_default().unwrap_or(match scheme {
        "wss" | "https" => 443,
        _ => 8000,
    });
    Ok(format!("{host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_address_accepts_bare_host_port() {
        assert_eq!(
            endpoint_socket_address("127.0.0.1:8000").expect("parses"),
            "127.0.0.1:8000"
        );
    }

    #[test]
    fn socket_address_strips_scheme() {
        assert_eq!(
            endpoint_socket_address("ws://surreal.internal:9000").expect("parses"),
            "surreal.internal:9000"
        );
    }
}
