mod observability;

use std::sync::Arc;
use std::time::{Duration, Instant};

use sanstha_domain::member::MemberService;
use sanstha_domain::ports::member::MemberRepository;
use sanstha_infra::config::AppConfig;
use sanstha_infra::db::DbConfig;
use sanstha_infra::logging::init_tracing;
use sanstha_infra::repositories::{MemoryBackend, SurrealMemberRepository};
use time::OffsetDateTime;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config)?;
    observability::init_metrics()?;

    let members: Arc<dyn MemberRepository> = if config.uses_memory_backend() {
        MemoryBackend::new().member_repo()
    } else {
        let repository = SurrealMemberRepository::new(&DbConfig::from_app_config(&config)).await?;
        Arc::new(repository)
    };
    let service = MemberService::new(members);

    info!(
        interval_ms = config.sweep_interval_ms,
        backend = %config.data_backend,
        "expiry sweep worker starting"
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(config.sweep_interval_ms.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let started = Instant::now();
                let today = OffsetDateTime::now_utc().date();
                match service.sweep_expired(today).await {
                    Ok(swept) => {
                        observability::register_sweep("success", swept, started.elapsed());
                        if swept > 0 {
                            info!(swept, "memberships moved to inactive");
                        }
                    }
                    Err(err) => {
                        observability::register_sweep("error", 0, started.elapsed());
                        tracing::error!(error = %err, "expiry sweep failed");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("worker shutdown");
                break;
            }
        }
    }

    Ok(())
}
