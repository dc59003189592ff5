use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const SWEEPS_TOTAL: &str = "sanstha_worker_expiry_sweeps_total";
const SWEPT_MEMBERS_TOTAL: &str = "sanstha_worker_swept_members_total";
const SWEEP_DURATION_SECONDS: &str = "sanstha_worker_sweep_duration_seconds";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

pub fn register_sweep(result: &'static str, swept: u64, elapsed: Duration) {
    counter!(SWEEPS_TOTAL, "result" => result).increment(1);
    if swept > 0 {
        counter!(SWEPT_MEMBERS_TOTAL).increment(swept);
    }
    histogram!(SWEEP_DURATION_SECONDS, "result" => result).record(elapsed.as_secs_f64());
}
