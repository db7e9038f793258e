use crate::state::SharedState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Background loops: resident memory sampling and expired cache eviction.
#[derive(Clone)]
pub struct Monitor {
    state: Arc<SharedState>,
}

impl Monitor {
    #[must_use]
    pub const fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    pub fn start(&self) {
        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.memory_loop().await;
        });

        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.cache_purge_loop().await;
        });
    }

    async fn memory_loop(&self) {
        let interval_secs = self.state.config.monitor.memory_interval_seconds.max(1);
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        info!("Memory monitor loop started");

        loop {
            interval.tick().await;
            if let Err(e) = self.sample_memory().await {
                error!("Memory sample failed: {}", e);
            }
        }
    }

    async fn cache_purge_loop(&self) {
        let interval_secs = self.state.config.cache.purge_interval_seconds.max(1);
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        info!("Cache purge loop started");

        loop {
            interval.tick().await;
            let removed = self.state.cache.purge_expired().await;
            if removed > 0 {
                debug!(removed, "Purged expired cache entries");
            }
        }
    }

    async fn sample_memory(&self) -> anyhow::Result<()> {
        let Some(rss_bytes) = resident_memory_bytes().await? else {
            return Ok(());
        };

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("process_resident_memory_bytes").set(rss_bytes as f64);

        let rss_mb = rss_bytes / (1024 * 1024);
        let threshold = self.state.config.monitor.memory_warn_mb;
        if above_threshold(rss_bytes, threshold) {
            warn!(
                event = "high_memory",
                rss_mb,
                threshold_mb = threshold,
                "Resident memory above threshold"
            );
        } else {
            debug!(rss_mb, "Memory sample");
        }

        Ok(())
    }
}

/// `None` on platforms without `/proc`.
async fn resident_memory_bytes() -> anyhow::Result<Option<u64>> {
    let status = match tokio::fs::read_to_string("/proc/self/status").await {
        Ok(status) => status,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(parse_vm_rss(&status))
}

const fn above_threshold(rss_bytes: u64, threshold_mb: u64) -> bool {
    rss_bytes > threshold_mb.saturating_mul(1024 * 1024)
}

fn parse_vm_rss(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kib| kib.parse::<u64>().ok())
        .map(|kib| kib * 1024)
}
