//! Generic stale-row watchdog (spec §4.3): reused by both the
//! Evaluation Service (over Candidates) and the Sandbox Service (over
//! Analyses) by instantiating with their own row type and
//! `VM_TIMEOUT`. Ticks at `VM_TIMEOUT/3`, takes `date_updated` as the
//! row's keepalive, and only fails the row and reclaims the VM — it
//! never retries stage logic (spec §4.3).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gi_protocol::config::VmConfig;
use tracing::{info, warn};

use crate::task_pool::VmTaskPool;

/// A row that can be reclaimed by the watchdog: it names the VM
/// currently bound to it.
pub trait ReclaimableRow: Send + Sync {
    fn vm_name(&self) -> Option<&str>;
}

/// Backing store the watchdog polls and mutates. Implemented once per
/// service over its own row type (`gi_db::candidates`/`gi_db::analyses`).
#[async_trait]
pub trait StaleRowStore<T: ReclaimableRow>: Send + Sync {
    async fn find_stale(&self, timeout: Duration) -> anyhow::Result<Vec<T>>;
    async fn mark_error(&self, row: &T, message: &str) -> anyhow::Result<()>;
}

pub struct StaleRowWatchdog<T, S> {
    store: S,
    vms: Arc<Vec<VmConfig>>,
    task_pool: Arc<VmTaskPool>,
    timeout: Duration,
    error_message: &'static str,
    _row: std::marker::PhantomData<T>,
}

impl<T, S> StaleRowWatchdog<T, S>
where
    T: ReclaimableRow,
    S: StaleRowStore<T>,
{
    pub fn new(
        store: S,
        vms: Arc<Vec<VmConfig>>,
        task_pool: Arc<VmTaskPool>,
        timeout: Duration,
        error_message: &'static str,
    ) -> Self {
        Self {
            store,
            vms,
            task_pool,
            timeout,
            error_message,
            _row: std::marker::PhantomData,
        }
    }

    fn poll_interval(&self) -> Duration {
        self.timeout / 3
    }

    /// Run forever, ticking at `VM_TIMEOUT/3` (spec §4.3). Intended to
    /// be spawned as one background task per service.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.poll_interval());
        loop {
            interval.tick().await;
            if let Err(err) = self.tick().await {
                warn!(%err, "watchdog tick failed");
            }
        }
    }

    async fn tick(&self) -> anyhow::Result<()> {
        let stale = self.store.find_stale(self.timeout).await?;
        for row in &stale {
            let Some(vm) = row.vm_name() else { continue };
            warn!(vm, "reclaiming stale row");
            self.store.mark_error(row, self.error_message).await?;

            if let Some(vm_config) = self.vms.iter().find(|v| v.name == vm) {
                self.task_pool
                    .spawn_revert_then_start(vm_config.name.clone(), vm_config.snapshot.clone());
            } else {
                warn!(vm, "stale row bound to an unconfigured VM, cannot revert");
            }
        }
        if !stale.is_empty() {
            info!(count = stale.len(), "watchdog reclaimed stale rows");
        }
        Ok(())
    }
}
