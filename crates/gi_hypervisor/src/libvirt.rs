//! `virsh`-backed driver (spec §4.3, §9), grounded on the corpus's
//! async subprocess idiom (`casparian::scout::extractor::spawn_extractor`):
//! `tokio::process::Command` with `kill_on_drop(true)`, piped output, and
//! non-zero exit mapped to a structured error.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::driver::{HypervisorDriver, HypervisorError};
use crate::retry::{with_retry, DEFAULT_BACKOFF, DEFAULT_RETRIES};

pub struct LibvirtDriver {
    virsh_path: String,
    start_poll_interval: Duration,
    start_deadline: Duration,
}

impl LibvirtDriver {
    pub fn new() -> Self {
        Self {
            virsh_path: "virsh".to_string(),
            start_poll_interval: Duration::from_secs(2),
            start_deadline: Duration::from_secs(60),
        }
    }

    pub fn with_virsh_path(mut self, path: impl Into<String>) -> Self {
        self.virsh_path = path.into();
        self
    }

    async fn run(&self, args: &[&str]) -> Result<String, HypervisorError> {
        debug!(args = ?args, "virsh");
        let output = Command::new(&self.virsh_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HypervisorError::Command(format!("failed to spawn virsh: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HypervisorError::Command(format!(
                "virsh {:?} exited with {:?}: {}",
                args,
                output.status.code(),
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| HypervisorError::Command(format!("virsh output not utf8: {e}")))
    }
}

impl Default for LibvirtDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HypervisorDriver for LibvirtDriver {
    async fn revert(&self, vm: &str, snapshot: &str) -> Result<(), HypervisorError> {
        with_retry(vm, "revert", DEFAULT_RETRIES, DEFAULT_BACKOFF, || async {
            self.run(&["snapshot-revert", vm, snapshot]).await.map(|_| ())
        })
        .await
    }

    async fn start(&self, vm: &str) -> Result<(), HypervisorError> {
        // `virsh start` on an already-running domain fails; treat that
        // as success and fall through to the running-set poll.
        let _ = self.run(&["start", vm]).await;

        let deadline = tokio::time::Instant::now() + self.start_deadline;
        loop {
            if self.list_running().await?.contains(vm) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(HypervisorError::StartTimeout { vm: vm.to_string() });
            }
            tokio::time::sleep(self.start_poll_interval).await;
        }
    }

    async fn list_running(&self) -> Result<HashSet<String>, HypervisorError> {
        let stdout = self.run(&["list", "--name", "--state-running"]).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn destroy(&self, vm: &str) -> Result<(), HypervisorError> {
        with_retry(vm, "destroy", DEFAULT_RETRIES, DEFAULT_BACKOFF, || async {
            self.run(&["destroy", vm]).await.map(|_| ())
        })
        .await
    }
}
