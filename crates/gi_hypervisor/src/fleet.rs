//! Fleet initialization (spec §4.3): revert then start every configured
//! VM in parallel, blocking service startup until all complete, and
//! reset any row left in a non-terminal running state by a previous
//! crash back to `pending`.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use gi_protocol::config::VmConfig;
use tracing::{info, warn};

use crate::driver::{HypervisorDriver, HypervisorError};

pub struct FleetManager {
    driver: Arc<dyn HypervisorDriver>,
}

impl FleetManager {
    pub fn new(driver: Arc<dyn HypervisorDriver>) -> Self {
        Self { driver }
    }

    /// Revert then start every VM in `vms`, all in parallel. Returns an
    /// error listing every VM that failed to come up; the caller (§6
    /// CLI surface) should exit `2` ("hypervisor ... unreachable at
    /// startup") if this fails.
    pub async fn init_fleet(&self, vms: &[VmConfig]) -> Result<(), HypervisorError> {
        let results = join_all(vms.iter().map(|vm| async move {
            let outcome = async {
                self.driver.revert(&vm.name, &vm.snapshot).await?;
                self.driver.start(&vm.name).await
            }
            .await;
            (vm.name.clone(), outcome)
        }))
        .await;

        let failures: Vec<String> = results
            .into_iter()
            .filter_map(|(name, outcome)| match outcome {
                Ok(()) => {
                    info!(vm = %name, "fleet init: ready");
                    None
                }
                Err(err) => {
                    warn!(vm = %name, %err, "fleet init: failed");
                    Some(format!("{name}: {err}"))
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(HypervisorError::Command(format!(
                "fleet init failed for: {}",
                failures.join(", ")
            )))
        }
    }

    /// Run `init_fleet` together with the caller's startup-recovery
    /// query (reset non-terminal Candidate/Analysis rows), per spec
    /// §4.3's "Reset any Analysis/Candidate found in non-terminal
    /// running state at startup to pending."
    pub async fn init_all<F, Fut>(&self, vms: &[VmConfig], reset_non_terminal: F) -> Result<(), HypervisorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<u64>>,
    {
        self.init_fleet(vms).await?;
        match reset_non_terminal().await {
            Ok(count) if count > 0 => info!(count, "reset non-terminal rows left by a previous crash"),
            Ok(_) => {}
            Err(err) => warn!(%err, "failed to reset non-terminal rows at startup"),
        }
        Ok(())
    }
}
