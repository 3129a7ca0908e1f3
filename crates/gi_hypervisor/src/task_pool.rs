//! Collapses concurrent revert/start requests for the same VM name into
//! one in-flight operation (spec §4.3, §9): "new work for that VM is
//! blocked until the task completes." Handlers never await this
//! directly — they `tokio::spawn` the call and return immediately
//! (spec §5: "dispatched to a background task pool owned by the
//! service and never joined from a handler").

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::driver::{HypervisorDriver, HypervisorError};

type SharedResult = Result<(), String>;
type InFlight = Shared<BoxFuture<'static, SharedResult>>;

pub struct VmTaskPool {
    driver: Arc<dyn HypervisorDriver>,
    inflight: AsyncMutex<HashMap<String, InFlight>>,
}

impl VmTaskPool {
    pub fn new(driver: Arc<dyn HypervisorDriver>) -> Self {
        Self {
            driver,
            inflight: AsyncMutex::new(HashMap::new()),
        }
    }

    /// True while `vm` has a revert/start sequence in flight — callers
    /// must treat the VM as ineligible for checkin until this clears.
    pub async fn is_busy(&self, vm: &str) -> bool {
        self.inflight.lock().await.contains_key(vm)
    }

    /// Revert `vm` to `snapshot`, then start it. Concurrent callers for
    /// the same `vm` share one underlying operation instead of issuing
    /// duplicate hypervisor calls.
    pub async fn revert_then_start(&self, vm: &str, snapshot: &str) -> Result<(), HypervisorError> {
        let fut = {
            let mut map = self.inflight.lock().await;
            if let Some(existing) = map.get(vm) {
                existing.clone()
            } else {
                let driver = Arc::clone(&self.driver);
                let vm_owned = vm.to_string();
                let snapshot_owned = snapshot.to_string();
                let task: BoxFuture<'static, SharedResult> = async move {
                    driver
                        .revert(&vm_owned, &snapshot_owned)
                        .await
                        .map_err(|e| e.to_string())?;
                    driver.start(&vm_owned).await.map_err(|e| e.to_string())
                }
                .boxed();
                let shared = task.shared();
                map.insert(vm.to_string(), shared.clone());
                shared
            }
        };

        let result = fut.await;
        self.inflight.lock().await.remove(vm);
        if result.is_ok() {
            info!(vm, "revert+start complete, VM eligible for checkin again");
        }
        result.map_err(HypervisorError::Command)
    }

    /// Fire a revert+start without waiting for it (the normal call site
    /// from a request handler, per §5's never-block rule).
    pub fn spawn_revert_then_start(self: &Arc<Self>, vm: String, snapshot: String) {
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = pool.revert_then_start(&vm, &snapshot).await {
                tracing::error!(vm, %err, "revert+start failed, VM stays out of the usable pool");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDriver {
        revert_calls: AtomicUsize,
    }

    #[async_trait]
    impl HypervisorDriver for CountingDriver {
        async fn revert(&self, _vm: &str, _snapshot: &str) -> Result<(), HypervisorError> {
            self.revert_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(())
        }

        async fn start(&self, _vm: &str) -> Result<(), HypervisorError> {
            Ok(())
        }

        async fn list_running(&self) -> Result<HashSet<String>, HypervisorError> {
            Ok(HashSet::new())
        }

        async fn destroy(&self, _vm: &str) -> Result<(), HypervisorError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_reverts_of_same_vm_collapse_into_one() {
        let driver = Arc::new(CountingDriver {
            revert_calls: AtomicUsize::new(0),
        });
        let pool = Arc::new(VmTaskPool::new(driver.clone()));

        let (a, b) = tokio::join!(
            pool.revert_then_start("vm-1", "base"),
            pool.revert_then_start("vm-1", "base"),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(driver.revert_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn vm_is_busy_until_sequence_completes() {
        let driver = Arc::new(CountingDriver {
            revert_calls: AtomicUsize::new(0),
        });
        let pool = Arc::new(VmTaskPool::new(driver));

        pool.spawn_revert_then_start("vm-1".into(), "base".into());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(pool.is_busy("vm-1").await);

        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        assert!(!pool.is_busy("vm-1").await);
    }
}
