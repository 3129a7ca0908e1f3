//! The `HypervisorDriver` trait every VM backend implements (spec
//! §4.3, §9 "Polymorphic hypervisor driver").

use std::collections::HashSet;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error, Clone)]
pub enum HypervisorError {
    #[error("hypervisor-error: {0}")]
    Command(String),

    #[error("hypervisor-error: {vm} did not reach the running set within the deadline")]
    StartTimeout { vm: String },

    #[error("hypervisor-error: retries exhausted for {op} on {vm}: {last}")]
    RetriesExhausted { vm: String, op: &'static str, last: String },
}

/// Abstract hypervisor operations (spec §4.3). Every operation is async
/// and intended to be dispatched to a background task pool — handlers
/// never await these directly (spec §5).
#[async_trait]
pub trait HypervisorDriver: Send + Sync {
    /// Restore `vm` to `snapshot`. Retries transient failures with
    /// bounded backoff before surfacing `HypervisorError`.
    async fn revert(&self, vm: &str, snapshot: &str) -> Result<(), HypervisorError>;

    /// Boot `vm` if not already running; polls `list_running()` until
    /// present or a deadline elapses.
    async fn start(&self, vm: &str) -> Result<(), HypervisorError>;

    /// Hypervisor-level enumeration of running VM names.
    async fn list_running(&self) -> Result<HashSet<String>, HypervisorError>;

    /// Forced power-off.
    async fn destroy(&self, vm: &str) -> Result<(), HypervisorError>;
}
