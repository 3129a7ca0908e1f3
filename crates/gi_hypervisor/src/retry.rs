//! Bounded retry with linear backoff, shared by every `HypervisorDriver`
//! implementation (spec §4.3: "fails with `hypervisor-error` after N
//! retries").

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::driver::HypervisorError;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Run `op` up to `retries + 1` times, sleeping `backoff * attempt`
/// between failures, returning the last error if none succeed.
pub async fn with_retry<F, Fut, T>(
    vm: &str,
    operation: &'static str,
    retries: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T, HypervisorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HypervisorError>>,
{
    let mut last_err = None;
    for attempt in 0..=retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(vm, operation, attempt, %err, "hypervisor operation failed, retrying");
                last_err = Some(err);
                if attempt < retries {
                    tokio::time::sleep(backoff * (attempt + 1)).await;
                }
            }
        }
    }

    Err(HypervisorError::RetriesExhausted {
        vm: vm.to_string(),
        op: operation,
        last: last_err.map(|e| e.to_string()).unwrap_or_default(),
    })
}
