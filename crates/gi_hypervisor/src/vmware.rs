//! `vmrun -T ws`-backed driver for VMware Workstation on Linux (spec
//! §4.3, §9). Mirrors [`crate::libvirt::LibvirtDriver`]'s subprocess
//! idiom with the `vmrun` CLI's different argument shape: it addresses
//! VMs by `.vmx` path rather than by name, so the driver is configured
//! with a name → vmx-path table (analogous to `config.vms[].name`).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::driver::{HypervisorDriver, HypervisorError};
use crate::retry::{with_retry, DEFAULT_BACKOFF, DEFAULT_RETRIES};

pub struct VmwareWorkstationLinuxDriver {
    vmrun_path: String,
    vmx_paths: HashMap<String, String>,
    start_poll_interval: Duration,
    start_deadline: Duration,
}

impl VmwareWorkstationLinuxDriver {
    pub fn new(vmx_paths: HashMap<String, String>) -> Self {
        Self {
            vmrun_path: "vmrun".to_string(),
            vmx_paths,
            start_poll_interval: Duration::from_secs(2),
            start_deadline: Duration::from_secs(60),
        }
    }

    pub fn with_vmrun_path(mut self, path: impl Into<String>) -> Self {
        self.vmrun_path = path.into();
        self
    }

    fn vmx_path(&self, vm: &str) -> Result<&str, HypervisorError> {
        self.vmx_paths
            .get(vm)
            .map(String::as_str)
            .ok_or_else(|| HypervisorError::Command(format!("no vmx path configured for vm {vm}")))
    }

    async fn run(&self, args: &[&str]) -> Result<String, HypervisorError> {
        debug!(args = ?args, "vmrun");
        let output = Command::new(&self.vmrun_path)
            .arg("-T")
            .arg("ws")
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HypervisorError::Command(format!("failed to spawn vmrun: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HypervisorError::Command(format!(
                "vmrun {:?} exited with {:?}: {}",
                args,
                output.status.code(),
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| HypervisorError::Command(format!("vmrun output not utf8: {e}")))
    }
}

#[async_trait]
impl HypervisorDriver for VmwareWorkstationLinuxDriver {
    async fn revert(&self, vm: &str, snapshot: &str) -> Result<(), HypervisorError> {
        let vmx = self.vmx_path(vm)?.to_string();
        with_retry(vm, "revert", DEFAULT_RETRIES, DEFAULT_BACKOFF, || {
            let vmx = vmx.clone();
            let snapshot = snapshot.to_string();
            async move { self.run(&["revertToSnapshot", &vmx, &snapshot]).await.map(|_| ()) }
        })
        .await
    }

    async fn start(&self, vm: &str) -> Result<(), HypervisorError> {
        let vmx = self.vmx_path(vm)?.to_string();
        let _ = self.run(&["start", &vmx, "nogui"]).await;

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
        let stdout = self.run(&["list"]).await?;
        let running_paths: HashSet<&str> = stdout
            .lines()
            .skip(1) // first line is "Total running VMs: N"
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        Ok(self
            .vmx_paths
            .iter()
            .filter(|(_, path)| running_paths.contains(path.as_str()))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn destroy(&self, vm: &str) -> Result<(), HypervisorError> {
        let vmx = self.vmx_path(vm)?.to_string();
        with_retry(vm, "destroy", DEFAULT_RETRIES, DEFAULT_BACKOFF, || {
            let vmx = vmx.clone();
            async move { self.run(&["stop", &vmx, "hard"]).await.map(|_| ()) }
        })
        .await
    }
}
