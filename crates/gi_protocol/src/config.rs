//! JSON configuration schema (spec §6).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmProvider {
    Libvirt,
    #[serde(rename = "vmware")]
    VmwareWorkstationLinux,
}

impl VmProvider {
    pub fn driver_name(self) -> &'static str {
        match self {
            Self::Libvirt => "libvirt",
            Self::VmwareWorkstationLinux => "vmware-workstation-linux",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmConfig {
    pub name: String,
    pub ip: String,
    pub snapshot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchTarget {
    pub interface: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsMonitorConfig {
    pub classifier: Option<PathBuf>,
    pub tokenizer: Option<PathBuf>,
    pub signatures: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub eval_server: Option<LaunchTarget>,
    pub sandbox_server: Option<LaunchTarget>,
    pub es_monitor: Option<EsMonitorConfig>,
}

/// Top-level configuration file shared by all four binaries (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sqlalchemy_database_uri: String,
    pub sandbox_token: String,
    pub data_path: PathBuf,
    pub evaluation_server: String,
    #[serde(default)]
    pub launcher: LauncherConfig,
    #[serde(rename = "VMS", alias = "vms")]
    pub vms: Vec<VmConfig>,
    #[serde(rename = "VM_PROVIDER", alias = "vm_provider")]
    pub vm_provider: VmProvider,
    #[serde(rename = "VM_TIMEOUT", alias = "vm_timeout")]
    pub vm_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Look up the configured name of the VM whose management IP matches `ip`.
    pub fn vm_by_ip(&self, ip: &str) -> Option<&VmConfig> {
        self.vms.iter().find(|vm| vm.ip == ip)
    }

    pub fn vm_by_name(&self, name: &str) -> Option<&VmConfig> {
        self.vms.iter().find(|vm| vm.name == name)
    }

    pub fn vm_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.vm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_shape() {
        let json = r#"{
            "sqlalchemy_database_uri": "postgres://u:p@host/db",
            "sandbox_token": "tok",
            "data_path": "/var/lib/gi",
            "evaluation_server": "http://es:5000",
            "launcher": {
                "eval_server": {"interface": "0.0.0.0", "port": 5000},
                "sandbox_server": {"interface": "0.0.0.0", "port": 5001},
                "es_monitor": {"classifier": "/m.ckpt", "tokenizer": "/tok", "signatures": "a,b"}
            },
            "VMS": [{"name": "win10-01", "ip": "192.168.122.101", "snapshot": "build"}],
            "VM_PROVIDER": "libvirt",
            "VM_TIMEOUT": 120
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.vms.len(), 1);
        assert_eq!(cfg.vm_provider, VmProvider::Libvirt);
        assert_eq!(cfg.vm_timeout_secs, 120);
        assert_eq!(cfg.vm_by_ip("192.168.122.101").unwrap().name, "win10-01");
    }

    #[test]
    fn rejects_unregistered_ip() {
        let cfg = Config {
            sqlalchemy_database_uri: String::new(),
            sandbox_token: String::new(),
            data_path: PathBuf::new(),
            evaluation_server: String::new(),
            launcher: LauncherConfig::default(),
            vms: vec![],
            vm_provider: VmProvider::Libvirt,
            vm_timeout_secs: 60,
        };
        assert!(cfg.vm_by_ip("10.0.0.1").is_none());
    }
}
