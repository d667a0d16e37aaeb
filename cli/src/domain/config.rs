//! Domain types and validators for vmctl configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

const REDACTED: &str = "********";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.vmctl/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VmctlConfig {
    /// Hypervisor endpoint and script settings.
    pub hypervisor: HypervisorConfig,
    /// Local record storage.
    pub store: StoreConfig,
}

/// Where and how hypervisor scripts are run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HypervisorConfig {
    /// ESXi / vCenter host the scripts connect to.
    pub host: String,
    pub username: String,
    pub password: String,
    /// Program that executes the scripts, e.g. `pwsh`.
    pub shell: String,
    /// Directory holding `create_VM.ps1` and friends.
    pub scripts_dir: PathBuf,
    /// Upper bound on a single hypervisor command.
    pub timeout_secs: u64,
}

impl Default for HypervisorConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: String::new(),
            shell: "pwsh".to_string(),
            scripts_dir: PathBuf::from("scripts"),
            timeout_secs: 600,
        }
    }
}

impl HypervisorConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings needed before any script can be run.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("hypervisor.host", &self.host),
            ("hypervisor.username", &self.username),
            ("hypervisor.shell", &self.shell),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingValue {
                    key: key.to_string(),
                });
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "hypervisor.timeout_secs".to_string(),
                value: "0".to_string(),
                valid: "a positive number of seconds".to_string(),
            });
        }
        Ok(())
    }
}

/// Local record storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory of per-VM JSON records. Defaults to `~/.vmctl/vms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl VmctlConfig {
    /// Copy safe to print: the hypervisor password is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.hypervisor.password.is_empty() {
            copy.hypervisor.password = REDACTED.to_string();
        }
        copy
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
