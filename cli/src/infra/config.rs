//! YAML configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::VmctlConfig;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "VMCTL_CONFIG";
/// Overrides `hypervisor.password` so it need not live in the file.
pub const PASSWORD_ENV: &str = "VMCTL_HYPERVISOR_PASSWORD";

/// Reads `VmctlConfig` from a YAML file on disk.
#[derive(Debug, Clone)]
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Store at `$VMCTL_CONFIG`, or `~/.vmctl/config.yaml` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        resolve_path(std::env::var(CONFIG_ENV).ok()).map(Self::with_path)
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, applying the password environment override.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<VmctlConfig> {
        self.load_with(std::env::var(PASSWORD_ENV).ok())
    }

    fn load_with(&self, password: Option<String>) -> Result<VmctlConfig> {
        let mut config = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)
                .with_context(|| format!("cannot read {}", self.path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("cannot parse {}", self.path.display()))?
        } else {
            VmctlConfig::default()
        };
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            config.hypervisor.password = password;
        }
        Ok(config)
    }
}

/// Config file location given the value of `VMCTL_CONFIG`, if any.
///
/// # Errors
///
/// Returns an error if no override is set and the home directory cannot be
/// determined.
pub fn resolve_path(env_override: Option<String>) -> Result<PathBuf> {
    if let Some(val) = env_override.filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(val));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".vmctl").join("config.yaml"))
}
