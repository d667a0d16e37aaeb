//! Infrastructure implementation of the `VmStore` port.
//!
//! `JsonVmStore` keeps one `<name>.json` file per VM under a directory
//! (default `~/.vmctl/vms`). Blocking filesystem work runs on
//! `tokio::task::spawn_blocking`; writes go through a temp file and a rename
//! so a record is either fully old or fully new.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use vmctl_common::OwnerId;

use crate::application::ports::VmStore;
use crate::domain::{VmRecord, validate_vm_name};

const RECORD_EXT: &str = "json";

/// Directory of per-VM JSON records.
#[derive(Debug, Clone)]
pub struct JsonVmStore {
    dir: PathBuf,
}

impl JsonVmStore {
    /// Create a store using the default directory (`~/.vmctl/vms`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_dir(home.join(".vmctl").join("vms")))
    }

    /// Create a store rooted at an explicit directory.
    #[must_use]
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file, or `None` for names that can never be stored.
    fn record_path(dir: &Path, name: &str) -> Option<PathBuf> {
        validate_vm_name(name).ok()?;
        Some(dir.join(format!("{name}.{RECORD_EXT}")))
    }

    fn read_record(path: &Path) -> Result<VmRecord> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading record {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing record {}", path.display()))
    }

    fn load_sync(dir: &Path, name: &str) -> Result<Option<VmRecord>> {
        let Some(path) = Self::record_path(dir, name) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    fn list_sync(dir: &Path, owner: &OwnerId) -> Result<Vec<VmRecord>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
        let mut records = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("reading directory {}", dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            let record = match Self::read_record(&path) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %format!("{e:#}"),
                        "skipping unreadable record"
                    );
                    continue;
                }
            };
            if &record.owner == owner {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn save_sync(dir: &Path, record: &VmRecord) -> Result<()> {
        let path = Self::record_path(dir, &record.name)
            .ok_or_else(|| anyhow::anyhow!("invalid VM name: {:?}", record.name))?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
        let content = serde_json::to_string_pretty(record).context("serializing record")?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("finalizing record {}", path.display()))
    }

    fn delete_sync(dir: &Path, name: &str) -> Result<()> {
        let Some(path) = Self::record_path(dir, name) else {
            return Ok(());
        };
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing record {}", path.display()))
            }
            _ => Ok(()),
        }
    }
}

impl VmStore for JsonVmStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<VmRecord>> {
        let dir = self.dir.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || Self::load_sync(&dir, &name))
            .await
            .context("record load task panicked")?
    }

    async fn find_all_by_owner(&self, owner: &OwnerId) -> Result<Vec<VmRecord>> {
        let dir = self.dir.clone();
        let owner = owner.clone();
        tokio::task::spawn_blocking(move || Self::list_sync(&dir, &owner))
            .await
            .context("record scan task panicked")?
    }

    async fn save(&self, record: &VmRecord) -> Result<()> {
        let dir = self.dir.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || Self::save_sync(&dir, &record))
            .await
            .context("record save task panicked")?
    }

    async fn delete(&self, record: &VmRecord) -> Result<()> {
        let dir = self.dir.clone();
        let name = record.name.clone();
        tokio::task::spawn_blocking(move || Self::delete_sync(&dir, &name))
            .await
            .context("record delete task panicked")?
    }
}
