//! VM record: the locally persisted representation of one VM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vmctl_common::{OwnerId, PowerState, VmView};

use crate::domain::error::VmError;
use crate::domain::policy::{self, OsProfile};

/// Validated parameters of a VM to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub name: String,
    pub os: OsProfile,
    pub num_cpu: u32,
    pub ram_gb: u32,
    pub storage_gb: u32,
}

impl VmSpec {
    /// Build a spec from raw caller input, applying name, profile and floor
    /// checks in that order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`, `InvalidProfile` or `InsufficientResources`.
    pub fn parse(
        name: &str,
        os: &str,
        num_cpu: u32,
        ram_gb: u32,
        storage_gb: u32,
    ) -> Result<Self, VmError> {
        policy::validate_vm_name(name)?;
        let os = OsProfile::parse(os)?;
        policy::validate_new(os, num_cpu, ram_gb, storage_gb)?;
        Ok(Self {
            name: name.to_string(),
            os,
            num_cpu,
            ram_gb,
            storage_gb,
        })
    }
}

/// Last-known state of one VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    /// Unique, immutable after creation.
    pub name: String,
    pub os: OsProfile,
    pub num_cpu: u32,
    pub ram_gb: u32,
    /// Never decreases.
    pub storage_gb: u32,
    pub state: PowerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VmRecord {
    /// Record for a VM the hypervisor has just created and powered on.
    #[must_use]
    pub fn created(spec: VmSpec, ip: Option<String>, owner: OwnerId, now: DateTime<Utc>) -> Self {
        Self {
            name: spec.name,
            os: spec.os,
            num_cpu: spec.num_cpu,
            ram_gb: spec.ram_gb,
            storage_gb: spec.storage_gb,
            state: PowerState::PoweredOn,
            ip,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy with the address removed, for responses about suspended VMs.
    #[must_use]
    pub fn without_address(&self) -> Self {
        Self {
            ip: None,
            ..self.clone()
        }
    }

    /// Copy as shown in owner listings: suspended VMs hide their address.
    #[must_use]
    pub fn for_listing(&self) -> Self {
        if self.state == PowerState::Suspended {
            self.without_address()
        } else {
            self.clone()
        }
    }

    #[must_use]
    pub fn to_view(&self) -> VmView {
        VmView {
            name: self.name.clone(),
            os: self.os.to_string(),
            num_cpu: self.num_cpu,
            ram_gb: self.ram_gb,
            storage: self.storage_gb,
            state: self.state,
            ip: self.ip.clone(),
            owner_id: self.owner.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Normalize raw hypervisor output into an address: `None` when blank.
#[must_use]
pub fn parse_address(output: &str) -> Option<String> {
    let trimmed = output.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
