//! Resource policy: OS profiles, per-profile resource floors, VM names.
//!
//! Pure functions only — no I/O, no async.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::VmError;

/// VM names become hypervisor command-line arguments and store file names,
/// so only a conservative character set is accepted. 80 is the vSphere
/// display-name limit.
pub static VM_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,79}$").expect("valid regex")
});

/// Guest operating system family. Stored in canonical uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OsProfile {
    Ubuntu,
    Windows,
}

/// Minimum resources a VM of a given profile must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceFloor {
    pub min_cpu: u32,
    pub min_ram_gb: u32,
    /// Only checked at creation; storage can never shrink afterwards.
    pub min_storage_gb: u32,
}

impl OsProfile {
    pub const ALL: [OsProfile; 2] = [OsProfile::Ubuntu, OsProfile::Windows];

    /// Parse a profile name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::InvalidProfile`] (carrying the uppercased input)
    /// for anything other than a known profile.
    pub fn parse(name: &str) -> Result<Self, VmError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| VmError::InvalidProfile(name.to_uppercase()))
    }

    /// Canonical form, e.g. `"UBUNTU"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ubuntu => "UBUNTU",
            Self::Windows => "WINDOWS",
        }
    }

    #[must_use]
    pub const fn floor(self) -> ResourceFloor {
        match self {
            Self::Ubuntu => ResourceFloor {
                min_cpu: 1,
                min_ram_gb: 1,
                min_storage_gb: 4,
            },
            Self::Windows => ResourceFloor {
                min_cpu: 1,
                min_ram_gb: 2,
                min_storage_gb: 32,
            },
        }
    }
}

impl fmt::Display for OsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsProfile {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check the resources requested for a new VM against the profile floor.
///
/// # Errors
///
/// Returns [`VmError::InsufficientResources`] if any value is below the floor.
pub fn validate_new(
    profile: OsProfile,
    num_cpu: u32,
    ram_gb: u32,
    storage_gb: u32,
) -> Result<(), VmError> {
    let floor = profile.floor();
    if num_cpu < floor.min_cpu || ram_gb < floor.min_ram_gb || storage_gb < floor.min_storage_gb {
        return Err(VmError::InsufficientResources {
            profile: profile.to_string(),
            requirement: format!(
                "requires at least {} CPU, {} GB RAM and {} GB storage",
                floor.min_cpu, floor.min_ram_gb, floor.min_storage_gb
            ),
        });
    }
    Ok(())
}

/// Check a CPU/RAM resize against the profile floor.
///
/// # Errors
///
/// Returns [`VmError::InsufficientResources`] if either value is below the floor.
pub fn validate_resize(profile: OsProfile, num_cpu: u32, ram_gb: u32) -> Result<(), VmError> {
    let floor = profile.floor();
    if num_cpu < floor.min_cpu || ram_gb < floor.min_ram_gb {
        return Err(VmError::InsufficientResources {
            profile: profile.to_string(),
            requirement: format!(
                "requires at least {} CPU and {} GB RAM",
                floor.min_cpu, floor.min_ram_gb
            ),
        });
    }
    Ok(())
}

/// Validate a VM name against [`VM_NAME_RE`].
///
/// # Errors
///
/// Returns [`VmError::InvalidName`] if the name does not match.
pub fn validate_vm_name(name: &str) -> Result<(), VmError> {
    if !VM_NAME_RE.is_match(name) {
        return Err(VmError::InvalidName(name.to_string()));
    }
    Ok(())
}
