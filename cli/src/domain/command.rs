//! Hypervisor commands: one value per external operation.

use crate::domain::policy::OsProfile;

/// An operation the hypervisor gateway can run against one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HypervisorCommand {
    Create {
        name: String,
        os: OsProfile,
        num_cpu: u32,
        ram_gb: u32,
        storage_gb: u32,
    },
    Delete {
        name: String,
    },
    Start {
        name: String,
    },
    Stop {
        name: String,
    },
    Suspend {
        name: String,
    },
    ResizeStorage {
        name: String,
        storage_gb: u32,
    },
    ResizeCompute {
        name: String,
        num_cpu: u32,
        ram_gb: u32,
    },
    FetchAddress {
        name: String,
    },
}

impl HypervisorCommand {
    /// Short operation name used in logs and error messages.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Delete { .. } => "delete",
            Self::Start { .. } => "start",
            Self::Stop { .. } => "stop",
            Self::Suspend { .. } => "suspend",
            Self::ResizeStorage { .. } => "update hard disk",
            Self::ResizeCompute { .. } => "update CPU or RAM",
            Self::FetchAddress { .. } => "fetch address of",
        }
    }

    #[must_use]
    pub fn vm_name(&self) -> &str {
        match self {
            Self::Create { name, .. }
            | Self::Delete { name }
            | Self::Start { name }
            | Self::Stop { name }
            | Self::Suspend { name }
            | Self::ResizeStorage { name, .. }
            | Self::ResizeCompute { name, .. }
            | Self::FetchAddress { name } => name,
        }
    }

    /// Operation-specific arguments that follow the VM name.
    #[must_use]
    pub fn params(&self) -> Vec<String> {
        match self {
            Self::Create {
                os,
                num_cpu,
                ram_gb,
                storage_gb,
                ..
            } => vec![
                os.to_string(),
                num_cpu.to_string(),
                ram_gb.to_string(),
                storage_gb.to_string(),
            ],
            Self::ResizeStorage { storage_gb, .. } => vec![storage_gb.to_string()],
            Self::ResizeCompute {
                num_cpu, ram_gb, ..
            } => vec![num_cpu.to_string(), ram_gb.to_string()],
            Self::Delete { .. }
            | Self::Start { .. }
            | Self::Stop { .. }
            | Self::Suspend { .. }
            | Self::FetchAddress { .. } => Vec::new(),
        }
    }
}
