//! Request and error bodies exchanged with the transport layer.

use serde::{Deserialize, Serialize};

/// Body of a create request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewVm {
    pub name: String,
    /// OS profile, matched case-insensitively (`"ubuntu"`, `"Windows"`, ...).
    pub os: String,
    #[serde(rename = "numCPU")]
    pub num_cpu: u32,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
    pub storage: u32,
}

/// Body of a compute resize request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCpuRam {
    pub name: String,
    #[serde(rename = "numCPU")]
    pub num_cpu: u32,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
}

/// Body of a storage resize request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateStorage {
    pub name: String,
    pub storage: u32,
}

/// Structured failure returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    /// Stable failure kind, e.g. `"CANNOT_SUSPEND"`.
    pub code: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            code: code.into(),
        }
    }
}
