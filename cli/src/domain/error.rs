//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! Every failure a lifecycle operation can report is a [`VmError`]; the
//! transport collaborator maps its [`ErrorKind`] to a status code.

use std::fmt;

use thiserror::Error;
use vmctl_common::PowerState;

// ── Gateway errors ────────────────────────────────────────────────────────────

/// Failure of one hypervisor command.
///
/// Either the command could not be run at all (spawn failure, I/O error,
/// timeout) or it ran and exited unsuccessfully. In both cases the target VM
/// is treated as unchanged.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("could not run {script}: {reason}")]
    Invocation { script: String, reason: String },

    #[error(
        "{script} exited with {}: {stderr}",
        .code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
    )]
    Failed {
        script: String,
        code: Option<i32>,
        stderr: String,
    },
}

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Errors reported by VM lifecycle operations.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("OS name {0} is invalid")]
    InvalidProfile(String),

    #[error(
        "Invalid VM name '{0}': must be 1-80 characters of [A-Za-z0-9._-] starting with a letter or digit"
    )]
    InvalidName(String),

    #[error("Configuration parameters are not enough for {profile}: {requirement}")]
    InsufficientResources {
        profile: String,
        requirement: String,
    },

    #[error("Not found VM with name: {0}")]
    NotFound(String),

    #[error("VM {0} already exists")]
    AlreadyExists(String),

    #[error("VM {name} already in {state} state")]
    AlreadyInState { name: String, state: PowerState },

    #[error("Unable to suspend VM {0} while it is powered off")]
    CannotSuspend(String),

    #[error("VM {name} can only be updated while powered off (currently {state})")]
    CannotUpdate { name: String, state: PowerState },

    #[error(
        "You can only increase the disk of VM {name}: requested {requested} GB, current {current} GB"
    )]
    CannotUpdateStorage {
        name: String,
        current: u32,
        requested: u32,
    },

    #[error("Fail to {operation} VM {name}")]
    Gateway {
        operation: &'static str,
        name: String,
        #[source]
        source: GatewayError,
    },

    #[error("Fail to persist VM {name}: {cause:#}")]
    Store { name: String, cause: anyhow::Error },
}

impl VmError {
    /// The stable failure kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProfile(_) => ErrorKind::InvalidProfile,
            Self::InvalidName(_) => ErrorKind::InvalidName,
            Self::InsufficientResources { .. } => ErrorKind::InsufficientResources,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::AlreadyInState { .. } => ErrorKind::AlreadyInState,
            Self::CannotSuspend(_) => ErrorKind::CannotSuspend,
            Self::CannotUpdate { .. } => ErrorKind::CannotUpdate,
            Self::CannotUpdateStorage { .. } => ErrorKind::CannotUpdateStorage,
            Self::Gateway { .. } => ErrorKind::GatewayError,
            Self::Store { .. } => ErrorKind::StoreError,
        }
    }

    pub(crate) fn store(name: &str, cause: anyhow::Error) -> Self {
        Self::Store {
            name: name.to_string(),
            cause,
        }
    }
}

/// Failure kinds, one per [`VmError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidProfile,
    InvalidName,
    InsufficientResources,
    NotFound,
    AlreadyExists,
    AlreadyInState,
    CannotSuspend,
    CannotUpdate,
    CannotUpdateStorage,
    GatewayError,
    StoreError,
}

impl ErrorKind {
    /// Machine-readable code used in JSON error bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidProfile => "INVALID_PROFILE",
            Self::InvalidName => "INVALID_NAME",
            Self::InsufficientResources => "INSUFFICIENT_RESOURCES",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::AlreadyInState => "ALREADY_IN_STATE",
            Self::CannotSuspend => "CANNOT_SUSPEND",
            Self::CannotUpdate => "CANNOT_UPDATE",
            Self::CannotUpdateStorage => "CANNOT_UPDATE_STORAGE",
            Self::GatewayError => "GATEWAY_ERROR",
            Self::StoreError => "STORE_ERROR",
        }
    }

    /// HTTP status a transport layer should answer with.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidProfile
            | Self::InvalidName
            | Self::InsufficientResources
            | Self::CannotUpdateStorage => 400,
            Self::NotFound => 404,
            Self::AlreadyExists
            | Self::AlreadyInState
            | Self::CannotSuspend
            | Self::CannotUpdate => 409,
            Self::GatewayError | Self::StoreError => 500,
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing setting: {key}\n\nSet it in the vmctl config file (see: vmctl config path)")]
    MissingValue { key: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
