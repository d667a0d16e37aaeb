//! Command implementations

pub mod config;
pub mod create;
pub mod delete;
pub mod list;
pub mod power;
pub mod resize;

use clap::Args;

use crate::domain::{ConfigError, VmError};

/// A single VM addressed by name.
#[derive(Args, Debug)]
pub struct VmArgs {
    /// VM name
    pub name: String,
}

/// Machine-readable code for a failed command.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<VmError>() {
        return e.kind().as_str();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return "CONFIG_ERROR";
    }
    "INTERNAL_ERROR"
}
