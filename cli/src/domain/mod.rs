//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod policy;
pub mod transition;
pub mod vm;

pub use command::HypervisorCommand;
pub use config::{HypervisorConfig, StoreConfig, VmctlConfig};
pub use error::{ConfigError, ErrorKind, GatewayError, VmError};
pub use policy::{OsProfile, ResourceFloor, validate_new, validate_resize, validate_vm_name};
pub use transition::{AddressUpdate, Commit, Plan, Transition};
pub use vm::{VmRecord, VmSpec};
