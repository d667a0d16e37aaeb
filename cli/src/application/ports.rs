//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use vmctl_common::OwnerId;

use crate::domain::{GatewayError, HypervisorCommand, VmRecord};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Hypervisor Gateway Port ───────────────────────────────────────────────────

/// Runs one hypervisor command and returns its text output.
///
/// Output has trailing newlines stripped. On error the caller must assume the
/// VM is unchanged; implementations never retry.
#[allow(async_fn_in_trait)]
pub trait HypervisorGateway {
    async fn run(&self, command: &HypervisorCommand) -> Result<String, GatewayError>;
}

// ── Persistence Port ──────────────────────────────────────────────────────────

/// Abstracts persistence of VM records, keyed by name.
#[allow(async_fn_in_trait)]
pub trait VmStore {
    /// Load a record, returning `None` if no VM has that name.
    async fn find_by_name(&self, name: &str) -> Result<Option<VmRecord>>;
    /// All records owned by `owner`, sorted by name.
    async fn find_all_by_owner(&self, owner: &OwnerId) -> Result<Vec<VmRecord>>;
    /// Insert or replace the record with the same name.
    async fn save(&self, record: &VmRecord) -> Result<()>;
    /// Remove the record. Removing a missing record is not an error.
    async fn delete(&self, record: &VmRecord) -> Result<()>;
}
