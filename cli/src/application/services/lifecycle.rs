//! Lifecycle state machine executor.
//!
//! Every operation follows the same two phases: the domain table in
//! `crate::domain::transition` validates the request in memory, then exactly
//! one logical gateway operation runs and, only if it succeeds, the record is
//! mutated and persisted. A failed gateway call leaves the record untouched.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use vmctl_common::OwnerId;

use crate::application::ports::{HypervisorGateway, VmStore};
use crate::domain::transition::{self, Commit, Plan, Transition};
use crate::domain::vm::{self, VmRecord, VmSpec};
use crate::domain::{HypervisorCommand, VmError};

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record after the transition (possibly unchanged).
    Updated(VmRecord),
    /// The VM was deleted; this is its last known record.
    Removed(VmRecord),
}

impl Outcome {
    #[must_use]
    pub fn into_record(self) -> VmRecord {
        match self {
            Self::Updated(r) | Self::Removed(r) => r,
        }
    }
}

/// Create a VM on the hypervisor and persist its record.
///
/// `spec` must already be validated; the caller checks that no record with
/// the same name exists.
///
/// # Errors
///
/// Returns `VmError::Gateway` if the create command fails (nothing is
/// persisted), or `VmError::Store` if the record cannot be saved.
pub async fn create(
    gateway: &impl HypervisorGateway,
    store: &impl VmStore,
    spec: VmSpec,
    owner: OwnerId,
) -> Result<VmRecord, VmError> {
    let command = HypervisorCommand::Create {
        name: spec.name.clone(),
        os: spec.os,
        num_cpu: spec.num_cpu,
        ram_gb: spec.ram_gb,
        storage_gb: spec.storage_gb,
    };
    let output = run(gateway, &command, command.operation()).await?;

    let record = VmRecord::created(spec, vm::parse_address(&output), owner, Utc::now());
    if record.ip.is_none() {
        warn!(vm = %record.name, "create returned no address");
    }
    store
        .save(&record)
        .await
        .map_err(|e| VmError::store(&record.name, e))?;

    info!(vm = %record.name, owner = %record.owner, to = %record.state, "vm created");
    Ok(record)
}

/// Apply `transition` to an existing record.
///
/// # Errors
///
/// Returns the validation error from the transition table without touching
/// the gateway, `VmError::Gateway` if the hypervisor command fails (the
/// record is not modified), or `VmError::Store` if persisting fails.
pub async fn execute(
    gateway: &impl HypervisorGateway,
    store: &impl VmStore,
    mut record: VmRecord,
    requested: Transition,
) -> Result<Outcome, VmError> {
    let (command, commit) = match transition::plan(&record, requested)? {
        Plan::Unchanged => {
            debug!(vm = %record.name, ?requested, "nothing to change");
            return Ok(Outcome::Updated(record));
        }
        Plan::Run { command, commit } => (command, commit),
    };
    let operation = command.operation();
    let from = record.state;

    run(gateway, &command, operation).await?;

    // Start from powered-off is one logical operation made of two calls; a
    // failed address lookup fails the whole start.
    let fetched = if commit.needs_address() {
        let lookup = HypervisorCommand::FetchAddress {
            name: record.name.clone(),
        };
        let output = run(gateway, &lookup, operation).await?;
        vm::parse_address(&output)
    } else {
        None
    };

    if commit == Commit::Remove {
        store
            .delete(&record)
            .await
            .map_err(|e| VmError::store(&record.name, e))?;
        info!(vm = %record.name, from = %from, "vm deleted");
        return Ok(Outcome::Removed(record));
    }

    transition::apply(&mut record, commit, fetched, Utc::now());
    store
        .save(&record)
        .await
        .map_err(|e| VmError::store(&record.name, e))?;

    info!(vm = %record.name, operation, from = %from, to = %record.state, "transition committed");
    Ok(Outcome::Updated(record))
}

async fn run(
    gateway: &impl HypervisorGateway,
    command: &HypervisorCommand,
    operation: &'static str,
) -> Result<String, VmError> {
    let started = Instant::now();
    gateway.run(command).await.map_err(|source| {
        warn!(
            vm = command.vm_name(),
            operation,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            error = %source,
            "hypervisor command failed",
        );
        VmError::Gateway {
            operation,
            name: command.vm_name().to_string(),
            source,
        }
    })
}
