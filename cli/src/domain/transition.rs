//! Lifecycle state machine table.
//!
//! [`plan`] decides, entirely in memory, whether a transition is legal from
//! the record's current state and which hypervisor command it needs.
//! [`apply`] commits the outcome once that command has succeeded. Nothing in
//! here performs I/O.

use chrono::{DateTime, Utc};
use vmctl_common::PowerState;

use crate::domain::command::HypervisorCommand;
use crate::domain::error::VmError;
use crate::domain::policy;
use crate::domain::vm::VmRecord;

/// A requested change to an existing VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
    Suspend,
    Delete,
    ResizeStorage { storage_gb: u32 },
    ResizeCompute { num_cpu: u32, ram_gb: u32 },
}

/// How the record's address changes on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressUpdate {
    Keep,
    Clear,
    /// Replace with the output of a follow-up `FetchAddress` command.
    Fetch,
}

/// Mutation to commit after the command succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Power {
        next: PowerState,
        address: AddressUpdate,
    },
    Storage {
        storage_gb: u32,
    },
    Compute {
        num_cpu: u32,
        ram_gb: u32,
    },
    Remove,
}

impl Commit {
    /// Whether a `FetchAddress` call must follow the main command.
    #[must_use]
    pub fn needs_address(self) -> bool {
        matches!(
            self,
            Commit::Power {
                address: AddressUpdate::Fetch,
                ..
            }
        )
    }
}

/// Outcome of [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to do; return the record as is.
    Unchanged,
    Run {
        command: HypervisorCommand,
        commit: Commit,
    },
}

/// Decide what `transition` requires given the record's current state.
///
/// # Errors
///
/// Returns the validation error for an illegal transition: `AlreadyInState`,
/// `CannotSuspend`, `CannotUpdate`, `CannotUpdateStorage` or
/// `InsufficientResources`.
pub fn plan(record: &VmRecord, transition: Transition) -> Result<Plan, VmError> {
    use PowerState::{PoweredOff, PoweredOn, Suspended};

    let name = record.name.clone();
    let already = |state| VmError::AlreadyInState {
        name: record.name.clone(),
        state,
    };

    let (command, commit) = match (transition, record.state) {
        (Transition::Start, PoweredOn) => return Err(already(PoweredOn)),
        (Transition::Start, PoweredOff) => (
            HypervisorCommand::Start { name },
            Commit::Power {
                next: PoweredOn,
                address: AddressUpdate::Fetch,
            },
        ),
        (Transition::Start, Suspended) => (
            HypervisorCommand::Start { name },
            Commit::Power {
                next: PoweredOn,
                address: AddressUpdate::Keep,
            },
        ),

        (Transition::Stop, PoweredOff) => return Err(already(PoweredOff)),
        (Transition::Stop, PoweredOn | Suspended) => (
            HypervisorCommand::Stop { name },
            Commit::Power {
                next: PoweredOff,
                address: AddressUpdate::Clear,
            },
        ),

        (Transition::Suspend, Suspended) => return Err(already(Suspended)),
        (Transition::Suspend, PoweredOff) => return Err(VmError::CannotSuspend(name)),
        // The stored address survives suspension; only responses hide it.
        (Transition::Suspend, PoweredOn) => (
            HypervisorCommand::Suspend { name },
            Commit::Power {
                next: Suspended,
                address: AddressUpdate::Keep,
            },
        ),

        (Transition::Delete, _) => (HypervisorCommand::Delete { name }, Commit::Remove),

        (Transition::ResizeStorage { storage_gb }, state) => {
            if state != PoweredOff {
                return Err(VmError::CannotUpdate { name, state });
            }
            if storage_gb <= record.storage_gb {
                return Err(VmError::CannotUpdateStorage {
                    name,
                    current: record.storage_gb,
                    requested: storage_gb,
                });
            }
            (
                HypervisorCommand::ResizeStorage { name, storage_gb },
                Commit::Storage { storage_gb },
            )
        }

        (Transition::ResizeCompute { num_cpu, ram_gb }, state) => {
            if num_cpu == record.num_cpu && ram_gb == record.ram_gb {
                return Ok(Plan::Unchanged);
            }
            policy::validate_resize(record.os, num_cpu, ram_gb)?;
            if state != PoweredOff {
                return Err(VmError::CannotUpdate { name, state });
            }
            (
                HypervisorCommand::ResizeCompute {
                    name,
                    num_cpu,
                    ram_gb,
                },
                Commit::Compute { num_cpu, ram_gb },
            )
        }
    };

    Ok(Plan::Run { command, commit })
}

/// Commit a successful transition to `record`.
///
/// `fetched_address` is the (already normalized) output of the follow-up
/// `FetchAddress` call, used only for [`AddressUpdate::Fetch`].
/// [`Commit::Remove`] leaves the record untouched; the caller deletes it.
pub fn apply(
    record: &mut VmRecord,
    commit: Commit,
    fetched_address: Option<String>,
    now: DateTime<Utc>,
) {
    match commit {
        Commit::Power { next, address } => {
            record.state = next;
            match address {
                AddressUpdate::Keep => {}
                AddressUpdate::Clear => record.ip = None,
                AddressUpdate::Fetch => record.ip = fetched_address,
            }
        }
        Commit::Storage { storage_gb } => record.storage_gb = storage_gb,
        Commit::Compute { num_cpu, ram_gb } => {
            record.num_cpu = num_cpu;
            record.ram_gb = ram_gb;
        }
        Commit::Remove => return,
    }
    record.updated_at = now;
}
