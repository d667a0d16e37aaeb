//! Lifecycle service façade — one entry point per VM operation.
//!
//! Every entry point takes the calling principal explicitly, serializes work
//! per VM name, looks the record up, and hands it to the state machine
//! executor in [`super::lifecycle`]. Failures are returned as [`VmError`]
//! values for the transport collaborator to map.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use tracing::{debug, instrument};
use vmctl_common::{NewVm, OwnerId, UpdateCpuRam, UpdateStorage};

use crate::application::ports::{HypervisorGateway, VmStore};
use crate::application::services::lifecycle::{self, Outcome};
use crate::application::services::locks::NameLocks;
use crate::domain::{Transition, VmError, VmRecord, VmSpec};

/// VM lifecycle operations over a gateway and a store.
pub struct LifecycleService<G, S> {
    gateway: G,
    store: S,
    locks: NameLocks,
}

impl<G: HypervisorGateway, S: VmStore> LifecycleService<G, S> {
    pub fn new(gateway: G, store: S) -> Self {
        Self {
            gateway,
            store,
            locks: NameLocks::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create and power on a new VM owned by `caller`.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `InvalidProfile`, `InsufficientResources`,
    /// `AlreadyExists`, `GatewayError` or `StoreError`.
    #[instrument(skip_all, fields(vm = %request.name, caller = %caller))]
    pub async fn create(&self, caller: &OwnerId, request: &NewVm) -> Result<VmRecord, VmError> {
        let spec = VmSpec::parse(
            &request.name,
            &request.os,
            request.num_cpu,
            request.ram_gb,
            request.storage,
        )?;
        let _guard = self.locks.acquire(&spec.name).await;
        if self.lookup(&spec.name).await?.is_some() {
            return Err(VmError::AlreadyExists(spec.name));
        }
        lifecycle::create(&self.gateway, &self.store, spec, caller.clone()).await
    }

    /// Delete a VM and its record. Returns the last known record.
    ///
    /// # Errors
    ///
    /// `NotFound`, `GatewayError` or `StoreError`.
    #[instrument(skip_all, fields(vm = %name, caller = %caller))]
    pub async fn delete(&self, caller: &OwnerId, name: &str) -> Result<VmRecord, VmError> {
        self.transition(name, Transition::Delete).await
    }

    /// All VMs owned by `caller`. Suspended VMs are listed without address.
    ///
    /// # Errors
    ///
    /// `StoreError` if the records cannot be read.
    #[instrument(skip_all, fields(caller = %caller))]
    pub async fn list_for_owner(&self, caller: &OwnerId) -> Result<Vec<VmRecord>, VmError> {
        let records = self
            .store
            .find_all_by_owner(caller)
            .await
            .map_err(|e| VmError::store(caller.as_str(), e))?;
        debug!(count = records.len(), "listed vms");
        Ok(records.iter().map(VmRecord::for_listing).collect())
    }

    /// Power on a stopped or suspended VM.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyInState`, `GatewayError` or `StoreError`.
    #[instrument(skip_all, fields(vm = %name, caller = %caller))]
    pub async fn start(&self, caller: &OwnerId, name: &str) -> Result<VmRecord, VmError> {
        self.transition(name, Transition::Start).await
    }

    /// Power off a running or suspended VM.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyInState`, `GatewayError` or `StoreError`.
    #[instrument(skip_all, fields(vm = %name, caller = %caller))]
    pub async fn stop(&self, caller: &OwnerId, name: &str) -> Result<VmRecord, VmError> {
        self.transition(name, Transition::Stop).await
    }

    /// Suspend a running VM.
    ///
    /// The stored record keeps its address so a resume does not need to look
    /// it up again; the returned copy omits it.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AlreadyInState`, `CannotSuspend`, `GatewayError` or
    /// `StoreError`.
    #[instrument(skip_all, fields(vm = %name, caller = %caller))]
    pub async fn suspend(&self, caller: &OwnerId, name: &str) -> Result<VmRecord, VmError> {
        let record = self.transition(name, Transition::Suspend).await?;
        Ok(record.without_address())
    }

    /// Grow the disk of a powered-off VM.
    ///
    /// # Errors
    ///
    /// `NotFound`, `CannotUpdate`, `CannotUpdateStorage`, `GatewayError` or
    /// `StoreError`.
    #[instrument(skip_all, fields(vm = %request.name, caller = %caller))]
    pub async fn resize_storage(
        &self,
        caller: &OwnerId,
        request: &UpdateStorage,
    ) -> Result<VmRecord, VmError> {
        let transition = Transition::ResizeStorage {
            storage_gb: request.storage,
        };
        self.transition(&request.name, transition).await
    }

    /// Change CPU count and RAM of a powered-off VM.
    ///
    /// Requesting the current values succeeds without running anything.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InsufficientResources`, `CannotUpdate`, `GatewayError` or
    /// `StoreError`.
    #[instrument(skip_all, fields(vm = %request.name, caller = %caller))]
    pub async fn resize_compute(
        &self,
        caller: &OwnerId,
        request: &UpdateCpuRam,
    ) -> Result<VmRecord, VmError> {
        let transition = Transition::ResizeCompute {
            num_cpu: request.num_cpu,
            ram_gb: request.ram_gb,
        };
        self.transition(&request.name, transition).await
    }

    async fn transition(&self, name: &str, transition: Transition) -> Result<VmRecord, VmError> {
        let _guard = self.locks.acquire(name).await;
        let record = self
            .lookup(name)
            .await?
            .ok_or_else(|| VmError::NotFound(name.to_string()))?;
        lifecycle::execute(&self.gateway, &self.store, record, transition)
            .await
            .map(Outcome::into_record)
    }

    async fn lookup(&self, name: &str) -> Result<Option<VmRecord>, VmError> {
        self.store
            .find_by_name(name)
            .await
            .map_err(|e| VmError::store(name, e))
    }
}
