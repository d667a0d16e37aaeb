//! Shared port stubs for unit tests.
//!
//! `ScriptedGateway` counts calls per operation, can fail selected operations
//! and yields before answering so concurrent callers interleave.
//! `InMemoryStore` is a map keyed by VM name.

#![allow(clippy::expect_used, dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use vmctl::application::{HypervisorGateway, LifecycleService, VmStore};
use vmctl::domain::{GatewayError, HypervisorCommand, OsProfile, VmRecord};
use vmctl_common::{NewVm, OwnerId, PowerState};

// ── Gateway ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ScriptedGateway {
    calls: Mutex<Vec<String>>,
    responses: BTreeMap<&'static str, String>,
    failing: Vec<&'static str>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    /// Gateway that answers `create` and `fetch address of` with `ip`.
    pub fn with_address(ip: &str) -> Self {
        Self::default()
            .respond("create", &format!("{ip}\r\n"))
            .respond("fetch address of", &format!("{ip}\n"))
    }

    pub fn respond(mut self, operation: &'static str, output: &str) -> Self {
        self.responses.insert(operation, output.to_string());
        self
    }

    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Operations seen so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self) -> usize {
        self.calls().len()
    }

    pub fn count_of(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == operation).count()
    }

    pub fn reset(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl HypervisorGateway for ScriptedGateway {
    async fn run(&self, command: &HypervisorCommand) -> Result<String, GatewayError> {
        let op = command.operation();
        self.calls.lock().expect("calls lock").push(op.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&op) {
            return Err(GatewayError::Failed {
                script: format!("{op}.ps1"),
                code: Some(1),
                stderr: "hypervisor unreachable".to_string(),
            });
        }
        let out = self.responses.get(op).cloned().unwrap_or_default();
        Ok(out.trim_end_matches(['\r', '\n']).to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<String, VmRecord>>,
}

impl InMemoryStore {
    pub fn get(&self, name: &str) -> Option<VmRecord> {
        self.records.lock().expect("store lock").get(name).cloned()
    }

    pub fn put(&self, record: VmRecord) {
        self.records
            .lock()
            .expect("store lock")
            .insert(record.name.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock").len()
    }
}

impl VmStore for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<VmRecord>> {
        Ok(self.get(name))
    }

    async fn find_all_by_owner(&self, owner: &OwnerId) -> Result<Vec<VmRecord>> {
        Ok(self
            .records
            .lock()
            .expect("store lock")
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }

    async fn save(&self, record: &VmRecord) -> Result<()> {
        self.put(record.clone());
        Ok(())
    }

    async fn delete(&self, record: &VmRecord) -> Result<()> {
        self.records.lock().expect("store lock").remove(&record.name);
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub type TestService = LifecycleService<ScriptedGateway, InMemoryStore>;

pub fn service(gateway: ScriptedGateway) -> TestService {
    LifecycleService::new(gateway, InMemoryStore::default())
}

pub fn alice() -> OwnerId {
    OwnerId::new("alice")
}

pub fn new_vm(name: &str, os: &str, cpu: u32, ram: u32, storage: u32) -> NewVm {
    NewVm {
        name: name.to_string(),
        os: os.to_string(),
        num_cpu: cpu,
        ram_gb: ram,
        storage,
    }
}

/// Stored UBUNTU 2/2/10 record owned by alice.
pub fn record(name: &str, state: PowerState, ip: Option<&str>) -> VmRecord {
    let now = Utc::now();
    VmRecord {
        name: name.to_string(),
        os: OsProfile::Ubuntu,
        num_cpu: 2,
        ram_gb: 2,
        storage_gb: 10,
        state,
        ip: ip.map(str::to_string),
        owner: alice(),
        created_at: now,
        updated_at: now,
    }
}
