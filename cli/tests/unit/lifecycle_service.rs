//! Lifecycle service behaviour over stub ports.

#![allow(clippy::expect_used)]

use std::time::Duration;

use vmctl::domain::{ErrorKind, OsProfile};
use vmctl_common::{OwnerId, PowerState, UpdateCpuRam, UpdateStorage};

use crate::mocks::{ScriptedGateway, alice, new_vm, record, service};

fn grow(name: &str, storage: u32) -> UpdateStorage {
    UpdateStorage {
        name: name.to_string(),
        storage,
    }
}

fn compute(name: &str, num_cpu: u32, ram_gb: u32) -> UpdateCpuRam {
    UpdateCpuRam {
        name: name.to_string(),
        num_cpu,
        ram_gb,
    }
}

// ── create ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_powers_on_with_address_and_persists() {
    let svc = service(ScriptedGateway::with_address("10.0.0.5"));
    let vm = svc
        .create(&alice(), &new_vm("vm1", "ubuntu", 2, 2, 10))
        .await
        .expect("create");

    assert_eq!(vm.state, PowerState::PoweredOn);
    assert_eq!(vm.ip.as_deref(), Some("10.0.0.5"));
    assert_eq!(vm.os, OsProfile::Ubuntu);
    assert_eq!(vm.owner, alice());
    assert_eq!(svc.store().get("vm1"), Some(vm));
    assert_eq!(svc.gateway().calls(), ["create"]);
}

#[tokio::test]
async fn create_rejections_never_reach_the_gateway() {
    let svc = service(ScriptedGateway::default());
    let cases = [
        (new_vm("vm1", "solaris", 2, 2, 10), ErrorKind::InvalidProfile),
        (new_vm("vm1", "windows", 1, 1, 40), ErrorKind::InsufficientResources),
        (new_vm("vm1", "ubuntu", 1, 1, 3), ErrorKind::InsufficientResources),
        (new_vm("bad name", "ubuntu", 1, 1, 4), ErrorKind::InvalidName),
    ];
    for (request, expected) in cases {
        let err = svc.create(&alice(), &request).await.expect_err("rejected");
        assert_eq!(err.kind(), expected, "{request:?}");
    }
    assert_eq!(svc.gateway().count(), 0);
    assert_eq!(svc.store().len(), 0);
}

#[tokio::test]
async fn create_existing_name_is_rejected() {
    let svc = service(ScriptedGateway::default());
    svc.store()
        .put(record("vm1", PowerState::PoweredOff, None));
    let err = svc
        .create(&alice(), &new_vm("vm1", "ubuntu", 2, 2, 10))
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(svc.gateway().count(), 0);
}

#[tokio::test]
async fn failed_create_persists_nothing() {
    let svc = service(ScriptedGateway::default().failing("create"));
    let err = svc
        .create(&alice(), &new_vm("vm1", "ubuntu", 2, 2, 10))
        .await
        .expect_err("gateway down");
    assert_eq!(err.kind(), ErrorKind::GatewayError);
    assert_eq!(err.to_string(), "Fail to create VM vm1");
    assert!(svc.store().get("vm1").is_none());
}

// ── power transitions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn start_when_running_is_already_in_state() {
    let svc = service(ScriptedGateway::default());
    svc.store()
        .put(record("vm1", PowerState::PoweredOn, Some("10.0.0.5")));
    let err = svc.start(&alice(), "vm1").await.expect_err("running");
    assert_eq!(err.kind(), ErrorKind::AlreadyInState);
    assert_eq!(err.to_string(), "VM vm1 already in POWERED_ON state");
    assert_eq!(svc.gateway().count(), 0);
}

#[tokio::test]
async fn stop_then_start_refetches_address() {
    let svc = service(ScriptedGateway::default().respond("fetch address of", "10.0.0.9\n"));
    svc.store()
        .put(record("vm1", PowerState::PoweredOn, Some("10.0.0.5")));

    let stopped = svc.stop(&alice(), "vm1").await.expect("stop");
    assert_eq!(stopped.state, PowerState::PoweredOff);
    assert!(stopped.ip.is_none());

    let started = svc.start(&alice(), "vm1").await.expect("start");
    assert_eq!(started.state, PowerState::PoweredOn);
    assert_eq!(started.ip.as_deref(), Some("10.0.0.9"));
    assert_eq!(svc.gateway().calls(), ["stop", "start", "fetch address of"]);
}

#[tokio::test]
async fn suspend_then_start_keeps_stored_address() {
    let svc = service(ScriptedGateway::with_address("10.0.0.9"));
    svc.store()
        .put(record("vm1", PowerState::PoweredOn, Some("10.0.0.5")));

    svc.suspend(&alice(), "vm1").await.expect("suspend");
    let resumed = svc.start(&alice(), "vm1").await.expect("start");

    assert_eq!(resumed.state, PowerState::PoweredOn);
    assert_eq!(resumed.ip.as_deref(), Some("10.0.0.5"));
    assert_eq!(svc.gateway().count_of("fetch address of"), 0);
}

#[tokio::test]
async fn suspend_rules() {
    let svc = service(ScriptedGateway::default());
    svc.store().put(record("off", PowerState::PoweredOff, None));
    svc.store()
        .put(record("paused", PowerState::Suspended, Some("10.0.0.5")));

    let err = svc.suspend(&alice(), "off").await.expect_err("off");
    assert_eq!(err.kind(), ErrorKind::CannotSuspend);
    let err = svc.suspend(&alice(), "paused").await.expect_err("paused");
    assert_eq!(err.kind(), ErrorKind::AlreadyInState);
    assert_eq!(svc.gateway().count(), 0);
}

#[tokio::test]
async fn stop_from_suspended_clears_address() {
    let svc = service(ScriptedGateway::default());
    svc.store()
        .put(record("vm1", PowerState::Suspended, Some("10.0.0.5")));
    let vm = svc.stop(&alice(), "vm1").await.expect("stop");
    assert_eq!(vm.state, PowerState::PoweredOff);
    assert!(svc.store().get("vm1").expect("stored").ip.is_none());
}

#[tokio::test]
async fn unknown_name_is_not_found_for_every_operation() {
    let svc = service(ScriptedGateway::default());
    let owner = alice();
    let results = [
        svc.start(&owner, "ghost").await.map(|_| ()),
        svc.stop(&owner, "ghost").await.map(|_| ()),
        svc.suspend(&owner, "ghost").await.map(|_| ()),
        svc.delete(&owner, "ghost").await.map(|_| ()),
        svc.resize_storage(&owner, &grow("ghost", 50)).await.map(|_| ()),
        svc.resize_compute(&owner, &compute("ghost", 2, 2)).await.map(|_| ()),
    ];
    for result in results {
        let err = result.expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Not found VM with name: ghost");
    }
    assert_eq!(svc.gateway().count(), 0);
}

// ── gateway failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_failure_leaves_record_identical() {
    let failing = [
        "start", "stop", "suspend", "delete", "update hard disk", "update CPU or RAM",
    ];
    for op in failing {
        let svc = service(ScriptedGateway::default().failing(op));
        let state = match op {
            "stop" | "suspend" | "delete" => PowerState::PoweredOn,
            _ => PowerState::PoweredOff,
        };
        let before = record("vm1", state, (state == PowerState::PoweredOn).then_some("10.0.0.5"));
        svc.store().put(before.clone());

        let result = match op {
            "start" => svc.start(&alice(), "vm1").await,
            "stop" => svc.stop(&alice(), "vm1").await,
            "suspend" => svc.suspend(&alice(), "vm1").await,
            "delete" => svc.delete(&alice(), "vm1").await,
            "update hard disk" => svc.resize_storage(&alice(), &grow("vm1", 20)).await,
            _ => svc.resize_compute(&alice(), &compute("vm1", 4, 8)).await,
        };

        let err = result.expect_err(op);
        assert_eq!(err.kind(), ErrorKind::GatewayError, "{op}");
        assert_eq!(svc.store().get("vm1"), Some(before), "{op}");
        assert_eq!(svc.gateway().count(), 1, "{op}: no retries");
    }
}

#[tokio::test]
async fn failed_address_lookup_fails_start_from_off() {
    let svc = service(ScriptedGateway::default().failing("fetch address of"));
    let before = record("vm1", PowerState::PoweredOff, None);
    svc.store().put(before.clone());

    let err = svc.start(&alice(), "vm1").await.expect_err("lookup failed");

    assert_eq!(err.kind(), ErrorKind::GatewayError);
    assert_eq!(err.to_string(), "Fail to start VM vm1");
    assert_eq!(svc.store().get("vm1"), Some(before));
}

// ── resize ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn storage_must_strictly_grow() {
    let svc = service(ScriptedGateway::default());
    svc.store().put(record("vm1", PowerState::PoweredOff, None));

    for size in [5, 10] {
        let err = svc
            .resize_storage(&alice(), &grow("vm1", size))
            .await
            .expect_err("not larger");
        assert_eq!(err.kind(), ErrorKind::CannotUpdateStorage);
    }
    assert_eq!(svc.gateway().count(), 0);

    let vm = svc
        .resize_storage(&alice(), &grow("vm1", 11))
        .await
        .expect("grow");
    assert_eq!(vm.storage_gb, 11);
    assert_eq!(svc.gateway().calls(), ["update hard disk"]);
}

#[tokio::test]
async fn resize_requires_powered_off() {
    let svc = service(ScriptedGateway::default());
    svc.store()
        .put(record("vm1", PowerState::Suspended, Some("10.0.0.5")));

    let err = svc
        .resize_storage(&alice(), &grow("vm1", 64))
        .await
        .expect_err("suspended");
    assert_eq!(err.kind(), ErrorKind::CannotUpdate);
    let err = svc
        .resize_compute(&alice(), &compute("vm1", 4, 8))
        .await
        .expect_err("suspended");
    assert_eq!(err.kind(), ErrorKind::CannotUpdate);
    assert_eq!(svc.gateway().count(), 0);
}

#[tokio::test]
async fn identical_compute_resize_is_a_free_success() {
    let svc = service(ScriptedGateway::default());
    let before = record("vm1", PowerState::PoweredOn, Some("10.0.0.5"));
    svc.store().put(before.clone());

    let vm = svc
        .resize_compute(&alice(), &compute("vm1", 2, 2))
        .await
        .expect("no-op");

    assert_eq!(vm, before);
    assert_eq!(svc.gateway().count(), 0);
}

#[tokio::test]
async fn compute_resize_below_floor_is_rejected() {
    let svc = service(ScriptedGateway::default());
    svc.store().put(record("vm1", PowerState::PoweredOff, None));
    let err = svc
        .resize_compute(&alice(), &compute("vm1", 0, 2))
        .await
        .expect_err("no cpu");
    assert_eq!(err.kind(), ErrorKind::InsufficientResources);
    assert_eq!(svc.gateway().count(), 0);
}

#[tokio::test]
async fn compute_resize_updates_record() {
    let svc = service(ScriptedGateway::default());
    svc.store().put(record("vm1", PowerState::PoweredOff, None));
    let vm = svc
        .resize_compute(&alice(), &compute("vm1", 4, 16))
        .await
        .expect("resize");
    assert_eq!((vm.num_cpu, vm.ram_gb), (4, 16));
    assert_eq!(svc.store().get("vm1"), Some(vm));
}

// ── delete / list ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_record_in_any_state() {
    for state in [PowerState::PoweredOn, PowerState::PoweredOff, PowerState::Suspended] {
        let svc = service(ScriptedGateway::default());
        svc.store().put(record("vm1", state, None));
        let last = svc.delete(&alice(), "vm1").await.expect("delete");
        assert_eq!(last.name, "vm1");
        assert!(svc.store().get("vm1").is_none());
        assert_eq!(svc.gateway().calls(), ["delete"]);
    }
}

#[tokio::test]
async fn listing_hides_suspended_addresses_and_other_owners() {
    let svc = service(ScriptedGateway::default());
    svc.store()
        .put(record("a-running", PowerState::PoweredOn, Some("10.0.0.5")));
    svc.store()
        .put(record("b-paused", PowerState::Suspended, Some("10.0.0.6")));
    let mut foreign = record("c-foreign", PowerState::PoweredOn, Some("10.0.0.7"));
    foreign.owner = OwnerId::new("bob");
    svc.store().put(foreign);

    let listed = svc.list_for_owner(&alice()).await.expect("list");

    let summary: Vec<_> = listed
        .iter()
        .map(|r| (r.name.as_str(), r.ip.as_deref()))
        .collect();
    assert_eq!(
        summary,
        [("a-running", Some("10.0.0.5")), ("b-paused", None)]
    );
    assert_eq!(
        svc.store().get("b-paused").expect("stored").ip.as_deref(),
        Some("10.0.0.6")
    );
}

// ── worked example ────────────────────────────────────────────────────────────

#[tokio::test]
async fn example_walk() {
    let svc = service(ScriptedGateway::with_address("10.0.0.5"));

    let vm = svc
        .create(&alice(), &new_vm("vm1", "ubuntu", 2, 2, 10))
        .await
        .expect("create");
    assert_eq!(vm.state, PowerState::PoweredOn);
    assert!(vm.ip.is_some());

    let vm = svc.suspend(&alice(), "vm1").await.expect("suspend");
    assert_eq!(vm.state, PowerState::Suspended);
    assert!(vm.ip.is_none());
    assert_eq!(
        svc.store().get("vm1").expect("stored").ip.as_deref(),
        Some("10.0.0.5")
    );

    let vm = svc.stop(&alice(), "vm1").await.expect("stop");
    assert_eq!(vm.state, PowerState::PoweredOff);
    assert!(vm.ip.is_none());

    let err = svc
        .resize_storage(&alice(), &grow("vm1", 5))
        .await
        .expect_err("shrink");
    assert_eq!(err.kind(), ErrorKind::CannotUpdateStorage);
}

// ── concurrency ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_name_operations_are_serialized() {
    let svc = service(ScriptedGateway::default().slow(Duration::from_millis(20)));
    svc.store().put(record("vm1", PowerState::PoweredOff, None));
    let owner = alice();

    let (first, second) = tokio::join!(svc.start(&owner, "vm1"), svc.start(&owner, "vm1"));

    let errors: Vec<_> = [first, second]
        .into_iter()
        .filter_map(Result::err)
        .map(|e| e.kind())
        .collect();
    assert_eq!(errors, [ErrorKind::AlreadyInState]);
    assert_eq!(svc.gateway().count_of("start"), 1);
    assert_eq!(svc.gateway().max_in_flight(), 1);
}

#[tokio::test]
async fn distinct_names_run_concurrently() {
    let svc = service(ScriptedGateway::default().slow(Duration::from_millis(20)));
    svc.store().put(record("vm1", PowerState::PoweredOn, Some("10.0.0.5")));
    svc.store().put(record("vm2", PowerState::PoweredOn, Some("10.0.0.6")));
    let owner = alice();

    let (a, b) = tokio::join!(svc.stop(&owner, "vm1"), svc.stop(&owner, "vm2"));

    a.expect("stop vm1");
    b.expect("stop vm2");
    assert_eq!(svc.gateway().max_in_flight(), 2);
}
