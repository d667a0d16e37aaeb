//! Property-based tests for resource floors and storage growth.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;
use vmctl::domain::transition::{Plan, Transition, plan};
use vmctl::domain::{ErrorKind, OsProfile, validate_new, validate_resize};
use vmctl_common::PowerState;

use crate::mocks::{ScriptedGateway, alice, record, service};

fn profile() -> impl Strategy<Value = OsProfile> {
    prop_oneof![Just(OsProfile::Ubuntu), Just(OsProfile::Windows)]
}

// ============================================================================
// Resource floors
// ============================================================================

proptest! {
    /// Requests at or above every floor are accepted.
    #[test]
    fn prop_at_or_above_floor_passes(
        os in profile(),
        extra_cpu in 0u32..64,
        extra_ram in 0u32..256,
        extra_disk in 0u32..2048,
    ) {
        let floor = os.floor();
        prop_assert!(validate_new(
            os,
            floor.min_cpu + extra_cpu,
            floor.min_ram_gb + extra_ram,
            floor.min_storage_gb + extra_disk,
        ).is_ok());
        prop_assert!(validate_resize(os, floor.min_cpu + extra_cpu, floor.min_ram_gb + extra_ram).is_ok());
    }

    /// Any single value below its floor is rejected with InsufficientResources.
    #[test]
    fn prop_below_floor_fails(os in profile(), which in 0usize..3, deficit in 1u32..=4) {
        let floor = os.floor();
        let mut values = [floor.min_cpu, floor.min_ram_gb, floor.min_storage_gb];
        values[which] = values[which].saturating_sub(deficit);
        let err = validate_new(os, values[0], values[1], values[2]).expect_err("below floor");
        prop_assert_eq!(err.kind(), ErrorKind::InsufficientResources);
    }

    /// Profile names match regardless of case.
    #[test]
    fn prop_profile_parse_ignores_case(os in profile(), mask in proptest::collection::vec(any::<bool>(), 7)) {
        let mixed: String = os
            .as_str()
            .chars()
            .zip(mask.iter().cycle())
            .map(|(c, lower)| if *lower { c.to_ascii_lowercase() } else { c })
            .collect();
        prop_assert_eq!(OsProfile::parse(&mixed).expect("known profile"), os);
    }

    /// Unknown profile names are rejected.
    #[test]
    fn prop_unknown_profile_rejected(name in "[a-z]{1,12}") {
        prop_assume!(name != "ubuntu" && name != "windows");
        let err = OsProfile::parse(&name).expect_err("unknown");
        prop_assert_eq!(err.kind(), ErrorKind::InvalidProfile);
    }
}

// ============================================================================
// Storage monotonicity
// ============================================================================

proptest! {
    /// Planning a storage resize only ever succeeds for strictly larger sizes.
    #[test]
    fn prop_storage_plan_only_grows(current in 4u32..1000, requested in 0u32..1000) {
        let mut vm = record("vm1", PowerState::PoweredOff, None);
        vm.storage_gb = current;
        let result = plan(&vm, Transition::ResizeStorage { storage_gb: requested });
        if requested > current {
            prop_assert!(matches!(result, Ok(Plan::Run { .. })), "expected Ok(Plan::Run)");
        } else {
            let err = result.expect_err("not larger");
            prop_assert_eq!(err.kind(), ErrorKind::CannotUpdateStorage);
        }
    }

    /// Over any sequence of storage requests the stored size never decreases
    /// and ends at the largest size requested.
    #[test]
    fn prop_stored_storage_never_decreases(requests in proptest::collection::vec(1u32..200, 1..12)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let svc = service(ScriptedGateway::default());
            svc.store().put(record("vm1", PowerState::PoweredOff, None));
            let mut last = 10;
            for size in &requests {
                let request = vmctl_common::UpdateStorage { name: "vm1".to_string(), storage: *size };
                let _ = svc.resize_storage(&alice(), &request).await;
                let stored = svc.store().get("vm1").expect("stored").storage_gb;
                assert!(stored >= last, "storage shrank from {last} to {stored}");
                last = stored;
            }
            let expected = requests.iter().copied().fold(10, u32::max);
            assert_eq!(last, expected);
        });
    }
}
