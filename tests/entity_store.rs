//! Behaviour of the entity store against the in-memory backend.

mod common;

use common::{accident, date, owner, policy, populated, single_owner, store, vehicle};
use insure::{
    Accident, Collection, Owner, Policy, PolicyStatus, Record, RequestState, StoreError, Vehicle,
    view::{self, Filter, NOT_AVAILABLE},
};
use test_case::test_case;

#[test]
fn create_then_list_adds_exactly_the_submitted_record() {
    let mut store = store(populated());
    let before = store.list::<Vehicle>().unwrap().to_vec();
    let payload = vehicle("DL-03-XY-4455", "Swift", 3);

    let created = store.create(&payload).unwrap();
    let after = store.list::<Vehicle>().unwrap();

    assert_eq!(after.len(), before.len() + 1);
    let added: Vec<_> = after
        .iter()
        .filter(|record| !before.contains(record))
        .collect();
    assert_eq!(added, vec![&Record::new(created.id, payload)]);
}

#[test]
fn owners_scenario_assigns_a_larger_id() {
    let mut store = store(single_owner());

    let owners = store.list::<Owner>().unwrap();
    assert_eq!(
        owners,
        &[Record::new(
            1,
            owner("Anjali Sharma", "123 MG Road", "9876543210")
        )]
    );

    store.create(&owner("Rohan", "X", "123")).unwrap();
    let owners = store.list::<Owner>().unwrap();

    assert_eq!(owners.len(), 2);
    assert!(owners[1].id > 1);
    assert_eq!(owners[1].fields, owner("Rohan", "X", "123"));
}

#[test]
fn update_replaces_the_whole_record() {
    let mut store = store(populated());
    let replacement = accident("Outer Ring Road", 2);

    store.update(1, &replacement).unwrap();
    let accidents = store.list::<Accident>().unwrap();

    assert_eq!(accidents, &[Record::new(1, replacement)]);
}

#[test]
fn cancelling_a_policy_keeps_the_rest_of_the_payload() {
    let mut store = store(populated());
    let mut payload = store
        .list::<Policy>()
        .unwrap()
        .iter()
        .find(|p| p.id == 2)
        .unwrap()
        .fields
        .clone();
    payload.status = PolicyStatus::Cancelled;
    payload.end_date = date("2024-05-01");

    store.update(2, &payload).unwrap();
    store.list::<Policy>().unwrap();

    let updated = store.resolve_reference::<Policy>(2).unwrap();
    assert_eq!(updated.fields.status, PolicyStatus::Cancelled);
    assert_eq!(updated.fields, payload);
}

#[test_case(Collection::Owners, 2; "owner")]
#[test_case(Collection::Vehicles, 3; "vehicle")]
#[test_case(Collection::Policies, 1; "policy")]
#[test_case(Collection::Accidents, 1; "accident")]
fn remove_then_list_drops_the_record(collection: Collection, id: u64) {
    let mut store = store(populated());
    let before = store.list_collection(collection).unwrap();

    store.remove_from(collection, id).unwrap();
    let after = store.list_collection(collection).unwrap();

    assert_eq!(after, before - 1);
    let gone = insure::Reference { collection, id };
    assert!(!store.cache().contains(gone));
}

#[test]
fn update_of_missing_record_is_rejected() {
    let mut store = store(populated());

    let error = store.update(42, &owner("Nobody", "Nowhere", "000")).unwrap_err();

    assert!(matches!(
        error,
        StoreError::ServerRejected { status: 404, .. }
    ));
}

#[test]
fn resolve_reference_never_fails() {
    let mut store = store(populated());
    store.refresh_all().unwrap();

    assert!(store.resolve_reference::<Owner>(3).is_some());
    assert!(store.resolve_reference::<Owner>(0).is_none());
    assert!(store.resolve_reference::<Vehicle>(u64::MAX).is_none());
    assert!(store.resolve_reference::<Accident>(2).is_none());
}

#[test]
fn resolution_reflects_the_latest_list_only() {
    let mut store = store(populated());
    store.list::<Owner>().unwrap();

    store.remove::<Owner>(2).unwrap();
    assert!(store.resolve_reference::<Owner>(2).is_some());

    store.list::<Owner>().unwrap();
    assert!(store.resolve_reference::<Owner>(2).is_none());
}

#[test]
fn failed_list_keeps_cache_and_raises_one_failure() {
    let mut store = store(single_owner());
    store.list::<Owner>().unwrap();
    let before = store.cached::<Owner>().to_vec();

    store.backend_mut().set_offline(true);
    let result = store.list::<Owner>();

    let error = result.unwrap_err();
    assert!(matches!(error, StoreError::NetworkFailure { .. }));
    assert_eq!(store.cached::<Owner>(), before.as_slice());
    assert_eq!(store.banner(), Some(&error));
    assert_eq!(store.state(Collection::Owners), RequestState::Failed);
    assert_eq!(store.backend().request_count(), 2);
}

#[test]
fn deleted_owner_renders_as_not_available() {
    let mut store = store(populated());
    store.remove::<Owner>(1).unwrap();
    store.refresh_all().unwrap();

    let table = view::table::<Vehicle>(store.cache(), &Filter::default());

    let owners: Vec<_> = table.rows.iter().map(|row| row[5].as_str()).collect();
    assert_eq!(owners, vec![NOT_AVAILABLE, "Rohan Mehta", NOT_AVAILABLE]);
    assert_eq!(store.cache().unresolved_references().len(), 2);
}

#[test]
fn cascading_delete_takes_the_vehicles_along() {
    let mut store = store(populated());

    let removed = store.remove_owner_cascading(1).unwrap();
    store.refresh_all().unwrap();

    assert_eq!(removed, 2);
    let remaining: Vec<_> = store.cached::<Vehicle>().iter().map(|v| v.id).collect();
    assert_eq!(remaining, vec![2]);
    assert!(store.resolve_reference::<Owner>(1).is_none());
}

#[test]
fn cascade_stops_at_first_failure() {
    let mut store = store(populated());
    store.backend_mut().reject_with(Some(500));

    let error = store.remove_owner_cascading(1).unwrap_err();

    assert!(matches!(error, StoreError::ServerRejected { .. }));
    store.backend_mut().reject_with(None);
    assert_eq!(store.list::<Owner>().unwrap().len(), 3);
}

#[test]
fn policy_listing_resolves_vehicle_numbers() {
    let mut store = store(populated());
    for collection in view::required_collections(Collection::Policies) {
        store.list_collection(collection).unwrap();
    }

    let table = view::table::<Policy>(
        store.cache(),
        &Filter::default().search(Some("pol-002")),
    );

    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][2], "MH-12-CD-5678");
    assert_eq!(table.rows[0][6], "expired");
}

#[test]
fn new_policy_defaults_to_active() {
    let mut store = store(populated());
    let mut payload = policy("POL-003", 3, PolicyStatus::default());
    payload.amount = 9800.5;

    let created = store.create(&payload).unwrap();

    assert_eq!(created.id, 3);
    assert_eq!(created.fields.status, PolicyStatus::Active);
}
