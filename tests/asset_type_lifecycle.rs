//! Asset type lifecycle tests
//!
//! Create, update and delete against a live store, including the usage and
//! reference guards and concurrent catalog mutation.

mod common;

use assetreg::schema::{AssetType, SchemaCatalog};
use assetreg::storage::Transaction;
use assetreg::AssetError;
use common::*;
use serde_json::{json, Value};

fn delete(registry: &assetreg::Registry, tag: &str, force: bool) -> assetreg::AssetResult<Value> {
    registry.invoke_by_name(
        "deleteAssetType",
        &json!({"assetTypes": [{"tag": tag, "force": force}]}),
        &org1(),
    )
}

fn update(registry: &assetreg::Registry, patch: Value) -> assetreg::AssetResult<Value> {
    registry.invoke_by_name("updateAssetType", &json!({ "assetTypes": [patch] }), &org1())
}

fn put(registry: &assetreg::Registry, asset: Value) -> assetreg::AssetResult<Value> {
    registry.invoke_by_name("putAsset", &asset, &org1())
}

fn tags(registry: &assetreg::Registry) -> Vec<String> {
    registry
        .catalog()
        .unwrap()
        .iter()
        .map(|def| def.tag.clone())
        .collect()
}

// =============================================================================
// Create
// =============================================================================

#[test]
fn test_create_marks_types_dynamic() {
    let registry = registry();
    let mut person = sample_person();
    person["dynamic"] = json!(false);

    let created = create(&registry, vec![person]).unwrap();

    assert_eq!(created[0]["tag"], "samplePerson");
    assert_eq!(created[0]["dynamic"], true);
    assert!(registry.catalog().unwrap().get("samplePerson").unwrap().dynamic);
}

#[test]
fn test_create_batch_may_reference_itself() {
    let registry = registry();

    // sampleBook names samplePerson, which comes later in the batch
    create(&registry, vec![sample_book(), sample_person()]).unwrap();

    assert_eq!(tags(&registry), vec!["sampleBook", "samplePerson"]);
}

#[test]
fn test_create_duplicate_tag_conflicts() {
    let registry = seeded_registry();

    let err = create(&registry, vec![sample_person()]).unwrap_err();
    assert!(matches!(err, AssetError::Conflict(_)));
}

#[test]
fn test_create_duplicate_within_batch_conflicts() {
    let registry = registry();

    let err = create(&registry, vec![sample_secret(), sample_secret()]).unwrap_err();
    assert!(matches!(err, AssetError::Conflict(_)));
    assert!(registry.catalog().unwrap().is_empty());
}

#[test]
fn test_create_batch_aborts_on_invalid_item() {
    let registry = registry();
    let keyless = json!({
        "tag": "sampleNote",
        "label": "Note",
        "props": [{"tag": "text", "label": "Text", "dataType": "string"}]
    });

    let err = create(&registry, vec![sample_secret(), keyless]).unwrap_err();

    assert!(matches!(err, AssetError::Validation { .. }));
    assert!(tags(&registry).is_empty());
}

#[test]
fn test_create_rejects_unknown_data_type() {
    let registry = registry();
    let def = json!({
        "tag": "sampleCar",
        "label": "Car",
        "props": [{"tag": "plate", "label": "Plate", "dataType": "licensePlate", "isKey": true}]
    });

    let err = create(&registry, vec![def]).unwrap_err();
    assert!(matches!(err, AssetError::UnknownType(ref name) if name == "licensePlate"));
}

#[test]
fn test_create_rejects_dangling_reference() {
    let registry = registry();

    let err = create(&registry, vec![sample_book()]).unwrap_err();
    assert!(matches!(err, AssetError::NotFound(_)));
}

#[test]
fn test_create_requires_asset_types() {
    let registry = registry();

    let err = registry
        .invoke_by_name("createAssetType", &json!({"assetTypes": []}), &org1())
        .unwrap_err();
    assert!(matches!(err, AssetError::Validation { ref field, .. } if field == "assetTypes"));

    let err = registry
        .invoke_by_name("createAssetType", &json!({}), &org1())
        .unwrap_err();
    assert!(matches!(err, AssetError::Validation { .. }));
}

// =============================================================================
// Update
// =============================================================================

#[test]
fn test_update_is_idempotent() {
    let registry = seeded_registry();
    let patch = json!({
        "tag": "samplePerson",
        "label": "Person (v2)",
        "props": [
            {"tag": "name", "label": "Renamed", "dataType": "number"},
            {"tag": "nickname", "label": "Nickname", "dataType": "string"}
        ]
    });

    let first = update(&registry, patch.clone()).unwrap();
    let second = update(&registry, patch).unwrap();
    assert_eq!(first, second);

    let catalog = registry.catalog().unwrap();
    let person = catalog.get("samplePerson").unwrap();
    assert_eq!(person.label, "Person (v2)");
    assert_eq!(person.props.len(), 5);
    assert_eq!(person.find_prop("name").unwrap().data_type, "string");
    assert_eq!(person.props[4].tag, "nickname");
}

#[test]
fn test_update_replaces_readers() {
    let registry = seeded_registry();

    update(&registry, json!({"tag": "sampleSecret", "readers": ["org2MSP"]})).unwrap();

    let catalog = registry.catalog().unwrap();
    let secret = catalog.get("sampleSecret").unwrap();
    assert!(secret.readers.permits("org2MSP"));
    assert!(!secret.readers.permits("org1MSP"));
}

#[test]
fn test_update_new_key_prop_on_used_type_is_rejected() {
    let registry = seeded_registry();
    put(&registry, json!({"@assetType": "samplePerson", "name": "Maria"})).unwrap();

    let surname = json!({"tag": "surname", "label": "Surname", "dataType": "string", "isKey": true});
    let err = update(&registry, json!({"tag": "samplePerson", "props": [surname.clone()]})).unwrap_err();
    assert!(matches!(err, AssetError::InUse(ref tag) if tag == "samplePerson"));

    // No instances of sampleSecret exist, so a new key is fine there
    let mut code = surname;
    code["tag"] = json!("code");
    update(&registry, json!({"tag": "sampleSecret", "props": [code]})).unwrap();
    let catalog = registry.catalog().unwrap();
    assert_eq!(catalog.get("sampleSecret").unwrap().key_props().count(), 2);
}

#[test]
fn test_update_unknown_tag_not_found() {
    let registry = seeded_registry();

    let err = update(&registry, json!({"tag": "sampleCar", "label": "Car"})).unwrap_err();
    assert!(matches!(err, AssetError::NotFound(_)));
}

#[test]
fn test_update_invalid_prop_aborts_batch() {
    let registry = seeded_registry();
    let args = json!({"assetTypes": [
        {"tag": "samplePerson", "label": "Changed"},
        {"tag": "sampleBook", "props": [{"tag": "isbn", "label": "ISBN", "dataType": "barcode"}]}
    ]});

    let err = registry
        .invoke_by_name("updateAssetType", &args, &org1())
        .unwrap_err();

    assert!(matches!(err, AssetError::UnknownType(_)));
    assert_eq!(
        registry.catalog().unwrap().get("samplePerson").unwrap().label,
        "Person"
    );
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_in_use_requires_force() {
    let registry = registry();
    create(&registry, vec![sample_person()]).unwrap();
    put(&registry, json!({"@assetType": "samplePerson", "name": "Maria"})).unwrap();

    let err = delete(&registry, "samplePerson", false).unwrap_err();
    assert!(matches!(err, AssetError::InUse(_)));
    assert_eq!(err.code(), "ASSET_IN_USE");

    let deleted = delete(&registry, "samplePerson", true).unwrap();
    assert_eq!(deleted[0]["tag"], "samplePerson");
    assert!(!registry.catalog().unwrap().contains("samplePerson"));

    // The instance outlives its type
    let orphan = registry.store().get("samplePerson:Maria").unwrap();
    assert!(orphan.is_some());
}

#[test]
fn test_delete_referenced_type_fails_even_with_force() {
    let registry = seeded_registry();

    let err = delete(&registry, "samplePerson", true).unwrap_err();
    match err {
        AssetError::Referenced { tag, referenced_by } => {
            assert_eq!(tag, "samplePerson");
            assert_eq!(referenced_by, "sampleBook");
        }
        other => panic!("expected Referenced, got {:?}", other),
    }
    assert!(registry.catalog().unwrap().contains("samplePerson"));
}

#[test]
fn test_delete_referrer_and_target_in_one_batch_fails() {
    let registry = seeded_registry();
    let args = json!({"assetTypes": [{"tag": "sampleBook"}, {"tag": "samplePerson"}]});

    let err = registry
        .invoke_by_name("deleteAssetType", &args, &org1())
        .unwrap_err();

    assert!(matches!(err, AssetError::Referenced { ref referenced_by, .. } if referenced_by == "sampleBook"));
    assert_eq!(tags(&registry), vec!["samplePerson", "sampleBook", "sampleSecret"]);
}

#[test]
fn test_delete_referrer_then_target_separately() {
    let registry = seeded_registry();

    delete(&registry, "sampleBook", false).unwrap();
    delete(&registry, "samplePerson", false).unwrap();

    assert_eq!(tags(&registry), vec!["sampleSecret"]);
}

#[test]
fn test_delete_self_referencing_type_fails() {
    let registry = registry();
    let node = json!({
        "tag": "node",
        "label": "Node",
        "props": [
            {"tag": "id", "label": "Id", "dataType": "string", "isKey": true},
            {"tag": "parent", "label": "Parent", "dataType": "->node"}
        ]
    });
    create(&registry, vec![node]).unwrap();

    let err = delete(&registry, "node", true).unwrap_err();
    match err {
        AssetError::Referenced { tag, referenced_by } => {
            assert_eq!(tag, "node");
            assert_eq!(referenced_by, "node");
        }
        other => panic!("expected Referenced, got {:?}", other),
    }
    assert!(registry.catalog().unwrap().contains("node"));
}

#[test]
fn test_delete_then_not_found() {
    let registry = seeded_registry();

    delete(&registry, "sampleSecret", false).unwrap();
    let err = delete(&registry, "sampleSecret", false).unwrap_err();
    assert!(matches!(err, AssetError::NotFound(_)));
}

// =============================================================================
// Built-in types
// =============================================================================

fn builtin_secret() -> AssetType {
    serde_json::from_value(sample_secret()).unwrap()
}

#[test]
fn test_builtin_types_are_immutable() {
    let registry = registry();
    registry.sync_builtin_types(&[builtin_secret()]).unwrap();

    let err = update(&registry, json!({"tag": "sampleSecret", "label": "Changed"})).unwrap_err();
    assert!(matches!(err, AssetError::Immutable(_)));

    let err = delete(&registry, "sampleSecret", true).unwrap_err();
    assert!(matches!(err, AssetError::Immutable(_)));
    assert_eq!(err.code(), "ASSET_IMMUTABLE");
}

#[test]
fn test_builtin_types_are_immutable_while_in_use() {
    let registry = registry();
    registry.sync_builtin_types(&[builtin_secret()]).unwrap();
    put(
        &registry,
        json!({"@assetType": "sampleSecret", "secretName": "launch", "secret": "42"}),
    )
    .unwrap();

    for force in [false, true] {
        let err = delete(&registry, "sampleSecret", force).unwrap_err();
        assert!(matches!(err, AssetError::Immutable(_)), "force={}", force);
    }
    assert!(registry.catalog().unwrap().contains("sampleSecret"));
}

#[test]
fn test_sync_builtin_types_replaces_previous_builtin() {
    let registry = registry();
    registry.sync_builtin_types(&[builtin_secret()]).unwrap();

    let mut changed = builtin_secret();
    changed.label = "Secret (v2)".to_string();
    registry.sync_builtin_types(&[changed]).unwrap();

    let catalog = registry.catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get("sampleSecret").unwrap().label, "Secret (v2)");
    assert!(!catalog.get("sampleSecret").unwrap().dynamic);
}

#[test]
fn test_sync_builtin_types_refuses_dynamic_tag() {
    let registry = seeded_registry();

    let err = registry.sync_builtin_types(&[builtin_secret()]).unwrap_err();
    assert!(matches!(err, AssetError::Conflict(_)));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_catalog_mutation_conflicts() {
    let registry = registry();

    let mut tx = Transaction::begin(registry.store());
    let mut stale = SchemaCatalog::load(&mut tx).unwrap();

    create(&registry, vec![sample_person()]).unwrap();

    stale.insert(builtin_secret()).unwrap();
    stale.store(&mut tx).unwrap();
    let err = tx.commit().unwrap_err();
    assert!(err.is_conflict());

    // The winning mutation is intact
    assert_eq!(tags(&registry), vec!["samplePerson"]);
}

#[test]
fn test_registries_sharing_a_store_see_each_other() {
    let store = SharedStore::default();
    let first = registry_over(store.clone());
    let second = registry_over(store);

    create(&first, vec![sample_person()]).unwrap();
    create(&second, vec![sample_book()]).unwrap();

    let err = delete(&first, "samplePerson", false).unwrap_err();
    assert!(matches!(err, AssetError::Referenced { .. }));
}
