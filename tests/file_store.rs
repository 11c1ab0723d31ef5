//! Durability tests for the file-backed store

mod common;

use std::fs::{self, OpenOptions};
use std::io::Write;

use assetreg::storage::{FileStore, RecordStore, StorageErrorCode, LOG_FILE_NAME};
use common::*;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_catalog_and_instances_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let registry = registry_over(FileStore::open(temp_dir.path()).unwrap());
        create(&registry, vec![sample_person(), sample_book()]).unwrap();
        registry
            .invoke_by_name(
                "putAsset",
                &json!({"@assetType": "samplePerson", "name": "Maria", "cpf": "123.456.789-00"}),
                &org2(),
            )
            .unwrap();
    }

    let registry = registry_over(FileStore::open(temp_dir.path()).unwrap());

    let catalog = registry.catalog().unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("sampleBook").unwrap().dynamic);

    let maria = registry
        .invoke_by_name("readAsset", &json!({"@key": "samplePerson:Maria"}), &org1())
        .unwrap();
    assert_eq!(maria["cpf"], "12345678900");
    assert_eq!(maria["active"], false);
}

#[test]
fn test_versions_continue_after_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let registry = registry_over(FileStore::open(temp_dir.path()).unwrap());
        create(&registry, vec![sample_secret()]).unwrap();
    }

    let store = FileStore::open(temp_dir.path()).unwrap();
    let version = store.get("assetTypeListData").unwrap().unwrap().version;
    assert_eq!(version, 1);

    let registry = registry_over(store);
    create(&registry, vec![sample_person()]).unwrap();
    drop(registry);

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.get("assetTypeListData").unwrap().unwrap().version, 2);
}

#[test]
fn test_rejected_operation_appends_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_over(FileStore::open(temp_dir.path()).unwrap());
    create(&registry, vec![sample_person()]).unwrap();

    let log_path = temp_dir.path().join(LOG_FILE_NAME);
    let before = fs::metadata(&log_path).unwrap().len();

    registry
        .invoke_by_name("putAsset", &json!({"@assetType": "samplePerson"}), &org1())
        .unwrap_err();
    registry
        .invoke_by_name("readAsset", &json!({"@key": "samplePerson:Nobody"}), &org1())
        .unwrap_err();

    assert_eq!(fs::metadata(&log_path).unwrap().len(), before);
}

#[test]
fn test_damaged_log_refuses_to_open() {
    let temp_dir = TempDir::new().unwrap();

    {
        let registry = registry_over(FileStore::open(temp_dir.path()).unwrap());
        create(&registry, vec![sample_secret()]).unwrap();
    }

    let log_path = temp_dir.path().join(LOG_FILE_NAME);
    let mut bytes = fs::read(&log_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&log_path, &bytes).unwrap();

    let err = match FileStore::open(temp_dir.path()) {
        Ok(_) => panic!("damaged log opened"),
        Err(e) => e,
    };
    assert!(err.is_fatal());
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
}

#[test]
fn test_truncated_tail_refuses_to_open() {
    let temp_dir = TempDir::new().unwrap();

    {
        let registry = registry_over(FileStore::open(temp_dir.path()).unwrap());
        create(&registry, vec![sample_secret()]).unwrap();
    }

    let log_path = temp_dir.path().join(LOG_FILE_NAME);
    let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(&[0x01, 0x02]).unwrap();
    drop(file);

    assert!(FileStore::open(temp_dir.path()).is_err());
}
