use compvault_index::{BlindIndexBuilder, IndexKey, IndexTokenSet};
use compvault_storage::{
    MemoryRecordStore, RecordPayload, RecordStore, SecureStorageRecord, StorageError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn index() -> BlindIndexBuilder {
    BlindIndexBuilder::new(IndexKey::from_bytes(&[11u8; 32]).unwrap())
}

fn record(unique: &[(&str, &str)], non_unique: &[(&str, &str)]) -> SecureStorageRecord {
    let b = index();
    let mut set = IndexTokenSet::new();
    for (name, value) in unique {
        set.insert(name, b.build_index(name, value).unwrap(), true);
    }
    for (name, value) in non_unique {
        set.insert(name, b.build_index(name, value).unwrap(), false);
    }
    SecureStorageRecord::new(
        RecordPayload::Unencrypted {
            plaintext: json!({"title": "draft"}),
        },
        set,
    )
}

#[tokio::test]
async fn write_then_read() {
    let store = MemoryRecordStore::new();
    let rec = record(&[("identifier", "c-1")], &[]);

    let stored = store.write_record("compositions", rec.clone()).await.unwrap();
    assert_eq!(stored, Some(rec.clone()));

    let read = store.read_record("compositions", &rec.id).await.unwrap();
    assert_eq!(read, Some(rec));
    assert!(store.read_record("compositions", "missing").await.unwrap().is_none());
    assert!(store.read_record("other", "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn unique_token_conflict() {
    let store = MemoryRecordStore::new();
    store
        .write_record("c", record(&[("identifier", "c-1")], &[]))
        .await
        .unwrap();

    let err = store
        .write_record("c", record(&[("identifier", "C-1 ")], &[]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::UniqueConflict { ref collection, .. } if collection == "c"
    ));
    assert_eq!(store.len("c").await, 1);

    // Other collections are independent.
    store
        .write_record("d", record(&[("identifier", "c-1")], &[]))
        .await
        .unwrap();
}

#[tokio::test]
async fn rewrite_same_id_keeps_its_tokens() {
    let store = MemoryRecordStore::new();
    let rec = record(&[("identifier", "c-1")], &[]);
    store.write_record("c", rec.clone()).await.unwrap();
    store.write_record("c", rec.clone()).await.unwrap();
    assert_eq!(store.len("c").await, 1);
}

#[tokio::test]
async fn removal_releases_unique_tokens() {
    let store = MemoryRecordStore::new();
    let rec = record(&[("identifier", "c-1")], &[]);
    store.write_record("c", rec.clone()).await.unwrap();
    store.remove_record("c", &rec.id).await.unwrap();
    assert!(store.is_empty("c").await);

    store
        .write_record("c", record(&[("identifier", "c-1")], &[]))
        .await
        .unwrap();
    assert!(matches!(
        store.remove_record("c", "nope").await,
        Err(StorageError::NotFound { .. })
    ));
}

#[tokio::test]
async fn query_returns_every_non_unique_match_in_order() {
    let store = MemoryRecordStore::new();
    let first = record(&[], &[("subject", "urn:uuid:1234")]);
    let second = record(&[], &[("subject", "urn:uuid:1234")]);
    let other = record(&[], &[("subject", "urn:uuid:9999")]);
    for r in [&first, &second, &other] {
        store.write_record("c", r.clone()).await.unwrap();
    }

    let token = index().build_index("subject", "urn:uuid:1234").unwrap();
    let found = store.query_records("c", &[token]).await.unwrap();
    let ids: Vec<_> = found.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

    assert!(store.query_records("c", &[]).await.unwrap().is_empty());
    assert!(store.query_records("empty", &[]).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unique_writes_admit_one() {
    let store = MemoryRecordStore::new();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .write_record("c", record(&[("identifier", "shared")], &[]))
                .await
        }));
    }

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(StorageError::UniqueConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((ok, conflicts), (1, 15));
    assert_eq!(store.len("c").await, 1);
}

#[test]
fn blocking_read_through_tokio_test() {
    let store = MemoryRecordStore::new();
    let rec = record(&[], &[]);
    tokio_test::block_on(store.write_record("c", rec.clone())).unwrap();
    assert_eq!(tokio_test::block_on(store.len("c")), 1);
}
