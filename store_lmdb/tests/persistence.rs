use coffer_store::{
    Account, AccountStore, MetaStore, ReserveStore, Store, StoreError, SCHEMA_VERSION,
};
use coffer_store_lmdb::LmdbStore;
use coffer_types::{Amount, HolderAddress, Rate, Timestamp};

/// Helper: open a temporary LMDB store.
fn temp_store() -> (tempfile::TempDir, LmdbStore) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = LmdbStore::open(dir.path(), 10 * 1024 * 1024).expect("failed to open env");
    (dir, store)
}

fn addr(n: u8) -> HolderAddress {
    HolderAddress::new(format!("cfr_{n:0>8}"))
}

fn account(principal: u128, rate: u64, last_accrual: u64) -> Account {
    Account {
        principal: Amount::new(principal),
        locked_rate: Rate::new(rate),
        last_accrual: Timestamp::new(last_accrual),
    }
}

#[test]
fn account_roundtrip() {
    let (_dir, store) = temp_store();
    let alice = addr(1);

    assert_eq!(store.get_account(&alice).expect("get"), None);
    assert!(!store.exists(&alice).expect("exists"));

    let record = account(1_000_000, 42, 99);
    store.put_account(&alice, &record).expect("put");

    assert_eq!(store.get_account(&alice).expect("get"), Some(record));
    assert!(store.exists(&alice).expect("exists"));
    assert_eq!(store.account_count().expect("count"), 1);
}

#[test]
fn iter_accounts_returns_every_record() {
    let (_dir, store) = temp_store();
    for n in 0..5u8 {
        store
            .put_account(&addr(n), &account(n as u128 * 100, 7, 0))
            .expect("put");
    }

    let mut entries = store.iter_accounts().expect("iter");
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[3].0, addr(3));
    assert_eq!(entries[3].1.principal, Amount::new(300));
}

#[test]
fn meta_and_schema_version() {
    let (_dir, store) = temp_store();

    assert!(matches!(
        store.get_schema_version(),
        Err(StoreError::NotFound(_))
    ));
    store.set_schema_version(SCHEMA_VERSION).expect("set");
    assert_eq!(store.get_schema_version().expect("get"), SCHEMA_VERSION);

    store.put_meta("custom", b"value").expect("put");
    assert_eq!(store.get_meta("custom").expect("get"), b"value");
    store.delete_meta("custom").expect("delete");
    assert!(matches!(
        store.get_meta("custom"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn global_rate_roundtrip() {
    let (_dir, store) = temp_store();
    assert_eq!(store.get_global_rate().expect("get"), None);
    store.set_global_rate(Rate::new(123_456)).expect("set");
    assert_eq!(
        store.get_global_rate().expect("get"),
        Some(Rate::new(123_456))
    );
}

#[test]
fn reserve_roundtrip() {
    let (_dir, store) = temp_store();
    let vault = HolderAddress::new("cfr_vault");

    assert_eq!(store.get_reserve(&vault).expect("get"), None);
    store
        .put_reserve(&vault, Amount::new(5_000_000))
        .expect("put");
    assert_eq!(
        store.get_reserve(&vault).expect("get"),
        Some(Amount::new(5_000_000))
    );

    let entries = store.iter_reserves().expect("iter");
    assert_eq!(entries, vec![(vault, Amount::new(5_000_000))]);
}

#[test]
fn batch_commits_atomically() {
    let (_dir, store) = temp_store();
    let alice = addr(1);

    let mut batch = store.begin_write().expect("begin");
    batch
        .put_account(&alice, &account(500, 3, 10))
        .expect("put account");
    batch.put_reserve(&alice, Amount::new(9)).expect("put reserve");
    batch.put_global_rate(Rate::new(3)).expect("put rate");
    batch.put_schema_version(SCHEMA_VERSION).expect("put version");

    // Nothing is visible until the batch commits.
    assert_eq!(store.get_account(&alice).expect("get"), None);
    batch.commit().expect("commit");

    assert_eq!(
        store.get_account(&alice).expect("get"),
        Some(account(500, 3, 10))
    );
    assert_eq!(store.get_reserve(&alice).expect("get"), Some(Amount::new(9)));
    assert_eq!(store.get_global_rate().expect("get"), Some(Rate::new(3)));
    assert_eq!(store.get_schema_version().expect("get"), SCHEMA_VERSION);
}

#[test]
fn dropped_batch_does_not_persist() {
    let (_dir, store) = temp_store();
    let alice = addr(1);

    {
        let mut batch = store.begin_write().expect("begin");
        batch
            .put_account(&alice, &account(500, 3, 10))
            .expect("put");
        // dropping the batch aborts the transaction
    }

    assert_eq!(store.get_account(&alice).expect("get"), None);
}

#[test]
fn reopening_preserves_state() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let alice = addr(1);

    {
        let store = LmdbStore::open(dir.path(), 10 * 1024 * 1024).expect("open");
        let mut batch = store.begin_write().expect("begin");
        batch
            .put_account(&alice, &account(777, 5, 123))
            .expect("put");
        batch.put_global_rate(Rate::new(5)).expect("rate");
        batch.commit().expect("commit");
    }

    let store = LmdbStore::open(dir.path(), 10 * 1024 * 1024).expect("reopen");
    assert_eq!(
        store.get_account(&alice).expect("get"),
        Some(account(777, 5, 123))
    );
    assert_eq!(store.get_global_rate().expect("get"), Some(Rate::new(5)));
}

#[test]
fn put_overwrites_existing_record() {
    let (_dir, store) = temp_store();
    let alice = addr(1);

    store.put_account(&alice, &account(100, 1, 0)).expect("put");
    store.put_account(&alice, &account(200, 2, 50)).expect("put");
    assert_eq!(
        store.get_account(&alice).expect("get"),
        Some(account(200, 2, 50))
    );
    assert_eq!(store.account_count().expect("count"), 1);
}
