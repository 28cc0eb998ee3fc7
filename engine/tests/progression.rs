use engine::{ChapterId, MemoryStorage, ProgressionState, ProgressionStore, StorageError, XpWallet};

fn ch(id: u32) -> ChapterId {
    ChapterId::new(id).unwrap()
}

fn fresh_store() -> ProgressionStore<MemoryStorage> {
    ProgressionStore::open(MemoryStorage::new(), 100).unwrap()
}

#[test]
fn new_store_starts_with_defaults_and_saves_them() {
    let store = fresh_store();
    assert_eq!(store.xp_balance(), 100);
    assert!(store.is_unlocked(ChapterId::FIRST));
    assert_eq!(store.unlocked_chapters().len(), 1);
    assert_eq!(store.storage().saved(), Some(store.state()));
    assert!(!store.is_dirty());
}

#[test]
fn open_uses_saved_state() {
    let mut saved = ProgressionState::new(100);
    saved.credit(35);
    saved.unlock(ch(2));
    let store = ProgressionStore::open(MemoryStorage::with_state(saved.clone()), 100).unwrap();
    assert_eq!(store.state(), &saved);
    assert_eq!(store.storage().save_count(), 0);
}

#[test]
fn credit_and_debit() {
    let mut store = fresh_store();
    store.credit(40);
    assert_eq!(store.xp_balance(), 140);
    assert_eq!(store.debit(100), 100);
    assert_eq!(store.xp_balance(), 40);
    assert_eq!(store.debit(1000), 40);
    assert_eq!(store.xp_balance(), 0);
}

#[test]
fn zero_amounts_are_no_ops() {
    let mut store = fresh_store();
    let saves = store.storage().save_count();
    store.credit(0);
    assert_eq!(store.debit(0), 0);
    assert_eq!(store.xp_balance(), 100);
    assert_eq!(store.storage().save_count(), saves);
}

#[test]
fn every_mutation_is_written_through() {
    let mut store = fresh_store();
    store.credit(5);
    assert_eq!(store.storage().saved().unwrap().xp_balance(), 105);
    store.unlock(ch(2));
    assert!(store.storage().saved().unwrap().is_unlocked(ch(2)));
    store.set_player_name("Gaia");
    assert_eq!(store.storage().saved().unwrap().player_name(), "Gaia");
}

#[test]
fn unlock_twice_equals_unlock_once() {
    let mut once = fresh_store();
    once.unlock(ch(3));
    let mut twice = fresh_store();
    assert!(twice.unlock(ch(3)));
    let saves = twice.storage().save_count();
    assert!(!twice.unlock(ch(3)));
    assert_eq!(twice.storage().save_count(), saves);
    assert_eq!(once.unlocked_chapters(), twice.unlocked_chapters());
}

#[test]
fn reset_restores_exact_defaults() {
    let mut store = fresh_store();
    store.credit(900);
    store.unlock(ch(2));
    store.unlock(ch(5));
    store.reset();
    assert_eq!(store.xp_balance(), 100);
    assert_eq!(
        store.unlocked_chapters().iter().copied().collect::<Vec<_>>(),
        vec![ChapterId::FIRST]
    );
    assert_eq!(store.storage().saved(), Some(store.state()));
}

#[test]
fn reset_uses_configured_starting_xp() {
    let mut store = ProgressionStore::open(MemoryStorage::new(), 250).unwrap();
    store.debit(250);
    store.reset();
    assert_eq!(store.xp_balance(), 250);
}

#[test]
fn failed_save_keeps_change_and_flush_retries() {
    let mut store = ProgressionStore::open(MemoryStorage::unavailable(), 100).unwrap();
    assert!(store.is_dirty());

    store.credit(20);
    assert_eq!(store.xp_balance(), 120);
    assert!(store.is_dirty());
    assert!(matches!(store.flush(), Err(StorageError::Unavailable)));

    store.storage_mut().set_available(true);
    store.flush().unwrap();
    assert!(!store.is_dirty());
    assert_eq!(store.storage().saved().unwrap().xp_balance(), 120);
}

#[test]
fn store_is_a_wallet() {
    let mut store = fresh_store();
    XpWallet::credit(&mut store, 10);
    assert_eq!(store.balance(), 110);
    assert_eq!(XpWallet::debit(&mut store, 200), 110);
    assert_eq!(store.balance(), 0);
}
