//! Profile store behavior against a shared in-memory backend
//!
//! A second `ProfileStore` over a clone of the same `MemoryStore` stands in
//! for a fresh process reading the same persisted blob.

use uuid::Uuid;
use vlessconn_core::{
    KeyValueStore, MemoryStore, PROFILES_KEY, Profile, ProfileStore, StoreError,
};

fn profile(name: &str, link: &str) -> Profile {
    Profile::from_uri(name, link).expect("valid link")
}

fn reopen(backing: &MemoryStore) -> ProfileStore<MemoryStore> {
    let mut store = ProfileStore::new(backing.clone());
    store.load().expect("load");
    store
}

#[test]
fn add_then_load_in_fresh_process() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing.clone());
    let p = profile(
        "Frankfurt",
        "vless://id-1@fra.example.com:443?reality=1&pbk=KEY&sni=www.example.com",
    );
    store.add(p.clone()).unwrap();

    let fresh = reopen(&backing);
    assert_eq!(fresh.profiles(), &[p]);
}

#[test]
fn delete_absent_id_leaves_collection_unchanged() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing.clone());
    store.add(profile("a", "vless://a@a.example.com:443")).unwrap();
    store.add(profile("b", "vless://b@b.example.com:443")).unwrap();
    let before = store.profiles().to_vec();

    let outcome = store.delete(Uuid::new_v4()).unwrap();
    assert!(!outcome.removed);
    assert_eq!(store.profiles(), before.as_slice());
    assert_eq!(reopen(&backing).profiles(), before.as_slice());
}

#[test]
fn update_absent_id_does_not_insert() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing.clone());
    store.add(profile("a", "vless://a@a.example.com:443")).unwrap();

    let replaced = store
        .update(Uuid::new_v4(), profile("b", "vless://b@b.example.com:443"))
        .unwrap();
    assert!(!replaced);

    let fresh = reopen(&backing);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh.profiles()[0].name, "a");
}

#[test]
fn update_persists_replacement() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing.clone());
    let original = profile("a", "vless://a@a.example.com:443");
    let id = store.add(original.clone()).unwrap();

    let replacement = original
        .with_details("renamed", "b.example.com", 8443, "b")
        .unwrap();
    assert!(store.update(id, replacement).unwrap());

    let fresh = reopen(&backing);
    let stored = fresh.get(id).unwrap();
    assert_eq!(stored.name, "renamed");
    assert_eq!(stored.raw_uri, "vless://b@b.example.com:8443");
    assert_eq!(stored.created_at, original.created_at);
}

#[test]
fn write_failure_diverges_until_next_write() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing.clone());
    store.add(profile("a", "vless://a@a.example.com:443")).unwrap();

    backing.set_fail_writes(true);
    let err = store
        .add(profile("b", "vless://b@b.example.com:443"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(store.len(), 2);
    assert_eq!(reopen(&backing).len(), 1);

    // the next successful write carries the earlier change too
    backing.set_fail_writes(false);
    store.add(profile("c", "vless://c@c.example.com:443")).unwrap();
    assert_eq!(reopen(&backing).len(), 3);
}

#[test]
fn load_failure_keeps_previous_collection() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing.clone());
    store.add(profile("a", "vless://a@a.example.com:443")).unwrap();

    backing.set(PROFILES_KEY, "[{\"id\": 42}]").unwrap();
    assert!(matches!(store.load(), Err(StoreError::LoadFailed(_))));
    assert_eq!(store.len(), 1);
}

#[test]
fn deleting_selected_profile_clears_selection() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing);
    let a = store.add(profile("a", "vless://a@a.example.com:443")).unwrap();
    assert!(store.select(a));
    assert_eq!(store.selected_profile().map(|p| p.id), Some(a));

    let outcome = store.delete(a).unwrap();
    assert!(outcome.selection_cleared);
    assert!(store.selected_profile().is_none());
}

#[test]
fn ids_are_never_reused() {
    let backing = MemoryStore::new();
    let mut store = ProfileStore::new(backing);
    let a = store.add(profile("a", "vless://a@a.example.com:443")).unwrap();
    store.delete(a).unwrap();
    let b = store.add(profile("a", "vless://a@a.example.com:443")).unwrap();
    assert_ne!(a, b);
}
