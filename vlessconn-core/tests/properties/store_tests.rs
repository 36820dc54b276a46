//! Property tests for profile store invariants

use std::collections::HashSet;

use proptest::prelude::*;
use vlessconn_core::{MemoryStore, Profile, ProfileStore};

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    DeleteExisting(usize),
    DeleteUnknown,
    UpdateExisting(usize, String),
    UpdateUnknown(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[a-z]{1,8}".prop_map(Op::Add),
        1 => any::<usize>().prop_map(Op::DeleteExisting),
        1 => Just(Op::DeleteUnknown),
        1 => (any::<usize>(), "[a-z]{1,8}").prop_map(|(i, n)| Op::UpdateExisting(i, n)),
        1 => "[a-z]{1,8}".prop_map(Op::UpdateUnknown),
    ]
}

fn profile(name: &str) -> Profile {
    Profile::manual(name, "vpn.example.com", 443, "user").unwrap()
}

proptest! {
    /// Property: IDs stay unique and a reload sees exactly the in-memory state
    #[test]
    fn store_matches_reload_after_any_ops(ops in proptest::collection::vec(op_strategy(), 0..30)) {
        let backing = MemoryStore::new();
        let mut store = ProfileStore::new(backing.clone());

        for op in ops {
            match op {
                Op::Add(name) => {
                    store.add(profile(&name)).unwrap();
                }
                Op::DeleteExisting(i) => {
                    if !store.is_empty() {
                        let id = store.profiles()[i % store.len()].id;
                        prop_assert!(store.delete(id).unwrap().removed);
                    }
                }
                Op::DeleteUnknown => {
                    let before = store.len();
                    store.delete(uuid::Uuid::new_v4()).unwrap();
                    prop_assert_eq!(store.len(), before);
                }
                Op::UpdateExisting(i, name) => {
                    if !store.is_empty() {
                        let id = store.profiles()[i % store.len()].id;
                        prop_assert!(store.update(id, profile(&name)).unwrap());
                        prop_assert_eq!(&store.get(id).unwrap().name, &name);
                    }
                }
                Op::UpdateUnknown(name) => {
                    let before: Vec<_> = store.profiles().to_vec();
                    prop_assert!(!store.update(uuid::Uuid::new_v4(), profile(&name)).unwrap());
                    prop_assert_eq!(store.profiles(), before.as_slice());
                }
            }

            let ids: HashSet<_> = store.profiles().iter().map(|p| p.id).collect();
            prop_assert_eq!(ids.len(), store.len());
        }

        let mut reloaded = ProfileStore::new(backing);
        reloaded.load().unwrap();
        prop_assert_eq!(reloaded.profiles(), store.profiles());
    }

    /// Property: a manual port is accepted exactly when it is in 1..=65535
    #[test]
    fn manual_port_range(port in 0u32..200_000) {
        let result = Profile::manual("p", "h", port, "u");
        prop_assert_eq!(result.is_ok(), (1..=65_535).contains(&port));
    }
}
