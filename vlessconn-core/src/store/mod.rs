//! Profile store
//!
//! Owns the collection of saved profiles and writes every change through to
//! a [`KeyValueStore`](crate::storage::KeyValueStore).

mod profile_store;

pub use profile_store::{DeleteOutcome, ProfileStore};
