//! Write-through store of saved connection profiles.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::Profile;
use crate::storage::{KeyValueStore, PROFILES_KEY};
use crate::tracing::span_names;

/// What a delete actually changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// A profile with the ID existed and was removed
    pub removed: bool,
    /// The removed profile was the selected one, so the selection was cleared
    pub selection_cleared: bool,
}

/// Owner of the saved profile collection
///
/// The in-memory collection is the source of truth once [`ProfileStore::load`]
/// has run. Every mutation is written through to the key-value store before
/// returning. A failed write is reported and remembered in
/// [`ProfileStore::last_error`], but the in-memory change stays applied.
///
/// Mutations take `&mut self`; hosts that share a store between threads wrap
/// it in a mutex.
#[derive(Debug)]
pub struct ProfileStore<S: KeyValueStore> {
    storage: S,
    profiles: Vec<Profile>,
    selected: Option<Uuid>,
    last_error: Option<StoreError>,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Creates an empty store over the given persistence collaborator
    ///
    /// Nothing is read until [`ProfileStore::load`] is called.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            profiles: Vec::new(),
            selected: None,
            last_error: None,
        }
    }

    /// Returns the persistence collaborator
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the persisted collection and replaces the in-memory one
    ///
    /// A missing blob leaves the store unchanged. Records that share an ID
    /// with an earlier record, or that fail validation, are dropped.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if the blob cannot be read or decoded. The
    /// in-memory collection is left as it was.
    pub fn load(&mut self) -> StoreResult<()> {
        let _span = crate::trace_operation!(span_names::STORE_LOAD).entered();

        let blob = match self.storage.get(PROFILES_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::debug!("No persisted profiles");
                return Ok(());
            }
            Err(e) => return Err(self.load_failed(e.to_string())),
        };

        let decoded: Vec<Profile> = match serde_json::from_str(&blob) {
            Ok(decoded) => decoded,
            Err(e) => return Err(self.load_failed(e.to_string())),
        };

        let mut seen = HashSet::with_capacity(decoded.len());
        let mut profiles = Vec::with_capacity(decoded.len());
        for profile in decoded {
            if !seen.insert(profile.id) {
                tracing::warn!(profile_id = %profile.id, "Dropping profile with duplicate ID");
                continue;
            }
            if let Err(e) = profile.validate() {
                tracing::warn!(profile_id = %profile.id, error = %e, "Dropping invalid profile");
                continue;
            }
            profiles.push(profile);
        }

        self.profiles = profiles;
        if let Some(id) = self.selected
            && self.get(id).is_none()
        {
            self.selected = None;
        }

        tracing::info!(item_count = self.profiles.len(), "Loaded profiles");
        Ok(())
    }

    /// Appends a profile and writes the collection through
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` or `InvalidProfile` without touching the
    /// collection, or `Persistence` if the write failed after the profile was
    /// appended.
    pub fn add(&mut self, profile: Profile) -> StoreResult<Uuid> {
        if self.get(profile.id).is_some() {
            return Err(StoreError::DuplicateId(profile.id));
        }
        profile.validate()?;

        let id = profile.id;
        tracing::debug!(profile_id = %id, name = %profile.name, "Adding profile");
        self.profiles.push(profile);
        self.persist()?;
        Ok(id)
    }

    /// Removes the profile with the given ID and writes the collection through
    ///
    /// An unknown ID is not an error; the write still happens.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write failed. The removal is kept.
    pub fn delete(&mut self, id: Uuid) -> StoreResult<DeleteOutcome> {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);

        let mut outcome = DeleteOutcome {
            removed: self.profiles.len() != before,
            selection_cleared: false,
        };
        if self.selected == Some(id) {
            self.selected = None;
            outcome.selection_cleared = true;
        }

        tracing::debug!(profile_id = %id, removed = outcome.removed, "Deleting profile");
        self.persist()?;
        Ok(outcome)
    }

    /// Replaces the profile with the given ID wholesale
    ///
    /// The stored record keeps the target's `id` and `created_at`. An unknown
    /// ID inserts nothing, but the collection is still written.
    ///
    /// Returns true if a record was replaced.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` without touching the collection, or
    /// `Persistence` if the write failed. The replacement is kept.
    pub fn update(&mut self, id: Uuid, mut profile: Profile) -> StoreResult<bool> {
        profile.validate()?;

        let replaced = match self.profiles.iter_mut().find(|p| p.id == id) {
            Some(existing) => {
                profile.id = existing.id;
                profile.created_at = existing.created_at;
                *existing = profile;
                true
            }
            None => false,
        };

        tracing::debug!(profile_id = %id, replaced, "Updating profile");
        self.persist()?;
        Ok(replaced)
    }

    /// Removes every profile and the selection, then writes through
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write failed. The store stays empty.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.profiles.clear();
        self.selected = None;
        tracing::info!("Cleared all profiles");
        self.persist()
    }

    /// Gets a profile by ID
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// All profiles in insertion order
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Number of stored profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if no profiles are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Finds a profile by exact name, falling back to a case-insensitive match
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .or_else(|| {
                self.profiles
                    .iter()
                    .find(|p| p.name.to_lowercase() == name.to_lowercase())
            })
    }

    /// Marks a stored profile as selected
    ///
    /// Returns false, leaving the selection unchanged, if the ID is unknown.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// ID of the selected profile
    #[must_use]
    pub const fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    /// The selected profile
    #[must_use]
    pub fn selected_profile(&self) -> Option<&Profile> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Clears the selection
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The most recent load or write failure, if not yet cleared
    #[must_use]
    pub const fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Forgets the recorded failure
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn load_failed(&mut self, reason: String) -> StoreError {
        tracing::error!(error = %reason, "Failed to load profiles");
        let err = StoreError::LoadFailed(reason);
        self.last_error = Some(err.clone());
        err
    }

    fn persist(&mut self) -> StoreResult<()> {
        let _span = crate::trace_operation_debug!(
            span_names::STORE_PERSIST,
            item_count = self.profiles.len()
        )
        .entered();

        let result = serde_json::to_string(&self.profiles)
            .map_err(|e| e.to_string())
            .and_then(|blob| {
                self.storage
                    .set(PROFILES_KEY, &blob)
                    .map_err(|e| e.to_string())
            });

        result.map_err(|reason| {
            tracing::error!(error = %reason, "Failed to persist profiles");
            let err = StoreError::Persistence(reason);
            self.last_error = Some(err.clone());
            err
        })
    }
}
