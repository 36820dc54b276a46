//! Application context tying profiles, settings and the tunnel together
//!
//! [`VpnClient`] is what a front end holds: it is built from an explicit
//! profile store, connection manager and settings, so tests can hand it an
//! in-memory store and a scripted tunnel.

use uuid::Uuid;

use crate::config::AppSettings;
use crate::connection::{
    ConnectionManager, ConnectionState, ConnectionStatus, Tunnel, TunnelOptions,
};
use crate::error::{ConnectionError, StoreResult, VlessConnResult};
use crate::models::Profile;
use crate::storage::KeyValueStore;
use crate::store::{DeleteOutcome, ProfileStore};
use crate::uri::{self, ParsedUri};

/// A link that was not imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSkip {
    /// The original text
    pub link: String,
    /// Why it was skipped
    pub reason: String,
}

/// Outcome of importing a block of links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// IDs of the created profiles, in input order
    pub added: Vec<Uuid>,
    /// Links that were skipped, in input order
    pub skipped: Vec<ImportSkip>,
}

impl ImportSummary {
    /// Returns a summary string of the import
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Imported: {}, Skipped: {}",
            self.added.len(),
            self.skipped.len()
        )
    }
}

/// The client-side application context
pub struct VpnClient<S: KeyValueStore, T: Tunnel> {
    store: ProfileStore<S>,
    connection: ConnectionManager<T>,
    settings: AppSettings,
}

impl<S: KeyValueStore, T: Tunnel> VpnClient<S, T> {
    /// Creates a client
    ///
    /// The connection timeout is taken from `settings`.
    #[must_use]
    pub fn new(
        store: ProfileStore<S>,
        connection: ConnectionManager<T>,
        settings: AppSettings,
    ) -> Self {
        let connection = connection.with_timeout(settings.connect_timeout());
        Self {
            store,
            connection,
            settings,
        }
    }

    /// Loads the persisted profiles
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if the collection cannot be read or decoded.
    pub fn load(&mut self) -> StoreResult<()> {
        self.store.load()
    }

    /// The profile store
    #[must_use]
    pub const fn store(&self) -> &ProfileStore<S> {
        &self.store
    }

    /// The profile store, mutably
    pub const fn store_mut(&mut self) -> &mut ProfileStore<S> {
        &mut self.store
    }

    /// The connection manager
    #[must_use]
    pub const fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    /// A snapshot of the connection state
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Current settings
    #[must_use]
    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replaces the settings; the new timeout applies to later connects
    pub fn set_settings(&mut self, settings: AppSettings) {
        self.connection.set_timeout(settings.connect_timeout());
        self.settings = settings;
    }

    /// Creates and stores a profile from a pasted link
    ///
    /// # Errors
    ///
    /// Returns the profile error for a bad name or link, or the store error.
    pub fn add_from_uri(&mut self, name: &str, link: &str) -> VlessConnResult<Uuid> {
        let profile = Profile::from_uri(name, link)?;
        Ok(self.store.add(profile)?)
    }

    /// Creates and stores a profile from manually entered fields
    ///
    /// # Errors
    ///
    /// Returns the profile error for bad fields, or the store error.
    pub fn add_manual(
        &mut self,
        name: &str,
        address: &str,
        port: u32,
        identifier: &str,
    ) -> VlessConnResult<Uuid> {
        let profile = Profile::manual(name, address, port, identifier)?;
        Ok(self.store.add(profile)?)
    }

    /// Imports every valid link in a pasted block of text
    ///
    /// See [`import_links`].
    ///
    /// # Errors
    ///
    /// Returns the store error if a write fails; profiles added before the
    /// failure stay in the store.
    pub fn import_links(&mut self, text: &str) -> VlessConnResult<ImportSummary> {
        Ok(import_links(&mut self.store, text)?)
    }

    /// Replaces a stored profile's fields
    ///
    /// The link is regenerated; `id`, `created_at` and Reality parameters are
    /// kept. An unknown ID inserts nothing and returns false.
    ///
    /// # Errors
    ///
    /// Returns the profile error for bad fields, or the store error.
    pub fn update_profile(
        &mut self,
        id: Uuid,
        name: &str,
        address: &str,
        port: u32,
        identifier: &str,
    ) -> VlessConnResult<bool> {
        let replacement = match self.store.get(id) {
            Some(existing) => existing.with_details(name, address, port, identifier)?,
            None => Profile::manual(name, address, port, identifier)?,
        };
        Ok(self.store.update(id, replacement)?)
    }

    /// Deletes a profile
    ///
    /// If it is the active connection target, a live tunnel is disconnected
    /// and the reference is cleared, even when the store write fails.
    ///
    /// # Errors
    ///
    /// Returns the store error if the write failed.
    pub async fn delete_profile(&mut self, id: Uuid) -> VlessConnResult<DeleteOutcome> {
        let outcome = self.store.delete(id);

        if self.connection.active_profile() == Some(id) {
            if self.connection.status() != ConnectionStatus::Disconnected
                && let Err(e) = self.connection.disconnect().await
            {
                tracing::warn!(profile_id = %id, error = %e, "Failed to disconnect deleted profile");
            }
            self.connection.clear_active_if(id);
        }

        Ok(outcome?)
    }

    /// Selects a profile and connects to it
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` for an unknown ID, or the connection error.
    pub async fn connect(&mut self, id: Uuid) -> VlessConnResult<()> {
        let profile = self
            .store
            .get(id)
            .cloned()
            .ok_or(ConnectionError::ProfileNotFound(id))?;
        self.store.select(id);

        let options = TunnelOptions {
            kill_switch: self.settings.kill_switch,
        };
        self.connection.connect(&profile, &options).await?;
        Ok(())
    }

    /// Connects to the selected profile
    ///
    /// # Errors
    ///
    /// Returns `NothingSelected` without a selection, or the connection error.
    pub async fn connect_selected(&mut self) -> VlessConnResult<()> {
        let id = self
            .store
            .selected()
            .ok_or(ConnectionError::NothingSelected)?;
        self.connect(id).await
    }

    /// Disconnects the tunnel
    ///
    /// # Errors
    ///
    /// Returns the connection error.
    pub async fn disconnect(&mut self) -> VlessConnResult<()> {
        self.connection.disconnect().await?;
        Ok(())
    }

    /// Waits for the next tunnel event after connecting
    pub async fn poll_connection(&mut self) -> Option<ConnectionStatus> {
        self.connection.poll_event().await
    }

    /// Connects to the selected profile if auto-connect is enabled
    ///
    /// Returns true if a connection was made.
    ///
    /// # Errors
    ///
    /// Returns the connection error.
    pub async fn auto_connect(&mut self) -> VlessConnResult<bool> {
        if !self.settings.auto_connect || self.store.selected().is_none() {
            return Ok(false);
        }
        self.connect_selected().await?;
        Ok(true)
    }

    /// Disconnects and removes every profile
    ///
    /// # Errors
    ///
    /// Returns the connection error, or the store error if the write failed.
    pub async fn reset(&mut self) -> VlessConnResult<()> {
        self.connection.disconnect().await?;
        self.store.clear_all()?;
        Ok(())
    }
}

/// Imports every valid link in a pasted block of text into `store`
///
/// Each profile is named after the link's remark, or `address:port`
/// without one. Links that fail to parse or lack an identifier are
/// reported as skipped.
///
/// # Errors
///
/// Returns the store error if a write fails; profiles added before the
/// failure stay in the store.
pub fn import_links<S: KeyValueStore>(
    store: &mut ProfileStore<S>,
    text: &str,
) -> StoreResult<ImportSummary> {
    let report = uri::parse_batch_report(uri::split_links(text));
    let mut summary = ImportSummary {
        added: Vec::with_capacity(report.parsed.len()),
        skipped: report
            .skipped
            .into_iter()
            .map(|s| ImportSkip {
                link: s.link,
                reason: s.error.to_string(),
            })
            .collect(),
    };

    for (link, parsed) in report.parsed {
        let name = import_name(&parsed);
        match Profile::from_parsed(name, link.clone(), parsed) {
            Ok(profile) => summary.added.push(store.add(profile)?),
            Err(e) => summary.skipped.push(ImportSkip {
                link,
                reason: e.to_string(),
            }),
        }
    }

    tracing::info!(
        added = summary.added.len(),
        skipped = summary.skipped.len(),
        "Imported links"
    );
    Ok(summary)
}

fn import_name(parsed: &ParsedUri) -> String {
    parsed
        .remark
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map_or_else(
            || format!("{}:{}", uri::format_host(&parsed.address), parsed.port),
            str::to_string,
        )
}
