//! A tunnel that replays a fixed script of events.
//!
//! Used by tests and demos in place of a platform networking module.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::{future, stream};
use uuid::Uuid;

use crate::error::ConnectionError;
use crate::models::Profile;

use super::tunnel::{Tunnel, TunnelEvent, TunnelEvents, TunnelOptions};

#[derive(Debug, Default)]
struct Runtime {
    live: Option<UnboundedSender<TunnelEvent>>,
    connected_profiles: Vec<Uuid>,
    last_options: Option<TunnelOptions>,
    disconnects: usize,
}

/// Scripted [`Tunnel`]
///
/// Each `connect` emits the configured events, then keeps the stream open
/// until `disconnect` (which emits `Disconnecting`, `Disconnected`) unless
/// [`ScriptedTunnel::closing_after_script`] was used. Clones share their
/// call records and live stream, so a test can keep a handle after moving
/// the tunnel into a manager.
#[derive(Debug, Clone)]
pub struct ScriptedTunnel {
    connect_events: Vec<TunnelEvent>,
    keep_open: bool,
    connect_error: Option<String>,
    hang_on_connect: bool,
    runtime: Arc<Mutex<Runtime>>,
}

impl Default for ScriptedTunnel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTunnel {
    /// A tunnel that connects successfully
    #[must_use]
    pub fn new() -> Self {
        Self {
            connect_events: vec![TunnelEvent::Connecting, TunnelEvent::Connected],
            keep_open: true,
            connect_error: None,
            hang_on_connect: false,
            runtime: Arc::default(),
        }
    }

    /// Replaces the events emitted on connect
    #[must_use]
    pub fn with_connect_events(mut self, events: Vec<TunnelEvent>) -> Self {
        self.connect_events = events;
        self
    }

    /// Ends the event stream right after the scripted events
    #[must_use]
    pub const fn closing_after_script(mut self) -> Self {
        self.keep_open = false;
        self
    }

    /// Makes every connect attempt fail before any event
    #[must_use]
    pub fn failing_connect(mut self, reason: impl Into<String>) -> Self {
        self.connect_error = Some(reason.into());
        self
    }

    /// A tunnel whose `connect` call itself never returns
    #[must_use]
    pub const fn hanging_connect(mut self) -> Self {
        self.hang_on_connect = true;
        self
    }

    /// A tunnel that never finishes connecting
    #[must_use]
    pub fn stalled() -> Self {
        Self::new().with_connect_events(vec![TunnelEvent::Connecting])
    }

    /// Pushes an event into the live stream
    ///
    /// Returns false if no stream is open.
    pub fn inject(&self, event: TunnelEvent) -> bool {
        self.runtime()
            .live
            .as_ref()
            .is_some_and(|tx| tx.unbounded_send(event).is_ok())
    }

    /// Ends the live stream without a final event, as a crashed tunnel would
    pub fn close(&self) {
        self.runtime().live = None;
    }

    /// IDs of the profiles passed to `connect`, in call order
    #[must_use]
    pub fn connected_profiles(&self) -> Vec<Uuid> {
        self.runtime().connected_profiles.clone()
    }

    /// Options passed to the most recent `connect`
    #[must_use]
    pub fn last_options(&self) -> Option<TunnelOptions> {
        self.runtime().last_options
    }

    /// Number of `disconnect` calls
    #[must_use]
    pub fn disconnect_count(&self) -> usize {
        self.runtime().disconnects
    }

    fn runtime(&self) -> MutexGuard<'_, Runtime> {
        self.runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Tunnel for ScriptedTunnel {
    async fn connect(
        &self,
        profile: &Profile,
        options: &TunnelOptions,
    ) -> Result<TunnelEvents, ConnectionError> {
        {
            let mut runtime = self.runtime();
            runtime.connected_profiles.push(profile.id);
            runtime.last_options = Some(*options);
        }
        if self.hang_on_connect {
            return future::pending().await;
        }

        let mut runtime = self.runtime();
        if let Some(reason) = &self.connect_error {
            return Err(ConnectionError::Tunnel(reason.clone()));
        }

        let scripted = stream::iter(self.connect_events.clone());
        if !self.keep_open {
            runtime.live = None;
            return Ok(scripted.boxed());
        }

        let (tx, rx) = mpsc::unbounded();
        runtime.live = Some(tx);
        Ok(scripted.chain(rx).boxed())
    }

    async fn disconnect(&self) -> Result<(), ConnectionError> {
        let mut runtime = self.runtime();
        runtime.disconnects += 1;
        if let Some(tx) = runtime.live.take() {
            let _ = tx.unbounded_send(TunnelEvent::Disconnecting);
            let _ = tx.unbounded_send(TunnelEvent::Disconnected);
        }
        Ok(())
    }
}
