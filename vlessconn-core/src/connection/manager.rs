//! Connection manager driving the tunnel state machine
//!
//! The manager turns the tunnel's event stream into [`ConnectionState`]
//! changes and publishes each change on a `watch` channel. `connect` and
//! `disconnect` suspend while waiting for the tunnel, never on a timer.

use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{ConnectionError, ConnectionResult};
use crate::models::Profile;
use crate::tracing::span_names;

use super::state::{ConnectionState, ConnectionStatus};
use super::tunnel::{Tunnel, TunnelEvent, TunnelEvents, TunnelOptions};

impl From<TunnelEvent> for ConnectionStatus {
    fn from(event: TunnelEvent) -> Self {
        match event {
            TunnelEvent::Connecting => Self::Connecting,
            TunnelEvent::Connected => Self::Connected,
            TunnelEvent::Disconnecting => Self::Disconnecting,
            TunnelEvent::Disconnected => Self::Disconnected,
            TunnelEvent::Failed(reason) => Self::Error(reason),
        }
    }
}

/// Owner of the connection state
pub struct ConnectionManager<T: Tunnel> {
    tunnel: T,
    state_tx: watch::Sender<ConnectionState>,
    events: Option<TunnelEvents>,
    timeout: Option<Duration>,
}

impl<T: Tunnel + std::fmt::Debug> std::fmt::Debug for ConnectionManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("tunnel", &self.tunnel)
            .field("state", &*self.state_tx.borrow())
            .field("has_events", &self.events.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<T: Tunnel> ConnectionManager<T> {
    /// Creates a disconnected manager over `tunnel` with no timeout
    #[must_use]
    pub fn new(tunnel: T) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::default());
        Self {
            tunnel,
            state_tx,
            events: None,
            timeout: None,
        }
    }

    /// Limits how long `connect` and `disconnect` wait for the tunnel
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Changes the timeout for later calls
    pub const fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Returns the tunnel
    #[must_use]
    pub const fn tunnel(&self) -> &T {
        &self.tunnel
    }

    /// Returns a snapshot of the current state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Returns the current status
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.state_tx.borrow().status.clone()
    }

    /// Returns the profile the tunnel was started for
    #[must_use]
    pub fn active_profile(&self) -> Option<Uuid> {
        self.state_tx.borrow().active_profile
    }

    /// Subscribes to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Time spent connected so far, if connected
    #[must_use]
    pub fn connection_duration(&self) -> Option<Duration> {
        self.state_tx.borrow().duration_at(Utc::now())
    }

    /// Connects to `profile` and waits until the tunnel is up
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless currently disconnected or failed
    /// - `Tunnel` if the tunnel refuses, fails, or ends its stream early
    /// - `Timeout` if the tunnel is not up within the configured timeout
    pub async fn connect(
        &mut self,
        profile: &Profile,
        options: &TunnelOptions,
    ) -> ConnectionResult<()> {
        let current = self.status();
        if !current.is_idle() {
            return Err(ConnectionError::InvalidState {
                action: "connect",
                status: current.label().to_string(),
            });
        }

        let span = crate::trace_operation!(
            span_names::CONNECTION_ESTABLISH,
            profile_id = %profile.id,
            host = %profile.address,
            port = profile.port
        );
        self.establish(profile, options).instrument(span).await
    }

    async fn establish(
        &mut self,
        profile: &Profile,
        options: &TunnelOptions,
    ) -> ConnectionResult<()> {
        self.events = None;
        self.state_tx.send_modify(|state| {
            state.active_profile = Some(profile.id);
            state.connected_since = None;
        });
        self.transition(ConnectionStatus::Connecting);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.bring_up(profile, options))
                .await
                .unwrap_or_else(|_| Err(ConnectionError::Timeout(limit.as_secs()))),
            None => self.bring_up(profile, options).await,
        };

        if let Err(ConnectionError::Timeout(secs)) = &result {
            tracing::warn!(timeout_secs = secs, "Tunnel did not come up in time");
            self.transition(ConnectionStatus::Error(format!(
                "timed out after {secs} seconds"
            )));
            if let Err(e) = self.tunnel.disconnect().await {
                tracing::warn!(error = %e, "Failed to stop timed out tunnel");
            }
        }
        result
    }

    /// Disconnects and waits until the tunnel is down
    ///
    /// Does nothing when already disconnected. A failed connection is reset
    /// to disconnected without involving the tunnel.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` while a disconnect is already running, or the
    /// tunnel's error if the request could not be delivered.
    pub async fn disconnect(&mut self) -> ConnectionResult<()> {
        let current = self.status();
        match current {
            ConnectionStatus::Disconnected => return Ok(()),
            ConnectionStatus::Disconnecting => {
                return Err(ConnectionError::InvalidState {
                    action: "disconnect",
                    status: current.label().to_string(),
                });
            }
            ConnectionStatus::Error(_) => {
                self.finish_disconnect();
                return Ok(());
            }
            ConnectionStatus::Connecting | ConnectionStatus::Connected => {}
        }

        let span = crate::trace_operation!(span_names::CONNECTION_DISCONNECT);
        self.teardown().instrument(span).await
    }

    async fn teardown(&mut self) -> ConnectionResult<()> {
        self.transition(ConnectionStatus::Disconnecting);
        if let Err(e) = self.tunnel.disconnect().await {
            self.transition(ConnectionStatus::Error(e.to_string()));
            return Err(e);
        }

        if let Some(events) = self.events.take() {
            match self.timeout {
                Some(limit) => {
                    if tokio::time::timeout(limit, self.drain_until_down(events))
                        .await
                        .is_err()
                    {
                        tracing::warn!(
                            timeout_secs = limit.as_secs(),
                            "Tunnel did not confirm shutdown in time"
                        );
                    }
                }
                None => self.drain_until_down(events).await,
            }
        }

        self.finish_disconnect();
        Ok(())
    }

    /// Waits for the next tunnel event after connecting and applies it
    ///
    /// Returns the resulting status, or `None` when there is no open event
    /// stream. A stream that ends while connected is treated as a failure.
    pub async fn poll_event(&mut self) -> Option<ConnectionStatus> {
        let mut events = self.events.take()?;
        match events.next().await {
            Some(event) => {
                self.apply_event(event);
                if self.status() != ConnectionStatus::Disconnected {
                    self.events = Some(events);
                }
            }
            None => {
                if self.status().is_active() {
                    self.transition(ConnectionStatus::Error(
                        "tunnel closed unexpectedly".to_string(),
                    ));
                }
            }
        }
        Some(self.status())
    }

    /// Clears the active profile if it is `id`
    ///
    /// Returns true if the reference was cleared. The tunnel is not touched.
    pub fn clear_active_if(&mut self, id: Uuid) -> bool {
        let mut cleared = false;
        self.state_tx.send_if_modified(|state| {
            if state.active_profile == Some(id) {
                state.active_profile = None;
                cleared = true;
            }
            cleared
        });
        cleared
    }

    /// Asks the tunnel to connect and waits for `Connected`
    ///
    /// Runs as one unit under the connect timeout, so a tunnel that never
    /// answers `connect` times out like one that never reports `Connected`.
    async fn bring_up(
        &mut self,
        profile: &Profile,
        options: &TunnelOptions,
    ) -> ConnectionResult<()> {
        let events = match self.tunnel.connect(profile, options).await {
            Ok(events) => events,
            Err(e) => {
                self.transition(ConnectionStatus::Error(e.to_string()));
                return Err(e);
            }
        };
        self.wait_for_connected(events).await
    }

    async fn wait_for_connected(&mut self, mut events: TunnelEvents) -> ConnectionResult<()> {
        while let Some(event) = events.next().await {
            self.apply_event(event);
            match self.status() {
                ConnectionStatus::Connected => {
                    self.events = Some(events);
                    return Ok(());
                }
                ConnectionStatus::Error(reason) => return Err(ConnectionError::Tunnel(reason)),
                _ => {}
            }
        }

        let reason = "tunnel closed before connecting".to_string();
        self.transition(ConnectionStatus::Error(reason.clone()));
        Err(ConnectionError::Tunnel(reason))
    }

    async fn drain_until_down(&mut self, mut events: TunnelEvents) {
        while let Some(event) = events.next().await {
            self.apply_event(event);
            if matches!(
                self.status(),
                ConnectionStatus::Disconnected | ConnectionStatus::Error(_)
            ) {
                break;
            }
        }
    }

    fn finish_disconnect(&mut self) {
        self.events = None;
        if self.status() != ConnectionStatus::Disconnected {
            self.transition(ConnectionStatus::Disconnected);
        }
        self.state_tx.send_modify(|state| {
            state.active_profile = None;
            state.connected_since = None;
        });
    }

    fn apply_event(&mut self, event: TunnelEvent) {
        let next = ConnectionStatus::from(event);
        if self.status() == next {
            tracing::debug!(status = %next, "Ignoring repeated tunnel event");
            return;
        }
        self.transition(next);
    }

    /// Moves to `next` if the transition is allowed, logging either way
    fn transition(&self, next: ConnectionStatus) {
        self.state_tx.send_if_modified(|state| {
            if !state.status.can_transition_to(&next) {
                tracing::warn!(from = %state.status, to = %next, "Ignoring invalid transition");
                return false;
            }
            tracing::info!(from = %state.status, to = %next, "Connection status changed");
            match &next {
                ConnectionStatus::Connected => state.connected_since = Some(Utc::now()),
                ConnectionStatus::Connecting | ConnectionStatus::Error(_) => {
                    state.connected_since = None;
                }
                ConnectionStatus::Disconnecting | ConnectionStatus::Disconnected => {}
            }
            state.status = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ScriptedTunnel;

    fn profile() -> Profile {
        Profile::from_uri("test", "vless://user@vpn.example.com:443").unwrap()
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let tunnel = ScriptedTunnel::new();
        let mut manager = ConnectionManager::new(tunnel.clone());
        let p = profile();

        manager.connect(&p, &TunnelOptions::default()).await.unwrap();
        let state = manager.state();
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.active_profile, Some(p.id));
        assert!(state.connected_since.is_some());
        assert!(manager.connection_duration().is_some());
        assert_eq!(tunnel.connected_profiles(), vec![p.id]);

        manager.disconnect().await.unwrap();
        let state = manager.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.active_profile.is_none());
        assert!(state.connected_since.is_none());
        assert_eq!(tunnel.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_options_reach_tunnel() {
        let tunnel = ScriptedTunnel::new();
        let mut manager = ConnectionManager::new(tunnel.clone());
        let options = TunnelOptions { kill_switch: true };
        manager.connect(&profile(), &options).await.unwrap();
        assert_eq!(tunnel.last_options(), Some(options));
    }

    #[tokio::test]
    async fn test_connect_rejected_while_connected() {
        let mut manager = ConnectionManager::new(ScriptedTunnel::new());
        let p = profile();
        manager.connect(&p, &TunnelOptions::default()).await.unwrap();
        let err = manager
            .connect(&p, &TunnelOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ConnectionError::InvalidState {
                action: "connect",
                status: "connected".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_tunnel_refuses() {
        let tunnel = ScriptedTunnel::new().failing_connect("no route");
        let mut manager = ConnectionManager::new(tunnel);
        let err = manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::Tunnel("no route".to_string()));
        assert!(matches!(manager.status(), ConnectionStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_tunnel_reports_failure() {
        let tunnel = ScriptedTunnel::new().with_connect_events(vec![
            TunnelEvent::Connecting,
            TunnelEvent::Failed("handshake rejected".to_string()),
        ]);
        let mut manager = ConnectionManager::new(tunnel);
        let err = manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::Tunnel("handshake rejected".to_string()));
        assert_eq!(
            manager.status(),
            ConnectionStatus::Error("handshake rejected".to_string())
        );

        // a failed attempt can be retried
        assert!(manager.status().is_idle());
    }

    #[tokio::test]
    async fn test_stream_ends_before_connected() {
        let tunnel = ScriptedTunnel::stalled().closing_after_script();
        let mut manager = ConnectionManager::new(tunnel);
        let err = manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Tunnel(_)));
    }

    #[tokio::test]
    async fn test_connect_timeout() {
        let tunnel = ScriptedTunnel::stalled();
        let mut manager =
            ConnectionManager::new(tunnel.clone()).with_timeout(Some(Duration::from_millis(50)));
        let err = manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Timeout(_)));
        assert!(matches!(manager.status(), ConnectionStatus::Error(_)));
        assert_eq!(tunnel.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_timeout_covers_hanging_tunnel() {
        let tunnel = ScriptedTunnel::new().hanging_connect();
        let mut manager =
            ConnectionManager::new(tunnel.clone()).with_timeout(Some(Duration::from_millis(50)));
        let p = profile();
        let err = tokio::time::timeout(
            Duration::from_secs(2),
            manager.connect(&p, &TunnelOptions::default()),
        )
        .await
        .expect("connect must give up on its own deadline")
        .unwrap_err();
        assert!(matches!(err, ConnectionError::Timeout(_)));
        assert!(matches!(manager.status(), ConnectionStatus::Error(_)));
        assert_eq!(tunnel.connected_profiles(), vec![p.id]);
    }

    #[tokio::test]
    async fn test_invalid_tunnel_transition_ignored() {
        let tunnel = ScriptedTunnel::new().with_connect_events(vec![
            TunnelEvent::Connecting,
            TunnelEvent::Disconnected,
            TunnelEvent::Connected,
        ]);
        let mut manager = ConnectionManager::new(tunnel);
        manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap();
        assert_eq!(manager.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_poll_event_sees_tunnel_drop() {
        let tunnel = ScriptedTunnel::new();
        let mut manager = ConnectionManager::new(tunnel.clone());
        manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap();

        assert!(tunnel.inject(TunnelEvent::Failed("link lost".to_string())));
        assert_eq!(
            manager.poll_event().await,
            Some(ConnectionStatus::Error("link lost".to_string()))
        );
        assert!(manager.connection_duration().is_none());

        manager.disconnect().await.unwrap();
        assert_eq!(manager.status(), ConnectionStatus::Disconnected);
        assert!(manager.active_profile().is_none());
    }

    #[tokio::test]
    async fn test_poll_event_stream_closed() {
        let tunnel = ScriptedTunnel::new();
        let mut manager = ConnectionManager::new(tunnel.clone());
        manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap();
        tunnel.close();
        assert!(matches!(
            manager.poll_event().await,
            Some(ConnectionStatus::Error(_))
        ));
        assert_eq!(manager.poll_event().await, None);
    }

    #[tokio::test]
    async fn test_disconnect_when_idle_is_noop() {
        let tunnel = ScriptedTunnel::new();
        let mut manager = ConnectionManager::new(tunnel.clone());
        manager.disconnect().await.unwrap();
        assert_eq!(tunnel.disconnect_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let mut manager = ConnectionManager::new(ScriptedTunnel::new());
        let mut rx = manager.subscribe();
        manager
            .connect(&profile(), &TunnelOptions::default())
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_clear_active_if() {
        let mut manager = ConnectionManager::new(ScriptedTunnel::new());
        let p = profile();
        manager.connect(&p, &TunnelOptions::default()).await.unwrap();

        assert!(!manager.clear_active_if(Uuid::new_v4()));
        assert_eq!(manager.active_profile(), Some(p.id));
        assert!(manager.clear_active_if(p.id));
        assert!(manager.active_profile().is_none());
    }
}
