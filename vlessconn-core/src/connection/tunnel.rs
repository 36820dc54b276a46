//! Boundary to the platform networking module.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ConnectionError;
use crate::models::Profile;

/// Status event reported by a tunnel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelEvent {
    /// Handshake in progress
    Connecting,
    /// Tunnel is carrying traffic
    Connected,
    /// Teardown in progress
    Disconnecting,
    /// Tunnel is down
    Disconnected,
    /// Tunnel failed
    Failed(String),
}

/// Stream of events for one connection attempt
pub type TunnelEvents = BoxStream<'static, TunnelEvent>;

/// Options passed to the tunnel with each connection attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TunnelOptions {
    /// Block traffic outside the tunnel while it is down
    pub kill_switch: bool,
}

/// A VPN tunnel implementation
///
/// This crate never moves packets itself; a platform module implements this
/// trait and reports progress as [`TunnelEvent`]s.
#[async_trait]
pub trait Tunnel: Send + Sync {
    /// Starts a tunnel for `profile` and returns its event stream
    ///
    /// The stream reports the tunnel's status changes, including later
    /// drops, until it ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt could not be started at all.
    async fn connect(
        &self,
        profile: &Profile,
        options: &TunnelOptions,
    ) -> Result<TunnelEvents, ConnectionError>;

    /// Asks the running tunnel to shut down
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be delivered.
    async fn disconnect(&self) -> Result<(), ConnectionError>;
}
