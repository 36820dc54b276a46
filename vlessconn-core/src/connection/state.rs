//! Connection status and its allowed transitions.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Status of the tunnel as seen by the front end
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No tunnel
    #[default]
    Disconnected,
    /// Waiting for the tunnel to come up
    Connecting,
    /// Tunnel is up
    Connected,
    /// Waiting for the tunnel to go down
    Disconnecting,
    /// The tunnel failed; carries the reason
    Error(String),
}

impl ConnectionStatus {
    /// Returns true if the state machine may move from `self` to `next`
    ///
    /// ```text
    /// Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected
    /// Connecting | Connected | Disconnecting -> Error
    /// Connecting -> Disconnecting
    /// Error -> Connecting | Disconnected
    /// ```
    #[must_use]
    pub const fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Connected | Self::Disconnecting)
                | (Self::Connected, Self::Disconnecting)
                | (Self::Disconnecting, Self::Disconnected)
                | (
                    Self::Connecting | Self::Connected | Self::Disconnecting,
                    Self::Error(_)
                )
                | (Self::Error(_), Self::Connecting | Self::Disconnected)
        )
    }

    /// Returns true while a tunnel is up or being set up
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Returns true if a new connection may be started
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Error(_))
    }

    /// Short label for logs and status lines
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(reason) => write!(f, "error: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Snapshot of the connection published to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionState {
    /// Current status
    pub status: ConnectionStatus,
    /// Profile the tunnel was started for
    pub active_profile: Option<Uuid>,
    /// When the tunnel reported `Connected`
    pub connected_since: Option<DateTime<Utc>>,
}

impl ConnectionState {
    /// Time spent connected as of `now`, if connected
    #[must_use]
    pub fn duration_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.status != ConnectionStatus::Connected {
            return None;
        }
        self.connected_since
            .map(|since| (now - since).to_std().unwrap_or_default())
    }
}

/// Formats a duration as `HH:MM:SS`
///
/// Hours keep counting past 99.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
