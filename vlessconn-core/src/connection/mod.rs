//! Connection state machine
//!
//! [`ConnectionManager`] drives a [`Tunnel`] through
//! `Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected`,
//! with `Error` reachable from every active state. The tunnel itself lives
//! outside this crate; [`ScriptedTunnel`] stands in for it in tests.

mod manager;
mod scripted;
mod state;
mod tunnel;

pub use manager::ConnectionManager;
pub use scripted::ScriptedTunnel;
pub use state::{ConnectionState, ConnectionStatus, format_duration};
pub use tunnel::{Tunnel, TunnelEvent, TunnelEvents, TunnelOptions};
