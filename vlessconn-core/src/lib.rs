//! `vlessconn` Core Library
//!
//! This crate provides the core functionality of the `vlessconn` VPN client
//! front end: the VLESS link codec, the saved-profile store, settings, and the
//! connection state machine that drives an externally supplied tunnel.
//!
//! # Crate Structure
//!
//! - [`uri`] - Parse and generate `vless://` links, batch import
//! - [`models`] - Saved profile record
//! - [`store`] - Write-through profile store
//! - [`storage`] - Key-value persistence collaborators (memory, files)
//! - [`config`] - Application settings and config directory
//! - [`connection`] - Tunnel trait and connection state machine
//! - [`client`] - Application context over all of the above
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod tracing;
pub mod uri;

pub use client::{ImportSkip, ImportSummary, VpnClient, import_links};
pub use config::{AppSettings, ConfigManager, LoggingSettings, Theme};
pub use connection::{
    ConnectionManager, ConnectionState, ConnectionStatus, ScriptedTunnel, Tunnel, TunnelEvent,
    TunnelEvents, TunnelOptions, format_duration,
};
pub use error::{
    ConfigError, ConfigResult, ConnectionError, ConnectionResult, ProfileError, ProfileResult,
    StorageError, StorageResult, StoreError, StoreResult, UriError, UriResult, VlessConnError,
    VlessConnResult,
};
pub use models::{Profile, RealityParams, TransportKind};
pub use storage::{FileStore, KeyValueStore, MemoryStore, PROFILES_KEY};
pub use store::{DeleteOutcome, ProfileStore};
pub use tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult, init_tracing,
    is_tracing_initialized,
};
pub use uri::{BatchParseResult, ParsedUri, SkippedLink};
