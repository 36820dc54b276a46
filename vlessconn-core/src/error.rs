//! Error types for `vlessconn`
//!
//! Each concern has its own error enum and `Result` alias. [`VlessConnError`]
//! wraps all of them for callers that don't care which layer failed.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced while parsing a VLESS link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    /// The text is not a syntactically valid link, has the wrong scheme,
    /// or is missing the host or port
    #[error("Invalid link format: {0}")]
    InvalidFormat(String),

    /// The port is numeric but outside 1-65535
    #[error("Port out of range (1-65535): {0}")]
    OutOfRange(String),
}

/// Result type for link parsing
pub type UriResult<T> = Result<T, UriError>;

/// Errors produced while building a usable profile from user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// A required text field is empty
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    /// The link or the manually entered port is invalid
    #[error(transparent)]
    Uri(#[from] UriError),
}

/// Result type for profile construction
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors reported by the persistence collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying I/O failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for persistence collaborator operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors reported by the profile store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Reading or decoding the persisted collection failed
    #[error("Failed to load profiles: {0}")]
    LoadFailed(String),

    /// Writing the collection failed; the in-memory change was kept
    #[error("Failed to persist profiles: {0}")]
    Persistence(String),

    /// A profile with this ID is already stored
    #[error("Profile ID already exists: {0}")]
    DuplicateId(Uuid),

    /// The record handed to the store violates a profile invariant
    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

/// Result type for profile store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors related to settings and the config directory
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not determine a config directory for this platform
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// Failed to read the settings file
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// File that failed to read
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// Settings file contents are not valid
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// Failed to write the settings file
    #[error("Failed to write {path}: {reason}")]
    Write {
        /// File that failed to write
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// A setting has an unacceptable value
    #[error("Invalid setting '{key}': {reason}")]
    Validation {
        /// Setting key
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from the connection state machine and its tunnel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The tunnel reported a failure
    #[error("Tunnel error: {0}")]
    Tunnel(String),

    /// The request is not valid in the current state
    #[error("Cannot {action} while {status}")]
    InvalidState {
        /// The rejected action
        action: &'static str,
        /// Current status label
        status: String,
    },

    /// The tunnel did not settle within the configured timeout
    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    /// No profile with the given ID exists
    #[error("Profile not found: {0}")]
    ProfileNotFound(Uuid),

    /// No profile is selected
    #[error("No profile selected")]
    NothingSelected,
}

/// Result type for connection operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Top-level error for `vlessconn`
#[derive(Debug, Error)]
pub enum VlessConnError {
    /// Link parsing error
    #[error(transparent)]
    Uri(#[from] UriError),

    /// Profile construction error
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Profile store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type using the top-level error
pub type VlessConnResult<T> = Result<T, VlessConnError>;
