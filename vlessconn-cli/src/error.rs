//! CLI error types and exit codes.

use vlessconn_core::error::{
    ConfigError, ProfileError, StoreError, UriError, VlessConnError,
};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or storage errors
    pub const GENERAL_ERROR: i32 = 1;
    /// The named profile does not exist
    pub const NOT_FOUND: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// More than one profile matches
    #[error("Ambiguous profile name '{query}'. Matches: {matches}")]
    Ambiguous {
        /// What the user typed
        query: String,
        /// Comma-separated matching names
        matches: String,
    },

    /// Link error
    #[error("Invalid link: {0}")]
    Uri(String),

    /// Profile validation error
    #[error("Invalid profile: {0}")]
    Profile(String),

    /// Profile store error
    #[error("Storage error: {0}")]
    Store(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// Import error
    #[error("Import error: {0}")]
    Import(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<VlessConnError> for CliError {
    fn from(err: VlessConnError) -> Self {
        match err {
            VlessConnError::Uri(e) => e.into(),
            VlessConnError::Profile(e) => e.into(),
            VlessConnError::Store(e) => e.into(),
            VlessConnError::Config(e) => e.into(),
            VlessConnError::Connection(e) => Self::Config(e.to_string()),
            VlessConnError::Io(e) => Self::Io(e),
        }
    }
}

impl From<UriError> for CliError {
    fn from(err: UriError) -> Self {
        Self::Uri(err.to_string())
    }
}

impl From<ProfileError> for CliError {
    fn from(err: ProfileError) -> Self {
        Self::Profile(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidProfile(e) => e.into(),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, storage, IO)
    /// - 2: Profile not found
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ProfileNotFound(_) => exit_codes::NOT_FOUND,
            Self::Config(_)
            | Self::Ambiguous { .. }
            | Self::Uri(_)
            | Self::Profile(_)
            | Self::Store(_)
            | Self::Export(_)
            | Self::Import(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
