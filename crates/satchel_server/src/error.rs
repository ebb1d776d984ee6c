//! Server error types.

use satchel_inventory::{CatalogError, InventoryError};
use satchel_shared::OwnerId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the session layer and the server binary.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The server configuration is not valid TOML for [`crate::ServerConfig`].
    #[error("invalid server config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("invalid server config: {0}")]
    ConfigValue(String),

    /// The item catalog failed to load.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An inventory operation failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// The async runtime could not be started.
    #[error("runtime start failed: {0}")]
    Runtime(#[source] std::io::Error),

    /// A player already has a session.
    #[error("player {0} already has a session")]
    AlreadyRegistered(OwnerId),

    /// No session exists for the player.
    #[error("no session for player {0}")]
    UnknownPlayer(OwnerId),

    /// Too many store round trips are outstanding for one session.
    #[error("player {owner} has {pending} store requests in flight")]
    Backpressure {
        /// Session owner.
        owner: OwnerId,
        /// Outstanding continuations.
        pending: usize,
    },

    /// Outstanding continuations did not finish in time.
    #[error("player {owner} still waits on {pending} store requests")]
    Timeout {
        /// Session owner.
        owner: OwnerId,
        /// Continuations still outstanding.
        pending: usize,
    },

    /// The backing store reported a failure.
    #[error("store failure: {0}")]
    Store(String),
}

/// Result alias for the session layer.
pub type ServerResult<T> = Result<T, ServerError>;
