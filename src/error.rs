use std::time::Duration;

use thiserror::Error;

use crate::node_type::NodeType;

/// Errors produced by a [`Registry`](crate::Registry) implementation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested path does not exist in the store.
    #[error("key not found: {path}")]
    NotFound { path: String },

    /// The store is unreachable or the session is not established.
    #[error("registry connection error: {0}")]
    Connection(String),

    /// The session could not be established within the given deadline.
    #[error("registry connection not established within {0:?}")]
    ConnectTimeout(Duration),

    /// Any other failure reported by the store.
    #[error("registry operation failed: {0}")]
    Store(String),
}

/// Errors surfaced by [`RegistryClient`](crate::RegistryClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// A store failure propagated as-is through a pass-through operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// `get_lock` refuses to touch the store while the session is down,
    /// since exclusivity of an acquired lock could not be guaranteed.
    #[error("registry is not connected")]
    NotConnected,

    /// Strict discovery failed to enumerate a node type's children.
    #[error("failed to list {node_type} server nodes")]
    Discovery {
        node_type: NodeType,
        #[source]
        source: RegistryError,
    },

    /// A heartbeat payload did not decode against its node type's schema.
    #[error("malformed heartbeat at {path}")]
    Heartbeat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A failover marker's value is not a decimal epoch-millis timestamp.
    #[error("failover marker {path} has non-numeric timestamp {value:?}")]
    MarkerTimestamp { path: String, value: String },
}
