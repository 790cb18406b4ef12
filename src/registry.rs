//! The external coordination-store seam.
//!
//! [`Registry`] is the capability set this crate requires from the store:
//! a hierarchical key-value tree with existence checks, persistent and
//! ephemeral writes, children listing, change subscriptions, connection
//! state notifications, and named locks. Consensus, session management, and
//! watch delivery are entirely the implementation's concern.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RegistryError;

/// Kind of change observed under a subscribed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Add,
    Remove,
    Update,
}

/// One change notification delivered to a [`SubscribeListener`].
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    pub path: String,
    pub data: String,
}

/// Session state reported by the store to [`ConnectionListener`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Reconnected,
    Suspended,
}

/// Callback for changes under a subscribed path. Implementations must expect
/// at least one notification per mutating event, in the order the store
/// observed them; nothing in this crate dedupes or reorders.
pub trait SubscribeListener: Send + Sync {
    fn notify(&self, event: Event);
}

impl<F> SubscribeListener for F
where
    F: Fn(Event) + Send + Sync,
{
    fn notify(&self, event: Event) {
        self(event)
    }
}

/// Callback for store-wide session state changes.
pub trait ConnectionListener: Send + Sync {
    fn on_update(&self, state: ConnectionState);
}

impl<F> ConnectionListener for F
where
    F: Fn(ConnectionState) + Send + Sync,
{
    fn on_update(&self, state: ConnectionState) {
        self(state)
    }
}

/// Capability set required from the coordination store.
///
/// Every method is one round trip with no retry at this layer; only
/// [`connect_until_timeout`](Registry::connect_until_timeout) carries a
/// deadline.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, RegistryError>;

    /// Write `value` at `path`; `ephemeral` ties the node to the writer's
    /// session so it disappears when that session ends.
    async fn put(&self, path: &str, value: &str, ephemeral: bool) -> Result<(), RegistryError>;

    /// Read the value at `path`, failing with
    /// [`RegistryError::NotFound`] when absent.
    async fn get(&self, path: &str) -> Result<String, RegistryError>;

    async fn delete(&self, path: &str) -> Result<(), RegistryError>;

    /// Immediate child keys of `path`, in unspecified order.
    async fn children(&self, path: &str) -> Result<Vec<String>, RegistryError>;

    async fn subscribe(
        &self,
        path: &str,
        listener: Arc<dyn SubscribeListener>,
    ) -> Result<(), RegistryError>;

    async fn add_connection_state_listener(
        &self,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<(), RegistryError>;

    /// Acquire the named lock at `path`, returning whether it was obtained.
    async fn acquire_lock(&self, path: &str) -> Result<bool, RegistryError>;

    /// Release the named lock at `path`. No ownership check is performed.
    async fn release_lock(&self, path: &str) -> Result<bool, RegistryError>;

    fn is_connected(&self) -> bool;

    /// Block until the session is established, failing with
    /// [`RegistryError::ConnectTimeout`] once `timeout` elapses.
    async fn connect_until_timeout(&self, timeout: Duration) -> Result<(), RegistryError>;

    async fn close(&self) -> Result<(), RegistryError>;
}
