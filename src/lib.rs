//! Coordination-store façade for a distributed scheduler's cluster processes.
//!
//! This crate provides:
//! - Idempotent bootstrap of the reserved registry namespaces (masters,
//!   workers, alert service, failover markers)
//! - Heartbeat-based server discovery, lenient or strict per caller
//! - A key/value and named-lock pass-through over the store
//! - Change and connection-state subscription registration
//! - Garbage collection of failover markers past a 7-day retention window
//!
//! The store itself is abstract: anything implementing [`Registry`]
//! (ZooKeeper, etcd, or the bundled [`InMemoryRegistry`]) supplies
//! consensus, sessions, and watch delivery. This crate adds no retries,
//! caching, or background work of its own; every call is one round trip.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scheduler_registry::{InMemoryRegistry, NodeType, RegistryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(InMemoryRegistry::new());
//!     let client = RegistryClient::new(registry).await?;
//!
//!     // A worker announces itself; masters discover it.
//!     client
//!         .persist_ephemeral(
//!             "/nodes/worker/10.0.0.5:1234",
//!             r#"{"startupTime":1,"reportTime":2,"processId":3,"host":"10.0.0.5","port":1234}"#,
//!         )
//!         .await?;
//!     for server in client.get_server_list(NodeType::Worker).await {
//!         println!("worker {} at {}:{}", server.id, server.host, server.port);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod heartbeat;
mod memory;
mod node_type;
mod registry;
mod server;

pub use client::{ErrorSink, RegistryClient, Stoppable, FAILOVER_MARKER_RETENTION_MS};
pub use error::{ClientError, RegistryError};
pub use heartbeat::{AlertHeartbeat, Heartbeat, MasterHeartbeat, WorkerHeartbeat};
pub use memory::InMemoryRegistry;
pub use node_type::NodeType;
pub use registry::{
    ConnectionListener, ConnectionState, Event, EventType, Registry, SubscribeListener,
};
pub use server::ServerInfo;
