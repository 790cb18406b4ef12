//! The coordination façade used by every scheduler process.
//!
//! [`RegistryClient`] wraps a [`Registry`] backend with namespace bootstrap,
//! heartbeat-based server discovery, a key/value and lock pass-through, and
//! garbage collection of stale failover markers. It holds no durable state,
//! spawns nothing, and performs every operation as one synchronous round
//! trip to the store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use rand::Rng;

use crate::error::ClientError;
use crate::heartbeat::Heartbeat;
use crate::node_type::NodeType;
use crate::registry::{ConnectionListener, Registry, SubscribeListener};
use crate::server::ServerInfo;

/// Failover markers older than this are garbage-collected (7 days).
pub const FAILOVER_MARKER_RETENTION_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Graceful-shutdown hook installed once at startup by the owning process
/// and invoked by shutdown orchestration.
pub trait Stoppable: Send + Sync {
    fn stop(&self, cause: &str);
}

/// Receives per-item failures from lenient operations (`get_server_maps`,
/// marker cleanup). Lenient operations keep going after reporting; they
/// never propagate these failures.
pub trait ErrorSink: Send + Sync {
    fn record(&self, path: &str, error: &ClientError);
}

impl<F> ErrorSink for F
where
    F: Fn(&str, &ClientError) + Send + Sync,
{
    fn record(&self, path: &str, error: &ClientError) {
        self(path, error)
    }
}

/// Default sink: structured warn logs.
struct LogSink;

impl ErrorSink for LogSink {
    fn record(&self, path: &str, error: &ClientError) {
        tracing::warn!(path, error = %error, "registry operation degraded");
    }
}

/// Client-side façade over the shared coordination store.
pub struct RegistryClient {
    registry: Arc<dyn Registry>,
    stoppable: ArcSwapOption<Box<dyn Stoppable>>,
}

impl RegistryClient {
    /// Bootstrap the reserved namespaces, run one stale-marker cleanup pass,
    /// and return a ready client.
    ///
    /// Bootstrap is idempotent and safe against concurrent peers; cleanup
    /// failures are logged per item and never block readiness.
    ///
    /// # Errors
    ///
    /// Returns an error only when a namespace root can neither be found nor
    /// created.
    pub async fn new(registry: Arc<dyn Registry>) -> Result<Self, ClientError> {
        let client = Self {
            registry,
            stoppable: ArcSwapOption::empty(),
        };
        client.bootstrap().await?;
        client.clean_stale_failover_markers().await;
        Ok(client)
    }

    async fn bootstrap(&self) -> Result<(), ClientError> {
        for node_type in NodeType::ALL {
            let path = node_type.registry_path();
            if self.registry.exists(path).await? {
                continue;
            }
            if let Err(err) = self.registry.put(path, "", false).await {
                // A peer may create the root between our check and our put.
                if self.registry.exists(path).await.unwrap_or(false) {
                    tracing::debug!(path, error = %err, "namespace created concurrently by a peer");
                } else {
                    return Err(err.into());
                }
            } else {
                tracing::debug!(path, "created registry namespace");
            }
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.registry.is_connected()
    }

    /// Block until the store session is established or `timeout` elapses.
    pub async fn connect_until_timeout(&self, timeout: Duration) -> Result<(), ClientError> {
        Ok(self.registry.connect_until_timeout(timeout).await?)
    }

    /// Decode every live heartbeat under `node_type`'s root into a
    /// [`ServerInfo`].
    ///
    /// Empty and malformed payloads are skipped with a warning while their
    /// siblings are still processed. Result order follows whatever the store
    /// returns and must be treated as unordered.
    pub async fn get_server_list(&self, node_type: NodeType) -> Vec<ServerInfo> {
        let mut servers = Vec::new();
        for (child, raw) in self.get_server_maps(node_type).await {
            let path = format!("{}/{}", node_type.registry_path(), child);
            if raw.is_empty() {
                tracing::warn!(path = %path, "empty heartbeat payload, skipping node");
                continue;
            }
            match Heartbeat::decode(node_type, &raw) {
                Ok(Some(heartbeat)) => {
                    servers.push(ServerInfo::from_heartbeat(&heartbeat, &raw, &path));
                }
                Ok(None) => {
                    tracing::warn!(
                        node_type = %node_type,
                        path = %path,
                        "node type carries no heartbeat schema, returning bare descriptor"
                    );
                    servers.push(ServerInfo::bare(&raw, &path));
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "malformed heartbeat payload, skipping node");
                }
            }
        }
        servers
    }

    /// Pick one discovered server uniformly at random, or `None` when the
    /// node type has no live members.
    pub async fn get_random_server(&self, node_type: NodeType) -> Option<ServerInfo> {
        let mut servers = self.get_server_list(node_type).await;
        if servers.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..servers.len());
        Some(servers.swap_remove(index))
    }

    /// Lenient discovery: child key → raw heartbeat payload.
    ///
    /// Any enumeration or fetch failure degrades to a partial (possibly
    /// empty) map; failures go to the default tracing sink.
    pub async fn get_server_maps(&self, node_type: NodeType) -> HashMap<String, String> {
        self.get_server_maps_with(node_type, &LogSink).await
    }

    /// Same as [`get_server_maps`](Self::get_server_maps), reporting
    /// per-item failures to `sink` instead of the log.
    pub async fn get_server_maps_with(
        &self,
        node_type: NodeType,
        sink: &dyn ErrorSink,
    ) -> HashMap<String, String> {
        let root = node_type.registry_path();
        let mut map = HashMap::new();
        let children = match self.registry.children(root).await {
            Ok(children) => children,
            Err(err) => {
                sink.record(root, &ClientError::Registry(err));
                return map;
            }
        };
        for child in children {
            let path = format!("{root}/{child}");
            match self.registry.get(&path).await {
                Ok(value) => {
                    map.entry(child).or_insert(value);
                }
                Err(err) => sink.record(&path, &ClientError::Registry(err)),
            }
        }
        map
    }

    /// Whether any registered key under `node_type` contains `host`.
    ///
    /// This is a substring match, kept as observed in production: a short
    /// host like `10.0.0.1` also matches an unrelated `10.0.0.11:5678`.
    pub async fn check_node_exists(&self, host: &str, node_type: NodeType) -> bool {
        self.get_server_maps(node_type)
            .await
            .keys()
            .any(|key| key.contains(host))
    }

    /// Strict discovery: the set of child keys under `node_type`'s root.
    ///
    /// # Errors
    ///
    /// Unlike [`get_server_maps`](Self::get_server_maps), a store failure is
    /// wrapped in [`ClientError::Discovery`] and propagated; callers that
    /// need a complete view use this path.
    pub async fn get_server_node_set(
        &self,
        node_type: NodeType,
    ) -> Result<HashSet<String>, ClientError> {
        match self.registry.children(node_type.registry_path()).await {
            Ok(children) => Ok(children.into_iter().collect()),
            Err(source) => Err(ClientError::Discovery { node_type, source }),
        }
    }

    pub async fn get(&self, key: &str) -> Result<String, ClientError> {
        Ok(self.registry.get(key).await?)
    }

    /// Persistent write.
    pub async fn persist(&self, key: &str, value: &str) -> Result<(), ClientError> {
        tracing::info!(key, value, "persist");
        Ok(self.registry.put(key, value, false).await?)
    }

    /// Ephemeral write, tied to this process's store session.
    pub async fn persist_ephemeral(&self, key: &str, value: &str) -> Result<(), ClientError> {
        Ok(self.registry.put(key, value, true).await?)
    }

    pub async fn remove(&self, key: &str) -> Result<(), ClientError> {
        Ok(self.registry.delete(key).await?)
    }

    pub async fn exists(&self, key: &str) -> Result<bool, ClientError> {
        Ok(self.registry.exists(key).await?)
    }

    pub async fn get_children_keys(&self, key: &str) -> Result<Vec<String>, ClientError> {
        Ok(self.registry.children(key).await?)
    }

    /// Acquire the named lock at `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotConnected`] before issuing any store
    /// call when the session is down; a lock acquired over an unstable
    /// session could not guarantee exclusivity.
    pub async fn get_lock(&self, key: &str) -> Result<bool, ClientError> {
        if !self.registry.is_connected() {
            return Err(ClientError::NotConnected);
        }
        Ok(self.registry.acquire_lock(key).await?)
    }

    /// Release the named lock at `key`. The caller is trusted to release
    /// only locks it holds; no ownership check happens at this layer.
    pub async fn release_lock(&self, key: &str) -> Result<bool, ClientError> {
        Ok(self.registry.release_lock(key).await?)
    }

    /// Register a change listener for `path`. Pure pass-through: no dedupe,
    /// reordering, or buffering happens here.
    pub async fn subscribe(
        &self,
        path: &str,
        listener: Arc<dyn SubscribeListener>,
    ) -> Result<(), ClientError> {
        Ok(self.registry.subscribe(path, listener).await?)
    }

    pub async fn add_connection_state_listener(
        &self,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<(), ClientError> {
        Ok(self.registry.add_connection_state_listener(listener).await?)
    }

    /// Install the graceful-shutdown hook. Intended to be set exactly once
    /// at startup; a second write wins over the first.
    pub fn set_stoppable(&self, stoppable: impl Stoppable + 'static) {
        let boxed: Box<dyn Stoppable> = Box::new(stoppable);
        self.stoppable.store(Some(Arc::new(boxed)));
    }

    pub fn get_stoppable(&self) -> Option<Arc<Box<dyn Stoppable>>> {
        self.stoppable.load_full()
    }

    /// Delete failover markers older than the retention window, reporting
    /// per-item failures to the log. Returns how many markers were deleted.
    ///
    /// Runs once at construction; call again from an external scheduler if
    /// recurring cleanup is wanted.
    pub async fn clean_stale_failover_markers(&self) -> usize {
        self.clean_stale_failover_markers_with(&LogSink).await
    }

    /// Same as
    /// [`clean_stale_failover_markers`](Self::clean_stale_failover_markers),
    /// reporting per-item failures to `sink`.
    ///
    /// A marker is deleted iff `now - its timestamp` exceeds
    /// [`FAILOVER_MARKER_RETENTION_MS`]. Markers with non-numeric values are
    /// reported and left untouched; a failed read or delete never stops the
    /// pass.
    pub async fn clean_stale_failover_markers_with(&self, sink: &dyn ErrorSink) -> usize {
        let root = NodeType::FailoverFinishNodes.registry_path();
        let markers = match self.registry.children(root).await {
            Ok(markers) => markers,
            Err(err) => {
                sink.record(root, &ClientError::Registry(err));
                return 0;
            }
        };
        let now = now_millis();
        let mut deleted = 0;
        for marker in markers {
            let path = format!("{root}/{marker}");
            let value = match self.registry.get(&path).await {
                Ok(value) => value,
                Err(err) => {
                    sink.record(&path, &ClientError::Registry(err));
                    continue;
                }
            };
            let finish_time: i64 = match value.trim().parse() {
                Ok(timestamp) => timestamp,
                Err(_) => {
                    sink.record(
                        &path,
                        &ClientError::MarkerTimestamp {
                            path: path.clone(),
                            value,
                        },
                    );
                    continue;
                }
            };
            if now - finish_time > FAILOVER_MARKER_RETENTION_MS {
                match self.registry.delete(&path).await {
                    Ok(()) => {
                        deleted += 1;
                        tracing::info!(path = %path, "cleared failover marker older than the retention window");
                    }
                    Err(err) => sink.record(&path, &ClientError::Registry(err)),
                }
            }
        }
        deleted
    }

    pub async fn close(&self) -> Result<(), ClientError> {
        Ok(self.registry.close().await?)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as i64
}
