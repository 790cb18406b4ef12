//! In-memory [`Registry`] backend.
//!
//! A single-process stand-in for the real coordination store, used by the
//! crate's tests and handy for local runs. It keeps the whole tree in a
//! `BTreeMap`, tracks which nodes are ephemeral so `close` drops them the
//! way a session expiry would, and delivers change events synchronously to
//! subscribed listeners.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::RegistryError;
use crate::registry::{
    ConnectionListener, ConnectionState, Event, EventType, Registry, SubscribeListener,
};

#[derive(Debug, Clone)]
struct Node {
    value: String,
    ephemeral: bool,
}

#[derive(Default)]
struct Listeners {
    subscriptions: Vec<(String, Arc<dyn SubscribeListener>)>,
    connection: Vec<Arc<dyn ConnectionListener>>,
}

pub struct InMemoryRegistry {
    nodes: Mutex<BTreeMap<String, Node>>,
    locks: Mutex<HashSet<String>>,
    listeners: Mutex<Listeners>,
    connected: AtomicBool,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(BTreeMap::new()),
            locks: Mutex::new(HashSet::new()),
            listeners: Mutex::new(Listeners::default()),
            connected: AtomicBool::new(true),
        }
    }

    /// Flip the simulated session state and notify connection listeners.
    pub async fn set_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::SeqCst);
        if was == connected {
            return;
        }
        let state = if connected {
            ConnectionState::Reconnected
        } else {
            ConnectionState::Disconnected
        };
        let listeners = self.listeners.lock().await.connection.clone();
        for listener in listeners {
            listener.on_update(state);
        }
    }

    fn ensure_connected(&self) -> Result<(), RegistryError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistryError::Connection(
                "registry is disconnected".to_string(),
            ))
        }
    }

    async fn notify(&self, event: Event) {
        let listeners: Vec<Arc<dyn SubscribeListener>> = {
            let guard = self.listeners.lock().await;
            guard
                .subscriptions
                .iter()
                .filter(|(path, _)| {
                    event.path == *path || event.path.starts_with(&format!("{path}/"))
                })
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener.notify(event.clone());
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        self.ensure_connected()?;
        Ok(self.nodes.lock().await.contains_key(path))
    }

    async fn put(&self, path: &str, value: &str, ephemeral: bool) -> Result<(), RegistryError> {
        self.ensure_connected()?;
        let previous = self.nodes.lock().await.insert(
            path.to_string(),
            Node {
                value: value.to_string(),
                ephemeral,
            },
        );
        let event_type = if previous.is_some() {
            EventType::Update
        } else {
            EventType::Add
        };
        self.notify(Event {
            event_type,
            path: path.to_string(),
            data: value.to_string(),
        })
        .await;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<String, RegistryError> {
        self.ensure_connected()?;
        self.nodes
            .lock()
            .await
            .get(path)
            .map(|node| node.value.clone())
            .ok_or_else(|| RegistryError::NotFound {
                path: path.to_string(),
            })
    }

    async fn delete(&self, path: &str) -> Result<(), RegistryError> {
        self.ensure_connected()?;
        let removed = self.nodes.lock().await.remove(path);
        if let Some(node) = removed {
            self.notify(Event {
                event_type: EventType::Remove,
                path: path.to_string(),
                data: node.value,
            })
            .await;
        }
        Ok(())
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        self.ensure_connected()?;
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let nodes = self.nodes.lock().await;
        let mut children: Vec<String> = Vec::new();
        for key in nodes.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if rest.is_empty() {
                    continue;
                }
                let child = match rest.split_once('/') {
                    Some((first, _)) => first,
                    None => rest,
                };
                if children.last().map(String::as_str) != Some(child) {
                    children.push(child.to_string());
                }
            }
        }
        Ok(children)
    }

    async fn subscribe(
        &self,
        path: &str,
        listener: Arc<dyn SubscribeListener>,
    ) -> Result<(), RegistryError> {
        self.ensure_connected()?;
        self.listeners
            .lock()
            .await
            .subscriptions
            .push((path.to_string(), listener));
        Ok(())
    }

    async fn add_connection_state_listener(
        &self,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<(), RegistryError> {
        self.listeners.lock().await.connection.push(listener);
        Ok(())
    }

    async fn acquire_lock(&self, path: &str) -> Result<bool, RegistryError> {
        self.ensure_connected()?;
        Ok(self.locks.lock().await.insert(path.to_string()))
    }

    async fn release_lock(&self, path: &str) -> Result<bool, RegistryError> {
        self.ensure_connected()?;
        Ok(self.locks.lock().await.remove(path))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect_until_timeout(&self, timeout: Duration) -> Result<(), RegistryError> {
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.is_connected() {
            if tokio::time::Instant::now() >= deadline {
                return Err(RegistryError::ConnectTimeout(timeout));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), RegistryError> {
        self.nodes.lock().await.retain(|_, node| !node.ephemeral);
        self.set_connected(false).await;
        tracing::debug!("in-memory registry closed, ephemeral nodes dropped");
        Ok(())
    }
}
