//! Shared test harness: fault-injecting registry wrappers and a capturing
//! error sink, so the façade's lenient/strict split can be exercised
//! without a live coordination store.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scheduler_registry::{
    ClientError, ConnectionListener, ErrorSink, InMemoryRegistry, Registry, RegistryError,
    SubscribeListener,
};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Wraps [`InMemoryRegistry`] with switchable failures so tests can break
/// enumeration or individual fetches mid-flight.
pub struct FlakyRegistry {
    pub inner: Arc<InMemoryRegistry>,
    fail_children: AtomicBool,
    fail_gets: Mutex<HashSet<String>>,
    fail_deletes: Mutex<HashSet<String>>,
}

impl FlakyRegistry {
    pub fn new(inner: Arc<InMemoryRegistry>) -> Self {
        Self {
            inner,
            fail_children: AtomicBool::new(false),
            fail_gets: Mutex::new(HashSet::new()),
            fail_deletes: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_children(&self, fail: bool) {
        self.fail_children.store(fail, Ordering::SeqCst);
    }

    pub fn fail_get(&self, path: &str) {
        self.fail_gets.lock().unwrap().insert(path.to_string());
    }

    pub fn fail_delete(&self, path: &str) {
        self.fail_deletes.lock().unwrap().insert(path.to_string());
    }
}

#[async_trait]
impl Registry for FlakyRegistry {
    async fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        self.inner.exists(path).await
    }

    async fn put(&self, path: &str, value: &str, ephemeral: bool) -> Result<(), RegistryError> {
        self.inner.put(path, value, ephemeral).await
    }

    async fn get(&self, path: &str) -> Result<String, RegistryError> {
        if self.fail_gets.lock().unwrap().contains(path) {
            return Err(RegistryError::Store(format!("injected get failure: {path}")));
        }
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> Result<(), RegistryError> {
        if self.fail_deletes.lock().unwrap().contains(path) {
            return Err(RegistryError::Store(format!(
                "injected delete failure: {path}"
            )));
        }
        self.inner.delete(path).await
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        if self.fail_children.load(Ordering::SeqCst) {
            return Err(RegistryError::Store("injected children failure".to_string()));
        }
        self.inner.children(path).await
    }

    async fn subscribe(
        &self,
        path: &str,
        listener: Arc<dyn SubscribeListener>,
    ) -> Result<(), RegistryError> {
        self.inner.subscribe(path, listener).await
    }

    async fn add_connection_state_listener(
        &self,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<(), RegistryError> {
        self.inner.add_connection_state_listener(listener).await
    }

    async fn acquire_lock(&self, path: &str) -> Result<bool, RegistryError> {
        self.inner.acquire_lock(path).await
    }

    async fn release_lock(&self, path: &str) -> Result<bool, RegistryError> {
        self.inner.release_lock(path).await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn connect_until_timeout(&self, timeout: Duration) -> Result<(), RegistryError> {
        self.inner.connect_until_timeout(timeout).await
    }

    async fn close(&self) -> Result<(), RegistryError> {
        self.inner.close().await
    }
}

/// Counts lock-acquire round trips so tests can prove `get_lock`
/// short-circuits before touching the store.
pub struct CountingRegistry {
    pub inner: Arc<InMemoryRegistry>,
    pub acquire_calls: AtomicUsize,
}

impl CountingRegistry {
    pub fn new(inner: Arc<InMemoryRegistry>) -> Self {
        Self {
            inner,
            acquire_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Registry for CountingRegistry {
    async fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        self.inner.exists(path).await
    }

    async fn put(&self, path: &str, value: &str, ephemeral: bool) -> Result<(), RegistryError> {
        self.inner.put(path, value, ephemeral).await
    }

    async fn get(&self, path: &str) -> Result<String, RegistryError> {
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> Result<(), RegistryError> {
        self.inner.delete(path).await
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        self.inner.children(path).await
    }

    async fn subscribe(
        &self,
        path: &str,
        listener: Arc<dyn SubscribeListener>,
    ) -> Result<(), RegistryError> {
        self.inner.subscribe(path, listener).await
    }

    async fn add_connection_state_listener(
        &self,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<(), RegistryError> {
        self.inner.add_connection_state_listener(listener).await
    }

    async fn acquire_lock(&self, path: &str) -> Result<bool, RegistryError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire_lock(path).await
    }

    async fn release_lock(&self, path: &str) -> Result<bool, RegistryError> {
        self.inner.release_lock(path).await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn connect_until_timeout(&self, timeout: Duration) -> Result<(), RegistryError> {
        self.inner.connect_until_timeout(timeout).await
    }

    async fn close(&self) -> Result<(), RegistryError> {
        self.inner.close().await
    }
}

/// Collects (path, rendered error) pairs from lenient operations.
#[derive(Default)]
pub struct CaptureSink {
    records: Mutex<Vec<(String, String)>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(String, String)> {
        self.records.lock().unwrap().clone()
    }
}

impl ErrorSink for CaptureSink {
    fn record(&self, path: &str, error: &ClientError) {
        self.records
            .lock()
            .unwrap()
            .push((path.to_string(), error.to_string()));
    }
}
