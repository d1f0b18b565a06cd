//! Process-wide registry of named health probes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ConfigError;

/// Result of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// The resource is resolved and its endpoint answers.
    Healthy,
    /// The resource has not finished resolving; expected to clear on its own.
    NotReady {
        /// Why the probe cannot report a definitive result yet.
        reason: String,
    },
    /// The resource is not servable.
    Unhealthy {
        /// Why the resource is considered down.
        reason: String,
    },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// A named probe evaluated on demand by the host's health subsystem.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> HealthStatus;
}

/// Append-only registry of named probes.
///
/// Keys are unique per resource instance; registering the same key twice is a
/// configuration error. Registration of different keys is safe from
/// concurrent contexts.
#[derive(Clone, Default)]
pub struct HealthRegistry {
    probes: Arc<Mutex<HashMap<String, Arc<dyn HealthProbe>>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe under `key`.
    pub fn register(&self, key: &str, probe: Arc<dyn HealthProbe>) -> Result<(), ConfigError> {
        let mut probes = self.probes.lock().expect("health registry lock poisoned");
        if probes.contains_key(key) {
            return Err(ConfigError::DuplicateHealthCheck {
                key: key.to_string(),
            });
        }
        probes.insert(key.to_string(), probe);

        tracing::debug!("registered health check '{}'", key);
        Ok(())
    }

    /// Evaluate the probe registered under `key`.
    ///
    /// Returns `None` for unknown keys.
    pub async fn check(&self, key: &str) -> Option<HealthStatus> {
        let probe = {
            let probes = self.probes.lock().expect("health registry lock poisoned");
            probes.get(key).cloned()
        };

        match probe {
            Some(probe) => Some(probe.check().await),
            None => None,
        }
    }

    /// Evaluate every registered probe, sorted by key.
    pub async fn check_all(&self) -> Vec<(String, HealthStatus)> {
        let mut entries: Vec<(String, Arc<dyn HealthProbe>)> = {
            let probes = self.probes.lock().expect("health registry lock poisoned");
            probes
                .iter()
                .map(|(key, probe)| (key.clone(), Arc::clone(probe)))
                .collect()
        };
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut results = Vec::with_capacity(entries.len());
        for (key, probe) in entries {
            let status = probe.check().await;
            results.push((key, status));
        }
        results
    }

    /// Registered probe keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let probes = self.probes.lock().expect("health registry lock poisoned");
        let mut keys: Vec<String> = probes.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// TCP reachability check used by endpoint probes.
pub async fn tcp_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    use tokio::net::TcpStream;

    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}
