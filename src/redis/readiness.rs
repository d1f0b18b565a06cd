//! Readiness coordination: one-shot resolution of the connection descriptor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::watch;

use super::connection::ConnectionDescriptor;
use super::resource::RedisResource;
use crate::error::{ConfigError, ResolveError};
use crate::events::{Eventing, ReachableEvent};
use crate::health::{HealthProbe, HealthRegistry, HealthStatus, tcp_reachable};

/// Externally observable state of one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// Waiting for the reachable notification.
    Subscribed,
    /// Notification received; descriptor being computed.
    Resolving,
    /// Descriptor cached. Terminal.
    Resolved,
    /// Resolution produced an empty endpoint. Terminal.
    Failed,
}

/// Slot value broadcast to waiters. Settles exactly once.
#[derive(Clone, Debug)]
enum Resolution {
    Subscribed,
    Resolving,
    Resolved(ConnectionDescriptor),
    Failed(ResolveError),
}

/// Coordinates the one-shot resolution of a resource's connection descriptor.
///
/// Created per resource instance at declaration time. Subscribes to the
/// resource's reachable notification, resolves the descriptor exactly once
/// when it fires, and registers a health probe that fails closed until the
/// resolution settles. The resolution runs as a suspended task; if the host
/// is dropped before the notification fires, the task winds down with no
/// further side effects.
#[derive(Debug)]
pub struct ReadinessCoordinator {
    name: String,
    slot: watch::Sender<Resolution>,
}

impl ReadinessCoordinator {
    /// Subscribe to the reachable notification for `resource` and register
    /// its health probe under `<name>_check`.
    ///
    /// Must be called within a Tokio runtime. Fails if a probe is already
    /// registered under the resource's key.
    pub fn spawn(
        resource: &RedisResource,
        eventing: &Eventing,
        health: &HealthRegistry,
        probe_timeout: Duration,
    ) -> Result<Arc<Self>, ConfigError> {
        let (slot, _) = watch::channel(Resolution::Subscribed);
        let coordinator = Arc::new(Self {
            name: resource.name.clone(),
            slot,
        });

        let mut reachable = eventing.subscribe(&resource.name);

        health.register(
            &resource.health_check_key(),
            Arc::new(ReadinessProbe {
                slot: coordinator.slot.subscribe(),
                timeout: probe_timeout,
            }),
        )?;

        let password = resource.password.clone();
        let task_coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            let event = loop {
                let current = reachable.borrow_and_update().clone();
                if let Some(event) = current {
                    break event;
                }
                if reachable.changed().await.is_err() {
                    tracing::trace!(
                        "abandoning readiness subscription for '{}'",
                        task_coordinator.name
                    );
                    return;
                }
            };

            task_coordinator.resolve(event, password);
        });

        Ok(coordinator)
    }

    /// Settle the slot from the reachable notification. Runs once.
    fn resolve(&self, event: ReachableEvent, password: Option<SecretString>) {
        self.slot.send_replace(Resolution::Resolving);
        tracing::debug!("resolving connection descriptor for '{}'", self.name);

        if event.host.is_empty() || event.port == 0 {
            let err = ResolveError::EmptyEndpoint {
                name: self.name.clone(),
            };
            tracing::error!("{err}");
            self.slot.send_replace(Resolution::Failed(err));
            return;
        }

        let descriptor = ConnectionDescriptor {
            host: event.host,
            port: event.port,
            password,
        };
        tracing::info!("resource '{}' resolved at {}", self.name, descriptor);
        self.slot.send_replace(Resolution::Resolved(descriptor));
    }

    /// Name of the resource this coordinator belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    pub fn state(&self) -> ReadinessState {
        match &*self.slot.borrow() {
            Resolution::Subscribed => ReadinessState::Subscribed,
            Resolution::Resolving => ReadinessState::Resolving,
            Resolution::Resolved(_) => ReadinessState::Resolved,
            Resolution::Failed(_) => ReadinessState::Failed,
        }
    }

    /// The cached descriptor, or `None` before resolution completes.
    ///
    /// Asking early is not an error; callers that need the descriptor
    /// synchronously should [`wait_connection`](Self::wait_connection).
    pub fn connection(&self) -> Option<ConnectionDescriptor> {
        match &*self.slot.borrow() {
            Resolution::Resolved(descriptor) => Some(descriptor.clone()),
            _ => None,
        }
    }

    /// A watch that settles when resolution does.
    ///
    /// Watches are independent readers of the same one-shot slot; handing
    /// them out does not re-trigger resolution.
    pub fn connection_watch(&self) -> ConnectionWatch {
        ConnectionWatch {
            name: self.name.clone(),
            rx: self.slot.subscribe(),
        }
    }

    /// Wait until resolution settles, returning the descriptor or the
    /// terminal failure.
    pub async fn wait_connection(&self) -> Result<ConnectionDescriptor, ResolveError> {
        self.connection_watch().wait().await
    }
}

/// One reader of a coordinator's resolution slot.
pub struct ConnectionWatch {
    name: String,
    rx: watch::Receiver<Resolution>,
}

impl ConnectionWatch {
    /// Wait for the slot to settle.
    pub async fn wait(mut self) -> Result<ConnectionDescriptor, ResolveError> {
        loop {
            let current = self.rx.borrow_and_update().clone();
            match current {
                Resolution::Resolved(descriptor) => return Ok(descriptor),
                Resolution::Failed(err) => return Err(err),
                Resolution::Subscribed | Resolution::Resolving => {}
            }

            if self.rx.changed().await.is_err() {
                return Err(ResolveError::Abandoned { name: self.name });
            }
        }
    }
}

/// Health probe that reads the resolution slot lazily at probe time.
///
/// Fails closed: before the resolution settles it reports `NotReady`, never
/// healthy, and never blocks waiting for the slot.
struct ReadinessProbe {
    slot: watch::Receiver<Resolution>,
    timeout: Duration,
}

#[async_trait]
impl HealthProbe for ReadinessProbe {
    async fn check(&self) -> HealthStatus {
        let resolution = self.slot.borrow().clone();
        match resolution {
            Resolution::Subscribed | Resolution::Resolving => HealthStatus::NotReady {
                reason: "connection descriptor not yet resolved".to_string(),
            },
            Resolution::Failed(err) => HealthStatus::Unhealthy {
                reason: err.to_string(),
            },
            Resolution::Resolved(descriptor) => {
                if tcp_reachable(&descriptor.host, descriptor.port, self.timeout).await {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy {
                        reason: format!("{descriptor} is not reachable"),
                    }
                }
            }
        }
    }
}
