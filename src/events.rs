//! One-shot readiness notifications between the runtime driver and
//! per-resource coordinators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

/// Endpoint payload carried by a reachable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachableEvent {
    /// Host address the instance answers on.
    pub host: String,
    /// Host-side port the instance answers on.
    pub port: u16,
}

/// Per-resource "instance became reachable" notifications.
///
/// Each resource name keys a slot that is fulfilled at most once. Any number
/// of subscribers observe the fulfillment; none of them re-trigger it.
/// Slots for different resources are independent, so concurrent publishes for
/// different names need no coordination.
#[derive(Clone, Default)]
pub struct Eventing {
    slots: Arc<Mutex<HashMap<String, watch::Sender<Option<ReachableEvent>>>>>,
}

impl Eventing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the reachable notification for `name`.
    ///
    /// Subscribing after the slot was fulfilled still observes the event.
    pub fn subscribe(&self, name: &str) -> watch::Receiver<Option<ReachableEvent>> {
        let mut slots = self.slots.lock().expect("eventing lock poisoned");
        slots
            .entry(name.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    /// Report that the instance behind `name` is reachable.
    ///
    /// The first publish per resource wins; later ones are ignored.
    pub fn publish_reachable(&self, name: &str, event: ReachableEvent) {
        let sender = {
            let mut slots = self.slots.lock().expect("eventing lock poisoned");
            slots
                .entry(name.to_string())
                .or_insert_with(|| watch::channel(None).0)
                .clone()
        };

        let fulfilled = sender.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(event.clone());
            true
        });

        if fulfilled {
            tracing::debug!("resource '{}' reported reachable at {}:{}", name, event.host, event.port);
        } else {
            tracing::debug!("ignoring duplicate reachable notification for '{}'", name);
        }
    }
}
