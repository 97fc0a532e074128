//! Subscription hub: `(scope, kind)` -> ordered subscriber lists.
//!
//! Five scopes times nine reading kinds, each an independent delivery
//! channel, plus the connection-wide error and unknown-data sinks.
//! Subscribers fire in subscription order; a panicking subscriber is
//! isolated so its siblings still receive the event.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use serde_json::Value;

use kai_core::protocol::envelope::ApiError;
use kai_core::protocol::reading::{Hand, Reading, ReadingKind};

/// One of the five delivery targets for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The default Kai alias.
    Default,
    /// The default left-hand alias.
    DefaultLeft,
    /// The default right-hand alias.
    DefaultRight,
    /// One specific device slot.
    Device(u8),
    /// Every device.
    Any,
}

/// A decoded reading as delivered to subscribers.
#[derive(Debug, Clone)]
pub struct DeviceEvent {
    /// Id the data arrived from, straight off the envelope.
    pub kai_id: i64,
    /// Hand of the source device, when the id resolves in the registry.
    pub hand: Option<Hand>,
    pub reading: Reading,
}

pub type ReadingCallback = Arc<dyn Fn(&DeviceEvent) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&ApiError) + Send + Sync>;
pub type UnknownCallback = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
pub struct EventHub {
    readings: DashMap<(Scope, ReadingKind), Vec<ReadingCallback>>,
    errors: RwLock<Vec<ErrorCallback>>,
    unknown: RwLock<Vec<UnknownCallback>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        scope: Scope,
        kind: ReadingKind,
        callback: impl Fn(&DeviceEvent) + Send + Sync + 'static,
    ) {
        self.readings
            .entry((scope, kind))
            .or_default()
            .push(Arc::new(callback));
    }

    pub fn on_error(&self, callback: impl Fn(&ApiError) + Send + Sync + 'static) {
        write(&self.errors).push(Arc::new(callback));
    }

    pub fn on_unknown(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        write(&self.unknown).push(Arc::new(callback));
    }

    /// Deliver to every subscriber of `(scope, event.kind())` in
    /// subscription order.
    pub fn deliver(&self, scope: Scope, event: &DeviceEvent) {
        // Snapshot first: a subscriber may itself subscribe.
        let subscribers: Vec<ReadingCallback> =
            match self.readings.get(&(scope, event.reading.kind())) {
                Some(entry) => entry.value().clone(),
                None => return,
            };
        for callback in subscribers {
            invoke_isolated(|| callback(event));
        }
    }

    pub fn deliver_error(&self, error: &ApiError) {
        let subscribers = read(&self.errors).clone();
        for callback in subscribers {
            invoke_isolated(|| callback(error));
        }
    }

    pub fn deliver_unknown(&self, raw: &Value) {
        let subscribers = read(&self.unknown).clone();
        for callback in subscribers {
            invoke_isolated(|| callback(raw));
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn invoke_isolated(f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::warn!("subscriber panicked; continuing delivery");
    }
}
