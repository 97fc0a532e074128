//! The `KaiSdk` facade.
//!
//! One instance per connection to the Kai background service. All session
//! state lives on the instance rather than in process-wide statics, so a
//! process can hold several independent connections and tests stay
//! deterministic.

use std::sync::Arc;

use kai_core::error::{KaiError, Result};
use kai_core::protocol::capability::Capabilities;
use kai_core::protocol::envelope::{self, ApiError};
use kai_core::protocol::reading::ReadingKind;
use serde_json::Value;

use crate::config::ModuleConfig;
use crate::dispatch::Router;
use crate::events::{DeviceEvent, EventHub, Scope};
use crate::registry::{DeviceHandle, DeviceRegistry};
use crate::session::SessionState;
use crate::transport::Transport;

pub struct KaiSdk {
    state: Arc<SessionState>,
    registry: Arc<DeviceRegistry>,
    hub: Arc<EventHub>,
    router: Router,
    transport: Arc<dyn Transport>,
}

impl KaiSdk {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let state = Arc::new(SessionState::new());
        let registry = Arc::new(DeviceRegistry::new());
        let hub = Arc::new(EventHub::new());
        let router = Router::new(Arc::clone(&state), Arc::clone(&registry), Arc::clone(&hub));
        Self {
            state,
            registry,
            hub,
            router,
            transport,
        }
    }

    /// Build an SDK already initialised from a validated config.
    pub fn from_config(cfg: &ModuleConfig, transport: Arc<dyn Transport>) -> Self {
        let sdk = Self::new(transport);
        sdk.initialise(&cfg.module.id, &cfg.module.secret);
        sdk
    }

    /// Record module credentials. Must precede `connect`.
    pub fn initialise(&self, module_id: &str, module_secret: &str) {
        self.state.initialise(module_id, module_secret);
    }

    /// Send the authentication envelope. Fails with `NotInitialised` if
    /// `initialise` has not run; authentication itself is confirmed later by
    /// the service's `authentication` envelope.
    pub async fn connect(&self) -> Result<()> {
        let creds = self.state.credentials().ok_or(KaiError::NotInitialised)?;
        self.send(envelope::auth_message(&creds.module_id, &creds.module_secret))
            .await
    }

    /// Announce the capability set to subscribe to. Requires a confirmed
    /// authentication.
    pub async fn set_capabilities(&self, capabilities: Capabilities) -> Result<()> {
        if !self.state.authenticated() {
            return Err(KaiError::NotAuthenticated);
        }
        self.send(capabilities.to_message()).await
    }

    /// Forward one serialized envelope to the transport.
    pub async fn send(&self, frame: String) -> Result<()> {
        self.transport.transmit(frame).await
    }

    /// Entry point for the transport: call once per complete inbound
    /// message. Malformed input is dropped with a warning and never
    /// surfaces as an error; messages arriving before `initialise` are
    /// ignored.
    pub fn handle_incoming(&self, raw: &str) {
        if !self.state.initialised() {
            tracing::warn!("message received before initialise; ignoring");
            return;
        }
        self.router.handle_raw(raw);
    }

    // ---- readers (safe from any thread) ----

    pub fn authenticated(&self) -> bool {
        self.state.authenticated()
    }

    /// Name of the process currently in the foreground, as last reported.
    pub fn foreground_process(&self) -> Option<String> {
        self.state.foreground_process()
    }

    pub fn default_kai(&self) -> Option<DeviceHandle> {
        self.registry.default_kai()
    }

    pub fn default_left_kai(&self) -> Option<DeviceHandle> {
        self.registry.default_left_kai()
    }

    pub fn default_right_kai(&self) -> Option<DeviceHandle> {
        self.registry.default_right_kai()
    }

    pub fn connected_kai(&self, kai_id: i64) -> Option<DeviceHandle> {
        self.registry.lookup(kai_id)
    }

    // ---- subscriptions ----

    pub fn on_reading(
        &self,
        scope: Scope,
        kind: ReadingKind,
        callback: impl Fn(&DeviceEvent) + Send + Sync + 'static,
    ) {
        self.hub.subscribe(scope, kind, callback);
    }

    pub fn on_error(&self, callback: impl Fn(&ApiError) + Send + Sync + 'static) {
        self.hub.on_error(callback);
    }

    pub fn on_unknown(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        self.hub.on_unknown(callback);
    }
}
