//! The dispatch router: raw message -> typed events, fanned out to scopes.
//!
//! Two-level classification. The outer level keys on the envelope `type`
//! (authentication / connectedKais / incomingData / unknown), with
//! `success:false` short-circuiting everything into the error sink. The
//! inner level classifies each `incomingData` fragment among the nine
//! reading kinds and fans the decoded reading out to every resolved scope.
//!
//! Dispatch for one envelope completes synchronously before the next;
//! nothing here blocks on I/O.

use std::sync::Arc;

use serde_json::Value;

use kai_core::protocol::envelope::{self, Envelope, IncomingData};
use kai_core::protocol::reading::{self, ReadingKind};

use crate::events::{DeviceEvent, EventHub, Scope};
use crate::registry::DeviceRegistry;
use crate::session::SessionState;

pub struct Router {
    state: Arc<SessionState>,
    registry: Arc<DeviceRegistry>,
    hub: Arc<EventHub>,
}

impl Router {
    pub fn new(
        state: Arc<SessionState>,
        registry: Arc<DeviceRegistry>,
        hub: Arc<EventHub>,
    ) -> Self {
        Self {
            state,
            registry,
            hub,
        }
    }

    /// Decode one raw transport message and dispatch it.
    ///
    /// Malformed input is logged and dropped with all connection state
    /// untouched; it is never a fault to the caller.
    pub fn handle_raw(&self, raw: &str) {
        match envelope::decode_envelope(raw) {
            Ok(env) => self.dispatch(env),
            Err(err) => tracing::warn!(%err, "dropping malformed message"),
        }
    }

    fn dispatch(&self, env: Envelope) {
        match env {
            Envelope::Error(err) => {
                tracing::debug!(code = err.code, name = %err.name, "service reported error");
                self.hub.deliver_error(&err);
            }
            Envelope::Authentication { authenticated } => {
                self.state.set_authenticated(authenticated);
            }
            Envelope::ConnectedKais { kais } => {
                self.registry.replace_all(&kais);
            }
            Envelope::IncomingData { data, raw } => {
                self.dispatch_incoming(data, &raw);
            }
            Envelope::Unknown { tag, raw } => {
                tracing::debug!(%tag, "unknown envelope tag");
                self.hub.deliver_unknown(&raw);
            }
        }
    }

    fn dispatch_incoming(&self, data: IncomingData, raw: &Value) {
        self.state
            .set_foreground_process(data.foreground_process.clone());

        let scopes = self.resolve_scopes(&data);
        let hand = self.registry.lookup(data.kai_id).map(|h| h.hand);

        for fragment in &data.data {
            let Some(tag) = fragment.get("type").and_then(Value::as_str) else {
                tracing::warn!(%fragment, "dropping fragment without a type tag");
                continue;
            };
            let Some(kind) = ReadingKind::from_wire_tag(tag) else {
                // Unknown fragment tags surface the outer envelope, not the
                // fragment. Modules depend on that shape.
                tracing::debug!(tag, "unknown fragment tag");
                self.hub.deliver_unknown(raw);
                continue;
            };
            match reading::decode_fragment(kind, fragment) {
                Ok(decoded) => {
                    let event = DeviceEvent {
                        kai_id: data.kai_id,
                        hand,
                        reading: decoded,
                    };
                    for scope in &scopes {
                        self.hub.deliver(*scope, &event);
                    }
                }
                // One bad fragment never drops the batch.
                Err(err) => tracing::warn!(%err, tag, "dropping malformed fragment"),
            }
        }
    }

    /// Scope set for one envelope, in the fixed delivery order: default,
    /// default-left, default-right, device, any. The device scope joins only
    /// when the id resolves in the registry; the any scope always does.
    fn resolve_scopes(&self, data: &IncomingData) -> Vec<Scope> {
        let mut scopes = Vec::with_capacity(5);
        if data.default_kai {
            scopes.push(Scope::Default);
        }
        if data.default_left_kai {
            scopes.push(Scope::DefaultLeft);
        }
        if data.default_right_kai {
            scopes.push(Scope::DefaultRight);
        }
        if let Some(handle) = self.registry.lookup(data.kai_id) {
            scopes.push(Scope::Device(handle.kai_id));
        }
        scopes.push(Scope::Any);
        scopes
    }
}
