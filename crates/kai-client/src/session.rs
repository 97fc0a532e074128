//! Connection-wide session state.
//!
//! Written only from the dispatch path; readable from any thread, since
//! module code may poll `authenticated()` or `foreground_process()` while
//! dispatch runs on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Module credentials recorded by `initialise`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub module_id: String,
    pub module_secret: String,
}

#[derive(Default)]
pub struct SessionState {
    authenticated: AtomicBool,
    foreground_process: RwLock<Option<String>>,
    credentials: RwLock<Option<Credentials>>,
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialise(&self, module_id: impl Into<String>, module_secret: impl Into<String>) {
        *write(&self.credentials) = Some(Credentials {
            module_id: module_id.into(),
            module_secret: module_secret.into(),
        });
    }

    /// Set once `initialise` has recorded credentials.
    pub fn initialised(&self) -> bool {
        read(&self.credentials).is_some()
    }

    pub fn credentials(&self) -> Option<Credentials> {
        read(&self.credentials).clone()
    }

    pub fn authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::Release);
    }

    /// Latest-known foreground process, overwritten by every `incomingData`
    /// envelope.
    pub fn foreground_process(&self) -> Option<String> {
        read(&self.foreground_process).clone()
    }

    pub fn set_foreground_process(&self, name: String) {
        *write(&self.foreground_process) = Some(name);
    }
}
