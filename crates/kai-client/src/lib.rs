//! Kai SDK client engine.
//!
//! This crate wires the device registry, subscription hub, dispatch router,
//! and transport seam into the [`KaiSdk`] facade. It is consumed by modules
//! (client programs) and by integration tests; the actual connection to the
//! Kai background service lives behind the [`transport::Transport`] trait.

pub mod config;
pub mod dispatch;
pub mod events;
pub mod registry;
pub mod sdk;
pub mod session;
pub mod transport;

pub use sdk::KaiSdk;
