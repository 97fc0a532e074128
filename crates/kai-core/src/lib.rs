//! Kai SDK core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contracts shared by the client engine
//! and by tooling: envelope decoding, the nine capability reading decoders,
//! the capability bitmask, and the outbound message builders. It carries no
//! transport or runtime dependencies so it can be reused in multiple
//! contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `KaiError`/`Result` so a module
//! process never crashes on malformed traffic from the Kai service.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{KaiError, Result};
