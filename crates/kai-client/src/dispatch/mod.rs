//! Dispatch module exports.

pub mod router;

pub use router::Router;
