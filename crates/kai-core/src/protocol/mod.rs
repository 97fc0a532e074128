//! Kai wire protocol (single-object JSON messages).
//!
//! Every transport message is one newline-free JSON object. Inbound objects
//! carry a `success` flag and a `type` discriminator; `incomingData`
//! envelopes nest a second level of `type`-discriminated fragments, one per
//! capability reading.
//!
//! All parsers are panic-free: malformed input is reported as
//! `KaiError::Malformed` instead of panicking, keeping a module resilient to
//! a misbehaving or newer-versioned Kai service.

pub mod capability;
pub mod envelope;
pub mod reading;
