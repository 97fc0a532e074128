//! Top-level facade crate for the Kai SDK.
//!
//! Re-exports the protocol core and the client engine so modules can depend
//! on a single crate.

pub mod core {
    pub use kai_core::*;
}

pub mod client {
    pub use kai_client::*;
}

pub use kai_client::KaiSdk;
pub use kai_core::protocol::capability::Capabilities;
