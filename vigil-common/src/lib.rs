//! Vigil Common - Shared types, configuration and wire protocol for the Vigil diagnostic harness

pub mod config;
pub mod events;
pub mod protocol;

pub use config::*;
pub use events::*;
pub use protocol::*;
