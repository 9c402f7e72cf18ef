//! Connection loop and lifecycle.

pub mod lifecycle;
pub mod listener;

pub use lifecycle::{ServerState, Shutdown};
pub use listener::Server;
