//! Request routing
//!
//! - **`classifier`**: pure mapping from a path to a [`ResourceDecision`]
//! - **`dispatch`**: runs the chosen strategy and applies the error fallbacks

pub mod classifier;
pub mod dispatch;

pub use classifier::{ImageExtension, ResourceDecision, TextExtension, classify};
pub use dispatch::Dispatcher;
