//! Reelserve - movie search HTTP server
//!
//! Core library: request parsing, resource classification, response
//! construction and the sequential connection loop.

pub mod assets;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod movie;
pub mod routing;
pub mod server;
