//! Error types for reelserve

use thiserror::Error;

use crate::http::parser::ParseError;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Everything that can go wrong while serving.
///
/// Per-connection variants never escape the accept loop; only
/// `ListenSetupFailed` and `AcceptFailed` terminate the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request head could not be parsed
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    /// Static asset absent, or the path classified as NotFound
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Movie metadata call failed or returned an unexpected shape
    #[error("movie lookup failed for {title:?}: {reason}")]
    LookupFailed { title: String, reason: String },

    /// Image could not be decoded or re-encoded
    #[error("image transcoding failed: {0}")]
    Codec(#[from] image::ImageError),

    /// Peer did not send or accept data in time
    #[error("timed out while {0}")]
    Timeout(&'static str),

    /// Binding the listening socket failed
    #[error("could not listen on {addr}: {source}")]
    ListenSetupFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a connection failed
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
