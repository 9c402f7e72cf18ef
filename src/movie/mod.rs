//! Movie metadata lookup
//!
//! The only outbound dependency of the server: a title goes in, a
//! [`MovieRecord`] comes out.

pub mod client;
pub mod record;

pub use client::MovieClient;
pub use record::MovieRecord;
