//! HTTP protocol implementation.
//!
//! One request per connection: the head is read and parsed, a single
//! response is written, and the socket is closed.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Parses the request head from a byte buffer
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the request head
//!        └──────┬──────┘
//!               │ Head parsed          (malformed → 400, empty → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Classify and build the response
//!        └──────┬───────────┘
//!               │ Response ready       (no response at all → 500)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← One buffered write
//!        └──────┬───────────┘
//!               │
//!               ▼
//!            Closed
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
