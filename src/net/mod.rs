//! Network Layer
//!
//! JSON-over-WebSocket front end for presentation layers. Carries no
//! business logic: every decision is made by the protocol engine.

pub mod protocol;
pub mod server;

pub use protocol::{ClientMessage, ErrorCode, ServerMessage, SubmissionRequest, WireError};
pub use server::{dispatch, ContestServer, ServerConfig, ServerEngine, ServerError};
