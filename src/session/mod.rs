//! Per-user conversational session management.
//!
//! A session records where a user currently is inside a multi-turn flow:
//! a step name, loose string parameters, and an opaque payload blob that
//! only the layer that wrote it knows how to decode.

mod state;
mod store;

pub use state::SessionState;
pub use store::SessionStore;

/// Messenger user identifier.
pub type UserId = i64;
