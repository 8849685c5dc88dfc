//! Authentication module
//!
//! Everything the client needs to recover from an expired access token:
//! the plain refresh call, its wire types, and the session events
//! broadcast when stored credentials are dropped.

mod events;
mod refresher;
mod types;

pub use events::{InvalidationReason, SessionEvent, SessionEvents};
pub use refresher::TokenRefresher;
pub use types::{RefreshRequest, RefreshResponse};
