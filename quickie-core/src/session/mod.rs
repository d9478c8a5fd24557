//! Session conversation history
//!
//! A session is identified by an opaque token and exists only as the
//! cache entry holding its history.

pub mod manager;
pub mod store;

pub use manager::SessionManager;
pub use store::{History, Role, Turn};
