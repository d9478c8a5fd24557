//! HTTP surface of the quickie chat backend
//!
//! `POST /chat` forwards a prompt with the session's stored history to the
//! generative model and persists the exchange; `GET /chat/history` returns
//! what is stored for the caller's session.

pub mod chat;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod server;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

pub use chat::{ChatReply, ChatService};
pub use error::ApiError;
pub use server::{build_router, run_server};
pub use session::{ResolvedSession, SessionResolver};
pub use state::AppState;
