//! Generative model integrations for quickie
//!
//! This crate provides the [`ChatModel`] abstraction and the Gemini REST
//! client that implements it.

pub mod base;
pub mod gemini;

pub use base::{ChatModel, ProviderError, ProviderResult};
pub use gemini::GeminiClient;
