//! Core types and adapters for quickie
//!
//! This crate provides the configuration, error type, logging setup,
//! conversation history model and cache adapters shared by the
//! provider, server and CLI crates.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
