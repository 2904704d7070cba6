//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite adapters for stories and settings
//! - HTTP: REST API routes
//! - Ollama: completion endpoint used for chapter drafting
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod ollama;
pub mod persistence;
pub mod state;
