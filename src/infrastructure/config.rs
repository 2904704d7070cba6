//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `quillforge.toml` in the working directory, then `QUILLFORGE_*`
//! environment variables. Nested keys use a double underscore, e.g.
//! `QUILLFORGE_OLLAMA__MODEL=qwen2.5:14b`.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP server port
    pub server_port: u16,
    pub ollama: OllamaConfig,
}

/// Completion endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    /// Ollama native API base URL
    pub base_url: String,
    /// Model used for chapter generation
    pub model: String,
    /// Whole-request timeout for a generation call
    pub request_timeout_secs: u64,
    /// Timeout for the `/api/tags` health check
    pub health_check_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from defaults, `quillforge.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::build(Some("quillforge"), Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("QUILLFORGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build(file_name: Option<&str>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("database_url", "sqlite://quillforge.db?mode=rwc")?
            .set_default("server_port", 3000_i64)?
            .set_default("ollama.base_url", "http://localhost:11434")?
            .set_default("ollama.model", "llama3.1:8b")?
            .set_default("ollama.request_timeout_secs", 300_i64)?
            .set_default("ollama.health_check_timeout_secs", 5_i64)?;
        if let Some(name) = file_name {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
