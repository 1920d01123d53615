use anyhow::{Context, Result};

use crate::generation::generator::GenerationMode;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Absent is allowed; live generation then answers "Missing ANTHROPIC_API_KEY".
    pub anthropic_api_key: Option<String>,
    pub generation_mode: GenerationMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            generation_mode: generation_mode(std::env::var("USE_FAKE_AI").ok().as_deref()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// `USE_FAKE_AI=true` selects offline generation; anything else is live.
pub fn generation_mode(use_fake_ai: Option<&str>) -> GenerationMode {
    match use_fake_ai.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => GenerationMode::Offline,
        _ => GenerationMode::Live,
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
