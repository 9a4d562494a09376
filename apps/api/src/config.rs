use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// When set, resumes/jobs/recommendations live in PostgreSQL; otherwise
    /// the in-memory store is used and all state is wiped on restart.
    pub database_url: Option<String>,
    pub upload_dir: String,
    /// Number of pipeline worker tasks draining the upload queue.
    pub worker_count: usize,
    /// Bounded queue capacity; uploads beyond it are rejected with 503.
    pub queue_capacity: usize,
    /// Serve canned fixture text instead of reading uploaded documents.
    pub mock_extraction: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            database_url: std::env::var("DATABASE_URL").ok(),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            worker_count: parse_env("PIPELINE_WORKERS", 4)?,
            queue_capacity: parse_env("PIPELINE_QUEUE_CAPACITY", 64)?,
            mock_extraction: std::env::var("MOCK_EXTRACTION")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<usize>()
            .with_context(|| format!("{key} must be a positive integer")),
        Err(_) => Ok(default),
    }
}
