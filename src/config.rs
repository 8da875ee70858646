use anyhow::Context;
use std::path::PathBuf;

/// Runtime configuration, read once at startup.
///
/// `YOUTUBE_API_KEY` and `DATABASE_URL` are required; everything else is
/// env-over-default.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub youtube_api_key: String,
    pub database_url: String,
    pub static_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub max_upload_size: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let youtube_api_key = require_env("YOUTUBE_API_KEY")?;
        let database_url = require_env("DATABASE_URL")?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(16 * 1024 * 1024);

        Ok(Self {
            port,
            youtube_api_key,
            database_url,
            static_dir,
            http_timeout_secs,
            max_upload_size,
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} must be set in the environment or .env", name))?;
    Ok(value)
}
