use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub model_dir: PathBuf,
    /// Root for stored uploads; resumes land in `<media_dir>/resumes/`.
    pub media_dir: PathBuf,
    pub page_size: u32,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let page_size: u32 = parse_env("PAGE_SIZE", 10)?;
        anyhow::ensure!(page_size > 0, "PAGE_SIZE must be at least 1");

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            port: parse_env("PORT", 8080)?,
            model_dir: path_env("MODEL_DIR", "ml_models"),
            media_dir: path_env("MEDIA_DIR", "media"),
            page_size,
            access_token_ttl_minutes: parse_env("ACCESS_TOKEN_TTL_MINUTES", 60)?,
            refresh_token_ttl_hours: parse_env("REFRESH_TOKEN_TTL_HOURS", 24)?,
        })
    }

    /// Reads only `DATABASE_URL`, for commands that never serve HTTP.
    pub fn database_url_from_env() -> Result<String> {
        dotenvy::dotenv().ok();
        require_env("DATABASE_URL")
    }

    pub fn model_dir_from_env() -> PathBuf {
        dotenvy::dotenv().ok();
        path_env("MODEL_DIR", "ml_models")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn path_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests; nothing here touches the environment.
    pub fn for_tests(media_dir: PathBuf) -> Self {
        Config {
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            port: 0,
            model_dir: PathBuf::from("ml_models"),
            media_dir,
            page_size: 2,
            access_token_ttl_minutes: 60,
            refresh_token_ttl_hours: 24,
        }
    }
}
