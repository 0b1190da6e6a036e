use std::str::FromStr;

use anyhow::{Context, Result};

use crate::refinement::orchestrator::RefinementConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub refinement: RefinementConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = RefinementConfig::default();

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            refinement: RefinementConfig {
                max_passes: env_or("REFINE_MAX_PASSES", defaults.max_passes)?,
                boost_keyword_limit: env_or(
                    "REFINE_BOOST_KEYWORD_LIMIT",
                    defaults.boost_keyword_limit,
                )?,
                follow_up_keyword_limit: env_or(
                    "REFINE_FOLLOW_UP_KEYWORD_LIMIT",
                    defaults.follow_up_keyword_limit,
                )?,
                backfill_skill_limit: env_or(
                    "REFINE_BACKFILL_SKILL_LIMIT",
                    defaults.backfill_skill_limit,
                )?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        _ => Ok(default),
    }
}
