use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Upstream holiday endpoint; no url means no holidays are known
    pub holiday_api_url: Option<String>,
    pub holiday_api_token: Option<String>,
    pub holiday_api_timeout_secs: u64,

    // Open leave forms
    pub form_session_ttl_secs: u64,
    pub form_session_capacity: u64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),

            holiday_api_url: optional("HOLIDAY_API_URL"),
            holiday_api_token: optional("HOLIDAY_API_TOKEN"),
            holiday_api_timeout_secs: parsed_or("HOLIDAY_API_TIMEOUT_SECS", 5)?, // default 5 sec

            form_session_ttl_secs: parsed_or("FORM_SESSION_TTL_SECS", 1800)?, // default 30 min idle
            form_session_capacity: parsed_or("FORM_SESSION_CAPACITY", 10_000)?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            rate_protected_per_min: 1000,
            api_prefix: "/api/v1".to_string(),
            holiday_api_url: None,
            holiday_api_token: None,
            holiday_api_timeout_secs: 1,
            form_session_ttl_secs: 60,
            form_session_capacity: 100,
        }
    }
}
