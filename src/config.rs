// src/config.rs

use std::{env, net::SocketAddr};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. Without one the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// HMAC secret for session tokens.
    pub session_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl: u64,
    /// Whether the session cookie is marked `Secure`.
    pub cookie_secure: bool,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub log_dir: String,
    /// Origins allowed by CORS, credentials included.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;

        let session_ttl: u64 = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("SESSION_TTL_SECS is not a number: {raw}"))?,
            Err(_) => 7 * 24 * 60 * 60,
        };

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|raw| matches!(raw.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let cors_origins = parse_cors_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        )
        .context("Invalid CORS_ORIGINS")?;

        Ok(Self {
            database_url,
            session_secret,
            session_ttl,
            cookie_secure,
            bind_addr,
            rust_log,
            log_dir,
            cors_origins,
        })
    }
}

/// Splits a comma-separated origin list.
///
/// Session cookies need credentialed CORS, which cannot be combined with a
/// wildcard origin, so `*` is rejected.
pub fn parse_cors_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        anyhow::bail!("wildcard origin \"*\" is not allowed with credentialed CORS");
    }
    Ok(origins)
}
