use anyhow::Context;
use serde::Deserialize;

/// Longest token lifetime accepted from configuration (ten years).
pub const MAX_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_days: parse_ttl_days(std::env::var("JWT_TTL_DAYS").ok().as_deref())?,
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

/// Unset means 30 days; anything else must be a whole number of days in
/// `1..=MAX_TTL_DAYS`.
pub(crate) fn parse_ttl_days(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(30);
    };
    let days = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("JWT_TTL_DAYS is not a number: {raw:?}"))?;
    if !(1..=MAX_TTL_DAYS).contains(&days) {
        anyhow::bail!("JWT_TTL_DAYS must be between 1 and {MAX_TTL_DAYS}, got {days}");
    }
    Ok(days)
}
