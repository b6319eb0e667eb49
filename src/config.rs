use std::env;

use anyhow::Context;
use chrono::TimeDelta;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cors_allow_origin: String,
    pub seed_sample_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://ecommerce.db?mode=rwc".to_string());
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(10);
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let cors_allow_origin = env::var("CORS_ALLOW_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let seed_sample_data = env::var("SEED_SAMPLE_DATA")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);
        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            jwt_secret,
            token_ttl_hours,
            cors_allow_origin,
            seed_sample_data,
        })
    }

    /// Token lifetime; rejects hour counts chrono cannot represent.
    pub fn token_ttl(&self) -> anyhow::Result<TimeDelta> {
        TimeDelta::try_hours(self.token_ttl_hours).with_context(|| {
            format!("TOKEN_TTL_HOURS={} is out of range", self.token_ttl_hours)
        })
    }

    /// Origins accepted by the CORS layer, split from the comma-separated setting.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allow_origin
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
