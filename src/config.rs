use std::{env, path::PathBuf, str::FromStr};

use anyhow::Context;

use crate::services::{
    cost_estimator::{DEFAULT_PRICE_PER_PAGE, MAX_PRICE_PER_PAGE},
    pickup_code::DEFAULT_MAX_ATTEMPTS,
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub storage_base_path: PathBuf,
    pub price_per_page: i64,
    pub currency: String,
    pub pickup_code_max_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000)?;
        let storage_base_path = env::var("STORAGE_BASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));
        let price_per_page = parse_or("PRICE_PER_PAGE", DEFAULT_PRICE_PER_PAGE)?;
        let currency = env::var("CURRENCY")
            .map(|c| c.trim().to_ascii_uppercase())
            .unwrap_or_else(|_| "EUR".to_string());
        let pickup_code_max_attempts = parse_or("PICKUP_CODE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;

        if !(1..=MAX_PRICE_PER_PAGE).contains(&price_per_page) {
            anyhow::bail!("PRICE_PER_PAGE must be between 1 and {MAX_PRICE_PER_PAGE}");
        }
        if currency.len() != 3 {
            anyhow::bail!("CURRENCY must be a three letter code");
        }

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            storage_base_path,
            price_per_page,
            currency,
            pickup_code_max_attempts,
        })
    }
}

/// Unset falls back to `default`; a set but unparsable value is an error.
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw}")),
        Err(_) => Ok(default),
    }
}
