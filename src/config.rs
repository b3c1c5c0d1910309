use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Fallback HMAC key for local setups without `SECRET_SALT`. Anything seeded
/// under this key is forgeable, so it must never reach a real deployment.
pub const DEV_FALLBACK_SECRET: &str = "development-only-secret-key";

pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub secret: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3000"),
            database_path: try_load("DATABASE_PATH", "validation.db"),
            secret: load_secret(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn load_secret() -> String {
    match env::var("SECRET_SALT") {
        Ok(secret) if !secret.trim().is_empty() => secret,
        _ => {
            warn!(
                "SECRET_SALT not set, using the development-only fallback key. \
                 Verification numbers seeded with it are NOT safe for production."
            );
            DEV_FALLBACK_SECRET.to_string()
        }
    }
}
