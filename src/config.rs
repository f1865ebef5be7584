//! Application configuration read from the environment.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::PageSize;

const DEFAULT_DATABASE_URL: &str = "sqlite://contratos.db?mode=rwc";
const DEFAULT_JWT_SECRET: &str = "contrato-server-jwt-secret-change-in-production";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "./static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),
    #[error("invalid PDF_PAGE_SIZE: {0}")]
    InvalidPageSize(String),
    #[error("invalid BCRYPT_COST '{0}' (expected 4..=31)")]
    InvalidBcryptCost(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Directory holding `logo.png`
    pub static_dir: PathBuf,
    pub page_size: PageSize,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            page_size: PageSize::default(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not set, using default secret. SET THIS IN PRODUCTION!");
            defaults.jwt_secret.clone()
        });

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let page_size = match lookup("PDF_PAGE_SIZE") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidPageSize)?,
            None => defaults.page_size,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => return Err(ConfigError::InvalidBcryptCost(raw)),
            },
            None => defaults.bcrypt_cost,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            page_size,
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.port, 8080);
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.static_dir, PathBuf::from("./static"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("PDF_PAGE_SIZE", "a4"),
            ("BCRYPT_COST", "6"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.bcrypt_cost, 6);
        assert_eq!(config.jwt_secret, "segredo");
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PORT", "abc")])),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PDF_PAGE_SIZE", "legal")])),
            Err(ConfigError::InvalidPageSize(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("BCRYPT_COST", "2")])),
            Err(ConfigError::InvalidBcryptCost(_))
        ));
    }
}
