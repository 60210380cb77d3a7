//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.

use std::path::PathBuf;

use crate::core::auth::jwt::{
    ACCESS_TOKEN_EXPIRATION_MINUTES, JwtConfig, REFRESH_TOKEN_EXPIRATION_DAYS,
};
use crate::core::auth::middleware::CookieSettings;
use crate::core::db::DbConfig;

/// Signing secret used by debug builds when `JWT_SECRET` is unset
const DEV_JWT_SECRET: &str = "shopfront-development-secret-do-not-deploy";

/// Upper bound for `JWT_ACCESS_EXPIRATION_MINUTES` (one day)
pub const MAX_ACCESS_EXPIRATION_MINUTES: i64 = 24 * 60;

/// Upper bound for `JWT_REFRESH_EXPIRATION_DAYS`
pub const MAX_REFRESH_EXPIRATION_DAYS: i64 = 365;

/// Configuration errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is not set")]
    MissingDatabaseUrl,

    #[error("JWT_SECRET environment variable is not set")]
    MissingJwtSecret,

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("BOOTSTRAP_SUPER_ADMIN_EMAIL and BOOTSTRAP_SUPER_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrap,
}

/// Credentials for the first super admin
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub cookies: CookieSettings,
    /// JSON file replacing the built-in product type registry
    pub product_types_path: Option<PathBuf>,
    pub bootstrap: Option<BootstrapAdmin>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;

        let secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingJwtSecret),
        };

        let access_minutes = parse_or(
            "JWT_ACCESS_EXPIRATION_MINUTES",
            var("JWT_ACCESS_EXPIRATION_MINUTES"),
            ACCESS_TOKEN_EXPIRATION_MINUTES,
        )?;
        let refresh_days = parse_or(
            "JWT_REFRESH_EXPIRATION_DAYS",
            var("JWT_REFRESH_EXPIRATION_DAYS"),
            REFRESH_TOKEN_EXPIRATION_DAYS,
        )?;
        if !(1..=MAX_ACCESS_EXPIRATION_MINUTES).contains(&access_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "JWT_ACCESS_EXPIRATION_MINUTES",
                value: access_minutes.to_string(),
            });
        }
        if !(1..=MAX_REFRESH_EXPIRATION_DAYS).contains(&refresh_days) {
            return Err(ConfigError::InvalidValue {
                key: "JWT_REFRESH_EXPIRATION_DAYS",
                value: refresh_days.to_string(),
            });
        }

        let mut jwt = JwtConfig::new(secret)
            .access_token_expiration(access_minutes)
            .refresh_token_expiration(refresh_days);
        if let Some(issuer) = var("JWT_ISSUER") {
            jwt = jwt.issuer(issuer);
        }

        let cookies = CookieSettings {
            secure: parse_or("COOKIE_SECURE", var("COOKIE_SECURE"), true)?,
        };

        let bootstrap = match (
            var("BOOTSTRAP_SUPER_ADMIN_EMAIL"),
            var("BOOTSTRAP_SUPER_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteBootstrap),
        };

        Ok(Self {
            db: DbConfig::new(database_url),
            jwt,
            cookies,
            product_types_path: var("PRODUCT_TYPES_PATH").map(PathBuf::from),
            bootstrap,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
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
        move |key| map.get(key).cloned()
    }

    // ========================================================================
    // Lookup-based Tests (no env var dependencies - thread safe)
    // ========================================================================

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.db.database_url, "postgres://localhost/shop");
        assert_eq!(config.jwt.secret, "secret");
        assert_eq!(config.jwt.access_token_expiration_minutes, 15);
        assert_eq!(config.jwt.refresh_token_expiration_days, 7);
        assert_eq!(config.jwt.issuer, "shopfront");
        assert!(config.cookies.secure);
        assert!(config.product_types_path.is_none());
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_all_fields() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("JWT_ACCESS_EXPIRATION_MINUTES", "5"),
            ("JWT_REFRESH_EXPIRATION_DAYS", "30"),
            ("JWT_ISSUER", "shop-admin"),
            ("COOKIE_SECURE", "false"),
            ("PRODUCT_TYPES_PATH", "/etc/shop/types.json"),
            ("BOOTSTRAP_SUPER_ADMIN_EMAIL", "owner@shop.test"),
            ("BOOTSTRAP_SUPER_ADMIN_PASSWORD", "Password1"),
        ]))
        .unwrap();

        assert_eq!(config.jwt.access_token_expiration_minutes, 5);
        assert_eq!(config.jwt.refresh_token_expiration_days, 30);
        assert_eq!(config.jwt.issuer, "shop-admin");
        assert!(!config.cookies.secure);
        assert_eq!(
            config.product_types_path,
            Some(PathBuf::from("/etc/shop/types.json"))
        );
        assert_eq!(
            config.bootstrap.map(|b| b.email),
            Some("owner@shop.test".to_string())
        );
    }

    #[test]
    fn test_missing_database_url() {
        let result = Config::from_lookup(lookup(&[("JWT_SECRET", "secret")]));
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_debug_build_falls_back_to_dev_secret() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();
        assert_eq!(config.jwt.secret, DEV_JWT_SECRET);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("JWT_ACCESS_EXPIRATION_MINUTES", "soon"),
        ]));
        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidValue {
                key: "JWT_ACCESS_EXPIRATION_MINUTES",
                value: "soon".to_string()
            })
        );

        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("JWT_REFRESH_EXPIRATION_DAYS", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_oversized_lifetimes_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("JWT_ACCESS_EXPIRATION_MINUTES", "9223372036854775807"),
        ]));
        assert_eq!(
            result.err(),
            Some(ConfigError::InvalidValue {
                key: "JWT_ACCESS_EXPIRATION_MINUTES",
                value: "9223372036854775807".to_string()
            })
        );

        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("JWT_REFRESH_EXPIRATION_DAYS", "366"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "JWT_REFRESH_EXPIRATION_DAYS",
                ..
            })
        ));

        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("JWT_ACCESS_EXPIRATION_MINUTES", "1440"),
            ("JWT_REFRESH_EXPIRATION_DAYS", "365"),
        ]))
        .unwrap();
        assert_eq!(config.jwt.access_token_expiration_minutes, MAX_ACCESS_EXPIRATION_MINUTES);
    }

    #[test]
    fn test_incomplete_bootstrap() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "secret"),
            ("BOOTSTRAP_SUPER_ADMIN_EMAIL", "owner@shop.test"),
        ]));
        assert!(matches!(result, Err(ConfigError::IncompleteBootstrap)));
    }

    #[test]
    fn test_blank_values_treated_as_unset() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "   "),
            ("JWT_SECRET", "secret"),
        ]));
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn test_bootstrap_debug_redacts_password() {
        let bootstrap = BootstrapAdmin {
            email: "owner@shop.test".to_string(),
            password: "Password1".to_string(),
        };
        let debug = format!("{bootstrap:?}");
        assert!(debug.contains("owner@shop.test"));
        assert!(!debug.contains("Password1"));
    }
}
