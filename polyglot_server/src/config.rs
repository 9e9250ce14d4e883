//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use axum::http::HeaderValue;
use polyglot::{
    auth::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS},
    db::DatabaseConfig,
};
use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost/polyglot";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Prometheus exporter address, if metrics are exported
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Session token lifetime in seconds
    pub token_ttl_secs: i64,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Values given on the command line, which win over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or unparsable
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => match parse_env_addr("SERVER_BIND")? {
                Some(bind) => bind,
                None => SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            },
        };

        let database_url = overrides
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 2),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 5),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
        };

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let security = SecurityConfig {
            jwt_secret,
            password_pepper,
            token_ttl_secs: parse_env_or("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
        };

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        let metrics_bind = match overrides.metrics_bind {
            Some(addr) => Some(addr),
            None => parse_env_addr("METRICS_BIND")?,
        };

        Ok(ServerConfig {
            bind,
            database,
            security,
            cors_origins,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.security.token_ttl_secs) {
            return Err(ConfigError::Invalid {
                var: "TOKEN_TTL_SECS".to_string(),
                reason: format!("Must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        if let Some(origin) = self
            .cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS".to_string(),
                reason: format!("'{origin}' is not a valid origin"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// A set but unparsable address is an error, not a silent default
fn parse_env_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("'{v}' is not a socket address"),
                })
        }
        _ => Ok(None),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "SERVER_BIND",
        "JWT_SECRET",
        "PASSWORD_PEPPER",
        "TOKEN_TTL_SECS",
        "CORS_ORIGINS",
        "METRICS_BIND",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized.
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::set_var(key, value) };
    }

    fn valid_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            database: DatabaseConfig {
                database_url: "test".to_string(),
                max_connections: 10,
                min_connections: 1,
                connection_timeout_secs: 5,
                idle_timeout_secs: 300,
                max_lifetime_secs: 1800,
            },
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
                password_pepper: "a".repeat(16),
                token_ttl_secs: 3600,
            },
            cors_origins: Vec::new(),
            metrics_bind: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret() {
        let mut config = valid_config();
        config.security.jwt_secret = "short".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_pepper_and_bad_ttl() {
        let mut config = valid_config();
        config.security.password_pepper = "pepper".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.security.token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_ttl_upper_bound() {
        let mut config = valid_config();
        config.security.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        for ttl in [MAX_TOKEN_TTL_SECS + 1, 1_000_000_000_000_000, i64::MAX] {
            config.security.token_ttl_secs = ttl;
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TOKEN_TTL_SECS"));
        }
    }

    #[test]
    fn test_pool_bounds() {
        let mut config = valid_config();
        config.database.min_connections = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secrets_are_redacted() {
        let debug = format!("{:?}", valid_config());
        assert!(!debug.contains(&"a".repeat(32)));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_missing_jwt_secret() {
        clear_env();
        set_env("PASSWORD_PEPPER", &"p".repeat(16));

        let err = ServerConfig::from_env(Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_and_lists() {
        clear_env();
        set_env("JWT_SECRET", &"s".repeat(32));
        set_env("PASSWORD_PEPPER", &"p".repeat(16));
        set_env("CORS_ORIGINS", "http://localhost:3000, https://example.com,");

        let config = ServerConfig::from_env(Overrides::default()).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.security.token_ttl_secs, 3600);
        assert_eq!(
            config.cors_origins,
            ["http://localhost:3000", "https://example.com"]
        );
        assert!(config.metrics_bind.is_none());
        assert!(config.validate().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides_win_over_env() {
        clear_env();
        set_env("JWT_SECRET", &"s".repeat(32));
        set_env("PASSWORD_PEPPER", &"p".repeat(16));
        set_env("SERVER_BIND", "0.0.0.0:9000");

        let bind: SocketAddr = "127.0.0.1:7000".parse().unwrap();
        let config = ServerConfig::from_env(Overrides {
            bind: Some(bind),
            database_url: Some("postgres://override/db".to_string()),
            metrics_bind: None,
        })
        .unwrap();
        assert_eq!(config.bind, bind);
        assert_eq!(config.database.database_url, "postgres://override/db");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bad_metrics_bind() {
        clear_env();
        set_env("JWT_SECRET", &"s".repeat(32));
        set_env("PASSWORD_PEPPER", &"p".repeat(16));
        set_env("METRICS_BIND", "not-an-address");

        let err = ServerConfig::from_env(Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "METRICS_BIND"));
        clear_env();
    }
}
