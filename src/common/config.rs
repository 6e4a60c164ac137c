// src/common/config.rs
//! Startup configuration loaded from the environment

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Minimum length accepted for the session signing secret
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// OAuth client registration for the Google identity provider
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub session_secret: String,
    pub google: GoogleOAuthConfig,
    pub cookie_secure: bool,
    pub identity_timeout: Duration,
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: format!("must be at least {} bytes", MIN_SESSION_SECRET_LEN),
            });
        }

        let google = GoogleOAuthConfig {
            client_id: required("GOOGLE_CLIENT_ID")?,
            client_secret: required("GOOGLE_CLIENT_SECRET")?,
            redirect_url: required("GOOGLE_REDIRECT_URL")?,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 7878,
        };

        let identity_timeout = match lookup("IDENTITY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "IDENTITY_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "IDENTITY_TIMEOUT_SECS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(10),
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "sqlite://expense_tracker.db".to_string());

        let cookie_secure = lookup("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let reset_db = lookup("RESET_DB")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            port,
            session_secret,
            google,
            cookie_secure,
            identity_timeout,
            reset_db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("SESSION_SECRET", "x".repeat(40)),
            ("GOOGLE_CLIENT_ID", "client-id".to_string()),
            ("GOOGLE_CLIENT_SECRET", "client-secret".to_string()),
            (
                "GOOGLE_REDIRECT_URL",
                "http://localhost:7878/auth/callback".to_string(),
            ),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).expect("config should load");

        assert_eq!(config.port, 7878);
        assert_eq!(config.database_url, "sqlite://expense_tracker.db");
        assert_eq!(config.identity_timeout, Duration::from_secs(10));
        assert!(!config.cookie_secure);
        assert!(!config.reset_db);
        assert_eq!(config.google.client_id, "client-id");
    }

    #[test]
    fn test_missing_required_values_are_fatal() {
        for name in [
            "SESSION_SECRET",
            "GOOGLE_CLIENT_ID",
            "GOOGLE_CLIENT_SECRET",
            "GOOGLE_REDIRECT_URL",
        ] {
            let mut vars = base_env();
            vars.remove(name);
            assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing(name));
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = base_env();
        vars.insert("GOOGLE_CLIENT_ID", "   ".to_string());
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("GOOGLE_CLIENT_ID")
        );
    }

    #[test]
    fn test_short_session_secret_rejected() {
        let mut vars = base_env();
        vars.insert("SESSION_SECRET", "short".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                ..
            })
        ));
    }

    #[test]
    fn test_production_enables_secure_cookie() {
        let mut vars = base_env();
        vars.insert("APP_ENV", "Production".to_string());
        vars.insert("PORT", "9000".to_string());
        vars.insert("IDENTITY_TIMEOUT_SECS", "3".to_string());

        let config = load(&vars).unwrap();
        assert!(config.cookie_secure);
        assert_eq!(config.port, 9000);
        assert_eq!(config.identity_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = base_env();
        vars.insert("PORT", "not-a-port".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }
}
