use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_per_page = v.parse().unwrap_or(self.api.default_per_page);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_per_page = v.parse().unwrap_or(self.api.max_per_page);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_EXPIRES") {
            self.security.jwt_expiry_secs = v.parse().unwrap_or(self.security.jwt_expiry_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            api: ApiConfig {
                default_per_page: 10,
                max_per_page: 100,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-key".to_string(),
                jwt_expiry_secs: 3600,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            api: ApiConfig {
                default_per_page: 10,
                max_per_page: 100,
            },
            security: SecurityConfig {
                // Must come from JWT_SECRET_KEY; an empty secret rejects every token
                jwt_secret: String::new(),
                jwt_expiry_secs: 3600,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            api: ApiConfig {
                default_per_page: 10,
                max_per_page: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_secs: 3600,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.default_per_page, 10);
        assert_eq!(config.api.max_per_page, 100);
        assert_eq!(config.security.jwt_expiry_secs, 3600);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        // Production refuses to mint tokens until JWT_SECRET_KEY is provided
        assert!(config.security.jwt_secret.is_empty());
    }
}
