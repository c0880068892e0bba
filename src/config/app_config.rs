use crate::error::{AppError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Token signing settings and the OAuth client allowed to request tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_duration: i64,
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "8080")?,
                max_body_size: parse_var("MAX_BODY_SIZE", "1048576")?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?,
                jwt_duration: parse_var("JWT_DURATION", "86400")?,
                client_id: env::var("CLIENT_ID").unwrap_or_else(|_| "myclientid".to_string()),
                client_secret: env::var("CLIENT_SECRET")
                    .unwrap_or_else(|_| "myclientsecret".to_string()),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", name)))
}
