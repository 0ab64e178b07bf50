use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/natours.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
                connection_timeout_seconds: env::var("DATABASE_CONNECTION_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("DATABASE_CONNECTION_TIMEOUT_SECONDS must be a valid number")?,
            },
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = Config {
            database: DatabaseConfig {
                path: "./data/test.db".to_string(),
                max_connections: 15,
                connection_timeout_seconds: 30,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
        };

        assert_eq!(config.server_address(), "127.0.0.1:3000");
    }
}
