//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Todo lo que antes era
//! global (dirección base, capacidad del canal) entra por aquí y se pasa
//! explícitamente a los constructores.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Sin URL el servidor trabaja con el store en memoria
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub event_channel_capacity: usize,
    pub sse_keep_alive: Duration,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3333,
            database_url: None,
            cors_origins: Vec::new(),
            event_channel_capacity: 256,
            sse_keep_alive: Duration::from_secs(15),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Lee la configuración de las variables de entorno (ya cargado `.env`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            event_channel_capacity: parse_var(
                "EVENT_CHANNEL_CAPACITY",
                defaults.event_channel_capacity,
            )?,
            sse_keep_alive: Duration::from_secs(parse_var(
                "SSE_KEEP_ALIVE_SECS",
                defaults.sse_keep_alive.as_secs(),
            )?),
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Dirección única donde se sirven la API HTTP y el canal de eventos
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listen_addr() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.listen_addr().unwrap().port(), 3333);
        assert!(!config.is_production());
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let config = EnvironmentConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.listen_addr(), Err(ConfigError::InvalidAddress(_))));
    }
}
