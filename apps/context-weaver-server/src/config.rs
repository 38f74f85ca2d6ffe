//! Configuration management for Context Weaver Server

use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::highlight::HighlightColor;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub documents: DocumentsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Identity is resolved upstream; the server only reads the user id header.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub user_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    /// Largest accepted document body, in bytes
    pub max_document_bytes: usize,
    /// Color given to new annotations that don't name one
    pub default_color: HighlightColor,
}

const DEFAULT_MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./context-weaver.db".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                user_header: "x-user-id".to_string(),
            },
            documents: DocumentsConfig {
                max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
                default_color: HighlightColor::default(),
            },
        }
    }
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// Every variable is optional. A malformed value is logged and replaced by
    /// its default without touching the other settings.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let default_color = match lookup("DEFAULT_HIGHLIGHT_COLOR") {
            Some(name) => HighlightColor::from_name(&name).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown DEFAULT_HIGHLIGHT_COLOR {:?}, using {}",
                    name,
                    defaults.documents.default_color.as_str()
                );
                defaults.documents.default_color
            }),
            None => defaults.documents.default_color,
        };

        Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(lookup("SERVER_PORT"), "SERVER_PORT", defaults.server.port),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_or(
                    lookup("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            auth: AuthConfig {
                user_header: lookup("AUTH_USER_HEADER")
                    .map(|h| h.to_ascii_lowercase())
                    .unwrap_or(defaults.auth.user_header),
            },
            documents: DocumentsConfig {
                max_document_bytes: parse_or(
                    lookup("MAX_DOCUMENT_BYTES"),
                    "MAX_DOCUMENT_BYTES",
                    defaults.documents.max_document_bytes,
                ),
                default_color,
            },
        }
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}
