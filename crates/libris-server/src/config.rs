//! Configuration management

use crate::audit::ObjectType;
use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/libris";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Audit Configuration Constants
// ============================================================================

/// Days covered by the "recent" part of audit statistics.
pub const DEFAULT_AUDIT_STATISTICS_WINDOW_DAYS: i64 = 30;

/// Largest accepted statistics window (about a century).
pub const MAX_AUDIT_STATISTICS_WINDOW_DAYS: i64 = 36_500;

/// Upper bound on rows written to one spreadsheet export.
pub const DEFAULT_AUDIT_EXPORT_MAX_ROWS: i64 = 50_000;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub audit: AuditConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Object types whose changes are recorded
    pub tracked_types: Vec<ObjectType>,
    pub statistics_window_days: i64,
    pub export_max_rows: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            tracked_types: ObjectType::ALL.to_vec(),
            statistics_window_days: DEFAULT_AUDIT_STATISTICS_WINDOW_DAYS,
            export_max_rows: DEFAULT_AUDIT_EXPORT_MAX_ROWS,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse a comma-separated list of object types ("Book, Loan")
pub fn parse_tracked_types(raw: &str) -> anyhow::Result<Vec<ObjectType>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ObjectType>()
                .map_err(|_| anyhow::anyhow!("Unknown audited object type '{}'", s))
        })
        .collect()
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let tracked_types = match std::env::var("AUDIT_TRACKED_TYPES") {
            Ok(raw) => parse_tracked_types(&raw)?,
            Err(_) => ObjectType::ALL.to_vec(),
        };

        let config = Config {
            server: ServerConfig {
                host: std::env::var("LIBRIS_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("LIBRIS_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "LIBRIS_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or("DATABASE_IDLE_TIMEOUT", DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            audit: AuditConfig {
                tracked_types,
                statistics_window_days: env_or(
                    "AUDIT_STATISTICS_WINDOW_DAYS",
                    DEFAULT_AUDIT_STATISTICS_WINDOW_DAYS,
                ),
                export_max_rows: env_or("AUDIT_EXPORT_MAX_ROWS", DEFAULT_AUDIT_EXPORT_MAX_ROWS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.audit.statistics_window_days <= 0 {
            anyhow::bail!("AUDIT_STATISTICS_WINDOW_DAYS must be greater than 0");
        }

        if self.audit.statistics_window_days > MAX_AUDIT_STATISTICS_WINDOW_DAYS {
            anyhow::bail!(
                "AUDIT_STATISTICS_WINDOW_DAYS ({}) cannot exceed {}",
                self.audit.statistics_window_days,
                MAX_AUDIT_STATISTICS_WINDOW_DAYS
            );
        }

        if self.audit.export_max_rows <= 0 {
            anyhow::bail!("AUDIT_EXPORT_MAX_ROWS must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if self.audit.tracked_types.is_empty() {
            tracing::warn!("AUDIT_TRACKED_TYPES is empty - no changes will be audited");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            audit: AuditConfig::default(),
        }
    }
}
