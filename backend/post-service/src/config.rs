/// Configuration management for Post Service
///
/// Everything is read from environment variables (a `.env` file is loaded
/// first by `main`). Invalid values are reported instead of silently falling
/// back so a misconfigured deployment fails at startup.
use db_pool::env_utils::parse_env_or_error;
use db_pool::DbConfig;
use serde::{Deserialize, Serialize};

/// Batch size used by the chunked scan when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: i64 = 150;

/// Upper bound accepted for a chunk size, from config or from a request.
pub const MAX_CHUNK_SIZE: i64 = 1_000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Post scanning configuration
    pub posts: PostsConfig,
    /// Log output configuration
    pub logging: LoggingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Number of actix workers
    pub workers: usize,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool; the only pool-size knob for this service
    pub max_connections: u32,
    /// Apply bundled migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsConfig {
    /// Rows per batch for `GET /posts`
    pub chunk_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `json` or `text`
    pub format: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Pool settings for `service`; `DATABASE_MAX_CONNECTIONS` wins over the
    /// pool library's defaults and the minimum never exceeds it.
    pub fn pool_config(&self, service: &str) -> DbConfig {
        let mut pool = DbConfig::new(service, &self.url);
        pool.max_connections = self.max_connections;
        pool.min_connections = pool.min_connections.min(self.max_connections);
        pool
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let chunk_size: i64 = parse_env_or_error("POST_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        if !(1..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(format!(
                "POST_CHUNK_SIZE must be between 1 and {}, got {}",
                MAX_CHUNK_SIZE, chunk_size
            ));
        }

        let workers: usize = parse_env_or_error("POST_SERVICE_WORKERS", 4)?;
        if workers == 0 {
            return Err("POST_SERVICE_WORKERS must be at least 1".to_string());
        }

        let max_connections: u32 = parse_env_or_error("DATABASE_MAX_CONNECTIONS", 10)?;
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be at least 1".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("POST_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_error("POST_SERVICE_PORT", 8082)?,
                workers,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/nova".to_string()),
                max_connections,
                run_migrations: parse_env_or_error("RUN_MIGRATIONS", true)?,
            },
            posts: PostsConfig { chunk_size },
            logging: LoggingConfig {
                format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
        })
    }
}
