use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgSslMode};
use sqlx::Connection;

use crate::config::DatabaseConfig;
use crate::errors::AppError;

pub const MAX_CONNECTIONS: u32 = 25;
pub const MIN_CONNECTIONS: u32 = 5;
pub const MAX_CONN_LIFETIME: Duration = Duration::from_secs(3600);
pub const MAX_CONN_IDLE_TIME: Duration = Duration::from_secs(1800);

/// Sizing and lifetime limits applied to every pool this service creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: MAX_CONNECTIONS,
            min_connections: MIN_CONNECTIONS,
            max_lifetime: MAX_CONN_LIFETIME,
            idle_timeout: MAX_CONN_IDLE_TIME,
        }
    }
}

impl PoolSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_connections == 0 {
            return Err(AppError::PoolCreation(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(AppError::PoolCreation(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

/// Parse a space-separated `key=value` connection descriptor.
///
/// Empty values leave the driver default in place.
pub fn parse_dsn(dsn: &str) -> Result<PgConnectOptions, AppError> {
    let mut options = PgConnectOptions::new();

    for pair in dsn.split_whitespace() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::ConfigParse(format!("missing \"=\" after {pair:?}")))?;

        if value.is_empty() {
            continue;
        }

        options = match key {
            "host" => options.host(value),
            "port" => {
                let port = value
                    .parse::<u16>()
                    .map_err(|e| AppError::ConfigParse(format!("invalid port {value:?}: {e}")))?;
                options.port(port)
            }
            "user" => options.username(value),
            "password" => options.password(value),
            "dbname" => options.database(value),
            "sslmode" => {
                let mode = PgSslMode::from_str(value)
                    .map_err(|e| AppError::ConfigParse(format!("invalid sslmode {value:?}: {e}")))?;
                options.ssl_mode(mode)
            }
            other => {
                return Err(AppError::ConfigParse(format!(
                    "invalid connection option {other:?}"
                )))
            }
        };
    }

    Ok(options)
}

const MIGRATIONS: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        display_name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_username_lower_idx ON users (LOWER(username))",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_idx ON users (LOWER(email))",
];

/// Open one connection outside the pool and ping it, so a failure keeps its
/// underlying cause instead of surfacing as a pool timeout.
async fn check_connection(options: &PgConnectOptions, timeout: Duration) -> Result<(), AppError> {
    let check = async {
        let mut conn = PgConnection::connect_with(options).await?;
        conn.ping().await?;
        conn.close().await
    };

    match tokio::time::timeout(timeout, check).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::Connectivity(e.to_string())),
        Err(_) => Err(timed_out(timeout)),
    }
}

fn timed_out(timeout: Duration) -> AppError {
    AppError::Connectivity(format!(
        "no response within {}",
        humantime::format_duration(timeout)
    ))
}

/// Owns the PostgreSQL connection pool for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct Database {
    pool: Option<PgPool>,
    ping_timeout: Duration,
}

impl Database {
    pub async fn new(cfg: &DatabaseConfig) -> Result<Self, AppError> {
        Self::with_settings(cfg, PoolSettings::default()).await
    }

    pub async fn with_settings(cfg: &DatabaseConfig, settings: PoolSettings) -> Result<Self, AppError> {
        let connect_options = parse_dsn(&cfg.dsn())?;
        settings.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .max_lifetime(settings.max_lifetime)
            .idle_timeout(settings.idle_timeout)
            .acquire_timeout(cfg.connect_timeout)
            .connect_lazy_with(connect_options.clone());

        let database = Self {
            pool: Some(pool),
            ping_timeout: cfg.connect_timeout,
        };

        if let Err(e) = check_connection(&connect_options, cfg.connect_timeout).await {
            database.close().await;
            return Err(e);
        }

        log::info!(
            "database connection pool created (max={}, min={})",
            settings.max_connections,
            settings.min_connections
        );
        Ok(database)
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn require_pool(&self) -> Result<&PgPool, AppError> {
        self.pool.as_ref().ok_or_else(|| {
            AppError::Connectivity("no connection pool has been created".to_string())
        })
    }

    /// Round-trip through the pool, bounded by the configured connect timeout.
    pub async fn ping(&self) -> Result<(), AppError> {
        let timeout = self.ping_timeout;
        let pool = self.require_pool()?;

        let check = async {
            let mut conn = pool.acquire().await?;
            conn.ping().await?;
            Ok::<_, sqlx::Error>(())
        };

        match tokio::time::timeout(timeout, check).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::Connectivity(e.to_string())),
            Err(_) => Err(timed_out(timeout)),
        }
    }

    /// Create the `users` table and its case-insensitive unique indexes if missing.
    ///
    /// Each statement runs separately; prepared statements take a single command.
    pub async fn migrate(&self) -> Result<(), AppError> {
        let pool = self.require_pool()?;

        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(|e| AppError::Query(format!("migration failed: {e}")))?;
        }

        log::info!("database migrations applied");
        Ok(())
    }

    /// Close the pool if one was created. Calling this more than once is harmless.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
