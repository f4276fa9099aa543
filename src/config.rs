//! Environment-driven configuration.
//!
//! Every variable the service reads is declared once below as an [`EnvVar`]
//! together with its default. Absent, empty or unparseable values resolve to
//! that default, so a loaded [`Config`] is always fully populated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::AppError;

/// A named environment variable and the value used when it is missing or malformed.
#[derive(Debug, Clone)]
pub struct EnvVar<T> {
    pub name: &'static str,
    pub default: T,
}

pub const SERVER_PORT: EnvVar<u16> = EnvVar { name: "SERVER_PORT", default: 8080 };
pub const SERVER_READ_TIMEOUT: EnvVar<Duration> = EnvVar { name: "SERVER_READ_TIMEOUT", default: Duration::from_secs(15) };
pub const SERVER_WRITE_TIMEOUT: EnvVar<Duration> = EnvVar { name: "SERVER_WRITE_TIMEOUT", default: Duration::from_secs(15) };
pub const SERVER_IDLE_TIMEOUT: EnvVar<Duration> = EnvVar { name: "SERVER_IDLE_TIMEOUT", default: Duration::from_secs(60) };

pub const DB_HOST: EnvVar<String> = EnvVar { name: "DB_HOST", default: String::new() };
pub const DB_PORT: EnvVar<i32> = EnvVar { name: "DB_PORT", default: 5432 };
pub const DB_USER: EnvVar<String> = EnvVar { name: "DB_USER", default: String::new() };
pub const DB_PASSWORD: EnvVar<String> = EnvVar { name: "DB_PASSWORD", default: String::new() };
pub const DB_NAME: EnvVar<String> = EnvVar { name: "DB_NAME", default: String::new() };
pub const DB_SSLMODE: EnvVar<String> = EnvVar { name: "DB_SSLMODE", default: String::new() };
pub const DB_CONNECT_TIMEOUT: EnvVar<Duration> = EnvVar { name: "DB_CONNECT_TIMEOUT", default: Duration::from_secs(5) };

/// Types that can be read from the raw text of an environment variable.
pub trait FromEnvValue: Sized {
    fn from_env_value(raw: &str) -> Option<Self>;
}

impl FromEnvValue for u16 {
    fn from_env_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromEnvValue for i32 {
    fn from_env_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromEnvValue for String {
    fn from_env_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromEnvValue for Duration {
    fn from_env_value(raw: &str) -> Option<Self> {
        humantime::parse_duration(raw).ok()
    }
}

impl<T: FromEnvValue + Clone> EnvVar<T> {
    pub fn read<F>(&self, lookup: &F) -> T
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(raw) = lookup(self.name).filter(|v| !v.is_empty()) else {
            return self.default.clone();
        };

        match T::from_env_value(&raw) {
            Some(value) => value,
            None => {
                log::warn!("{} has an unparseable value {:?}, using the default", self.name, raw);
                self.default.clone()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
}

/// Connection settings for the PostgreSQL pool.
///
/// `port` stays a signed integer so an out-of-range value reaches the
/// descriptor parser and is rejected there.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: i32,
    pub user: String,
    pub password: String,
    pub db_name: String,
    pub ssl_mode: String,
    pub connect_timeout: Duration,
}

impl Config {
    /// Import `.env` (searched from the working directory upwards) and read the environment.
    ///
    /// A missing file is not an error. A file that exists but cannot be parsed is.
    pub fn load() -> Result<Self, AppError> {
        Self::import_env_file()?;
        Ok(Self::from_env())
    }

    /// Same as [`Config::load`], but imports the given file instead of searching for `.env`.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        Self::import_env_file_from(path)?;
        Ok(Self::from_env())
    }

    /// Seed the process environment from `.env`, returning the file used, if any.
    ///
    /// Variables already present in the environment are left untouched.
    pub fn import_env_file() -> Result<Option<PathBuf>, AppError> {
        match dotenv::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(AppError::EnvironmentLoad(e)),
        }
    }

    pub fn import_env_file_from<P: AsRef<Path>>(path: P) -> Result<Option<PathBuf>, AppError> {
        let path = path.as_ref();
        match dotenv::from_path(path) {
            Ok(()) => Ok(Some(path.to_path_buf())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(AppError::EnvironmentLoad(e)),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: ServerConfig {
                port: SERVER_PORT.read(&lookup),
                read_timeout: SERVER_READ_TIMEOUT.read(&lookup),
                write_timeout: SERVER_WRITE_TIMEOUT.read(&lookup),
                idle_timeout: SERVER_IDLE_TIMEOUT.read(&lookup),
            },
            database: DatabaseConfig {
                host: DB_HOST.read(&lookup),
                port: DB_PORT.read(&lookup),
                user: DB_USER.read(&lookup),
                password: DB_PASSWORD.read(&lookup),
                db_name: DB_NAME.read(&lookup),
                ssl_mode: DB_SSLMODE.read(&lookup),
                connect_timeout: DB_CONNECT_TIMEOUT.read(&lookup),
            },
        }
    }
}

impl DatabaseConfig {
    /// Connection descriptor in `key=value` form. Values are not escaped.
    pub fn dsn(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={}",
            self.host, self.port, self.user, self.password, self.db_name, self.ssl_mode
        )
    }
}

fn is_not_found(err: &dotenv::Error) -> bool {
    matches!(err, dotenv::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
}
