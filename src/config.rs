use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/attendance_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            cookie_secure: false,
        }
    }
}

impl Config {
    /// Loads configuration in priority order:
    /// 1. Built-in defaults
    /// 2. Attendance.toml, if present
    /// 3. Environment variables prefixed with ATTENDANCE_
    /// 4. DATABASE_URL, mapped onto database.url
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Attendance.toml").nested())
            .merge(Env::prefixed("ATTENDANCE_").split("_"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()));

        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.session.ttl_hours, 24);
        assert!(config.cors.allow_credentials);
    }

    #[test]
    fn load_without_files_or_env_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load().expect("defaults extract");
            assert_eq!(config.database.max_connections, 16);
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn database_url_env_overrides_the_default() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://example/override_db");
            let config = Config::load().expect("config extracts");
            assert_eq!(config.database.url, "postgres://example/override_db");
            Ok(())
        });
    }
}
