use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::engine::RoundLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct ReactxConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub game: GameConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            token_ttl_hours: 24,
            bcrypt_cost: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardConfig {
    pub limit: i64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Round-count bounds offered to players. The engine itself accepts 1..=50.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub min_rounds: u32,
    pub max_rounds: u32,
    pub default_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_rounds: 5,
            max_rounds: 50,
            default_rounds: 5,
        }
    }
}

impl GameConfig {
    pub fn limits(&self) -> RoundLimits {
        RoundLimits {
            min: self.min_rounds,
            max: self.max_rounds,
        }
    }

    /// Just the `[game]` section of `path`, with the same env overrides as
    /// [`ReactxConfig::load`]. Needs no `[database]` section, so game hosts
    /// can share the server's file or run without one.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct GameOnly {
            #[serde(default)]
            game: GameConfig,
        }

        let only: GameOnly = sources(path)?.try_deserialize()?;
        Ok(only.game)
    }
}

fn sources(path: &str) -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("REACTX").separator("__"))
        .build()
}

impl ReactxConfig {
    /// Load from `path` (if it exists), then apply `REACTX__SECTION__KEY`
    /// environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        sources(path)?.try_deserialize()
    }

    /// An in-memory configuration with every default applied.
    pub fn in_memory() -> Self {
        Self {
            service: ServiceConfig::default(),
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                max_connections: default_max_connections(),
            },
            http: HttpConfig::default(),
            auth: AuthConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            game: GameConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> (std::path::PathBuf, String) {
        let dir = std::env::temp_dir().join(format!("reactx-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("reactx.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        let stem = path.to_string_lossy().to_string();
        (dir, stem)
    }

    #[test]
    fn test_minimal_file_fills_defaults() {
        let (dir, path) = write_config(
            r#"
[database]
url = "postgres://localhost/reactx"
"#,
        );
        let cfg = ReactxConfig::load(&path).unwrap();
        assert_eq!(cfg.database.backend, StoreBackend::Postgres);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.http.port, 5000);
        assert_eq!(cfg.auth.token_ttl_hours, 24);
        assert_eq!(cfg.auth.bcrypt_cost, 10);
        assert_eq!(cfg.leaderboard.limit, 10);
        assert_eq!(cfg.game.limits(), RoundLimits { min: 5, max: 50 });
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_full_file_overrides() {
        let (dir, path) = write_config(
            r#"
[service]
log_level = "debug"

[database]
backend = "memory"

[http]
host = "0.0.0.0"
port = 8080

[auth]
jwt_secret = "s3cret"
token_ttl_hours = 2
bcrypt_cost = 4

[leaderboard]
limit = 25

[game]
min_rounds = 3
max_rounds = 20
default_rounds = 10
"#,
        );
        let cfg = ReactxConfig::load(&path).unwrap();
        assert_eq!(cfg.service.log_level, "debug");
        assert_eq!(cfg.database.backend, StoreBackend::Memory);
        assert_eq!(cfg.http.port, 8080);
        assert_eq!(cfg.auth.jwt_secret, "s3cret");
        assert_eq!(cfg.leaderboard.limit, 25);
        assert_eq!(cfg.game.default_rounds, 10);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let (dir, path) = write_config(
            r#"
[database]
backend = "sqlite"
"#,
        );
        assert!(ReactxConfig::load(&path).is_err());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_game_section_loads_without_database() {
        let (dir, path) = write_config(
            r#"
[game]
min_rounds = 10
default_rounds = 12
"#,
        );
        let game = GameConfig::load(&path).unwrap();
        assert_eq!(game.limits(), RoundLimits { min: 10, max: 50 });
        assert_eq!(game.default_rounds, 12);
        std::fs::remove_dir_all(dir).ok();

        let missing = GameConfig::load("/nonexistent/reactx-game").unwrap();
        assert_eq!(missing.default_rounds, 5);
    }
}
