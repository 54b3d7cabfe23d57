/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_events")]
    pub events: EventSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventSettings {
    #[serde(default)]
    pub backend: EventBackend,

    /// How often broker subscribers poll the outbox
    #[serde(default = "default_broker_poll_interval_ms")]
    pub broker_poll_interval_ms: u64,

    /// Outbox messages older than this are pruned
    #[serde(default = "default_broker_retention_secs")]
    pub broker_retention_secs: u64,
}

/// Which event bus a deployment runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventBackend {
    /// Single instance, events never leave the process
    #[default]
    InProcess,
    /// Several instances sharing the database outbox
    Broker,
}

impl EventSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.broker_poll_interval_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.broker_retention_secs)
    }
}

impl ServerConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// used when present. Environment variables prefixed `CHORUS_` override
    /// file values; nested keys use `__` (`CHORUS_AUTH__JWT_SECRET`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CHORUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set CHORUS_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.events.broker_poll_interval_ms == 0 {
            return Err(ServerError::Config(
                "events.broker_poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.events.broker_retention_secs == 0 {
            return Err(ServerError::Config(
                "events.broker_retention_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/chorus.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
    }
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_events() -> EventSettings {
    EventSettings {
        backend: EventBackend::default(),
        broker_poll_interval_ms: default_broker_poll_interval_ms(),
        broker_retention_secs: default_broker_retention_secs(),
    }
}

fn default_broker_poll_interval_ms() -> u64 {
    250
}

fn default_broker_retention_secs() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            events: default_events(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_require_secret() {
        let config = ServerConfig::default();
        assert_eq!(config.events.backend, EventBackend::InProcess);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[auth]
jwt_secret = "from-file"

[events]
backend = "broker"
broker_poll_interval_ms = 50
"#
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.events.backend, EventBackend::Broker);
        assert_eq!(config.events.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.events.broker_retention_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config.events.broker_poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
