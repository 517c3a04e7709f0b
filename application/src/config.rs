//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Debug, Display, Error};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret signing and verifying [JWT]s of user sessions.
    ///
    /// Has to be provided, no default is used.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[debug(skip)]
    pub jwt_secret: String,

    /// Duration a created user session stays valid for.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Administrator created on startup if there are no users yet.
    pub admin: Admin,
}

impl Service {
    /// Checks whether this [`Service`] configuration is usable.
    ///
    /// # Errors
    ///
    /// If the [`Service::jwt_secret`] is not provided.
    pub fn check(&self) -> Result<(), ServiceError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ServiceError::MissingJwtSecret);
        }
        Ok(())
    }
}

/// Error of an unusable [`Service`] configuration.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ServiceError {
    /// [`Service::jwt_secret`] is not provided.
    #[display("`service.jwt_secret` is not provided")]
    MissingJwtSecret,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            session_ttl,
            admin: _,
        } = value;
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            session_ttl,
        }
    }
}

/// Credentials of the administrator created on the first startup.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Admin {
    /// Login of the administrator.
    #[default("admin".to_owned())]
    pub login: String,

    /// Password of the administrator.
    #[debug(skip)]
    #[default("admin".to_owned())]
    pub password: String,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Service, ServiceError};

    #[test]
    fn requires_jwt_secret() {
        for secret in ["", "   "] {
            let service = Service {
                jwt_secret: secret.to_owned(),
                ..Service::default()
            };

            assert!(
                matches!(service.check(), Err(ServiceError::MissingJwtSecret)),
                "{secret:?}",
            );
        }
    }

    #[test]
    fn has_no_default_jwt_secret() {
        assert!(Service::default().check().is_err());

        let service = Service {
            jwt_secret: "4f1c0e9b".to_owned(),
            ..Service::default()
        };
        assert!(service.check().is_ok());
    }
}
