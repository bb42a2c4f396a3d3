//! [`Config`] of the application.
//!
//! Values come from an optional TOML file, then from environment variables
//! prefixed with `CONF.` (e.g. `CONF.SERVER.PORT=80`), falling back to
//! defaults for anything left unset.

use std::time::Duration;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Prefix of environment variables overriding the [`Config`] file.
const ENV_PREFIX: &str = "CONF";

/// Separator of nested keys in environment variables.
const ENV_SEPARATOR: &str = ".";

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP [`Server`] settings.
    pub server: Server,

    /// Marketplace [`Service`] settings.
    pub service: Service,

    /// [`Postgres`] connection settings.
    pub postgres: Postgres,

    /// [`Log`] settings.
    pub log: Log,
}

impl Config {
    /// Loads the [`Config`] from the TOML file at `path`, if it exists, and
    /// the environment.
    ///
    /// # Errors
    ///
    /// If a source cannot be read or holds a value of a wrong type.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let file = config::File::with_name(path.as_ref()).required(false);
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR);

        ConfigBuilder::<DefaultState>::default()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Address to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// [`Cors`] policy.
    pub cors: Cors,
}

/// [CORS] policy of the API.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API, `*` allowing any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Marketplace service settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret signing session credentials.
    #[default(SecretString::from("secret"))]
    pub jwt_secret: SecretString,

    /// How long a session stays valid after sign-in.
    #[default(Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,

    /// [bcrypt] cost of password hashing.
    ///
    /// [bcrypt]: https://wikipedia.org/wiki/Bcrypt
    #[default(12)]
    pub password_cost: u32,
}

impl From<Service> for service::Config {
    fn from(conf: Service) -> Self {
        let credentials = service::Credentials {
            session_ttl: conf.session_ttl,
            password_cost: conf.password_cost,
        };
        let secret = conf.jwt_secret.expose_secret().as_bytes();
        Self::with_secret(secret, credentials)
    }
}

/// Postgres connection settings.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Database server host.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Database server port.
    #[default(5432)]
    pub port: u16,

    /// Role to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password of the [`Postgres::user`].
    #[default(SecretString::from("postgres"))]
    pub password: SecretString,

    /// Name of the database holding the marketplace data.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum number of pooled connections.
    #[default(16)]
    pub max_connections: usize,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(conf: Postgres) -> Self {
        let mut pg = Self::new();
        pg.host = Some(conf.host);
        pg.port = Some(conf.port);
        pg.user = Some(conf.user);
        pg.password = Some(conf.password.expose_secret().to_owned());
        pg.dbname = Some(conf.dbname);
        pg.pool = Some(service::infra::postgres::PoolConfig::new(
            conf.max_connections,
        ));
        pg
    }
}

/// Logging settings.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Most verbose [`LogLevel`] still emitted.
    pub level: LogLevel,
}

/// Verbosity of emitted log events.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Everything, including step-by-step tracing.
    Trace,

    /// Diagnostics useful while debugging.
    Debug,

    /// Regular operation.
    #[default]
    Info,

    /// Recoverable problems only.
    Warn,

    /// Failures only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Config, LogLevel};

    #[test]
    fn missing_file_gives_defaults() {
        let conf = Config::new("does-not-exist.toml").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.service.session_ttl, Duration::from_secs(3600));
        assert_eq!(conf.postgres.dbname, "postgres");
        assert!(matches!(conf.log.level, LogLevel::Info));
    }

    #[test]
    fn postgres_section_maps_to_pool_config() {
        let conf = Config::default().postgres;
        let pg = service::infra::postgres::Config::from(conf);

        assert_eq!(pg.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(pg.port, Some(5432));
        assert_eq!(pg.pool.map(|p| p.max_size), Some(16));
    }
}
