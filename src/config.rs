//! Application-level configuration loading: JSON file, built-in defaults, environment overrides.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Principal;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "HOCKEY_TRACKER_CONFIG_PATH";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGO_DB: &str = "hockey_tracker";
const DEFAULT_TOKEN_TTL_HOURS: u32 = 24;
const DEV_PRINCIPAL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

/// Persistence backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps; data is lost on restart.
    Memory,
    /// MongoDB through the `mongo-store` feature.
    Mongo,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

impl Default for StoreBackend {
    fn default() -> Self {
        if cfg!(feature = "mongo-store") {
            Self::Mongo
        } else {
            Self::Memory
        }
    }
}

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Bearer JWTs issued by `/auth/login`.
    #[default]
    Token,
    /// Every request runs as the configured development principal.
    Dev,
}

impl AuthMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "token" | "jwt" => Some(Self::Token),
            "dev" => Some(Self::Dev),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongo_uri: String,
    pub mongo_db: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Signing secret; `None` means an ephemeral secret is generated at startup.
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: u32,
    pub dev_principal: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        store = ?app_config.store.backend,
                        auth = ?app_config.auth.mode,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `PORT`, `STORE_BACKEND`, `AUTH_MODE`, `JWT_SECRET`, `MONGO_URI` and `MONGO_DB`.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup("PORT") {
            match value.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(err) => warn!(%value, error = %err, "ignoring invalid PORT"),
            }
        }
        if let Some(value) = lookup("STORE_BACKEND") {
            match StoreBackend::parse(&value) {
                Some(backend) => self.store.backend = backend,
                None => warn!(%value, "ignoring unknown STORE_BACKEND"),
            }
        }
        if let Some(value) = lookup("AUTH_MODE") {
            match AuthMode::parse(&value) {
                Some(mode) => self.auth.mode = mode,
                None => warn!(%value, "ignoring unknown AUTH_MODE"),
            }
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(uri) = lookup("MONGO_URI") {
            self.store.mongo_uri = uri;
        }
        if let Some(db) = lookup("MONGO_DB") {
            self.store.mongo_db = db;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    server: RawServer,
    store: RawStore,
    auth: RawAuth,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServer {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStore {
    backend: Option<StoreBackend>,
    mongo_uri: Option<String>,
    mongo_db: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAuth {
    mode: Option<AuthMode>,
    jwt_secret: Option<String>,
    token_ttl_hours: Option<u32>,
    dev_principal: Option<RawPrincipal>,
}

#[derive(Debug, Deserialize)]
struct RawPrincipal {
    id: Option<Uuid>,
    email: Option<String>,
    name: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let dev_principal = value.auth.dev_principal;
        Self {
            server: ServerConfig {
                port: value.server.port.unwrap_or(DEFAULT_PORT),
            },
            store: StoreConfig {
                backend: value.store.backend.unwrap_or_default(),
                mongo_uri: value
                    .store
                    .mongo_uri
                    .unwrap_or_else(|| DEFAULT_MONGO_URI.into()),
                mongo_db: value.store.mongo_db.unwrap_or_else(|| DEFAULT_MONGO_DB.into()),
            },
            auth: AuthConfig {
                mode: value.auth.mode.unwrap_or_default(),
                jwt_secret: value.auth.jwt_secret.filter(|secret| !secret.is_empty()),
                token_ttl_hours: value
                    .auth
                    .token_ttl_hours
                    .filter(|hours| *hours > 0)
                    .unwrap_or(DEFAULT_TOKEN_TTL_HOURS),
                dev_principal: Principal {
                    id: dev_principal
                        .as_ref()
                        .and_then(|raw| raw.id)
                        .unwrap_or(DEV_PRINCIPAL_ID),
                    email: dev_principal
                        .as_ref()
                        .and_then(|raw| raw.email.clone())
                        .unwrap_or_else(|| "dev@localhost".into()),
                    name: dev_principal
                        .and_then(|raw| raw.name)
                        .unwrap_or_else(|| "Developer".into()),
                },
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
