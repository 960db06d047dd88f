use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Password or other credential; never printed by `Debug`.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MySqlParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    pub mysqldump_bin: String,
    pub docker_bin: String,
    pub container: String,
    pub startup_wait: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mysql: MySqlParams,
    pub root_password: Secret,
    pub backup_dir: PathBuf,
    pub tools: ToolsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing credentials are left
    /// empty and only surface once the server rejects the connection.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let port = match lookup("MYSQL_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("MYSQL_PORT must be a port number, got {raw:?}"))?,
            None => 3307,
        };

        let mysql = MySqlParams {
            host: var("MYSQL_HOST", "127.0.0.1"),
            port,
            user: var("MYSQL_USER", "root"),
            password: Secret::new(var("MYSQL_PASSWORD", "")),
            database: var("MYSQL_DATABASE", ""),
        };

        let tools = ToolsConfig {
            mysqldump_bin: var("MYSQLDUMP_BIN", "mysqldump"),
            docker_bin: var("DOCKER_BIN", "docker"),
            container: var("MYSQL_CONTAINER", "mysql"),
            startup_wait: Duration::from_secs(
                lookup("MYSQL_STARTUP_WAIT_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(8),
            ),
        };

        Ok(Self {
            mysql,
            root_password: Secret::new(var("MYSQL_ROOT_PASSWORD", "")),
            backup_dir: PathBuf::from(var("BACKUP_DIR", "backups")),
            tools,
        })
    }
}
