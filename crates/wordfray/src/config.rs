//! Persisted client settings.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wordfray_protocol::GameOptions;

use crate::ConfigError;

/// Server address used when none has been configured.
pub const DEFAULT_ENDPOINT: &str = "localhost:4268";

/// Settings that survive between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Game server address, `host:port` or a full `ws://` URL.
    pub endpoint: String,

    /// Sent to the server as `game-options` when hosting.
    pub options: GameOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            options: GameOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Replaces unusable values with defaults.
    pub fn validated(mut self) -> Self {
        if self.endpoint.trim().is_empty() {
            tracing::warn!("empty endpoint in config, using {DEFAULT_ENDPOINT}");
            self.endpoint = DEFAULT_ENDPOINT.to_string();
        }
        self.options = self.options.validated();
        self
    }
}

/// Loads and saves a [`ClientConfig`] as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config. A missing file yields the defaults.
    pub async fn load(&self) -> Result<ClientConfig, ConfigError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                return Ok(ClientConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Io { path: self.path.clone(), source });
            }
        };

        let config: ClientConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: self.path.clone(), source })?;
        Ok(config.validated())
    }

    /// Writes the config, creating parent directories as needed.
    pub async fn save(&self, config: &ClientConfig) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(config)
            .map_err(|source| ConfigError::Parse { path: self.path.clone(), source })?;
        tokio::fs::write(&self.path, text).await.map_err(io_err)?;

        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("wordfray-config-{}-{n}", std::process::id()))
            .join(name)
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let store = ConfigStore::new(scratch_path("absent.json"));
        let config = store.load().await.unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.endpoint, "localhost:4268");
        assert_eq!(config.options.timer, 0);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = ConfigStore::new(scratch_path("config.json"));
        let config = ClientConfig {
            endpoint: "ws://play.example.org:4268".into(),
            options: GameOptions { timer: 15 },
        };

        store.save(&config).await.unwrap();
        let text = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(text.contains('\n'), "pretty-printed");

        assert_eq!(store.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_invalid_values_are_reset() {
        let store = ConfigStore::new(scratch_path("config.json"));
        let dir = store.path().parent().unwrap();
        tokio::fs::create_dir_all(dir).await.unwrap();
        tokio::fs::write(store.path(), r#"{"endpoint":"  ","options":{"timer":7}}"#)
            .await
            .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let store = ConfigStore::new(scratch_path("config.json"));
        let dir = store.path().parent().unwrap();
        tokio::fs::create_dir_all(dir).await.unwrap();
        tokio::fs::write(store.path(), r#"{"endpoint":"10.0.0.2:4268"}"#).await.unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.endpoint, "10.0.0.2:4268");
        assert_eq!(config.options, GameOptions::default());
    }

    #[tokio::test]
    async fn test_garbage_is_a_parse_error() {
        let store = ConfigStore::new(scratch_path("config.json"));
        let dir = store.path().parent().unwrap();
        tokio::fs::create_dir_all(dir).await.unwrap();
        tokio::fs::write(store.path(), "endpoint = nope").await.unwrap();

        assert!(matches!(store.load().await, Err(ConfigError::Parse { .. })));
    }
}
