/// Host configuration
use aria_playback::PlaybackConfig;
use aria_server_client::ServerConfig;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "aria.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default)]
    pub player: PlaybackConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `aria.toml` is read if
    /// present. `ARIA_`-prefixed variables override both, with `__` between
    /// levels (`ARIA_SERVER__URL`, `ARIA_PLAYER__VOLUME`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ARIA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings.build()?.try_deserialize()
    }
}

impl ServerSettings {
    pub fn client_config(&self) -> ServerConfig {
        ServerConfig {
            url: self.url.clone(),
            user_id: self.user_id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        user_id: None,
        access_token: None,
    }
}

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        state_file: default_state_file(),
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./data/aria-player-state.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            player: PlaybackConfig::default(),
            storage: default_storage(),
        }
    }
}
