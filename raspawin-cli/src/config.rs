use raspawin_core::{GameConfig, PlayerContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub tenant_id: String,
    pub player_id: String,
    #[serde(default)]
    pub game: GameConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tenant_id: "client-1".to_string(),
            player_id: "player-1".to_string(),
            game: GameConfig::default(),
        }
    }
}

impl CliConfig {
    /// Read `config.json` from the data directory. A missing or unreadable
    /// file gives the defaults.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CliConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        config.data_dir = data_dir.to_path_buf();
        config
    }

    pub fn save(&self) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(CONFIG_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn player(&self) -> PlayerContext {
        PlayerContext::new(&self.tenant_id, &self.player_id)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("raspawin.db")
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("raspawin")
}
