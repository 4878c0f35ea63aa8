use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_ENTITY_FILENAME: &str = "entities.json";
const DEFAULT_UPDATES_PER_AUTOSAVE: u32 = 1;

/// Settings for the `recipecart` binary, stored in `<data dir>/config.json`.
///
/// Every field has a serde default, so a partial file (or none at all) is
/// valid. Command-line flags override whatever is loaded here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeCartConfig {
    /// Snapshot file, relative to the data directory unless absolute.
    /// A `.gz` suffix writes a gzip-compressed snapshot.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Autosave after this many updates; 0 disables autosave.
    #[serde(default = "default_updates_per_autosave")]
    pub updates_per_autosave: u32,

    #[serde(default)]
    pub disable_final_save: bool,

    /// Load the demo dataset on startup.
    #[serde(default)]
    pub mock_data: bool,
}

fn default_filename() -> String {
    DEFAULT_ENTITY_FILENAME.to_string()
}

fn default_updates_per_autosave() -> u32 {
    DEFAULT_UPDATES_PER_AUTOSAVE
}

impl Default for RecipeCartConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            updates_per_autosave: DEFAULT_UPDATES_PER_AUTOSAVE,
            disable_final_save: false,
            mock_data: false,
        }
    }
}

impl RecipeCartConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: RecipeCartConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Where the snapshot lives for a given data directory.
    pub fn entity_path<P: AsRef<Path>>(&self, data_dir: P) -> PathBuf {
        let filename = Path::new(&self.filename);
        if filename.is_absolute() {
            filename.to_path_buf()
        } else {
            data_dir.as_ref().join(filename)
        }
    }
}
