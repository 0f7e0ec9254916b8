use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calibrate::Calibration;
use directories::ProjectDirs;

/// Everything the operator can tune for an installation, persisted as one
/// settings file. Game rules, the blob area band, display bounds, and the
/// calibration numbers all live here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Player count preselected before anyone touches the menu.
    pub players: u32,
    /// Rounds per session.
    pub rounds: u32,
    /// Round timer budget in seconds.
    pub round_secs: f64,
    /// Consecutive satisfying ticks needed to confirm a hub or selector.
    pub wait_frames: u32,
    /// Time bonus per second left on the clock when a round is satisfied.
    pub points_per_second: u32,
    /// Ticks the loop keeps showing outcome feedback between rounds.
    pub pause_ticks: u32,
    /// Blob area band; regions outside it are ignored.
    pub min_blob_size: f64,
    pub max_blob_size: f64,
    /// Display-space bounds circles are laid out in.
    pub display_width: f64,
    pub display_height: f64,
    /// Player counts offered on the main menu.
    pub selector_counts: Vec<u32>,
    pub calibration: Calibration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: 4,
            rounds: 10,
            round_secs: 4.0,
            wait_frames: 30,
            points_per_second: 50,
            pause_ticks: 20,
            min_blob_size: 800.0,
            max_blob_size: 20000.0,
            display_width: 1920.0,
            display_height: 1080.0,
            selector_counts: vec![1, 2, 3, 4, 5, 6],
            calibration: Calibration::default(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "kreis") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("kreis_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
