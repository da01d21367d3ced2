use crate::normalize::NormalizeConfig;
use crate::retarget::RetargetConfig;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONFY_APP_NAME: &str = "pose-retarget";
const CONFY_CONFIG_NAME: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Time between two playback steps, independent of the display refresh rate.
    pub interval_ms: u64,
    /// Only keep this many frames of a loaded pose file.
    pub max_frames: Option<usize>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            interval_ms: 33,
            max_frames: None,
        }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackConfig,
    pub normalize: NormalizeConfig,
    pub retarget: RetargetConfig,
}

impl Settings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, CONFY_CONFIG_NAME).unwrap_or_else(|err| {
            warn!("failed to load settings, using defaults: {err}");
            Settings::default()
        })
    }

    pub fn save(&self) {
        if let Err(err) = confy::store(CONFY_APP_NAME, CONFY_CONFIG_NAME, self) {
            warn!("failed to store settings: {err}");
        }
    }
}
