//! Persisted settings, immutable after load.
//!
//! One JSON object with a fixed key set. Missing file: written out with
//! defaults. Missing individual keys: backfilled with defaults in memory,
//! existing keys preserved. Malformed file: logged, defaults used, the
//! broken file is left untouched for the user to inspect. Re-editing
//! requires a restart; nothing mutates settings at runtime.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Default settings file name, next to the binary's working directory.
pub const SETTINGS_FILE: &str = "simlife.json";

/// How the headset strap is worn; `Off` disables VR initialization
/// entirely even when hardware is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrapMode {
    Off,
    Partial,
    #[default]
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub vr_strap: StrapMode,
    #[serde(default)]
    pub handedness: Handedness,
    #[serde(default = "default_user_height_m")]
    pub user_height_m: f32,
    #[serde(default = "default_snap_turn_degrees")]
    pub snap_turn_degrees: f32,
    #[serde(default = "default_true")]
    pub comfort_vignette: bool,

    #[serde(default)]
    pub mapbox_token: String,
    #[serde(default = "default_mapbox_style")]
    pub mapbox_style: String,
    #[serde(default = "default_start_lat")]
    pub start_lat: f64,
    #[serde(default = "default_start_lon")]
    pub start_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    #[serde(default = "default_true")]
    pub music_enabled: bool,
    #[serde(default = "default_music_volume")]
    pub music_volume: f32,
    #[serde(default = "default_true")]
    pub sfx_enabled: bool,
    #[serde(default = "default_sfx_volume")]
    pub sfx_volume: f32,

    #[serde(default = "default_true")]
    pub effects_enabled: bool,
}

fn default_user_height_m() -> f32 {
    1.75
}

fn default_snap_turn_degrees() -> f32 {
    30.0
}

fn default_mapbox_style() -> String {
    "mapbox/streets-v12".to_string()
}

fn default_start_lat() -> f64 {
    37.7749
}

fn default_start_lon() -> f64 {
    -122.4194
}

fn default_zoom() -> u8 {
    16
}

fn default_music_volume() -> f32 {
    0.4
}

fn default_sfx_volume() -> f32 {
    0.8
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            vr_strap: StrapMode::default(),
            handedness: Handedness::default(),
            user_height_m: default_user_height_m(),
            snap_turn_degrees: default_snap_turn_degrees(),
            comfort_vignette: true,
            mapbox_token: String::new(),
            mapbox_style: default_mapbox_style(),
            start_lat: default_start_lat(),
            start_lon: default_start_lon(),
            zoom: default_zoom(),
            music_enabled: true,
            music_volume: default_music_volume(),
            sfx_enabled: true,
            sfx_volume: default_sfx_volume(),
            effects_enabled: true,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, creating the file with defaults if it
    /// does not exist. A malformed file falls back to defaults and is
    /// non-fatal.
    pub fn load_or_create(path: &Path) -> Result<Settings> {
        if !path.exists() {
            let settings = Settings::default();
            let json = serde_json::to_string_pretty(&settings)
                .map_err(crate::error::Error::serialization)?;
            fs::write(path, json)?;
            info!(path = %path.display(), "settings file created with defaults");
            return Ok(settings);
        }

        let raw = fs::read_to_string(path)?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(path = %path.display(), %err, "settings file malformed, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// VR is attempted only when hardware is present and the strap mode
    /// allows it.
    pub fn vr_enabled(&self) -> bool {
        self.vr_strap != StrapMode::Off
    }
}
