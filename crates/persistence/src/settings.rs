use crate::{write_atomic, PersistenceError};
use serde::{Deserialize, Serialize};
use sim_core::format::NumberFormat;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_AUTOSAVE_SECONDS: f64 = 30.0;
pub const DEFAULT_OFFLINE_CAP_SECONDS: f64 = 8.0 * 3600.0;
const AUTOSAVE_RANGE: (f64, f64) = (1.0, 3600.0);

/// Player-facing preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub number_format: NumberFormat,
    pub autosave_enabled: bool,
    /// Seconds between autosaves, kept within [1, 3600].
    pub autosave_interval_seconds: f64,
    /// Credit passive income for time spent away.
    pub offline_progress: bool,
    pub offline_cap_seconds: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            number_format: NumberFormat::Short,
            autosave_enabled: true,
            autosave_interval_seconds: DEFAULT_AUTOSAVE_SECONDS,
            offline_progress: true,
            offline_cap_seconds: DEFAULT_OFFLINE_CAP_SECONDS,
        }
    }
}

impl PlayerSettings {
    /// Bring out-of-range values back into their valid ranges. Invalid or
    /// non-positive autosave intervals fall back to the default.
    pub fn normalized(mut self) -> Self {
        let s = self.autosave_interval_seconds;
        self.autosave_interval_seconds = if s.is_finite() && s > 0.0 {
            s.clamp(AUTOSAVE_RANGE.0, AUTOSAVE_RANGE.1)
        } else {
            DEFAULT_AUTOSAVE_SECONDS
        };
        if !(self.offline_cap_seconds >= 0.0) || self.offline_cap_seconds.is_infinite() {
            self.offline_cap_seconds = DEFAULT_OFFLINE_CAP_SECONDS;
        }
        self
    }
}

/// Load settings, falling back to defaults when the file is missing or bad.
pub fn load_settings_or_default<P: AsRef<Path>>(path: P) -> PlayerSettings {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "settings load failed");
            }
            return PlayerSettings::default();
        }
    };
    match serde_json::from_str::<PlayerSettings>(&text) {
        Ok(s) => s.normalized(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings load failed");
            PlayerSettings::default()
        }
    }
}

pub fn save_settings<P: AsRef<Path>>(path: P, settings: &PlayerSettings) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(settings)?;
    write_atomic(path.as_ref(), &json)?;
    info!(path = %path.as_ref().display(), "settings saved");
    Ok(())
}
