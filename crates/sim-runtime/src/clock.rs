use persistence::PlayerSettings;
use std::time::{Duration, Instant};

/// Measures real elapsed time between passive ticks so income does not
/// drift when the host's timer fires late.
#[derive(Debug)]
pub struct TickClock {
    last: Instant,
}

impl TickClock {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Time since the previous lap (or start), resetting the mark.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// Counts elapsed run time towards the next autosave.
#[derive(Clone, Debug, PartialEq)]
pub struct AutosaveTimer {
    interval: Option<Duration>,
    since_last: Duration,
}

impl AutosaveTimer {
    /// `None` disables autosaving.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            since_last: Duration::ZERO,
        }
    }

    pub fn from_settings(settings: &PlayerSettings) -> Self {
        let interval = settings
            .autosave_enabled
            .then(|| Duration::from_secs_f64(settings.autosave_interval_seconds.max(1.0)));
        Self::new(interval)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Advance by `elapsed`; returns true when a save is due. The counter
    /// restarts after each due save.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };
        self.since_last += elapsed;
        if self.since_last >= interval {
            self.since_last = Duration::ZERO;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.since_last = Duration::ZERO;
    }
}

/// Shared settings with a version counter that consumers poll to notice
/// changes.
#[derive(Clone, Debug, Default)]
pub struct SettingsHandle {
    settings: PlayerSettings,
    version: u64,
}

impl SettingsHandle {
    pub fn new(settings: PlayerSettings) -> Self {
        Self {
            settings: settings.normalized(),
            version: 0,
        }
    }

    pub fn get(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the settings and bump the version.
    pub fn apply(&mut self, settings: PlayerSettings) {
        self.settings = settings.normalized();
        self.version += 1;
    }
}
