use crate::{AutosaveTimer, BuyError, Catalog, Offer, Quantity, SettingsHandle};
use persistence::{PlayerSettings, SaveData, SCHEMA_VERSION};
use sim_core::EconomyState;
use sim_econ::{PrestigeCurve, PrestigePreview};
use std::time::Duration;
use tracing::{debug, info};

/// Result of one passive tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub seconds: f64,
    pub earned: f64,
    /// The autosave interval elapsed; the host should persist now.
    pub autosave_due: bool,
}

/// What restoring a save did beyond copying fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RestoreReport {
    pub offline_seconds: f64,
    pub offline_earned: f64,
}

/// One player's game: economy state, upgrade catalog and prestige curve,
/// driven by clicks, ticks and purchases from a single timeline.
#[derive(Clone, Debug)]
pub struct Session {
    state: EconomyState,
    catalog: Catalog,
    curve: PrestigeCurve,
    settings: PlayerSettings,
    autosave: AutosaveTimer,
    settings_version: Option<u64>,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_settings(catalog, PlayerSettings::default())
    }

    pub fn with_settings(catalog: Catalog, settings: PlayerSettings) -> Self {
        let settings = settings.normalized();
        let mut state = EconomyState::new();
        catalog.reapply_all(&mut state);
        Self {
            state,
            catalog,
            curve: PrestigeCurve::default(),
            autosave: AutosaveTimer::from_settings(&settings),
            settings,
            settings_version: None,
        }
    }

    pub fn with_curve(mut self, curve: PrestigeCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn curve(&self) -> &PrestigeCurve {
        &self.curve
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Manual action; returns the money gained.
    pub fn click(&mut self) -> f64 {
        let before = self.state.money();
        self.state.add_on_click();
        self.state.money() - before
    }

    /// Credit passive income for `elapsed` real time and advance autosave.
    pub fn tick(&mut self, elapsed: Duration) -> TickReport {
        let seconds = elapsed.as_secs_f64();
        let before = self.state.money();
        self.state.apply_passive_tick(seconds);
        TickReport {
            seconds,
            earned: self.state.money() - before,
            autosave_due: self.autosave.advance(elapsed),
        }
    }

    pub fn buy(&mut self, id: &str, quantity: Quantity) -> Result<u32, BuyError> {
        self.catalog.try_buy(id, &mut self.state, quantity)
    }

    pub fn offers(&self, quantity: Quantity) -> Vec<Offer> {
        self.catalog.offers(&self.state, quantity)
    }

    pub fn prestige_preview(&self) -> PrestigePreview {
        self.curve.preview(&self.state)
    }

    /// Sell the company. On success purchases go back to zero and stats are
    /// rebuilt; an ineligible run is left as is.
    pub fn prestige(&mut self) -> u64 {
        let gained = self.curve.do_prestige(&mut self.state);
        if gained > 0 {
            self.catalog.reset_purchases();
            self.catalog.reapply_all(&mut self.state);
        }
        gained
    }

    /// Wipe everything, including investor capital.
    pub fn reset_all(&mut self) {
        self.state.reset_all();
        self.catalog.reset_purchases();
        self.catalog.reapply_all(&mut self.state);
        self.autosave.reset();
        info!("full reset");
    }

    pub fn apply_settings(&mut self, settings: PlayerSettings) {
        self.settings = settings.normalized();
        self.autosave = AutosaveTimer::from_settings(&self.settings);
        debug!(autosave = ?self.autosave.interval(), "settings applied");
    }

    /// Pick up settings changes published through `handle`. Returns true when
    /// a new version was applied.
    pub fn sync_settings(&mut self, handle: &SettingsHandle) -> bool {
        if self.settings_version == Some(handle.version()) {
            return false;
        }
        self.settings_version = Some(handle.version());
        self.apply_settings(handle.get().clone());
        true
    }

    /// Restart the autosave countdown after the host has saved.
    pub fn mark_saved(&mut self) {
        self.autosave.reset();
    }

    pub fn to_save(&self, now_unix: i64) -> SaveData {
        SaveData {
            schema_version: SCHEMA_VERSION,
            last_saved_unix_seconds: now_unix,
            money: self.state.money(),
            lines_of_code: self.state.lines_of_code(),
            investor_capital: self.state.investor_capital(),
            max_money_earned: self.state.max_money_earned(),
            upgrade_counts: self.catalog.purchase_counts(),
        }
    }

    /// Replace the current progress with `save`, rebuild stats from its
    /// purchase counts and credit offline income if enabled.
    pub fn restore(&mut self, save: &SaveData, now_unix: i64) -> RestoreReport {
        self.state.reset_all();
        self.state.set_money(save.money);
        self.state.set_lines_of_code(save.lines_of_code);
        self.state.set_investor_capital(save.investor_capital);
        self.state.set_max_money_earned(save.max_money_earned);
        self.catalog.apply_counts(&save.upgrade_counts);
        self.catalog.reapply_all(&mut self.state);
        self.autosave.reset();

        let mut report = RestoreReport::default();
        if self.settings.offline_progress {
            let away = now_unix.saturating_sub(save.last_saved_unix_seconds).max(0) as f64;
            let seconds = away.min(self.settings.offline_cap_seconds);
            let before = self.state.money();
            self.state.apply_passive_tick(seconds);
            report = RestoreReport {
                offline_seconds: seconds,
                offline_earned: self.state.money() - before,
            };
        }
        info!(
            money = self.state.money(),
            capital = self.state.investor_capital(),
            offline_seconds = report.offline_seconds,
            "progress restored"
        );
        report
    }
}
