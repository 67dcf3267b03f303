//! Investor capital ("sell the company") curve.
//!
//! The first prestige opens at a flat excess of [`IC_BASE_CHUNK`] over the
//! money record and always grants at least one point. Beyond the gate, the
//! excess is measured as a fraction of `max(gate, record)` and fed through a
//! saturating exponential `cap * (1 - e^(-alpha * p))`, where `alpha` is
//! derived so that `p = 1` yields [`TARGET_AT_P1`].

use crate::{EconError, EPS};
use sim_core::EconomyState;
use tracing::{debug, info};

/// Excess over the money record required for the first point.
pub const IC_BASE_CHUNK: f64 = 10_000.0;
/// Upper bound on investor capital gained per run.
pub const IC_SOFT_CAP: f64 = 100.0;
/// Raw gain when the excess equals the normaliser (p = 1).
pub const TARGET_AT_P1: f64 = 2.0;

const GAIN_EPS: f64 = 1e-9;
const MIN_PERCENT: f64 = 1e-12;

/// Where the current run stands relative to the prestige gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    /// Accumulating money; prestiging now would grant nothing.
    Active,
    /// Past the gate; prestiging grants at least one point.
    Eligible,
}

/// Snapshot of prestige numbers for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrestigePreview {
    pub phase: RunPhase,
    pub gain: u64,
    pub first_target: f64,
    pub next_target: f64,
    pub percent_over_gate: f64,
}

/// Calibrated saturating prestige curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrestigeCurve {
    base_chunk: f64,
    soft_cap: f64,
    alpha: f64,
}

impl Default for PrestigeCurve {
    fn default() -> Self {
        Self::from_parts(IC_BASE_CHUNK, IC_SOFT_CAP)
    }
}

impl PrestigeCurve {
    /// Build a curve with a custom gate and soft cap. `alpha` is re-derived
    /// from the soft cap.
    pub fn new(base_chunk: f64, soft_cap: f64) -> Result<Self, EconError> {
        if !base_chunk.is_finite() || base_chunk <= 0.0 {
            return Err(EconError::InvalidBaseChunk(base_chunk));
        }
        if !soft_cap.is_finite() || soft_cap <= TARGET_AT_P1 {
            return Err(EconError::InvalidSoftCap(soft_cap));
        }
        Ok(Self::from_parts(base_chunk, soft_cap))
    }

    fn from_parts(base_chunk: f64, soft_cap: f64) -> Self {
        // raw(1) = cap * (1 - e^-alpha) = TARGET_AT_P1
        let alpha = -(-TARGET_AT_P1 / soft_cap).ln_1p();
        Self {
            base_chunk,
            soft_cap,
            alpha,
        }
    }

    pub fn base_chunk(&self) -> f64 {
        self.base_chunk
    }

    pub fn soft_cap(&self) -> f64 {
        self.soft_cap
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Money at which the first point becomes available.
    pub fn first_target(&self, max_money_earned: f64) -> f64 {
        max_money_earned + self.base_chunk
    }

    /// Excess beyond the gate as a fraction of `max(gate, record)`.
    pub fn percent_over_gate(&self, money: f64, max_money_earned: f64) -> f64 {
        let first = self.first_target(max_money_earned);
        let norm = first.max(max_money_earned);
        ((money - first) / norm.max(EPS)).max(0.0)
    }

    /// Fractional gain for a given excess fraction, in `[0, soft_cap]`.
    pub fn raw_gain(&self, percent: f64) -> f64 {
        if !(percent > MIN_PERCENT) {
            return 0.0;
        }
        let raw = -self.soft_cap * (-self.alpha * percent).exp_m1();
        raw.clamp(0.0, self.soft_cap)
    }

    /// Inverse of [`raw_gain`](Self::raw_gain).
    pub fn percent_needed_for(&self, raw: f64) -> f64 {
        let s = (raw / self.soft_cap).clamp(1e-9, 1.0 - 1e-9);
        -(-s).ln_1p() / self.alpha
    }

    /// Whole investor capital a prestige would grant right now.
    pub fn preview_gain(&self, money: f64, max_money_earned: f64) -> u64 {
        if !(money >= self.first_target(max_money_earned) - GAIN_EPS) {
            return 0;
        }
        let raw = self.raw_gain(self.percent_over_gate(money, max_money_earned));
        let whole = (raw + GAIN_EPS).floor() as u64;
        whole.max(1)
    }

    /// Money at which [`preview_gain`](Self::preview_gain) next increments.
    ///
    /// Returns the first gate while nothing is earned yet, and infinity once
    /// the next whole point would reach the soft cap.
    pub fn next_target_money(&self, money: f64, max_money_earned: f64) -> f64 {
        let first = self.first_target(max_money_earned);
        let current = self.preview_gain(money, max_money_earned);
        if current == 0 {
            return first;
        }
        let next = current as f64 + 1.0;
        if next >= self.soft_cap - GAIN_EPS {
            return f64::INFINITY;
        }
        let norm = first.max(max_money_earned);
        first + self.percent_needed_for(next) * norm
    }

    pub fn phase(&self, money: f64, max_money_earned: f64) -> RunPhase {
        if self.preview_gain(money, max_money_earned) > 0 {
            RunPhase::Eligible
        } else {
            RunPhase::Active
        }
    }

    pub fn preview(&self, state: &EconomyState) -> PrestigePreview {
        let (money, record) = (state.money(), state.max_money_earned());
        let gain = self.preview_gain(money, record);
        PrestigePreview {
            phase: if gain > 0 {
                RunPhase::Eligible
            } else {
                RunPhase::Active
            },
            gain,
            first_target: self.first_target(record),
            next_target: self.next_target_money(money, record),
            percent_over_gate: self.percent_over_gate(money, record),
        }
    }

    /// Consume the run: bank the preview gain, raise the money record and
    /// reset the run. An ineligible run is left untouched and yields 0.
    pub fn do_prestige(&self, state: &mut EconomyState) -> u64 {
        let gained = self.preview_gain(state.money(), state.max_money_earned());
        if gained == 0 {
            debug!(money = state.money(), "prestige requested before the gate");
            return 0;
        }
        let money = state.money();
        state.record_prestige(gained);
        state.reset_run_keep_prestige();
        info!(gained, money, capital = state.investor_capital(), "prestige");
        gained
    }
}
