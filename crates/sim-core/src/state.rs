use crate::UpgradeEntry;
use tracing::debug;

/// Global bonus granted per unit of investor capital, as a fraction.
pub const FRAC_PER_IC: f64 = 0.05;
/// Global bonus granted per unit of investor capital, in percentage points.
pub const PCT_PER_IC: f64 = 5.0;

/// Currency balances, base rates and bonuses for one player.
///
/// Every mutator funnels through a clamp so that currencies and additive
/// bonuses never go negative and multipliers never drop below 1.0.
#[derive(Clone, Debug, PartialEq)]
pub struct EconomyState {
    money: f64,
    lines_of_code: f64,
    base_click_power: u64,
    base_income_per_sec: f64,
    click_flat: u64,
    income_flat: f64,
    click_mult: f64,
    income_mult: f64,
    max_money_earned: f64,
    investor_capital: f64,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self {
            money: 0.0,
            lines_of_code: 0.0,
            base_click_power: 1,
            base_income_per_sec: 0.0,
            click_flat: 0,
            income_flat: 0.0,
            click_mult: 1.0,
            income_mult: 1.0,
            max_money_earned: 0.0,
            investor_capital: 0.0,
        }
    }
}

impl EconomyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn lines_of_code(&self) -> f64 {
        self.lines_of_code
    }

    pub fn base_click_power(&self) -> u64 {
        self.base_click_power
    }

    pub fn base_income_per_sec(&self) -> f64 {
        self.base_income_per_sec
    }

    pub fn click_flat(&self) -> u64 {
        self.click_flat
    }

    pub fn income_flat(&self) -> f64 {
        self.income_flat
    }

    pub fn click_mult(&self) -> f64 {
        self.click_mult
    }

    pub fn income_mult(&self) -> f64 {
        self.income_mult
    }

    /// Highest money balance ever recorded at a prestige.
    pub fn max_money_earned(&self) -> f64 {
        self.max_money_earned
    }

    /// Permanent prestige currency.
    pub fn investor_capital(&self) -> f64 {
        self.investor_capital
    }

    pub fn global_bonus_fraction(&self) -> f64 {
        self.investor_capital * FRAC_PER_IC
    }

    pub fn global_bonus_percent_points(&self) -> f64 {
        self.investor_capital * PCT_PER_IC
    }

    /// Multiplier applied to every income source: `1 + IC * 0.05`.
    pub fn global_mult(&self) -> f64 {
        1.0 + self.global_bonus_fraction()
    }

    /// Money gained by a single manual click.
    pub fn click_gain_per_press(&self) -> f64 {
        self.base_click_power.saturating_add(self.click_flat) as f64 * self.click_mult * self.global_mult()
    }

    /// Passive money gained per second.
    pub fn current_income_per_sec(&self) -> f64 {
        (self.base_income_per_sec + self.income_flat) * self.income_mult * self.global_mult()
    }

    pub fn add_on_click(&mut self) {
        self.money += self.click_gain_per_press();
        self.lines_of_code += 1.0;
        self.clamp_invariants();
    }

    /// Credit passive income for `seconds` of elapsed wall-clock time.
    ///
    /// Negative or non-finite durations credit nothing.
    pub fn apply_passive_tick(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.money += self.current_income_per_sec() * seconds;
        }
        self.clamp_invariants();
    }

    /// Spend `amount` if the balance covers it. Leaves the state untouched
    /// and returns `false` otherwise.
    pub fn try_spend(&mut self, amount: f64) -> bool {
        if !(amount >= 0.0) || self.money < amount {
            return false;
        }
        self.money -= amount;
        self.clamp_invariants();
        true
    }

    pub fn add_click_flat(&mut self, amount: u64) {
        self.click_flat = self.click_flat.saturating_add(amount);
        self.clamp_invariants();
    }

    pub fn multiply_click(&mut self, factor: f64) {
        self.click_mult *= factor;
        self.clamp_invariants();
    }

    pub fn add_base_income(&mut self, amount: f64) {
        self.base_income_per_sec += amount;
        self.clamp_invariants();
    }

    pub fn add_income_flat(&mut self, amount: f64) {
        self.income_flat += amount;
        self.clamp_invariants();
    }

    pub fn multiply_income(&mut self, factor: f64) {
        self.income_mult *= factor;
        self.clamp_invariants();
    }

    pub fn set_money(&mut self, amount: f64) {
        self.money = amount;
        self.clamp_invariants();
    }

    pub fn set_lines_of_code(&mut self, amount: f64) {
        self.lines_of_code = amount;
        self.clamp_invariants();
    }

    pub fn set_investor_capital(&mut self, amount: f64) {
        self.investor_capital = amount;
        self.clamp_invariants();
    }

    pub fn set_max_money_earned(&mut self, amount: f64) {
        self.max_money_earned = amount;
        self.clamp_invariants();
    }

    /// Bank `gained` investor capital and raise the money record to the
    /// current balance. Does not reset the run.
    pub fn record_prestige(&mut self, gained: u64) {
        self.investor_capital += gained as f64;
        if self.money > self.max_money_earned {
            self.max_money_earned = self.money;
        }
        self.clamp_invariants();
    }

    /// Reset currencies and non-prestige stats; keeps investor capital and
    /// the money record.
    pub fn reset_run_keep_prestige(&mut self) {
        self.money = 0.0;
        self.lines_of_code = 0.0;
        self.reset_non_prestige_stats();
        self.clamp_invariants();
    }

    /// Full reset, including investor capital and the money record.
    pub fn reset_all(&mut self) {
        self.reset_run_keep_prestige();
        self.investor_capital = 0.0;
        self.max_money_earned = 0.0;
    }

    /// Recompute stats as a pure function of purchase counts.
    ///
    /// Currencies and prestige fields are left untouched.
    pub fn rebuild_stats_from<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = &'a UpgradeEntry>,
    {
        self.reset_non_prestige_stats();
        let mut applied = 0usize;
        for entry in entries {
            entry.effect.apply(self, entry.purchases());
            applied += 1;
        }
        debug!(entries = applied, "rebuilt stats from purchase counts");
    }

    fn reset_non_prestige_stats(&mut self) {
        self.base_click_power = 1;
        self.base_income_per_sec = 0.0;
        self.click_flat = 0;
        self.income_flat = 0.0;
        self.click_mult = 1.0;
        self.income_mult = 1.0;
    }

    fn clamp_invariants(&mut self) {
        self.money = non_negative(self.money);
        self.lines_of_code = non_negative(self.lines_of_code);
        self.base_income_per_sec = non_negative(self.base_income_per_sec);
        self.income_flat = non_negative(self.income_flat);
        self.max_money_earned = non_negative(self.max_money_earned);
        self.investor_capital = non_negative(self.investor_capital);
        self.base_click_power = self.base_click_power.max(1);
        self.click_mult = at_least_one(self.click_mult);
        self.income_mult = at_least_one(self.income_mult);
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_nan() || v < 0.0 {
        0.0
    } else {
        v
    }
}

fn at_least_one(v: f64) -> f64 {
    if v.is_nan() || v < 1.0 {
        1.0
    } else {
        v
    }
}
