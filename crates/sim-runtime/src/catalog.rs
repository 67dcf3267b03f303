use sim_core::{validate_catalog, EconomyState, Gate, UpgradeEntry, ValidationError};
use sim_econ::{current_cost, max_affordable, total_cost_for};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a purchase did not happen. No state changes in any of these cases.
#[derive(Debug, Error, PartialEq)]
pub enum BuyError {
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),
    #[error("purchase limit reached for {0}")]
    LimitReached(String),
    #[error("requested quantity is zero")]
    NothingRequested,
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },
}

/// How many purchases a buy request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    /// Exactly this many, clamped to the remaining purchases.
    Count(u32),
    /// As many as the current balance covers.
    Max,
}

/// Display row for one upgrade.
#[derive(Clone, Debug, PartialEq)]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    pub purchases: u32,
    pub remaining: Option<u32>,
    pub maxed: bool,
    /// Price of the next single purchase.
    pub current_cost: f64,
    /// Quantity the request resolves to against the current balance.
    pub quantity: u32,
    pub total_cost: f64,
    pub affordable: bool,
}

/// Upgrade entries plus the transaction logic that buys them.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<UpgradeEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<UpgradeEntry>) -> Result<Self, ValidationError> {
        validate_catalog(&entries)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[UpgradeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UpgradeEntry> {
        self.entries.iter().find(|e| e.id.0 == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id.0 == id)
    }

    /// Whether `entry` should be shown. Gates that reference an id missing
    /// from the catalog never hide anything.
    pub fn is_unlocked(&self, entry: &UpgradeEntry) -> bool {
        let Some(req) = &entry.requirement else {
            return true;
        };
        let Some(prereq) = self.get(&req.id.0) else {
            return true;
        };
        match req.gate {
            Gate::Maxed => prereq.is_limited() && prereq.is_maxed(),
            Gate::AtLeast(min) => prereq.purchases() >= min,
        }
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &UpgradeEntry> + '_ {
        self.entries.iter().filter(move |e| self.is_unlocked(e))
    }

    /// Resolve a request into a concrete count without buying anything.
    pub fn resolve_quantity(entry: &UpgradeEntry, money: f64, quantity: Quantity) -> u32 {
        match quantity {
            Quantity::Max => max_affordable(entry, money),
            Quantity::Count(n) => match entry.remaining_purchases() {
                Some(r) => n.min(r),
                None => n,
            },
        }
    }

    /// Buy `quantity` of upgrade `id`, returning how many were bought.
    ///
    /// The spend, the purchase count and the effect are applied together or
    /// not at all.
    pub fn try_buy(
        &mut self,
        id: &str,
        state: &mut EconomyState,
        quantity: Quantity,
    ) -> Result<u32, BuyError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| BuyError::UnknownUpgrade(id.to_string()))?;
        let entry = &self.entries[idx];
        if entry.is_maxed() {
            return Err(BuyError::LimitReached(id.to_string()));
        }
        let count = Self::resolve_quantity(entry, state.money(), quantity);
        if count == 0 {
            return Err(match quantity {
                Quantity::Count(_) => BuyError::NothingRequested,
                Quantity::Max => BuyError::InsufficientFunds {
                    needed: current_cost(entry),
                    available: state.money(),
                },
            });
        }
        let total = total_cost_for(entry, count);
        if !state.try_spend(total) {
            debug!(id, count, total, money = state.money(), "purchase declined");
            return Err(BuyError::InsufficientFunds {
                needed: total,
                available: state.money(),
            });
        }
        let entry = &mut self.entries[idx];
        entry.add_purchases(count);
        entry.effect.apply(state, count);
        info!(id, count, total, purchases = entry.purchases(), "upgrade bought");
        Ok(count)
    }

    /// Recompute `state`'s stats from the current purchase counts.
    pub fn reapply_all(&self, state: &mut EconomyState) {
        state.rebuild_stats_from(&self.entries);
    }

    pub fn reset_purchases(&mut self) {
        for e in &mut self.entries {
            e.set_purchases(0);
        }
    }

    pub fn purchase_counts(&self) -> BTreeMap<String, i64> {
        self.entries
            .iter()
            .map(|e| (e.id.0.clone(), i64::from(e.purchases())))
            .collect()
    }

    /// Overwrite purchase counts from persisted data. Entries missing from
    /// `counts` go to zero; negative counts clamp to zero; unknown ids are
    /// ignored.
    pub fn apply_counts(&mut self, counts: &BTreeMap<String, i64>) {
        for e in &mut self.entries {
            let raw = counts.get(&e.id.0).copied().unwrap_or(0);
            let count = u32::try_from(raw.max(0)).unwrap_or(u32::MAX);
            e.set_purchases(count);
        }
        for id in counts.keys() {
            if self.get(id).is_none() {
                warn!(%id, "save references an unknown upgrade");
            }
        }
    }

    pub fn offer(&self, entry: &UpgradeEntry, state: &EconomyState, quantity: Quantity) -> Offer {
        let resolved = Self::resolve_quantity(entry, state.money(), quantity);
        let total_cost = total_cost_for(entry, resolved.max(1));
        Offer {
            id: entry.id.0.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            unlocked: self.is_unlocked(entry),
            purchases: entry.purchases(),
            remaining: entry.remaining_purchases(),
            maxed: entry.is_maxed(),
            current_cost: current_cost(entry),
            quantity: resolved,
            total_cost,
            affordable: resolved > 0 && !entry.is_maxed() && state.money() >= total_cost,
        }
    }

    /// One display row per entry, in catalog order.
    pub fn offers(&self, state: &EconomyState, quantity: Quantity) -> Vec<Offer> {
        self.entries
            .iter()
            .map(|e| self.offer(e, state, quantity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::{CostCurve, Effect};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            UpgradeEntry::new(
                "keyboard",
                "Keyboard",
                10.0,
                CostCurve::Geometric { growth: 1.15 },
                Effect::ClickFlat(1),
            ),
            UpgradeEntry::new(
                "coffee",
                "Coffee",
                100.0,
                CostCurve::Linear { step: 50.0 },
                Effect::ClickMult(0.1),
            )
            .with_limit(3)
            .with_requirement("keyboard", Gate::AtLeast(2)),
            UpgradeEntry::new("monitor", "Monitor", 500.0, CostCurve::None, Effect::IncomeMult(1.0))
                .with_requirement("coffee", Gate::Maxed),
            UpgradeEntry::new(
                "intern",
                "Intern",
                20.0,
                CostCurve::Geometric { growth: 1.15 },
                Effect::IncomeFlat(0.5),
            )
            .with_requirement("keyboard", Gate::Maxed),
            UpgradeEntry::new("ghost", "Ghost", 1.0, CostCurve::None, Effect::ClickFlat(1))
                .with_requirement("does_not_exist", Gate::Maxed),
        ])
        .unwrap()
    }

    fn funded(money: f64) -> EconomyState {
        let mut s = EconomyState::new();
        s.set_money(money);
        s
    }

    #[test]
    fn buy_single_spends_and_applies() {
        let mut c = catalog();
        let mut s = funded(100.0);
        assert_eq!(c.try_buy("keyboard", &mut s, Quantity::Count(1)), Ok(1));
        assert_eq!(s.money(), 90.0);
        assert_eq!(s.click_flat(), 1);
        assert_eq!(c.get("keyboard").unwrap().purchases(), 1);
    }

    #[test]
    fn buy_max_uses_closed_form() {
        let mut c = catalog();
        let mut s = funded(100.0);
        assert_eq!(c.try_buy("keyboard", &mut s, Quantity::Max), Ok(6));
        assert!((s.money() - (100.0 - 87.537_384_375)).abs() < 1e-6);
        assert_eq!(s.click_flat(), 6);
    }

    #[test]
    fn failed_buy_changes_nothing() {
        let mut c = catalog();
        let mut s = funded(5.0);
        s.add_base_income(1.0);
        let before_state = s.clone();
        let before_counts = c.purchase_counts();
        assert!(matches!(
            c.try_buy("keyboard", &mut s, Quantity::Count(1)),
            Err(BuyError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            c.try_buy("keyboard", &mut s, Quantity::Max),
            Err(BuyError::InsufficientFunds { .. })
        ));
        assert_eq!(c.try_buy("keyboard", &mut s, Quantity::Count(0)), Err(BuyError::NothingRequested));
        assert_eq!(
            c.try_buy("nope", &mut s, Quantity::Count(1)),
            Err(BuyError::UnknownUpgrade("nope".into()))
        );
        assert_eq!(s, before_state);
        assert_eq!(c.purchase_counts(), before_counts);
    }

    #[test]
    fn limits_are_enforced() {
        let mut c = catalog();
        let mut s = funded(1e9);
        assert_eq!(c.try_buy("coffee", &mut s, Quantity::Count(10)), Ok(3));
        assert_eq!(c.get("coffee").unwrap().purchases(), 3);
        let money = s.money();
        assert_eq!(
            c.try_buy("coffee", &mut s, Quantity::Count(1)),
            Err(BuyError::LimitReached("coffee".into()))
        );
        assert_eq!(s.money(), money);
        assert_eq!(c.try_buy("monitor", &mut s, Quantity::Max), Ok(1));
        assert!(c.try_buy("monitor", &mut s, Quantity::Max).is_err());
    }

    #[test]
    fn unlock_rules() {
        let mut c = catalog();
        let mut s = funded(1e9);
        let locked = |c: &Catalog, id: &str| !c.is_unlocked(c.get(id).unwrap());
        assert!(locked(&c, "coffee"));
        assert!(locked(&c, "monitor"));
        // unlimited prerequisites never count as maxed
        assert!(locked(&c, "intern"));
        // dangling requirement never hides an entry
        assert!(!locked(&c, "ghost"));

        c.try_buy("keyboard", &mut s, Quantity::Count(2)).unwrap();
        assert!(!locked(&c, "coffee"));
        c.try_buy("keyboard", &mut s, Quantity::Count(5)).unwrap();
        assert!(locked(&c, "intern"));
        c.try_buy("coffee", &mut s, Quantity::Max).unwrap();
        assert!(!locked(&c, "monitor"));
        assert_eq!(c.unlocked().count(), 4);
    }

    #[test]
    fn counts_roundtrip_and_rebuild() {
        let mut c = catalog();
        let mut s = funded(1e9);
        c.try_buy("keyboard", &mut s, Quantity::Count(4)).unwrap();
        c.try_buy("coffee", &mut s, Quantity::Count(2)).unwrap();
        let counts = c.purchase_counts();
        let stats_after_buys = s.clone();

        let mut restored = catalog();
        let mut counts_with_noise = counts.clone();
        counts_with_noise.insert("unknown".into(), 7);
        counts_with_noise.insert("intern".into(), -3);
        restored.apply_counts(&counts_with_noise);
        assert_eq!(restored.get("keyboard").unwrap().purchases(), 4);
        assert_eq!(restored.get("intern").unwrap().purchases(), 0);

        let mut s2 = funded(s.money());
        restored.reapply_all(&mut s2);
        assert_eq!(s2.click_flat(), stats_after_buys.click_flat());
        assert!((s2.click_mult() - stats_after_buys.click_mult()).abs() < 1e-12);
    }

    #[test]
    fn buy_max_on_free_upgrade() {
        let mut c = Catalog::new(vec![UpgradeEntry::new(
            "freebie",
            "Freebie",
            0.0,
            CostCurve::Geometric { growth: 1.15 },
            Effect::ClickFlat(1),
        )
        .with_limit(3)])
        .unwrap();
        let mut s = funded(100.0);
        let offer = c.offer(c.get("freebie").unwrap(), &s, Quantity::Max);
        assert_eq!(offer.total_cost, 0.0);
        assert!(offer.affordable);
        assert_eq!(c.try_buy("freebie", &mut s, Quantity::Max), Ok(3));
        assert_eq!(s.money(), 100.0);
        assert_eq!(s.click_flat(), 3);
    }

    #[test]
    fn apply_counts_clamps_to_limit() {
        let mut c = catalog();
        let mut counts = BTreeMap::new();
        counts.insert("coffee".to_string(), 99);
        counts.insert("monitor".to_string(), 4);
        c.apply_counts(&counts);
        assert_eq!(c.get("coffee").unwrap().purchases(), 3);
        assert_eq!(c.get("monitor").unwrap().purchases(), 1);
    }

    #[test]
    fn offers_report_costs() {
        let c = catalog();
        let s = funded(100.0);
        let offers = c.offers(&s, Quantity::Max);
        let kb = offers.iter().find(|o| o.id == "keyboard").unwrap();
        assert_eq!(kb.quantity, 6);
        assert!(kb.affordable);
        assert_eq!(kb.current_cost, 10.0);
        let coffee = offers.iter().find(|o| o.id == "coffee").unwrap();
        assert!(!coffee.unlocked);
        assert!(coffee.affordable);
        assert_eq!(coffee.remaining, Some(3));
        let monitor = c.offer(c.get("monitor").unwrap(), &s, Quantity::Count(1));
        assert!(!monitor.affordable);
        assert_eq!(monitor.total_cost, 500.0);
    }

    proptest! {
        #[test]
        fn buy_never_breaks_invariants(money in 0.0f64..1e7,
                                       ops in proptest::collection::vec((0usize..5, 0u32..20, any::<bool>()), 1..30)) {
            let mut c = catalog();
            let mut s = funded(money);
            let ids: Vec<String> = c.entries().iter().map(|e| e.id.0.clone()).collect();
            for (i, n, max) in ops {
                let before_money = s.money();
                let q = if max { Quantity::Max } else { Quantity::Count(n) };
                match c.try_buy(&ids[i], &mut s, q) {
                    Ok(bought) => prop_assert!(bought > 0 && s.money() <= before_money),
                    Err(_) => prop_assert_eq!(s.money(), before_money),
                }
                prop_assert!(s.money() >= 0.0);
                prop_assert!(s.click_mult() >= 1.0 && s.income_mult() >= 1.0);
                for e in c.entries() {
                    if let Some(limit) = e.effective_limit() {
                        prop_assert!(e.purchases() <= limit);
                    }
                }
            }
        }
    }
}
