use crate::Effect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Default geometric cost ratio when a catalog record omits `growth`.
pub const DEFAULT_GROWTH: f64 = 1.15;

/// Unique identifier for an upgrade, e.g. "coffee_machine".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpgradeId(pub String);

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(s: &str) -> Self {
        UpgradeId(s.to_string())
    }
}

/// How the price of an upgrade evolves with the number already bought.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostCurve {
    /// One-off purchase at a constant price.
    None,
    /// Price grows by `step` per purchase.
    Linear { step: f64 },
    /// Price grows by a factor of `growth` per purchase.
    Geometric { growth: f64 },
}

impl CostCurve {
    /// Build a curve from its catalog name (case-insensitive).
    pub fn parse(name: &str, growth: f64, step: f64) -> Result<Self, ValidationError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CostCurve::None),
            "linear" => Ok(CostCurve::Linear { step }),
            "geometric" => Ok(CostCurve::Geometric { growth }),
            _ => Err(ValidationError::UnknownCostCurve(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CostCurve::None => "none",
            CostCurve::Linear { .. } => "linear",
            CostCurve::Geometric { .. } => "geometric",
        }
    }
}

/// Condition the prerequisite must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Prerequisite is limited and fully purchased.
    Maxed,
    /// Prerequisite has at least this many purchases.
    AtLeast(u32),
}

impl Gate {
    /// Resolve the catalog `requires`/`requires_min` pair. `requires`
    /// takes precedence; neither set means no gate.
    pub fn parse(requires: Option<&str>, requires_min: Option<u32>) -> Result<Option<Self>, ValidationError> {
        if let Some(r) = requires.map(str::trim).filter(|r| !r.is_empty()) {
            return match r.to_ascii_lowercase().as_str() {
                "maxed" => Ok(Some(Gate::Maxed)),
                "none" => Ok(requires_min.map(Gate::AtLeast)),
                _ => Err(ValidationError::UnknownRequirement(r.to_string())),
            };
        }
        Ok(requires_min.map(Gate::AtLeast))
    }
}

/// Visibility gate referencing another entry by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub id: UpgradeId,
    pub gate: Gate,
}

/// One purchasable upgrade with its cost curve and purchase count.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeEntry {
    pub id: UpgradeId,
    pub name: String,
    pub description: String,
    /// Price of the first purchase.
    pub base_cost: f64,
    pub cost_curve: CostCurve,
    pub effect: Effect,
    /// Maximum purchase count; `None` means unlimited.
    pub limit: Option<u32>,
    pub requirement: Option<Requirement>,
    purchases: u32,
}

impl UpgradeEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_cost: f64,
        cost_curve: CostCurve,
        effect: Effect,
    ) -> Self {
        Self {
            id: UpgradeId(id.into()),
            name: name.into(),
            description: String::new(),
            base_cost,
            cost_curve,
            effect,
            limit: None,
            requirement: None,
            purchases: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_requirement(mut self, id: impl Into<String>, gate: Gate) -> Self {
        self.requirement = Some(Requirement {
            id: UpgradeId(id.into()),
            gate,
        });
        self
    }

    pub fn purchases(&self) -> u32 {
        self.purchases
    }

    /// Limit actually enforced. One-off (`CostCurve::None`) entries can be
    /// bought at most once regardless of the declared limit.
    pub fn effective_limit(&self) -> Option<u32> {
        match self.cost_curve {
            CostCurve::None => Some(self.limit.map_or(1, |l| l.min(1))),
            _ => self.limit,
        }
    }

    pub fn is_limited(&self) -> bool {
        self.effective_limit().is_some()
    }

    /// Purchases left before the limit; `None` when unlimited.
    pub fn remaining_purchases(&self) -> Option<u32> {
        self.effective_limit()
            .map(|l| l.saturating_sub(self.purchases))
    }

    pub fn is_maxed(&self) -> bool {
        self.remaining_purchases() == Some(0)
    }

    /// Record `count` new purchases, never exceeding the limit.
    pub fn add_purchases(&mut self, count: u32) {
        self.set_purchases(self.purchases.saturating_add(count));
    }

    /// Overwrite the purchase count (e.g. from a save), clamped to the limit.
    pub fn set_purchases(&mut self, count: u32) {
        self.purchases = match self.effective_limit() {
            Some(l) => count.min(l),
            None => count,
        };
    }
}

/// Validation errors for catalog data.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("upgrade id must not be empty")]
    EmptyId,
    #[error("duplicate upgrade id: {0}")]
    DuplicateId(String),
    #[error("unknown effect kind: {0}")]
    UnknownEffectKind(String),
    #[error("invalid amount {amount} for effect {kind}")]
    InvalidAmount { kind: String, amount: f64 },
    #[error("unknown cost curve: {0}")]
    UnknownCostCurve(String),
    #[error("unknown requirement kind: {0}")]
    UnknownRequirement(String),
    /// Costs must be finite and non-negative.
    #[error("invalid base cost {0}")]
    InvalidCost(f64),
    /// Geometric growth must be finite and >= 1.
    #[error("invalid geometric growth {0}")]
    InvalidGrowth(f64),
    /// Linear step must be finite and non-negative.
    #[error("invalid linear step {0}")]
    InvalidStep(f64),
}

/// Validate a single catalog entry.
pub fn validate_entry(entry: &UpgradeEntry) -> Result<(), ValidationError> {
    if entry.id.0.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if !entry.base_cost.is_finite() || entry.base_cost < 0.0 {
        return Err(ValidationError::InvalidCost(entry.base_cost));
    }
    match entry.cost_curve {
        CostCurve::None => {}
        CostCurve::Linear { step } => {
            if !step.is_finite() || step < 0.0 {
                return Err(ValidationError::InvalidStep(step));
            }
        }
        CostCurve::Geometric { growth } => {
            if !growth.is_finite() || growth < 1.0 {
                return Err(ValidationError::InvalidGrowth(growth));
            }
        }
    }
    let amount = entry.effect.amount();
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount {
            kind: entry.effect.kind().to_string(),
            amount,
        });
    }
    Ok(())
}

/// Validate every entry and check ids are unique.
///
/// Requirements naming an id that is not in the catalog are allowed; such
/// gates never restrict visibility.
pub fn validate_catalog(entries: &[UpgradeEntry]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&UpgradeId> = BTreeSet::new();
    for e in entries {
        validate_entry(e)?;
        if !ids.insert(&e.id) {
            return Err(ValidationError::DuplicateId(e.id.0.clone()));
        }
    }
    Ok(())
}
