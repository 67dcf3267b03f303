//! Upgrade pricing for the three cost curve families.
//!
//! Bulk prices and "buy max" counts are closed-form, so a request against an
//! arbitrarily large balance resolves in constant time.

use crate::EPS;
use sim_core::{CostCurve, UpgradeEntry};

// Float estimates from the closed forms are nudged by at most this many
// steps to land on the exact bracket.
const MAX_CORRECTION_STEPS: usize = 4;

/// Price of the purchase with zero-based `index`.
///
/// `None` is constant, `Linear` adds `step` per index, `Geometric`
/// multiplies by `growth` per index.
pub fn cost_at(entry: &UpgradeEntry, index: u32) -> f64 {
    let p = f64::from(index);
    match entry.cost_curve {
        CostCurve::None => entry.base_cost,
        CostCurve::Linear { step } => entry.base_cost + step * p,
        CostCurve::Geometric { growth } if entry.base_cost > 0.0 => entry.base_cost * growth.powf(p),
        CostCurve::Geometric { .. } => 0.0,
    }
}

/// Price of the next single purchase.
pub fn current_cost(entry: &UpgradeEntry) -> f64 {
    cost_at(entry, entry.purchases())
}

/// Total price of buying `n` more purchases starting at the current count.
///
/// One-off entries cost `base_cost` until bought and nothing afterwards.
pub fn total_cost_for(entry: &UpgradeEntry, n: u32) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = f64::from(entry.purchases());
    let n_f = f64::from(n);
    match entry.cost_curve {
        CostCurve::None => {
            if entry.purchases() == 0 {
                entry.base_cost
            } else {
                0.0
            }
        }
        CostCurve::Linear { step } => {
            let first = entry.base_cost + step * p;
            n_f * first + step * n_f * (n_f - 1.0) / 2.0
        }
        CostCurve::Geometric { growth } => {
            let start = entry.base_cost * growth.powf(p);
            if start <= 0.0 {
                // free entries stay free; avoids 0 * inf below
                0.0
            } else if (growth - 1.0).abs() < EPS {
                start * n_f
            } else {
                start * (growth.powf(n_f) - 1.0) / (growth - 1.0)
            }
        }
    }
}

/// Largest `n` with `total_cost_for(entry, n) <= money`, clamped to the
/// remaining purchases.
pub fn max_affordable(entry: &UpgradeEntry, money: f64) -> u32 {
    let cap = match entry.remaining_purchases() {
        Some(0) => return 0,
        Some(r) => r,
        None => u32::MAX,
    };
    if !(money >= 0.0) {
        return 0;
    }
    let p = f64::from(entry.purchases());
    let estimate = match entry.cost_curve {
        CostCurve::None => {
            if entry.purchases() == 0 && money >= entry.base_cost {
                1.0
            } else {
                0.0
            }
        }
        CostCurve::Linear { step } => {
            let first = entry.base_cost + step * p;
            if step <= 0.0 && first <= 0.0 {
                return cap;
            } else if step <= 0.0 {
                money / first
            } else {
                // (step/2) n^2 + (first - step/2) n - money = 0
                let b = first - step / 2.0;
                let root = (b * b + 2.0 * step * money).max(0.0).sqrt();
                if b > 0.0 {
                    2.0 * money / (b + root)
                } else {
                    (root - b) / step
                }
            }
        }
        CostCurve::Geometric { growth } => {
            let start = entry.base_cost * growth.powf(p);
            if start <= 0.0 {
                return cap;
            } else if (growth - 1.0).abs() < EPS {
                money / start
            } else {
                (money * (growth - 1.0) / start).ln_1p() / (growth - 1.0).ln_1p()
            }
        }
    };
    refine(entry, money, to_count(estimate).min(cap), cap)
}

fn refine(entry: &UpgradeEntry, money: f64, mut n: u32, cap: u32) -> u32 {
    let fits = |k: u32| total_cost_for(entry, k) <= money;
    for _ in 0..MAX_CORRECTION_STEPS {
        if n > 0 && !fits(n) {
            n -= 1;
        } else {
            break;
        }
    }
    for _ in 0..MAX_CORRECTION_STEPS {
        if n < cap && fits(n + 1) {
            n += 1;
        } else {
            break;
        }
    }
    if fits(n) && (n == cap || !fits(n + 1)) {
        return n;
    }
    // The estimate lost precision (tiny start prices, saturated counts).
    // Totals are non-decreasing in n, so bisect for the last fitting count.
    let (mut lo, mut hi) = (0u32, cap);
    while lo < hi {
        let mid = lo + (hi - lo) / 2 + (hi - lo) % 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

fn to_count(x: f64) -> u32 {
    if x.is_nan() || x <= 0.0 {
        0
    } else {
        // saturating float-to-int cast
        x.floor() as u32
    }
}
