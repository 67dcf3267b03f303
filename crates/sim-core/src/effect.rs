use crate::{EconomyState, ValidationError};

/// What one purchase of an upgrade does to the economy.
///
/// Applying `n` purchases at once is equivalent to applying one purchase
/// `n` times: flat bonuses scale linearly, multipliers compound as
/// `(1 + amount)^n`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Adds to the flat click bonus.
    ClickFlat(u64),
    /// Multiplies click gain by `1 + amount` per purchase.
    ClickMult(f64),
    /// Adds to base passive income per second.
    IncomeFlat(f64),
    /// Multiplies passive income by `1 + amount` per purchase.
    IncomeMult(f64),
}

impl Effect {
    /// Build an effect from its catalog `type` string and `amount`.
    ///
    /// Kind matching is case-insensitive. Amounts must be finite and
    /// non-negative; flat click bonuses must be whole numbers.
    pub fn parse(kind: &str, amount: f64) -> Result<Self, ValidationError> {
        let kind_lc = kind.trim().to_ascii_lowercase();
        let known = matches!(
            kind_lc.as_str(),
            "click_flat" | "click_mult" | "income_flat" | "income_mult"
        );
        if !known {
            return Err(ValidationError::UnknownEffectKind(kind.to_string()));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount {
                kind: kind_lc,
                amount,
            });
        }
        match kind_lc.as_str() {
            "click_flat" => {
                if amount.fract() != 0.0 || amount >= u64::MAX as f64 {
                    return Err(ValidationError::InvalidAmount {
                        kind: kind_lc,
                        amount,
                    });
                }
                Ok(Effect::ClickFlat(amount as u64))
            }
            "click_mult" => Ok(Effect::ClickMult(amount)),
            "income_flat" => Ok(Effect::IncomeFlat(amount)),
            _ => Ok(Effect::IncomeMult(amount)),
        }
    }

    /// Catalog `type` string for this effect.
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::ClickFlat(_) => "click_flat",
            Effect::ClickMult(_) => "click_mult",
            Effect::IncomeFlat(_) => "income_flat",
            Effect::IncomeMult(_) => "income_mult",
        }
    }

    pub fn amount(&self) -> f64 {
        match *self {
            Effect::ClickFlat(a) => a as f64,
            Effect::ClickMult(a) | Effect::IncomeFlat(a) | Effect::IncomeMult(a) => a,
        }
    }

    /// Apply `count` purchases worth of this effect to `state`.
    pub fn apply(&self, state: &mut EconomyState, count: u32) {
        if count == 0 {
            return;
        }
        match *self {
            Effect::ClickFlat(a) => state.add_click_flat(a.saturating_mul(u64::from(count))),
            Effect::ClickMult(a) => state.multiply_click((1.0 + a).powf(f64::from(count))),
            Effect::IncomeFlat(a) => state.add_base_income(a * f64::from(count)),
            Effect::IncomeMult(a) => state.multiply_income((1.0 + a).powf(f64::from(count))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_known_kinds_case_insensitive() {
        assert_eq!(Effect::parse("click_flat", 3.0).unwrap(), Effect::ClickFlat(3));
        assert_eq!(Effect::parse("Click_Mult", 0.5).unwrap(), Effect::ClickMult(0.5));
        assert_eq!(Effect::parse("INCOME_FLAT", 1.25).unwrap(), Effect::IncomeFlat(1.25));
        assert_eq!(Effect::parse("income_mult", 0.1).unwrap(), Effect::IncomeMult(0.1));
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(
            Effect::parse("click_power", 1.0),
            Err(ValidationError::UnknownEffectKind("click_power".to_string()))
        );
    }

    #[test]
    fn parse_rejects_bad_amounts() {
        assert!(Effect::parse("click_flat", 1.5).is_err());
        assert!(Effect::parse("income_mult", -0.1).is_err());
        assert!(Effect::parse("income_flat", f64::INFINITY).is_err());
        // 2^64 rounds to u64::MAX as f64 but does not fit in a u64
        assert!(Effect::parse("click_flat", 18_446_744_073_709_551_616.0).is_err());
        assert!(Effect::parse("click_flat", 9_007_199_254_740_992.0).is_ok());
    }

    #[test]
    fn kind_roundtrips_through_parse() {
        for e in [
            Effect::ClickFlat(2),
            Effect::ClickMult(0.25),
            Effect::IncomeFlat(4.0),
            Effect::IncomeMult(0.5),
        ] {
            assert_eq!(Effect::parse(e.kind(), e.amount()).unwrap(), e);
        }
    }

    #[test]
    fn zero_count_is_noop() {
        let mut s = EconomyState::new();
        Effect::ClickMult(1.0).apply(&mut s, 0);
        assert_eq!(s, EconomyState::new());
    }

    proptest! {
        #[test]
        fn batched_apply_matches_sequential(amount in 0.0f64..2.0, count in 0u32..40, flat in 0u64..50) {
            for effect in [Effect::ClickFlat(flat), Effect::ClickMult(amount), Effect::IncomeFlat(amount), Effect::IncomeMult(amount)] {
                let mut batched = EconomyState::new();
                effect.apply(&mut batched, count);
                let mut seq = EconomyState::new();
                for _ in 0..count {
                    effect.apply(&mut seq, 1);
                }
                prop_assert_eq!(batched.click_flat(), seq.click_flat());
                let rel = |a: f64, b: f64| (a - b).abs() <= 1e-9 * a.abs().max(1.0);
                prop_assert!(rel(batched.click_mult(), seq.click_mult()));
                prop_assert!(rel(batched.income_mult(), seq.income_mult()));
                prop_assert!(rel(batched.base_income_per_sec(), seq.base_income_per_sec()));
            }
        }
    }
}
