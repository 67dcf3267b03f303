//! Human-readable number formatting for currency displays.

use serde::{Deserialize, Serialize};

/// Display mode for large numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// Suffix notation: 1.5K, 2M, 3.1B, 4T.
    #[default]
    Short,
    /// Scientific notation above 999: 1.23e4.
    Scientific,
}

const SUFFIXES: [(f64, &str); 4] = [
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
];

/// Format `n` according to `mode`.
pub fn format_number(n: f64, mode: NumberFormat) -> String {
    match mode {
        NumberFormat::Short => format_short(n),
        NumberFormat::Scientific => format_scientific(n),
    }
}

/// Whole numbers below 1000, otherwise one optional decimal plus a suffix.
pub fn format_short(n: f64) -> String {
    if !n.is_finite() {
        return format!("{n}");
    }
    let abs = n.abs();
    if abs < 1e3 {
        return format!("{n:.0}");
    }
    for (scale, suffix) in SUFFIXES {
        if abs >= scale {
            return format!("{}{}", trim_decimals(n / scale, 1), suffix);
        }
    }
    format!("{n:.0}")
}

pub fn format_scientific(n: f64) -> String {
    if n.is_finite() && n.abs() < 1e3 {
        return format!("{n:.0}");
    }
    format!("{n:.2e}")
}

/// Percent with up to two decimals and the same suffixes as [`format_short`].
pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        return "0%".to_string();
    }
    if value < 1e3 {
        return format!("{value:.0}%");
    }
    for (scale, suffix) in SUFFIXES {
        if value >= scale {
            return format!("{}{}%", trim_decimals(value / scale, 2), suffix);
        }
    }
    format!("{value:.0}%")
}

// "0.#"-style: fixed decimals with trailing zeros (and dot) removed.
fn trim_decimals(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
