#![deny(warnings)]

//! Economic models: upgrade pricing and the prestige curve.
//!
//! This crate provides closed-form utilities for:
//! - Single and bulk upgrade prices for none/linear/geometric cost curves
//! - The largest purchase count a money budget covers ("buy max")
//! - Investor capital gained from a run and the money needed for the next point

pub mod cost;
pub mod prestige;

pub use cost::{cost_at, current_cost, max_affordable, total_cost_for};
pub use prestige::{PrestigeCurve, PrestigePreview, RunPhase};

use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// The soft cap must be finite and exceed the gain targeted at p = 1.
    #[error("invalid soft cap: {0}")]
    InvalidSoftCap(f64),
    /// The first-milestone chunk must be finite and > 0.
    #[error("invalid base chunk: {0}")]
    InvalidBaseChunk(f64),
}

/// Smallest denominator used when dividing by curve parameters.
pub(crate) const EPS: f64 = 1e-9;
