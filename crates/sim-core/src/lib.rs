#![deny(warnings)]

//! Core economy model for the clicker-startup simulation.
//!
//! This crate defines the player's [`EconomyState`], the upgrade catalog
//! entries that mutate it, and validation helpers that guarantee catalog
//! data is well-formed before it ever reaches the simulation.

mod effect;
pub mod format;
mod state;
mod upgrade;

pub use effect::Effect;
pub use state::{EconomyState, FRAC_PER_IC, PCT_PER_IC};
pub use upgrade::{
    validate_catalog, validate_entry, CostCurve, Gate, Requirement, UpgradeEntry, UpgradeId,
    ValidationError, DEFAULT_GROWTH,
};
