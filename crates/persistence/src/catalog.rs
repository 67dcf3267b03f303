use crate::PersistenceError;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_catalog, validate_entry, CostCurve, Effect, Gate, Requirement, UpgradeEntry, UpgradeId,
    ValidationError, DEFAULT_GROWTH,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One upgrade as written in the catalog definition file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    /// -1 (or any negative value) means unlimited.
    #[serde(default = "unlimited")]
    pub limit: i64,
    #[serde(default = "default_cost_curve")]
    pub cost_curve: String,
    #[serde(default = "default_growth")]
    pub growth: f64,
    #[serde(default)]
    pub step: f64,
    #[serde(default)]
    pub requires_id: Option<String>,
    #[serde(default)]
    pub requires_min: Option<u32>,
    #[serde(default)]
    pub requires: Option<String>,
}

fn unlimited() -> i64 {
    -1
}

fn default_cost_curve() -> String {
    "geometric".to_string()
}

fn default_growth() -> f64 {
    DEFAULT_GROWTH
}

impl CatalogRecord {
    /// Convert to a validated entry with zero purchases.
    pub fn into_entry(self) -> Result<UpgradeEntry, ValidationError> {
        let effect = Effect::parse(&self.kind, self.amount)?;
        let cost_curve = CostCurve::parse(&self.cost_curve, self.growth, self.step)?;
        let gate = Gate::parse(self.requires.as_deref(), self.requires_min)?;
        let requirement = match (self.requires_id, gate) {
            (Some(id), Some(gate)) if !id.trim().is_empty() => Some(Requirement {
                id: UpgradeId(id.trim().to_string()),
                gate,
            }),
            _ => None,
        };
        let limit = if self.limit < 0 {
            None
        } else {
            Some(u32::try_from(self.limit).unwrap_or(u32::MAX))
        };
        let mut entry = UpgradeEntry::new(self.id.trim(), self.name, self.cost, cost_curve, effect)
            .with_description(self.description);
        entry.limit = limit;
        entry.requirement = requirement;
        validate_entry(&entry)?;
        Ok(entry)
    }
}

/// Parse a catalog definition (a JSON array of records).
///
/// Records that are mistyped, fail validation, or repeat an earlier id are
/// logged and skipped so one bad record cannot take down the whole catalog.
/// Only text that is not a JSON array is an error.
pub fn parse_catalog(text: &str) -> Result<Vec<UpgradeEntry>, PersistenceError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut entries = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let record = match CatalogRecord::deserialize(&value) {
            Ok(record) => record,
            Err(e) => {
                let id = value.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                warn!(index, %id, error = %e, "malformed upgrade record skipped");
                continue;
            }
        };
        let id = record.id.clone();
        match record.into_entry() {
            Ok(entry) => {
                if !seen.insert(entry.id.0.clone()) {
                    warn!(id = %entry.id, "duplicate upgrade id skipped");
                    continue;
                }
                entries.push(entry);
            }
            Err(e) => warn!(%id, error = %e, "invalid upgrade skipped"),
        }
    }
    validate_catalog(&entries)?;
    Ok(entries)
}

/// Load and parse a catalog definition file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<UpgradeEntry>, PersistenceError> {
    let text = fs::read_to_string(path.as_ref())?;
    let entries = parse_catalog(&text)?;
    info!(path = %path.as_ref().display(), count = entries.len(), "catalog loaded");
    Ok(entries)
}
