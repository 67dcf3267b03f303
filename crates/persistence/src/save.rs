use crate::{write_atomic, PersistenceError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Current save schema. Version 3 added `maxMoneyEarned`.
pub const SCHEMA_VERSION: u32 = 3;

/// Persisted progress for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub schema_version: u32,
    pub last_saved_unix_seconds: i64,
    pub money: f64,
    pub lines_of_code: f64,
    pub investor_capital: f64,
    /// Money record backing the prestige gate; absent before schema 3.
    #[serde(default)]
    pub max_money_earned: f64,
    /// Purchase count per upgrade id. Signed so that hand-edited negative
    /// counts load (and clamp to zero) instead of failing the whole save.
    #[serde(default)]
    pub upgrade_counts: BTreeMap<String, i64>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_saved_unix_seconds: 0,
            money: 0.0,
            lines_of_code: 0.0,
            investor_capital: 0.0,
            max_money_earned: 0.0,
            upgrade_counts: BTreeMap::new(),
        }
    }
}

/// Current wall-clock time as unix seconds.
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Write `data` as pretty JSON.
pub fn save_to_path<P: AsRef<Path>>(path: P, data: &SaveData) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path.as_ref(), &json)?;
    info!(path = %path.as_ref().display(), "save written");
    Ok(())
}

/// Read a save. A missing file is `Ok(None)`; a malformed one is an error.
pub fn load_save<P: AsRef<Path>>(path: P) -> Result<Option<SaveData>, PersistenceError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let data: SaveData = serde_json::from_str(&text)?;
    if data.schema_version > SCHEMA_VERSION {
        warn!(
            found = data.schema_version,
            supported = SCHEMA_VERSION,
            "save written by a newer version"
        );
    }
    info!(path = %path.display(), "save loaded");
    Ok(Some(data))
}

/// Remove a save file if present.
pub fn delete_save<P: AsRef<Path>>(path: P) -> Result<bool, PersistenceError> {
    match fs::remove_file(path.as_ref()) {
        Ok(()) => {
            info!(path = %path.as_ref().display(), "save deleted");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch_dir;

    fn sample() -> SaveData {
        let mut counts = BTreeMap::new();
        counts.insert("coffee".to_string(), 12);
        counts.insert("intern".to_string(), 3);
        SaveData {
            schema_version: SCHEMA_VERSION,
            last_saved_unix_seconds: 1_700_000_000,
            money: 1234.5,
            lines_of_code: 88.0,
            investor_capital: 4.0,
            max_money_earned: 25_000.0,
            upgrade_counts: counts,
        }
    }

    #[test]
    fn save_then_load() {
        let dir = scratch_dir("save");
        let path = dir.join("slot.json");
        save_to_path(&path, &sample()).unwrap();
        let back = load_save(&path).unwrap().unwrap();
        assert_eq!(back, sample());
        assert!(delete_save(&path).unwrap());
        assert!(!delete_save(&path).unwrap());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = scratch_dir("missing");
        assert!(load_save(dir.join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = scratch_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_save(&path), Err(PersistenceError::Json(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_2_saves_default_the_record() {
        let json = r#"{
            "schemaVersion": 2,
            "lastSavedUnixSeconds": 1700000000,
            "money": 10.0,
            "linesOfCode": 2.0,
            "investorCapital": 1.0,
            "upgradeCounts": { "coffee": 2 }
        }"#;
        let data: SaveData = serde_json::from_str(json).unwrap();
        assert_eq!(data.schema_version, 2);
        assert_eq!(data.max_money_earned, 0.0);
        assert_eq!(data.upgrade_counts.get("coffee"), Some(&2));
    }

    #[test]
    fn uses_camel_case_keys() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"lastSavedUnixSeconds\""));
        assert!(json.contains("\"upgradeCounts\""));
    }

    #[test]
    fn now_is_after_2020() {
        assert!(now_unix() > 1_577_836_800);
    }
}
