//! Working weight per machine.
//!
//! The weight a lifter is currently training with, kept under
//! `"<machine number>_WEIGHT"` in the same key-value store as the session
//! history. It fills in set rows entered without a weight.

use crate::store::KvStore;
use crate::{Error, Machine, Result};
use serde_json::Value;
use std::str::FromStr;

/// Storage key for a machine's working weight, e.g. `15_WEIGHT`
pub fn working_weight_key(machine: &Machine) -> String {
    format!("{}_WEIGHT", machine.number)
}

/// Requested change to a working weight
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeightChange {
    /// One step up
    Up,
    /// One step down
    Down,
    /// An explicit weight
    To(f64),
}

impl WeightChange {
    /// New weight after applying the change to `current`, never below zero
    pub fn apply(self, current: f64, step: f64) -> f64 {
        let next = match self {
            WeightChange::Up => current + step,
            WeightChange::Down => current - step,
            WeightChange::To(weight) => weight,
        };
        next.max(0.0)
    }
}

impl FromStr for WeightChange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "+" => Ok(WeightChange::Up),
            "-" => Ok(WeightChange::Down),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite())
                .map(WeightChange::To)
                .ok_or_else(|| {
                    Error::Other(format!(
                        "Invalid weight change '{}': expected +, - or a number",
                        s
                    ))
                }),
        }
    }
}

/// Stored working weight for a machine, `None` if never set
pub fn load_working_weight<S: KvStore>(store: &S, machine: &Machine) -> Result<Option<f64>> {
    let key = working_weight_key(machine);
    match store.get(&key)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(weight) if weight.is_finite() && weight >= 0.0 => Ok(Some(weight)),
            _ => Err(Error::MalformedData {
                key,
                reason: format!("expected a non-negative number, found {}", value),
            }),
        },
    }
}

/// Persist a working weight, clamped at zero; returns the stored value
pub fn save_working_weight<S: KvStore>(
    store: &mut S,
    machine: &Machine,
    weight: f64,
) -> Result<f64> {
    if !weight.is_finite() {
        return Err(Error::Other(format!("Invalid weight: {}", weight)));
    }

    let weight = weight.max(0.0);
    let key = working_weight_key(machine);
    store.set(&key, Value::from(weight))?;

    tracing::info!("Working weight for {} set to {}", machine.label(), weight);
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_default_catalog;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn press() -> &'static Machine {
        get_default_catalog().machine_by_id("PRESS").unwrap()
    }

    #[test]
    fn test_key_format() {
        assert_eq!(working_weight_key(press()), "15_WEIGHT");
    }

    #[test]
    fn test_parse_changes() {
        assert_eq!("+".parse::<WeightChange>().unwrap(), WeightChange::Up);
        assert_eq!("-".parse::<WeightChange>().unwrap(), WeightChange::Down);
        assert_eq!("102.5".parse::<WeightChange>().unwrap(), WeightChange::To(102.5));
        assert!("heavy".parse::<WeightChange>().is_err());
        assert!("inf".parse::<WeightChange>().is_err());
    }

    #[test]
    fn test_apply_steps_and_clamps() {
        assert_eq!(WeightChange::Up.apply(100.0, 5.0), 105.0);
        assert_eq!(WeightChange::Down.apply(100.0, 2.5), 97.5);
        assert_eq!(WeightChange::Down.apply(2.5, 5.0), 0.0);
        assert_eq!(WeightChange::To(-10.0).apply(100.0, 5.0), 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        assert_eq!(load_working_weight(&store, press()).unwrap(), None);

        assert_eq!(save_working_weight(&mut store, press(), 120.0).unwrap(), 120.0);
        assert_eq!(load_working_weight(&store, press()).unwrap(), Some(120.0));
        assert_eq!(store.get("15_WEIGHT").unwrap(), Some(json!(120.0)));
    }

    #[test]
    fn test_negative_weight_is_clamped() {
        let mut store = MemoryStore::new();
        assert_eq!(save_working_weight(&mut store, press(), -5.0).unwrap(), 0.0);
        assert_eq!(load_working_weight(&store, press()).unwrap(), Some(0.0));
    }

    #[test]
    fn test_malformed_weight_is_reported() {
        let mut store = MemoryStore::new();
        store.set("15_WEIGHT", json!("heavy")).unwrap();

        assert!(matches!(
            load_working_weight(&store, press()),
            Err(Error::MalformedData { .. })
        ));
    }
}
