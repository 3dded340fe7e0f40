//! Training rules per category.
//!
//! Every [`Category`] maps to exactly one [`Rule`]; the table is a struct with
//! one field per category so a missing entry is a compile error rather than a
//! runtime lookup failure.

use crate::{Category, Error, Result};
use serde::{Deserialize, Serialize};

/// Set count, rep range and weight step for one category
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub set_count: u32,
    pub rep_floor: u32,
    pub rep_ceiling: u32,
    pub weight_increment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
}

impl Rule {
    /// Prescription as shown in the plan, e.g. `3x6-8`
    pub fn scheme(&self) -> String {
        format!("{}x{}-{}", self.set_count, self.rep_floor, self.rep_ceiling)
    }

    /// Whether a set's reps reach the top of the rep range
    pub fn hits_ceiling(&self, reps: u32) -> bool {
        reps >= self.rep_ceiling
    }
}

/// The full rule table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RuleTable {
    #[serde(default = "default_heavy")]
    pub heavy: Rule,

    #[serde(default = "default_light")]
    pub light: Rule,

    #[serde(default = "default_core")]
    pub core: Rule,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            heavy: default_heavy(),
            light: default_light(),
            core: default_core(),
        }
    }
}

fn default_heavy() -> Rule {
    Rule {
        set_count: 3,
        rep_floor: 6,
        rep_ceiling: 8,
        weight_increment: 5.0,
        tempo: Some("3-1-2".into()),
    }
}

fn default_light() -> Rule {
    Rule {
        set_count: 3,
        rep_floor: 10,
        rep_ceiling: 12,
        weight_increment: 2.5,
        tempo: Some("2-1-2".into()),
    }
}

fn default_core() -> Rule {
    Rule {
        set_count: 3,
        rep_floor: 12,
        rep_ceiling: 15,
        weight_increment: 0.0,
        tempo: Some("2-2-2".into()),
    }
}

impl RuleTable {
    /// Rule for a category
    pub fn get(&self, category: Category) -> &Rule {
        match category {
            Category::Heavy => &self.heavy,
            Category::Light => &self.light,
            Category::Core => &self.core,
        }
    }

    /// Check every rule's numeric constraints
    pub fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            let rule = self.get(category);
            if rule.set_count == 0 {
                return Err(Error::Config(format!(
                    "{} rule must have at least one set",
                    category
                )));
            }
            if rule.rep_ceiling < rule.rep_floor {
                return Err(Error::Config(format!(
                    "{} rule: rep ceiling {} is below rep floor {}",
                    category, rule.rep_ceiling, rule.rep_floor
                )));
            }
            if !rule.weight_increment.is_finite() || rule.weight_increment < 0.0 {
                return Err(Error::Config(format!(
                    "{} rule: weight increment must be a non-negative number, got {}",
                    category, rule.weight_increment
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_validates() {
        RuleTable::default().validate().unwrap();
    }

    #[test]
    fn test_core_is_non_progressive() {
        let rules = RuleTable::default();
        assert_eq!(rules.get(Category::Core).weight_increment, 0.0);
    }

    #[test]
    fn test_default_values() {
        let rules = RuleTable::default();
        assert_eq!(rules.get(Category::Heavy).rep_ceiling, 8);
        assert_eq!(rules.get(Category::Heavy).weight_increment, 5.0);
        assert_eq!(rules.get(Category::Light).rep_ceiling, 12);
        assert_eq!(rules.get(Category::Light).weight_increment, 2.5);
        assert_eq!(rules.get(Category::Core).rep_ceiling, 15);
    }

    #[test]
    fn test_scheme_format() {
        let rules = RuleTable::default();
        assert_eq!(rules.get(Category::Heavy).scheme(), "3x6-8");
        assert_eq!(rules.get(Category::Light).scheme(), "3x10-12");
    }

    #[test]
    fn test_inverted_rep_range_rejected() {
        let mut rules = RuleTable::default();
        rules.light.rep_floor = 14;
        assert!(matches!(rules.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_negative_increment_rejected() {
        let mut rules = RuleTable::default();
        rules.heavy.weight_increment = -5.0;
        assert!(matches!(rules.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_sets_rejected() {
        let mut rules = RuleTable::default();
        rules.core.set_count = 0;
        assert!(matches!(rules.validate(), Err(Error::Config(_))));
    }
}
