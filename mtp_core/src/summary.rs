//! Rolling 7-day training summary.
//!
//! Totals are kept per category across every machine in the catalog. For each
//! machine/category the heaviest weight of its most recent session is the
//! reference for "top weight" sets, whether or not that session falls inside
//! the window.

use crate::history::HistoryStore;
use crate::store::KvStore;
use crate::{Catalog, Category, RuleTable};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Length of the rolling window in days
pub const WINDOW_DAYS: i64 = 7;

/// Raw set counts for one category
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct CategoryTotals {
    pub total_sets: u32,
    pub top_rep_sets: u32,
    pub top_weight_sets: u32,
}

/// Summary keyed by category; every category is always present
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct WeeklySummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub totals: BTreeMap<Category, CategoryTotals>,
}

impl WeeklySummary {
    fn empty(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            window_start,
            window_end,
            totals: Category::ALL
                .iter()
                .map(|&c| (c, CategoryTotals::default()))
                .collect(),
        }
    }

    /// Totals for one category
    pub fn get(&self, category: Category) -> CategoryTotals {
        self.totals.get(&category).copied().unwrap_or_default()
    }
}

/// Start of the window ending at `now`
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(WINDOW_DAYS)
}

/// Aggregate every history in the catalog over `[now - 7 days, now]`
///
/// Both bounds are inclusive.
pub fn summarize<S: KvStore>(
    catalog: &Catalog,
    rules: &RuleTable,
    history: &HistoryStore<S>,
    now: DateTime<Utc>,
) -> WeeklySummary {
    let cutoff = window_start(now);
    let mut summary = WeeklySummary::empty(cutoff, now);

    for machine in &catalog.machines {
        for category in Category::ALL {
            let sessions = history.load(machine, category);
            let Some(latest) = sessions.last() else {
                continue;
            };

            let rule = rules.get(category);
            let last_peak_weight = latest.peak_weight();
            let totals = summary.totals.entry(category).or_default();

            for session in sessions
                .iter()
                .filter(|s| s.timestamp() >= cutoff && s.timestamp() <= now)
            {
                for set in session.sets() {
                    totals.total_sets += 1;
                    if rule.hits_ceiling(set.reps) {
                        totals.top_rep_sets += 1;
                    }
                    if set.weight >= last_peak_weight {
                        totals.top_weight_sets += 1;
                    }
                }
            }
        }
    }

    tracing::debug!("Weekly summary through {}: {:?}", now, summary.totals);
    summary
}
