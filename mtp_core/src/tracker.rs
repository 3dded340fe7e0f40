//! Workout tracker: the entry point used by front ends.
//!
//! A `Tracker` bundles the machine catalog, the rule table and the history
//! store, and resolves machine ids before handing off to the history,
//! progression and summary modules.

use crate::history::HistoryStore;
use crate::progression;
use crate::store::KvStore;
use crate::summary::{self, WeeklySummary};
use crate::weights::{self, WeightChange};
use crate::{Catalog, Category, HandlePosition, Machine, Result, Rule, RuleTable, Session};
use chrono::{DateTime, Utc};

/// Plan row enriched with history-derived hints
#[derive(Clone, Debug)]
pub struct ExerciseStatus {
    pub machine: Machine,
    pub category: Category,
    pub rule: Rule,
    pub last_session: Option<Session>,
    pub suggested_weight: Option<f64>,
    pub working_weight: Option<f64>,
    pub earned_progression: bool,
}

/// Tracker over a catalog, a rule table and a history store
pub struct Tracker<S: KvStore> {
    catalog: Catalog,
    rules: RuleTable,
    history: HistoryStore<S>,
}

impl<S: KvStore> Tracker<S> {
    pub fn new(catalog: Catalog, rules: RuleTable, history: HistoryStore<S>) -> Self {
        Self {
            catalog,
            rules,
            history,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Resolve a machine id or display number
    pub fn machine(&self, id_or_number: &str) -> Result<&Machine> {
        self.catalog.resolve(id_or_number)
    }

    /// Full history for a machine/category, oldest first
    pub fn load(&self, machine_id: &str, category: Category) -> Result<Vec<Session>> {
        let machine = self.machine(machine_id)?;
        Ok(self.history.load(machine, category))
    }

    /// Most recent session for a machine/category
    pub fn last(&self, machine_id: &str, category: Category) -> Result<Option<Session>> {
        let machine = self.machine(machine_id)?;
        Ok(self.history.last(machine, category))
    }

    /// Append an already-built session
    pub fn append(&mut self, machine_id: &str, category: Category, session: Session) -> Result<()> {
        let machine = self.catalog.resolve(machine_id)?.clone();
        self.history.append(&machine, category, session)
    }

    /// Validate raw set input, build a session and append it
    ///
    /// Invalid rows are dropped; if none remain the attempt is rejected with
    /// `EmptySessionRejected` and nothing is written.
    pub fn log_session<I>(
        &mut self,
        machine_id: &str,
        category: Category,
        timestamp: DateTime<Utc>,
        raw_sets: I,
        handle: Option<HandlePosition>,
    ) -> Result<Session>
    where
        I: IntoIterator<Item = (u32, f64)>,
    {
        let machine = self.catalog.resolve(machine_id)?.clone();
        let sets = progression::build_sets(raw_sets)?;
        let session = Session::new(timestamp, sets, handle)?;

        self.history.append(&machine, category, session.clone())?;
        tracing::info!(
            "Logged {} {}: {}",
            machine.label(),
            category,
            session
        );
        Ok(session)
    }

    /// Suggested weight for the next session, `None` without history
    pub fn suggest_next_weight(&self, machine_id: &str, category: Category) -> Result<Option<f64>> {
        let machine = self.machine(machine_id)?;
        let history = self.history.load(machine, category);
        Ok(progression::suggest_next_weight(
            &history,
            self.rules.get(category),
        ))
    }

    /// Whether the last three sessions all hit the rep ceiling on every set
    pub fn has_earned_progression(&self, machine_id: &str, category: Category) -> Result<bool> {
        let machine = self.machine(machine_id)?;
        let history = self.history.load(machine, category);
        Ok(progression::has_earned_progression(
            &history,
            self.rules.get(category),
        ))
    }

    /// Stored working weight for a machine
    ///
    /// Unreadable values are logged and treated as unset.
    pub fn working_weight(&self, machine_id: &str) -> Result<Option<f64>> {
        let machine = self.machine(machine_id)?;
        Ok(self.stored_weight(machine))
    }

    /// Set the working weight for a machine, clamped at zero
    pub fn set_working_weight(&mut self, machine_id: &str, weight: f64) -> Result<f64> {
        let machine = self.catalog.resolve(machine_id)?.clone();
        weights::save_working_weight(self.history.store_mut(), &machine, weight)
    }

    /// Apply a change to the working weight and return the new value
    ///
    /// Steps use the category's weight increment. Without a stored weight the
    /// starting point is the suggested weight, or zero without history.
    pub fn change_working_weight(
        &mut self,
        machine_id: &str,
        category: Category,
        change: WeightChange,
    ) -> Result<f64> {
        let current = match self.working_weight(machine_id)? {
            Some(weight) => weight,
            None => self
                .suggest_next_weight(machine_id, category)?
                .unwrap_or(0.0),
        };
        let step = self.rules.get(category).weight_increment;
        self.set_working_weight(machine_id, change.apply(current, step))
    }

    /// Weight for set rows entered without one
    ///
    /// The working weight if set, else the suggested weight.
    pub fn default_weight(&self, machine_id: &str, category: Category) -> Result<Option<f64>> {
        match self.working_weight(machine_id)? {
            Some(weight) => Ok(Some(weight)),
            None => self.suggest_next_weight(machine_id, category),
        }
    }

    fn stored_weight(&self, machine: &Machine) -> Option<f64> {
        weights::load_working_weight(self.history.store(), machine).unwrap_or_else(|e| {
            tracing::warn!("Ignoring working weight for {}: {}", machine.label(), e);
            None
        })
    }

    /// Rolling 7-day summary ending at `now`
    pub fn summarize(&self, now: DateTime<Utc>) -> WeeklySummary {
        summary::summarize(&self.catalog, &self.rules, &self.history, now)
    }

    /// Status of every exercise planned for a day
    ///
    /// Each history is loaded once and used for all hints on that row.
    pub fn day_status(&self, weekday: chrono::Weekday) -> Result<Vec<ExerciseStatus>> {
        let Some(day) = self.catalog.day(weekday) else {
            return Ok(Vec::new());
        };

        day.exercises
            .iter()
            .map(|entry| {
                let machine = self.machine(&entry.machine_id)?;
                let rule = self.rules.get(entry.category);
                let history = self.history.load(machine, entry.category);

                Ok(ExerciseStatus {
                    machine: machine.clone(),
                    category: entry.category,
                    rule: rule.clone(),
                    suggested_weight: progression::suggest_next_weight(&history, rule),
                    working_weight: self.stored_weight(machine),
                    earned_progression: progression::has_earned_progression(&history, rule),
                    last_session: history.last().cloned(),
                })
            })
            .collect()
    }
}
