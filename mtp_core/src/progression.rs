//! Progression logic for machine weights.
//!
//! Two independent checks are provided:
//! - `suggest_next_weight`: a per-session nudge based only on the last set of
//!   the most recent session
//! - `has_earned_progression`: a confirmation gate requiring every set of the
//!   three most recent sessions to reach the rep ceiling
//!
//! The two may disagree; callers present them separately.

use crate::{Error, Result, Rule, Session, Set};

/// Number of consecutive sessions at the ceiling needed to earn an increase
pub const EARNED_STREAK: usize = 3;

/// Suggested working weight for the next session
///
/// Returns `None` when there is no history. Otherwise looks at the last set of
/// the most recent session: if it reached the rep ceiling the weight goes up
/// by the rule's increment, else it stays the same.
pub fn suggest_next_weight(history: &[Session], rule: &Rule) -> Option<f64> {
    let last = history.last()?;
    let last_set = last.last_set();

    if rule.hits_ceiling(last_set.reps) {
        let next = last_set.weight + rule.weight_increment;
        tracing::debug!(
            "Last set {} reached ceiling {}, suggesting {}",
            last_set,
            rule.rep_ceiling,
            next
        );
        Some(next)
    } else {
        tracing::debug!(
            "Last set {} below ceiling {}, holding at {}",
            last_set,
            rule.rep_ceiling,
            last_set.weight
        );
        Some(last_set.weight)
    }
}

/// Whether the lifter has earned a weight increase
///
/// True only when the three most recent sessions exist and every set in each
/// of them reached the rep ceiling.
pub fn has_earned_progression(history: &[Session], rule: &Rule) -> bool {
    if history.len() < EARNED_STREAK {
        return false;
    }

    history[history.len() - EARNED_STREAK..]
        .iter()
        .all(|session| session.sets().iter().all(|set| rule.hits_ceiling(set.reps)))
}

/// Turn raw `(reps, weight)` input rows into loggable sets
///
/// Rows with zero reps or a negative/non-finite weight are dropped. If nothing
/// remains the attempt is rejected so that no empty session is ever built.
pub fn build_sets<I>(raw: I) -> Result<Vec<Set>>
where
    I: IntoIterator<Item = (u32, f64)>,
{
    let sets: Vec<Set> = raw
        .into_iter()
        .map(|(reps, weight)| Set::new(reps, weight))
        .filter(Set::is_valid)
        .collect();

    if sets.is_empty() {
        return Err(Error::EmptySessionRejected);
    }
    Ok(sets)
}
