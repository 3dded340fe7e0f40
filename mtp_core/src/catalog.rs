//! Default machine catalog and weekly workout plan.
//!
//! This module provides the built-in machines and the Monday-Friday plan.

use crate::types::*;
use crate::{Error, Result};
use chrono::Weekday;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in machines and plan
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalogs.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn machine(id: &str, number: u32, name: &str, muscle_group: &str) -> Machine {
    Machine {
        id: id.into(),
        number,
        name: name.into(),
        muscle_group: muscle_group.into(),
    }
}

fn entry(machine_id: &str, category: Category) -> PlanEntry {
    PlanEntry {
        machine_id: machine_id.into(),
        category,
    }
}

fn build_default_catalog_internal() -> Catalog {
    use Category::{Core, Heavy, Light};

    // ========================================================================
    // Machines (ordered by floor number)
    // ========================================================================

    let machines = vec![
        machine("CURL", 1, "DEPENDENT CURL", "Arms"),
        machine("TRI", 2, "TRICEPS PRESS", "Arms"),
        machine("ABS", 3, "ABD CRUNCH", "Core"),
        machine("BACK", 4, "BACK EXTENSION", "Lower Back"),
        machine("ROW", 5, "SEATED ROW", "Mid Back"),
        machine("SH", 6, "SHOULDER PRESS", "Shoulders"),
        machine("CHEST", 7, "CHEST PRESS", "Chest"),
        machine("LAT", 8, "LAT PULLDOWN", "Back"),
        machine("PEC", 9, "PEC FLY / REAR DELT", "Chest / Rear Delts"),
        machine("PLC", 10, "PRONE LEG CURL", "Hamstrings"),
        machine("LEGEXT", 11, "LEG EXTENSION", "Quads"),
        machine("SLC", 12, "SEATED LEG CURL", "Hamstrings"),
        machine("ADD", 13, "HIP ADDUCTOR", "Inner Thighs"),
        machine("ABD", 14, "HIP ABDUCTOR", "Glutes"),
        machine("PRESS", 15, "LEG PRESS", "Quads / Glutes"),
    ];

    // ========================================================================
    // Weekly plan
    // ========================================================================

    let plan = vec![
        WorkoutDay {
            weekday: Weekday::Mon,
            title: "LOWER - HEAVY".into(),
            exercises: vec![
                entry("PRESS", Heavy),
                entry("SLC", Light),
                entry("ADD", Light),
                entry("ABD", Light),
                entry("ABS", Core),
            ],
        },
        WorkoutDay {
            weekday: Weekday::Tue,
            title: "UPPER - HEAVY + LIGHT".into(),
            exercises: vec![
                entry("CHEST", Heavy),
                entry("LAT", Heavy),
                entry("ROW", Light),
                entry("SH", Light),
                entry("TRI", Light),
            ],
        },
        WorkoutDay {
            weekday: Weekday::Wed,
            title: "FULL BODY".into(),
            exercises: vec![
                entry("PRESS", Heavy),
                entry("CHEST", Heavy),
                entry("ROW", Light),
                entry("ABD", Light),
                entry("ABS", Core),
            ],
        },
        WorkoutDay {
            weekday: Weekday::Thu,
            title: "LOWER - LIGHT / KNEE SAFE".into(),
            exercises: vec![
                entry("PRESS", Light),
                entry("SLC", Light),
                entry("ADD", Light),
                entry("ABD", Light),
                entry("BACK", Core),
            ],
        },
        WorkoutDay {
            weekday: Weekday::Fri,
            title: "UPPER - LIGHT / PUMP".into(),
            exercises: vec![
                entry("ROW", Light),
                entry("SH", Light),
                entry("PEC", Light),
                entry("TRI", Light),
                entry("CURL", Light),
            ],
        },
    ];

    Catalog { machines, plan }
}

impl Catalog {
    /// Look up a machine by its id (case-insensitive)
    pub fn machine_by_id(&self, id: &str) -> Option<&Machine> {
        self.machines
            .iter()
            .find(|m| m.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Look up a machine by the number painted on it
    pub fn machine_by_number(&self, number: u32) -> Option<&Machine> {
        self.machines.iter().find(|m| m.number == number)
    }

    /// Resolve user input that is either a machine id or a number
    pub fn resolve(&self, id_or_number: &str) -> Result<&Machine> {
        let text = id_or_number.trim().trim_start_matches('#');
        let found = match text.parse::<u32>() {
            Ok(number) => self.machine_by_number(number),
            Err(_) => self.machine_by_id(text),
        };
        found.ok_or_else(|| Error::UnknownMachine(id_or_number.to_string()))
    }

    /// Plan for a weekday, if it is a training day
    pub fn day(&self, weekday: Weekday) -> Option<&WorkoutDay> {
        self.plan.iter().find(|d| d.weekday == weekday)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut ids = HashSet::new();
        let mut numbers = HashSet::new();

        for machine in &self.machines {
            if machine.id.is_empty() {
                errors.push(format!("Machine #{} has empty ID", machine.number));
            }
            if machine.name.is_empty() {
                errors.push(format!("Machine '{}' has empty name", machine.id));
            }
            if !ids.insert(machine.id.to_uppercase()) {
                errors.push(format!("Duplicate machine ID '{}'", machine.id));
            }
            if !numbers.insert(machine.number) {
                errors.push(format!("Duplicate machine number {}", machine.number));
            }
        }

        let mut weekdays = HashSet::new();
        for day in &self.plan {
            if !weekdays.insert(day.weekday) {
                errors.push(format!("Weekday {} is planned twice", day.weekday));
            }
            if day.exercises.is_empty() {
                errors.push(format!("Plan for {} has no exercises", day.weekday));
            }

            // Check that all referenced machines exist
            for entry in &day.exercises {
                if self.machine_by_id(&entry.machine_id).is_none() {
                    errors.push(format!(
                        "Plan for {} references non-existent machine '{}'",
                        day.weekday, entry.machine_id
                    ));
                }
            }
        }

        errors
    }
}
