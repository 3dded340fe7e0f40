//! Core domain types for Matrix Training Plus.
//!
//! This module defines the fundamental types used throughout the system:
//! - Training categories and handle positions
//! - Sets and logged sessions
//! - Machines and the weekly workout plan

use crate::{Error, Result};
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Category Types
// ============================================================================

/// Training-intensity category driving the rep and weight rules
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Heavy,
    Light,
    Core,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 3] = [Category::Heavy, Category::Light, Category::Core];

    /// Upper-case name as used in storage keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Heavy => "HEAVY",
            Category::Light => "LIGHT",
            Category::Core => "CORE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "HEAVY" => Ok(Category::Heavy),
            "LIGHT" => Ok(Category::Light),
            "CORE" => Ok(Category::Core),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Handle position used on machines with two grips
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Inner,
    Outer,
}

impl fmt::Display for HandlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlePosition::Inner => f.write_str("inner"),
            HandlePosition::Outer => f.write_str("outer"),
        }
    }
}

impl FromStr for HandlePosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "inner" => Ok(HandlePosition::Inner),
            "outer" => Ok(HandlePosition::Outer),
            other => Err(Error::Other(format!(
                "Unknown handle position: {} (expected inner or outer)",
                other
            ))),
        }
    }
}

// ============================================================================
// Set and Session Types
// ============================================================================

/// One performed set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Set {
    pub reps: u32,
    pub weight: f64,
}

impl Set {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }

    /// A set is loggable when it has at least one rep and a finite,
    /// non-negative weight
    pub fn is_valid(&self) -> bool {
        self.reps > 0 && self.weight.is_finite() && self.weight >= 0.0
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.reps, self.weight)
    }
}

/// A logged exercise instance
///
/// Sessions are immutable once built and always carry at least one set.
/// The serialized shape is `{"time": <epoch ms>, "sets": [...], "handle"?: "inner"|"outer"}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "SessionRecord")]
pub struct Session {
    #[serde(rename = "time", with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    sets: Vec<Set>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handle: Option<HandlePosition>,
}

/// Wire shape used while deserializing, so the non-empty check also
/// applies to sessions read back from storage
#[derive(Deserialize)]
struct SessionRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    time: DateTime<Utc>,
    sets: Vec<Set>,
    #[serde(default)]
    handle: Option<HandlePosition>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = Error;

    fn try_from(record: SessionRecord) -> Result<Self> {
        Session::new(record.time, record.sets, record.handle)
    }
}

impl Session {
    /// Build a session, rejecting an empty set list
    pub fn new(
        timestamp: DateTime<Utc>,
        sets: Vec<Set>,
        handle: Option<HandlePosition>,
    ) -> Result<Self> {
        if sets.is_empty() {
            return Err(Error::EmptySessionRejected);
        }
        Ok(Self {
            timestamp,
            sets,
            handle,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    pub fn handle(&self) -> Option<HandlePosition> {
        self.handle
    }

    /// Final set performed in this session
    pub fn last_set(&self) -> &Set {
        // Non-empty by construction
        &self.sets[self.sets.len() - 1]
    }

    /// Heaviest weight lifted in this session
    pub fn peak_weight(&self) -> f64 {
        self.sets
            .iter()
            .map(|s| s.weight)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", set)?;
        }
        Ok(())
    }
}

// ============================================================================
// Machine and Plan Types
// ============================================================================

/// A numbered gym machine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Machine {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub muscle_group: String,
}

impl Machine {
    /// Label as printed on the gym floor, e.g. `#15 LEG PRESS`
    pub fn label(&self) -> String {
        format!("#{} {}", self.number, self.name)
    }
}

/// One exercise slot in a day's plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanEntry {
    pub machine_id: String,
    pub category: Category,
}

/// A training day in the weekly plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkoutDay {
    pub weekday: Weekday,
    pub title: String,
    pub exercises: Vec<PlanEntry>,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The machine catalog and weekly plan
#[derive(Clone, Debug)]
pub struct Catalog {
    pub machines: Vec<Machine>,
    pub plan: Vec<WorkoutDay>,
}
