//! CSV export of the full training history.
//!
//! One row per logged set, grouped by machine and category, oldest session
//! first within each group.

use crate::store::KvStore;
use crate::tracker::Tracker;
use crate::{Category, Result};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    machine_id: &'a str,
    machine_number: u32,
    category: Category,
    time: String,
    handle: Option<String>,
    set_index: usize,
    reps: u32,
    weight: f64,
}

/// Write every logged set to `writer`, returning the number of rows
pub fn write_history<S: KvStore, W: Write>(tracker: &Tracker<S>, writer: W) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut rows = 0;

    for machine in &tracker.catalog().machines {
        for category in Category::ALL {
            for session in tracker.history().load(machine, category) {
                let time = session.timestamp().to_rfc3339();
                let handle = session.handle().map(|h| h.to_string());

                for (index, set) in session.sets().iter().enumerate() {
                    csv_writer.serialize(CsvRow {
                        machine_id: &machine.id,
                        machine_number: machine.number,
                        category,
                        time: time.clone(),
                        handle: handle.clone(),
                        set_index: index + 1,
                        reps: set.reps,
                        weight: set.weight,
                    })?;
                    rows += 1;
                }
            }
        }
    }

    csv_writer.flush()?;
    Ok(rows)
}

/// Export history to a CSV file, replacing any existing file
pub fn write_history_csv<S: KvStore>(tracker: &Tracker<S>, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let rows = write_history(tracker, std::io::BufWriter::new(file))?;

    tracing::info!("Exported {} sets to {:?}", rows, path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::store::MemoryStore;
    use crate::{build_default_catalog, HandlePosition, RuleTable};
    use chrono::{TimeZone, Utc};

    fn tracker() -> Tracker<MemoryStore> {
        Tracker::new(
            build_default_catalog(),
            RuleTable::default(),
            HistoryStore::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_export_empty_history() {
        let tracker = tracker();
        let mut out = Vec::new();
        let rows = write_history(&tracker, &mut out).unwrap();

        assert_eq!(rows, 0);
        assert!(String::from_utf8(out).unwrap().trim().is_empty());
    }

    #[test]
    fn test_export_rows() {
        let mut tracker = tracker();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        tracker
            .log_session(
                "PRESS",
                Category::Heavy,
                at,
                vec![(8, 100.0), (7, 100.0)],
                None,
            )
            .unwrap();
        tracker
            .log_session(
                "ROW",
                Category::Light,
                at,
                vec![(12, 52.5)],
                Some(HandlePosition::Inner),
            )
            .unwrap();

        let mut out = Vec::new();
        let rows = write_history(&tracker, &mut out).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "machine_id,machine_number,category,time,handle,set_index,reps,weight"
        );
        // Machines are exported in catalog order: ROW (#5) before PRESS (#15)
        assert_eq!(lines[1], "ROW,5,LIGHT,2024-01-15T10:30:00+00:00,inner,1,12,52.5");
        assert_eq!(lines[2], "PRESS,15,HEAVY,2024-01-15T10:30:00+00:00,,1,8,100.0");
        assert_eq!(lines[3], "PRESS,15,HEAVY,2024-01-15T10:30:00+00:00,,2,7,100.0");
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("exports").join("history.csv");

        let mut tracker = tracker();
        tracker
            .log_session(
                "ABS",
                Category::Core,
                Utc::now(),
                vec![(15, 40.0)],
                None,
            )
            .unwrap();

        let rows = write_history_csv(&tracker, &path).unwrap();
        assert_eq!(rows, 1);
        assert!(std::fs::read_to_string(&path).unwrap().contains("ABS,3,CORE"));
    }
}
