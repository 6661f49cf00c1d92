//! Workout session log and statistics.
//!
//! Finished counting sessions are appended to a JSON Lines log. The log can
//! be summarised per exercise or exported to CSV for spreadsheets.

use crate::{jsonl, ExerciseKind, Result, WorkoutSession};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Session sink trait for persisting sessions
pub trait SessionSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()>;
}

/// JSONL-based session log with file locking
pub struct JsonlSessionLog {
    path: PathBuf,
}

impl JsonlSessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSink for JsonlSessionLog {
    fn append(&mut self, session: &WorkoutSession) -> Result<()> {
        jsonl::append_record(&self.path, session)?;
        tracing::debug!("Appended session {} to log", session.id);
        Ok(())
    }
}

/// Read all sessions from a log file
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    jsonl::read_records(path)
}

/// Aggregated figures for one exercise
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ExerciseStats {
    pub sessions: u32,
    pub total_reps: u32,
    pub best_reps: u32,
    pub total_calories: f64,
}

/// Per-exercise statistics, ordered by exercise
pub fn summarize(sessions: &[WorkoutSession]) -> BTreeMap<ExerciseKind, ExerciseStats> {
    let mut stats: BTreeMap<ExerciseKind, ExerciseStats> = BTreeMap::new();

    for session in sessions {
        let entry = stats.entry(session.exercise).or_default();
        entry.sessions += 1;
        entry.total_reps += session.reps;
        entry.best_reps = entry.best_reps.max(session.reps);
        entry.total_calories += session.calories;
    }

    stats
}

/// A row in the CSV output
#[derive(Debug, Serialize)]
struct CsvRow {
    id: String,
    exercise: String,
    started_at: String,
    finished_at: String,
    reps: u32,
    frames_processed: u32,
    frames_skipped: u32,
    calories: f64,
}

impl From<&WorkoutSession> for CsvRow {
    fn from(session: &WorkoutSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            exercise: session.exercise.to_string(),
            started_at: session.started_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            finished_at: session.finished_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            reps: session.reps,
            frames_processed: session.frames_processed,
            frames_skipped: session.frames_skipped,
            calories: session.calories,
        }
    }
}

/// Append sessions to a CSV file, writing headers only for a new file
///
/// Returns the number of rows written.
pub fn export_csv(sessions: &[WorkoutSession], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    tracing::info!("Exported {} sessions to {:?}", sessions.len(), csv_path);
    Ok(sessions.len())
}
