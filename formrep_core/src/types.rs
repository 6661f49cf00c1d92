//! Core domain types for formrep.
//!
//! This module defines the fundamental types used throughout the system:
//! - Landmarks and poses fed by the pose-estimation pipeline
//! - Exercise kinds and per-frame counter output
//! - Bookings, busy slots and the scheduling results built from them
//! - Logged workout sessions

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Pose Types
// ============================================================================

/// Number of landmarks in a full pose
pub const POSE_LANDMARK_COUNT: usize = 33;

/// A single tracked body keypoint in normalized image coordinates
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }
}

/// Landmarks for one video frame, indexed by the fixed anatomical map
///
/// A pose with fewer than [`POSE_LANDMARK_COUNT`] entries means nothing was
/// detected in that frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Pose(pub Vec<Landmark>);

impl Pose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self(landmarks)
    }

    /// A frame with no detection
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the pose carries a full landmark set
    pub fn is_detected(&self) -> bool {
        self.0.len() >= POSE_LANDMARK_COUNT
    }
}

/// Anatomical landmark indices used by the counters
pub mod landmark {
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
}

// ============================================================================
// Exercise and Counter Types
// ============================================================================

/// Exercises with a repetition counter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    BicepCurl,
    PushUp,
    Squat,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [
        ExerciseKind::BicepCurl,
        ExerciseKind::PushUp,
        ExerciseKind::Squat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::BicepCurl => "bicep_curl",
            ExerciseKind::PushUp => "push_up",
            ExerciseKind::Squat => "squat",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "bicep_curl" | "bicepcurl" | "curl" => Ok(ExerciseKind::BicepCurl),
            "push_up" | "pushup" => Ok(ExerciseKind::PushUp),
            "squat" => Ok(ExerciseKind::Squat),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown exercise: {}",
                other
            ))),
        }
    }
}

/// Mutable state of one counting session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterState {
    pub success_count: u32,
    /// At the top of the range of motion
    pub up: bool,
    /// A repetition was just completed
    pub down: bool,
    pub last_pose: Option<Pose>,
}

/// Output of one processed frame
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CounterResult {
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorie: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl CounterResult {
    pub fn count_only(count: u32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    /// True when this frame completed a repetition
    pub fn is_completion(&self) -> bool {
        self.score.is_some()
    }
}

// ============================================================================
// Scheduling Types
// ============================================================================

/// Duration assumed for bookings and workouts that don't specify one
pub const DEFAULT_WORKOUT_MINUTES: u32 = 60;

/// Training experience used to pick preferred workout windows
///
/// Deserializes leniently, like [`FitnessLevel::parse_lenient`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    /// Parse a level name; anything unrecognised is treated as beginner
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "advanced" => FitnessLevel::Advanced,
            "intermediate" => FitnessLevel::Intermediate,
            "beginner" => FitnessLevel::Beginner,
            other => {
                tracing::debug!("Unknown fitness level {:?}, using beginner", other);
                FitnessLevel::Beginner
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }
}

impl From<String> for FitnessLevel {
    fn from(s: String) -> Self {
        FitnessLevel::parse_lenient(&s)
    }
}

impl fmt::Display for FitnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named preferred daypart, `[start_hour, end_hour)`
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// A scheduled workout as supplied by the booking store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

impl Booking {
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes.unwrap_or(DEFAULT_WORKOUT_MINUTES)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.duration_minutes()))
    }
}

/// An interval occupied by a booking that is not completed
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct BusySlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
}

/// A recommended workout slot
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SuggestionResult {
    pub time: NaiveDateTime,
    pub fitness_level: FitnessLevel,
    pub reason: String,
}

/// An existing booking overlapping a proposed interval
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ScheduleConflict {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
}

impl From<&BusySlot> for ScheduleConflict {
    fn from(slot: &BusySlot) -> Self {
        ScheduleConflict {
            start: slot.start,
            end: slot.end,
            title: slot.title.clone(),
        }
    }
}

/// Outcome of validating a proposed workout time
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TimeAvailabilityResult {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<ScheduleConflict>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_available: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Session Types
// ============================================================================

/// A finished rep-counting session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub exercise: ExerciseKind,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
    pub reps: u32,
    pub frames_processed: u32,
    pub frames_skipped: u32,
    pub calories: f64,
}
