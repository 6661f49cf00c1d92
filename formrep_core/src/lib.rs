#![forbid(unsafe_code)]

//! Rep counting and workout scheduling engines for formrep.
//!
//! This crate provides:
//! - Domain types (landmarks, poses, bookings, sessions)
//! - Landmark geometry and the per-exercise rep counter
//! - Workout slot suggestion and availability checking
//! - Local stand-ins for the pose source and booking store
//! - Session logging and statistics

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod clock;
pub mod geometry;
pub mod counter;
pub mod busy;
pub mod schedule;
pub mod availability;
pub mod jsonl;
pub mod bookings;
pub mod sessions;
pub mod replay;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use clock::{Clock, FixedClock, SystemClock};
pub use geometry::{angle_at, is_unstable};
pub use counter::{CounterConfig, RepCounter};
pub use busy::build_busy_slots;
pub use schedule::{preferred_windows, suggest_optimal_time};
pub use availability::check_availability;
pub use bookings::{BookingStore, JsonlBookingStore};
pub use sessions::{JsonlSessionLog, SessionSink};
pub use replay::{read_pose_stream, replay, ReplaySummary};
