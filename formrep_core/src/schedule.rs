//! Workout slot suggestion.
//!
//! Suggestion logic:
//!
//! 1. **Preferred windows**: scan the three dayparts for the fitness level in
//!    priority order, 30 minutes apart, skipping anything already past.
//! 2. **Reasonable hours**: fall back to 07:00–21:00 on the same day.
//! 3. **Tomorrow**: when the target is today and nothing fits, rescan the
//!    preferred windows for tomorrow.

use crate::busy::{build_busy_slots, collides};
use crate::clock::Clock;
use crate::{Booking, BusySlot, FitnessLevel, SuggestionResult, TimeWindow};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Minutes between candidate start times
pub const SLOT_STEP_MINUTES: u32 = 30;

/// Fallback scan range when no preferred window has room
pub const REASONABLE_START_HOUR: u32 = 7;
pub const REASONABLE_END_HOUR: u32 = 21;

const fn window(name: &'static str, start_hour: u32, end_hour: u32) -> TimeWindow {
    TimeWindow {
        name,
        start_hour,
        end_hour,
    }
}

/// Preferred dayparts for a fitness level, highest priority first
pub fn preferred_windows(level: FitnessLevel) -> [TimeWindow; 3] {
    match level {
        FitnessLevel::Advanced => [
            window("Early Morning", 5, 8),
            window("Afternoon", 14, 16),
            window("Evening", 19, 21),
        ],
        FitnessLevel::Intermediate => [
            window("Morning", 7, 10),
            window("Lunchtime", 12, 14),
            window("Evening", 17, 20),
        ],
        FitnessLevel::Beginner => [
            window("Late Morning", 9, 12),
            window("Afternoon", 15, 18),
            window("Early Evening", 18, 21),
        ],
    }
}

fn level_tip(level: FitnessLevel) -> &'static str {
    match level {
        FitnessLevel::Beginner => "Tip: keep the session light and focus on form.",
        FitnessLevel::Intermediate => "Tip: alternate strength and cardio days to keep progressing.",
        FitnessLevel::Advanced => "Tip: schedule your hardest sets when energy peaks.",
    }
}

/// Candidate start times in `[start_hour:00, end_hour:00)`
fn candidates(date: NaiveDate, start_hour: u32, end_hour: u32) -> impl Iterator<Item = NaiveDateTime> {
    (start_hour..end_hour).flat_map(move |hour| {
        (0..60)
            .step_by(SLOT_STEP_MINUTES as usize)
            .filter_map(move |minute| date.and_hms_opt(hour, minute, 0))
    })
}

/// First free candidate in the range, ignoring anything at or before `not_after`
fn first_free(
    mut range: impl Iterator<Item = NaiveDateTime>,
    duration_minutes: u32,
    busy: &[BusySlot],
    not_after: Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    range.find(|&candidate| {
        if not_after.is_some_and(|now| candidate <= now) {
            return false;
        }
        !collides(candidate, duration_minutes, busy)
    })
}

fn describe_day(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "today".to_string()
    } else if Some(date) == today.succ_opt() {
        "tomorrow".to_string()
    } else {
        format!("on {}", date.format("%A, %b %-d"))
    }
}

fn format_time(time: NaiveDateTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn scan_preferred(
    level: FitnessLevel,
    date: NaiveDate,
    duration_minutes: u32,
    busy: &[BusySlot],
    now: NaiveDateTime,
) -> Option<SuggestionResult> {
    let not_after = (date == now.date()).then_some(now);

    preferred_windows(level).iter().find_map(|w| {
        let time = first_free(
            candidates(date, w.start_hour, w.end_hour),
            duration_minutes,
            busy,
            not_after,
        )?;

        tracing::debug!("Found {} slot in {} window", format_time(time), w.name);
        Some(SuggestionResult {
            time,
            fitness_level: level,
            reason: format!(
                "{} ({}) {} fits a {} routine. {}",
                w.name,
                format_time(time),
                describe_day(date, now.date()),
                level,
                level_tip(level)
            ),
        })
    })
}

/// Suggest the best time for a workout on `target_date`
///
/// `bookings` may span several days; only those on the scanned date count as
/// busy. `exclude_id` names the booking being rescheduled. Returns `None`
/// when no slot fits anywhere.
pub fn suggest_optimal_time(
    level: FitnessLevel,
    target_date: NaiveDate,
    duration_minutes: u32,
    bookings: &[Booking],
    exclude_id: Option<&str>,
    clock: &impl Clock,
) -> Option<SuggestionResult> {
    let now = clock.now();
    let today = now.date();
    let is_today = target_date == today;
    let busy = build_busy_slots(bookings, target_date, exclude_id);

    if let Some(suggestion) = scan_preferred(level, target_date, duration_minutes, &busy, now) {
        tracing::info!("Suggested {} for {} level", suggestion.time, level);
        return Some(suggestion);
    }

    let start_hour = if is_today {
        REASONABLE_START_HOUR.max(now.hour())
    } else {
        REASONABLE_START_HOUR
    };
    let fallback = first_free(
        candidates(target_date, start_hour, REASONABLE_END_HOUR),
        duration_minutes,
        &busy,
        is_today.then_some(now),
    );

    if let Some(time) = fallback {
        tracing::info!("No preferred window free, falling back to {}", time);
        return Some(SuggestionResult {
            time,
            fitness_level: level,
            reason: format!(
                "No preferred time available. {} {} is the earliest open slot. {}",
                format_time(time),
                describe_day(target_date, today),
                level_tip(level)
            ),
        });
    }

    if is_today {
        let tomorrow = target_date + Duration::days(1);
        let tomorrow_busy = build_busy_slots(bookings, tomorrow, exclude_id);

        if let Some(mut suggestion) =
            scan_preferred(level, tomorrow, duration_minutes, &tomorrow_busy, now)
        {
            tracing::info!("Day is full, suggesting {} tomorrow", suggestion.time);
            suggestion.reason = format!("No slots available today. {}", suggestion.reason);
            return Some(suggestion);
        }
    }

    tracing::info!("No workout slot available for {}", target_date);
    None
}
