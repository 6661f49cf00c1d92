//! Validation of a proposed workout time against existing bookings.

use crate::busy::{build_busy_slots, occupies};
use crate::clock::Clock;
use crate::schedule::SLOT_STEP_MINUTES;
use crate::{Booking, ScheduleConflict, TimeAvailabilityResult};
use chrono::{Duration, NaiveDateTime, Timelike};

/// Slack for proposals that slipped into the past while being saved
pub const PAST_GRACE_MINUTES: i64 = 5;

/// How many 30-minute steps the alternative search covers (24 hours)
pub const NEXT_AVAILABLE_STEPS: i64 = 48;

/// Hours never offered as alternatives: `[QUIET_START_HOUR, 24) ∪ [0, QUIET_END_HOUR)`
pub const QUIET_START_HOUR: u32 = 23;
pub const QUIET_END_HOUR: u32 = 5;

fn is_quiet_hour(time: NaiveDateTime) -> bool {
    time.hour() >= QUIET_START_HOUR || time.hour() < QUIET_END_HOUR
}

/// Check whether a workout can be booked at `proposed`
///
/// Every overlapping booking is reported, and when there are conflicts the
/// next free start within 24 hours is offered.
pub fn check_availability(
    proposed: NaiveDateTime,
    duration_minutes: u32,
    bookings: &[Booking],
    exclude_id: Option<&str>,
    clock: &impl Clock,
) -> TimeAvailabilityResult {
    let now = clock.now();
    let duration = Duration::minutes(i64::from(duration_minutes));
    let proposed_end = proposed + duration;

    if proposed < now - Duration::minutes(PAST_GRACE_MINUTES) {
        tracing::info!("Rejected {}: in the past", proposed);
        return TimeAvailabilityResult {
            available: false,
            conflicts: Some(vec![ScheduleConflict {
                start: proposed,
                end: proposed_end,
                title: "Past Time".to_string(),
            }]),
            next_available: None,
            message: Some("Cannot schedule a workout in the past".to_string()),
        };
    }

    let conflicts: Vec<ScheduleConflict> = build_busy_slots(bookings, proposed.date(), exclude_id)
        .iter()
        .filter(|slot| occupies(proposed, proposed_end, slot.start, slot.end))
        .map(ScheduleConflict::from)
        .collect();

    let Some(first) = conflicts.first() else {
        tracing::debug!("{} is available", proposed);
        return TimeAvailabilityResult {
            available: true,
            conflicts: None,
            next_available: None,
            message: Some("Time slot is available".to_string()),
        };
    };

    let message = format!("This time conflicts with \"{}\"", first.title);
    let next_available = find_next_available(proposed.max(now), duration, &conflicts);
    tracing::info!(
        "{} has {} conflict(s), next available {:?}",
        proposed,
        conflicts.len(),
        next_available
    );

    TimeAvailabilityResult {
        available: false,
        conflicts: Some(conflicts),
        next_available,
        message: Some(message),
    }
}

/// First 30-minute step from `from` that clears every conflict
fn find_next_available(
    from: NaiveDateTime,
    duration: Duration,
    conflicts: &[ScheduleConflict],
) -> Option<NaiveDateTime> {
    (0..NEXT_AVAILABLE_STEPS)
        .map(|step| from + Duration::minutes(step * i64::from(SLOT_STEP_MINUTES)))
        .filter(|candidate| !is_quiet_hour(*candidate))
        .find(|&candidate| {
            let end = candidate + duration;
            !conflicts
                .iter()
                .any(|c| occupies(candidate, end, c.start, c.end))
        })
}
