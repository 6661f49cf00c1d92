//! Busy-slot derivation and interval overlap.
//!
//! Intervals are half-open: `[start, end)`. Back-to-back bookings never
//! overlap.

use crate::{Booking, BusySlot};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// True if `[s1, e1)` and `[s2, e2)` share any instant
pub fn overlaps(s1: NaiveDateTime, e1: NaiveDateTime, s2: NaiveDateTime, e2: NaiveDateTime) -> bool {
    s1 < e2 && s2 < e1
}

/// Like [`overlaps`], but an empty `[s1, s1)` is treated as the point `s1`
///
/// A zero-length workout still conflicts with a booking it starts inside of.
pub fn occupies(s1: NaiveDateTime, e1: NaiveDateTime, s2: NaiveDateTime, e2: NaiveDateTime) -> bool {
    if s1 == e1 {
        s2 <= s1 && s1 < e2
    } else {
        overlaps(s1, e1, s2, e2)
    }
}

/// True if a workout of `duration_minutes` starting at `start` hits any slot
pub fn collides(start: NaiveDateTime, duration_minutes: u32, slots: &[BusySlot]) -> bool {
    let end = start + Duration::minutes(i64::from(duration_minutes));
    slots.iter().any(|slot| occupies(start, end, slot.start, slot.end))
}

/// Busy intervals on `date` from the supplied bookings
///
/// Completed bookings and the booking being edited (`exclude_id`) are left
/// out. Bookings without a duration occupy the default 60 minutes.
/// Only bookings starting on `date` count: one that begins the evening before
/// and runs past midnight does not block the early hours of `date`.
pub fn build_busy_slots(
    bookings: &[Booking],
    date: NaiveDate,
    exclude_id: Option<&str>,
) -> Vec<BusySlot> {
    let mut slots: Vec<BusySlot> = bookings
        .iter()
        .filter(|b| !b.completed)
        .filter(|b| exclude_id != Some(b.id.as_str()))
        .filter(|b| b.start.date() == date)
        .map(|b| BusySlot {
            start: b.start,
            end: b.end(),
            title: b.title.clone(),
        })
        .collect();

    slots.sort_by_key(|s| s.start);
    tracing::debug!("Built {} busy slots for {}", slots.len(), date);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn booking(id: &str, start: NaiveDateTime, minutes: Option<u32>, completed: bool) -> Booking {
        Booking {
            id: id.into(),
            title: format!("Workout {}", id),
            start,
            duration_minutes: minutes,
            completed,
        }
    }

    /// Three-comparison form: start inside, end inside, or enclosing
    fn overlaps_by_cases(
        s1: NaiveDateTime,
        e1: NaiveDateTime,
        s2: NaiveDateTime,
        e2: NaiveDateTime,
    ) -> bool {
        (s1 >= s2 && s1 < e2) || (e1 > s2 && e1 <= e2) || (s1 <= s2 && e1 >= e2)
    }

    #[test]
    fn test_formulations_agree_on_boundaries() {
        // Every non-empty interval pair on a quarter-hour grid spanning 3 hours
        let points: Vec<NaiveDateTime> = (0..=12).map(|q| at(9, 0) + Duration::minutes(15 * q)).collect();

        for (i, &s1) in points.iter().enumerate() {
            for &e1 in &points[i + 1..] {
                for (j, &s2) in points.iter().enumerate() {
                    for &e2 in &points[j + 1..] {
                        assert_eq!(
                            overlaps(s1, e1, s2, e2),
                            overlaps_by_cases(s1, e1, s2, e2),
                            "[{}, {}) vs [{}, {})",
                            s1,
                            e1,
                            s2,
                            e2
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_adjacent_intervals_do_not_overlap() {
        assert!(!overlaps(at(9, 0), at(10, 0), at(10, 0), at(11, 0)));
        assert!(!overlaps(at(10, 0), at(11, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn test_shared_start_overlaps() {
        assert!(overlaps(at(10, 0), at(10, 30), at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_enclosing_interval_overlaps() {
        assert!(overlaps(at(9, 0), at(12, 0), at(10, 0), at(10, 30)));
        assert!(overlaps(at(10, 0), at(10, 30), at(9, 0), at(12, 0)));
    }

    #[test]
    fn test_busy_slots_default_duration() {
        let slots = build_busy_slots(&[booking("a", at(10, 0), None, false)], at(0, 0).date(), None);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end, at(11, 0));
    }

    #[test]
    fn test_busy_slots_filters() {
        let bookings = vec![
            booking("done", at(8, 0), Some(30), true),
            booking("edit", at(9, 0), Some(30), false),
            booking("keep", at(14, 0), Some(45), false),
            booking("other_day", at(10, 0) + Duration::days(1), None, false),
        ];

        let slots = build_busy_slots(&bookings, at(0, 0).date(), Some("edit"));

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].title, "Workout keep");
        assert_eq!(slots[0].end, at(14, 45));
    }

    #[test]
    fn test_zero_length_workout_is_a_point() {
        assert!(occupies(at(10, 0), at(10, 0), at(10, 0), at(11, 0)));
        assert!(occupies(at(10, 30), at(10, 30), at(10, 0), at(11, 0)));
        assert!(!occupies(at(11, 0), at(11, 0), at(10, 0), at(11, 0)));
        assert!(!occupies(at(9, 59), at(9, 59), at(10, 0), at(11, 0)));

        let slots = build_busy_slots(&[booking("a", at(10, 0), Some(60), false)], at(0, 0).date(), None);
        assert!(collides(at(10, 0), 0, &slots));
        assert!(!collides(at(11, 0), 0, &slots));
    }

    #[test]
    fn test_overnight_booking_only_counts_on_its_start_date() {
        let late = booking("late", at(22, 0), Some(600), false);
        let next_day = at(0, 0).date() + Duration::days(1);

        assert!(build_busy_slots(std::slice::from_ref(&late), next_day, None).is_empty());
        let same_day = build_busy_slots(&[late], at(0, 0).date(), None);
        assert_eq!(same_day.len(), 1);
        assert_eq!(same_day[0].end, at(8, 0) + Duration::days(1));
    }

    #[test]
    fn test_collides() {
        let slots = build_busy_slots(&[booking("a", at(10, 0), Some(60), false)], at(0, 0).date(), None);

        assert!(!collides(at(9, 0), 60, &slots));
        assert!(collides(at(9, 30), 60, &slots));
        assert!(collides(at(10, 30), 15, &slots));
        assert!(!collides(at(11, 0), 60, &slots));
    }
}
