//! Property-based tests for day resolution using proptest.
//!
//! These verify invariants that must hold for *any* schedule/booking/now
//! combination, not just the handpicked examples in `resolver_tests.rs`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use proptest::prelude::*;
use slot_engine::{
    resolve_day, Booking, BookingId, BookingStatus, DayStatus, Granularity, ResourceId,
    ResourceSchedule, ResourceView, SlotStatus, TimeWindow, WeeklyWindow,
};

// ---------------------------------------------------------------------------
// Strategies — hour-aligned windows and bookings so every granularity in the
// test set divides them evenly
// ---------------------------------------------------------------------------

fn arb_granularity() -> impl Strategy<Value = u32> {
    prop_oneof![Just(15u32), Just(30u32), Just(60u32)]
}

/// (start_hour, len_hours) with start+len <= 22.
fn arb_window() -> impl Strategy<Value = (u32, u32)> {
    (6u32..=18, 1u32..=4)
}

/// (start_hour, duration_slots, status_tag)
fn arb_booking() -> impl Strategy<Value = (u32, u32, u8)> {
    (6u32..=20, 1u32..=4, 0u8..=2)
}

/// Day offset relative to the resolved date, and the hour of "now".
fn arb_now() -> impl Strategy<Value = (i64, u32)> {
    (-1i64..=1, 0u32..=23)
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

// 2026-03-16 is a Monday.
fn date_under_test() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn build_schedule(id: ResourceId, windows: &[(u32, u32)]) -> ResourceSchedule {
    ResourceSchedule {
        weekly: windows
            .iter()
            .map(|&(start, len)| WeeklyWindow {
                resource_id: id,
                weekday: Weekday::Mon,
                window: TimeWindow::new(hour(start), hour(start + len)),
                active: true,
            })
            .collect(),
        overrides: vec![],
    }
}

fn build_bookings(id: ResourceId, specs: &[(u32, u32, u8)], granularity: u32) -> Vec<Booking> {
    specs
        .iter()
        .map(|&(start_hour, slots, status_tag)| Booking {
            id: BookingId::new(),
            resource_id: id,
            start: date_under_test().and_time(hour(start_hour)),
            duration_minutes: slots * granularity,
            status: match status_tag {
                0 => BookingStatus::Active,
                1 => BookingStatus::Cancelled,
                _ => BookingStatus::Finalized,
            },
            payload: serde_json::json!({}),
        })
        .collect()
}

fn build_now(offset_days: i64, h: u32) -> NaiveDateTime {
    (date_under_test() + Duration::days(offset_days)).and_time(hour(h))
}

fn minute_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

// ---------------------------------------------------------------------------
// Property 1: slot starts are strictly increasing, unique, and on the grid
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_are_sorted_unique_and_aligned(
        g in arb_granularity(),
        windows in prop::collection::vec(arb_window(), 1..=3),
        (now_offset, now_hour) in arb_now(),
    ) {
        let id = ResourceId::new();
        let schedule = build_schedule(id, &windows);
        let granularity = Granularity::new(g).unwrap();

        let day = resolve_day(
            &ResourceView { resource_id: id, schedule: &schedule, bookings: &[] },
            date_under_test(),
            build_now(now_offset, now_hour),
            granularity,
        );

        for pair in day.slots.windows(2) {
            prop_assert!(
                pair[0].start < pair[1].start,
                "slots not strictly increasing: {:?} then {:?}",
                pair[0].start,
                pair[1].start
            );
        }
        for slot in &day.slots {
            prop_assert_eq!(minute_of(slot.start) % g, 0, "slot off the grid: {:?}", slot.start);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: a free slot is never inside an active booking's interval
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn free_slots_never_overlap_active_bookings(
        g in arb_granularity(),
        windows in prop::collection::vec(arb_window(), 1..=3),
        bookings in prop::collection::vec(arb_booking(), 0..=4),
        (now_offset, now_hour) in arb_now(),
    ) {
        let id = ResourceId::new();
        let schedule = build_schedule(id, &windows);
        let bookings = build_bookings(id, &bookings, g);
        let granularity = Granularity::new(g).unwrap();

        let day = resolve_day(
            &ResourceView { resource_id: id, schedule: &schedule, bookings: &bookings },
            date_under_test(),
            build_now(now_offset, now_hour),
            granularity,
        );

        for slot in day.slots.iter().filter(|s| s.is_free()) {
            let instant = slot.date.and_time(slot.start);
            for b in bookings.iter().filter(|b| b.is_active()) {
                prop_assert!(
                    !(b.start <= instant && instant < b.end()),
                    "free slot {:?} lies inside active booking {:?}..{:?}",
                    slot.start,
                    b.start,
                    b.end()
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: booked slots reference an active booking that contains them,
// with `head` set exactly on the booking's start slot
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn booked_slots_are_consistent_with_their_booking(
        g in arb_granularity(),
        windows in prop::collection::vec(arb_window(), 1..=3),
        bookings in prop::collection::vec(arb_booking(), 0..=4),
        (now_offset, now_hour) in arb_now(),
    ) {
        let id = ResourceId::new();
        let schedule = build_schedule(id, &windows);
        let bookings = build_bookings(id, &bookings, g);
        let granularity = Granularity::new(g).unwrap();

        let day = resolve_day(
            &ResourceView { resource_id: id, schedule: &schedule, bookings: &bookings },
            date_under_test(),
            build_now(now_offset, now_hour),
            granularity,
        );

        for slot in &day.slots {
            if let SlotStatus::Booked { booking, head } = slot.status {
                let instant = slot.date.and_time(slot.start);
                let source = bookings.iter().find(|b| b.id == booking);
                prop_assert!(source.is_some(), "booked slot references unknown booking");
                let source = source.unwrap();
                prop_assert!(source.is_active());
                prop_assert!(source.start <= instant && instant < source.end());
                prop_assert_eq!(head, source.start == instant);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: the day status always matches a recount of the slots
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn day_status_matches_recount(
        g in arb_granularity(),
        windows in prop::collection::vec(arb_window(), 0..=3),
        bookings in prop::collection::vec(arb_booking(), 0..=4),
        (now_offset, now_hour) in arb_now(),
    ) {
        let id = ResourceId::new();
        let schedule = build_schedule(id, &windows);
        let bookings = build_bookings(id, &bookings, g);
        let granularity = Granularity::new(g).unwrap();

        let day = resolve_day(
            &ResourceView { resource_id: id, schedule: &schedule, bookings: &bookings },
            date_under_test(),
            build_now(now_offset, now_hour),
            granularity,
        );

        let free = day.slots.iter().filter(|s| s.is_free()).count();
        let booked = day.slots.iter().filter(|s| s.is_booked()).count();

        let expected = if windows.is_empty() {
            DayStatus::NoSchedule
        } else {
            match (free, booked) {
                (0, 0) => DayStatus::Past,
                (0, _) => DayStatus::FullyBooked,
                (_, 0) => DayStatus::Available,
                _ => DayStatus::PartiallyBooked,
            }
        };
        prop_assert_eq!(day.status, expected);
    }
}

// ---------------------------------------------------------------------------
// Property 5: past marking follows "now" exactly, at minute precision
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn past_marking_follows_now(
        g in arb_granularity(),
        windows in prop::collection::vec(arb_window(), 1..=3),
        (now_offset, now_hour) in arb_now(),
    ) {
        let id = ResourceId::new();
        let schedule = build_schedule(id, &windows);
        let granularity = Granularity::new(g).unwrap();
        let now = build_now(now_offset, now_hour);

        let day = resolve_day(
            &ResourceView { resource_id: id, schedule: &schedule, bookings: &[] },
            date_under_test(),
            now,
            granularity,
        );

        for slot in &day.slots {
            let expected_past = match date_under_test().cmp(&now.date()) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Greater => false,
                std::cmp::Ordering::Equal => minute_of(slot.start) < minute_of(now.time()),
            };
            prop_assert_eq!(
                slot.is_past(),
                expected_past,
                "slot {:?} past flag wrong for now {:?}",
                slot.start,
                now
            );
        }
    }
}
