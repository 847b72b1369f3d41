//! Tests for announcement reconciliation
//!
//! Covers priority ordering, tolerance filtering and say-data merging.

use talking_timer_types::{DEFAULT_SAY, Phrases, Priority, SayDataMode, SayItem};

use super::{AnnouncementSources, CLOSE_SPACING_MS, TOLERANCE_MS, build_announcements};
use crate::announcement::Announcement;
use crate::timer::ConfigError;

fn build(spec: &str, total_ms: u64, priority: Priority) -> Vec<Announcement> {
    let phrases = Phrases::default();
    build_announcements(
        AnnouncementSources {
            spec,
            say_data: &[],
            mode: SayDataMode::Override,
            priority,
            phrases: &phrases,
        },
        total_ms,
    )
    .unwrap()
}

fn build_with_say(
    spec: &str,
    say_data: &[SayItem],
    mode: SayDataMode,
    total_ms: u64,
) -> Result<Vec<Announcement>, ConfigError> {
    let phrases = Phrases::default();
    build_announcements(
        AnnouncementSources {
            spec,
            say_data,
            mode,
            priority: Priority::Fraction,
            phrases: &phrases,
        },
        total_ms,
    )
}

fn offsets(items: &[Announcement]) -> Vec<u64> {
    items.iter().map(|a| a.offset_ms).collect()
}

fn assert_invariants(items: &[Announcement], total_ms: u64) {
    for pair in items.windows(2) {
        assert!(
            pair[0].offset_ms > pair[1].offset_ms,
            "offsets not strictly descending: {:?}",
            offsets(items)
        );
    }
    for (i, a) in items.iter().enumerate() {
        assert!(a.offset_ms > 0 && a.offset_ms < total_ms);
        for b in &items[i + 1..] {
            let spaced = a.offset_ms.abs_diff(b.offset_ms) >= TOLERANCE_MS;
            let near_end = a.offset_ms.min(b.offset_ms) <= CLOSE_SPACING_MS;
            assert!(
                spaced || near_end,
                "{} and {} are too close",
                a.offset_ms,
                b.offset_ms
            );
        }
    }
}

#[test]
fn test_default_spec() {
    let items = build(DEFAULT_SAY, 180_000, Priority::Fraction);
    assert_invariants(&items, 180_000);

    let mut expected = vec![90_000, 30_000, 20_000, 15_000];
    expected.extend((1..=10).rev().map(|s| s * 1_000));
    assert_eq!(offsets(&items), expected);

    assert_eq!(items[0].message, "Half way");
    assert_eq!(items[1].message, "30 seconds to go");
    assert_eq!(items[3].message, "15 seconds");
    assert_eq!(items[4].message, "10");
}

#[test]
fn test_half_way_collapse() {
    let items = build("1/2", 180_000, Priority::Fraction);
    assert_eq!(items, vec![Announcement::new(90_000, "Half way", 1.0)]);
}

#[test]
fn test_last_twenty_and_fifteen() {
    let items = build("last20 last15", 90_000, Priority::Fraction);
    assert_eq!(offsets(&items), vec![20_000, 15_000]);
    assert!(items.iter().all(|a| a.message.ends_with("to go") || a.message.ends_with("seconds")));
}

#[test]
fn test_all_last_keeps_close_countdown() {
    let items = build("allLast10", 60_000, Priority::Fraction);
    assert_eq!(offsets(&items), (1..=10).rev().map(|s| s * 1_000).collect::<Vec<_>>());
    assert_invariants(&items, 60_000);
}

#[test]
fn test_every_last_drops_full_length() {
    // 10 s cadence anchored at the end: 10000..=60000 are candidates and the
    // full-length 60000 falls outside (0, total)
    let items = build("everyLast10", 60_000, Priority::Fraction);
    assert_eq!(offsets(&items), vec![50_000, 40_000, 30_000, 20_000, 10_000]);
    assert_invariants(&items, 60_000);
}

#[test]
fn test_invariants_hold_across_mixed_specs() {
    let specs = [
        DEFAULT_SAY,
        "1/2 1/3 1/4 last1/5 first1/10",
        "all1m last20 last15 allLast10",
        "every30s everyLast20 3last7 first45",
        "1/2 30s 31s 34s 36s last1/4 all15s",
        "everyFirst1m 2-1/3 allLast30 last25",
        "Stretch: 1/2 then 2last1m and everyLast5s",
    ];
    let totals = [20_000, 60_000, 90_000, 180_000, 600_000, 3_600_000];
    let priorities = [Priority::Fraction, Priority::Time, Priority::Order];

    for spec in specs {
        for total_ms in totals {
            for priority in priorities {
                let items = build(spec, total_ms, priority);
                assert_invariants(&items, total_ms);
            }
        }
    }
}

#[test]
fn test_priority_decides_conflicts() {
    // last92 lands 2s from the midpoint
    let fraction_first = build("last92 1/2", 180_000, Priority::Fraction);
    assert_eq!(offsets(&fraction_first), vec![90_000]);

    let time_first = build("1/2 last92", 180_000, Priority::Time);
    assert_eq!(offsets(&time_first), vec![92_000]);

    let in_order = build("last92 1/2", 180_000, Priority::Order);
    assert_eq!(offsets(&in_order), vec![92_000]);
    let in_order = build("1/2 last92", 180_000, Priority::Order);
    assert_eq!(offsets(&in_order), vec![90_000]);
}

#[test]
fn test_tolerance_exempts_final_thirty_seconds() {
    let items = build("last30 last28 last60 last57", 120_000, Priority::Order);
    assert_eq!(offsets(&items), vec![60_000, 30_000, 28_000]);
}

#[test]
fn test_out_of_range_removed() {
    let items = build("last5m 1m", 120_000, Priority::Order);
    assert_eq!(offsets(&items), vec![60_000]);
}

#[test]
fn test_duplicates_removed() {
    let items = build("last10 10 allLast10", 60_000, Priority::Order);
    assert_eq!(items.iter().filter(|a| a.offset_ms == 10_000).count(), 1);
}

#[test]
fn test_say_data_overrides_spec() {
    let say = [SayItem::new(45_000, "Stretch")];
    let items = build_with_say("1/2", &say, SayDataMode::Override, 180_000).unwrap();
    assert_eq!(items, vec![Announcement::new(45_000, "Stretch", 1.0)]);
}

#[test]
fn test_say_data_merges_ahead_of_spec() {
    let say = [SayItem::new(45_000, "Stretch"), SayItem::new(88_000, "Breathe")];
    let items = build_with_say("1/2", &say, SayDataMode::Merge, 180_000).unwrap();
    assert_eq!(offsets(&items), vec![88_000, 45_000]);
}

#[test]
fn test_empty_say_data_falls_back_to_spec() {
    let items = build_with_say("1/2", &[], SayDataMode::Override, 180_000).unwrap();
    assert_eq!(offsets(&items), vec![90_000]);
}

#[test]
fn test_nothing_to_say() {
    let err = build_with_say("  ", &[], SayDataMode::Merge, 180_000).unwrap_err();
    assert!(matches!(err, ConfigError::NothingToSay));
}

#[test]
fn test_prose_only_is_not_an_error() {
    // Recognized nothing, but the caller did write something
    let items = build_with_say("just words", &[], SayDataMode::Override, 180_000).unwrap();
    assert!(items.is_empty());
}
