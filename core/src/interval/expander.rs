//! Directive expansion
//!
//! Turns one `Directive` into the concrete announcements it describes for a
//! timer of a given length. Offsets are always milliseconds *remaining*.
//! Nothing here filters or sorts; that happens in the reconciler.

use talking_timer_types::Phrases;

use super::directive::{Anchor, Directive, DirectiveForm, Quantifier, TimeUnit};
use super::phrasing::{fraction_message, rate_for, time_message};
use super::TOLERANCE_MS;
use crate::announcement::Announcement;

/// Expand a directive against a timer of `total_ms` milliseconds.
pub fn expand(directive: &Directive, total_ms: u64, phrases: &Phrases) -> Vec<Announcement> {
    if total_ms == 0 {
        return Vec::new();
    }

    match directive.form {
        DirectiveForm::Time { amount, unit } => {
            expand_time(directive, u64::from(amount), unit, total_ms, phrases)
        }
        DirectiveForm::Fraction {
            numerator,
            denominator,
        } => expand_fraction(directive, numerator, denominator, total_ms, phrases),
    }
}

fn announcement(offset_ms: u64, message: String) -> Announcement {
    let rate = rate_for(&message);
    Announcement::new(offset_ms, message, rate)
}

/// The canonical midpoint announcement
pub fn half_way(total_ms: u64, phrases: &Phrases) -> Announcement {
    announcement(total_ms / 2, phrases.half_way.clone())
}

/// An announcement `span` ms from the given anchor.
///
/// Start anchored spans become `total - span` remaining; spans that reach
/// past the start are dropped.
fn anchored(span: u64, anchor: Anchor, total_ms: u64, phrases: &Phrases) -> Option<Announcement> {
    match anchor {
        Anchor::First => {
            let offset = total_ms.checked_sub(span)?;
            Some(announcement(offset, time_message(span, &phrases.gone, true)))
        }
        Anchor::Last | Anchor::None => {
            Some(announcement(span, time_message(span, &phrases.to_go, false)))
        }
    }
}

fn expand_time(
    directive: &Directive,
    amount: u64,
    unit: TimeUnit,
    total_ms: u64,
    phrases: &Phrases,
) -> Vec<Announcement> {
    let unit_ms = unit.as_millis();
    // Counts come straight from user text; saturate rather than wrap
    let interval = amount.saturating_mul(unit_ms);

    match (directive.quantifier, directive.anchor) {
        // "30s", "last20", "first1m", "3last10"
        (Quantifier::Single, anchor) => {
            let count = u64::from(directive.multiplier_or_one()).min(total_ms / interval + 1);
            (1..=count)
                .filter_map(|k| anchored(k * interval, anchor, total_ms, phrases))
                .collect()
        }

        // "all30s": announce from both ends until the midpoint
        (quantifier, Anchor::None) => {
            let cadence = if quantifier == Quantifier::Every {
                interval.saturating_mul(u64::from(directive.multiplier_or_one()))
            } else {
                interval
            };
            let half = total_ms / 2;
            let mut out = Vec::new();
            let mut span = cadence;
            while span <= half {
                out.push(announcement(span, time_message(span, &phrases.to_go, false)));
                out.push(announcement(
                    total_ms - span,
                    time_message(span, &phrases.gone, false),
                ));
                span += cadence;
            }
            out
        }

        // "allLast10": each of the last ten units
        (Quantifier::All, anchor) => {
            let count = amount.min(total_ms / unit_ms);
            (1..=count)
                .rev()
                .filter_map(|k| anchored(k * unit_ms, anchor, total_ms, phrases))
                .collect()
        }

        // "everyLast30": every 30 units, `multiplier` times or all the way
        (Quantifier::Every, anchor) => {
            let max_count = total_ms / interval;
            let count = directive
                .multiplier
                .map(|m| u64::from(m).min(max_count))
                .unwrap_or(max_count);
            (1..=count)
                .rev()
                .filter_map(|k| anchored(k * interval, anchor, total_ms, phrases))
                .collect()
        }
    }
}

fn expand_fraction(
    directive: &Directive,
    numerator: Option<u32>,
    denominator: u32,
    total_ms: u64,
    phrases: &Phrases,
) -> Vec<Announcement> {
    let half = total_ms / 2;

    // "1/2" always means exactly one half way announcement
    if denominator == 2 {
        return vec![half_way(total_ms, phrases)];
    }

    let marks = denominator - 1;
    let count = directive
        .multiplier
        .or(numerator.filter(|n| *n > 1))
        .map(|m| m.min(marks))
        .unwrap_or(marks);

    let mark = |k: u32| total_ms * u64::from(k) / u64::from(denominator);
    let message = |k: u32, suffix: &str| match fraction_message(k, denominator) {
        Some(text) => format!("{}{}", text, suffix),
        None => phrases.half_way.clone(),
    };

    let mut out = Vec::new();
    match directive.anchor {
        Anchor::None => {
            for k in 1..=count.min(denominator / 2) {
                out.push(announcement(mark(k), message(k, &phrases.to_go)));
                out.push(announcement(total_ms - mark(k), message(k, &phrases.gone)));
            }
        }
        Anchor::Last => {
            for k in 1..=count {
                out.push(announcement(mark(k), message(k, &phrases.to_go)));
            }
        }
        Anchor::First => {
            for k in 1..=count {
                out.push(announcement(total_ms - mark(k), message(k, &phrases.gone)));
            }
        }
    }

    // Marks that land next to the midpoint collapse into "Half way"
    out.into_iter()
        .map(|item| {
            if item.offset_ms.abs_diff(half) < TOLERANCE_MS {
                half_way(total_ms, phrases)
            } else {
                item
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::tokenizer::parse_directive;

    fn expand_str(token: &str, total_ms: u64) -> Vec<Announcement> {
        let directive = parse_directive(token).expect("token should parse");
        expand(&directive, total_ms, &Phrases::default())
    }

    fn offsets(items: &[Announcement]) -> Vec<u64> {
        items.iter().map(|a| a.offset_ms).collect()
    }

    #[test]
    fn test_single_time_from_end() {
        let items = expand_str("30s", 180_000);
        assert_eq!(items, vec![Announcement::new(30_000, "30 seconds to go", 1.0)]);

        let items = expand_str("last20", 90_000);
        assert_eq!(items[0].offset_ms, 20_000);
        assert_eq!(items[0].message, "20 seconds to go");
    }

    #[test]
    fn test_single_time_from_start() {
        let items = expand_str("first1m", 180_000);
        assert_eq!(offsets(&items), vec![120_000]);
        assert_eq!(items[0].message, "1 minute gone");

        // Longer than the timer: nothing to say
        assert!(expand_str("first5m", 180_000).is_empty());
    }

    #[test]
    fn test_symmetric_all() {
        let items = expand_str("all1m", 300_000);
        assert_eq!(offsets(&items), vec![60_000, 240_000, 120_000, 180_000]);
        assert_eq!(items[0].message, "1 minute to go");
        assert_eq!(items[1].message, "1 minute gone");
    }

    #[test]
    fn test_all_last_counts_down_each_unit() {
        let items = expand_str("allLast10", 60_000);
        assert_eq!(
            offsets(&items),
            (1..=10).rev().map(|s| s * 1_000).collect::<Vec<_>>()
        );
        assert_eq!(items[0].message, "10");
        assert_eq!(items[0].rate, 1.5);
        assert_eq!(items[9].message, "1");
    }

    #[test]
    fn test_every_last_spans_whole_timer() {
        let items = expand_str("everyLast10", 60_000);
        assert_eq!(
            offsets(&items),
            vec![60_000, 50_000, 40_000, 30_000, 20_000, 10_000]
        );

        let items = expand_str("every2last10", 60_000);
        assert_eq!(offsets(&items), vec![20_000, 10_000]);
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        assert!(expand_str("every4000000000-4000000000h", 180_000).is_empty());
        assert!(expand_str("all4000000000h", 180_000).is_empty());
        assert!(expand_str("everyLast4000000000h", 180_000).is_empty());

        // Count capped by the timer length, not the requested amount
        let items = expand_str("allLast4000000000", 60_000);
        assert_eq!(items.len(), 60);
        assert_eq!(items[0].offset_ms, 60_000);

        let items = expand_str("4000000000last4000000000h", 180_000);
        assert!(items.iter().all(|a| a.offset_ms > 180_000));
    }

    #[test]
    fn test_every_first_measures_from_start() {
        let items = expand_str("everyFirst1m", 180_000);
        assert_eq!(offsets(&items), vec![0, 60_000, 120_000]);
        assert_eq!(items[2].message, "1 minute gone");
    }

    #[test]
    fn test_count_repeats_interval() {
        let items = expand_str("3last10", 120_000);
        assert_eq!(offsets(&items), vec![10_000, 20_000, 30_000]);
    }

    #[test]
    fn test_half_always_collapses() {
        for token in ["1/2", "last1/2", "all1/2", "3first1/2"] {
            let items = expand_str(token, 180_000);
            assert_eq!(items, vec![Announcement::new(90_000, "Half way", 1.0)], "{}", token);
        }
    }

    #[test]
    fn test_fraction_mirrored() {
        let items = expand_str("1/3", 180_000);
        assert_eq!(offsets(&items), vec![60_000, 120_000]);
        assert_eq!(items[0].message, "1 third to go");
        assert_eq!(items[1].message, "1 third gone");

        let items = expand_str("1/4", 120_000);
        assert_eq!(offsets(&items), vec![30_000, 90_000, 60_000, 60_000]);
        assert_eq!(items[2].message, "Half way");
    }

    #[test]
    fn test_fraction_anchored() {
        let items = expand_str("last1/5", 100_000);
        assert_eq!(offsets(&items), vec![20_000, 40_000, 60_000, 80_000]);
        assert_eq!(items[3].message, "4 fifths to go");

        let items = expand_str("2first1/5", 100_000);
        assert_eq!(offsets(&items), vec![80_000, 60_000]);
        assert_eq!(items[1].message, "2 fifths gone");
    }

    #[test]
    fn test_fraction_near_midpoint_collapses() {
        // 4/9 and 5/9 of 60s are both within 5s of the midpoint
        let items = expand_str("last1/9", 60_000);
        let halves: Vec<_> = items.iter().filter(|a| a.message == "Half way").collect();
        assert_eq!(halves.len(), 2);
        assert!(halves.iter().all(|a| a.offset_ms == 30_000));
    }
}
