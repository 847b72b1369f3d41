//! Spoken text for generated announcements

use phf::phf_map;

/// Ordinal words for reduced fraction denominators
static FRACTION_WORDS: phf::Map<u32, &'static str> = phf_map! {
    3u32 => "third",
    4u32 => "quarter",
    5u32 => "fifth",
    6u32 => "sixth",
    7u32 => "seventh",
    8u32 => "eighth",
    9u32 => "ninth",
    10u32 => "tenth",
};

/// Bare numbers at or below this many ms are spoken without a unit
const BARE_NUMBER_MS: u64 = 10_000;

/// Below this many ms only seconds are rendered
const SECONDS_ONLY_MS: u64 = 20_000;

/// Rate used for short countdown numbers so they finish before the next one
pub const FAST_RATE: f32 = 1.5;
pub const NORMAL_RATE: f32 = 1.0;

fn plural(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Render a length of time as speech, e.g. "2 minutes, 30 seconds to go".
///
/// Under 20 seconds only the seconds are spoken: 10 or fewer as a bare
/// number, 11-19 as "N seconds". `force_unit` always adds the unit and the
/// suffix (used for start-anchored announcements, where a bare number would
/// be ambiguous).
pub fn time_message(ms: u64, suffix: &str, force_unit: bool) -> String {
    if ms < SECONDS_ONLY_MS {
        let secs = (ms + 500) / 1_000;
        return if force_unit {
            format!("{} second{}{}", secs, plural(secs), suffix)
        } else if ms > BARE_NUMBER_MS {
            format!("{} seconds", secs)
        } else {
            secs.to_string()
        };
    }

    let mut parts = Vec::with_capacity(3);
    let mut working = ms;

    let hours = working / 3_600_000;
    if hours > 0 {
        working -= hours * 3_600_000;
        parts.push(format!("{} hour{}", hours, plural(hours)));
    }

    let minutes = working / 60_000;
    if minutes > 0 {
        working -= minutes * 60_000;
        parts.push(format!("{} minute{}", minutes, plural(minutes)));
    }

    let seconds = (working + 500) / 1_000;
    if seconds > 0 {
        parts.push(format!("{} second{}", seconds, plural(seconds)));
    }

    format!("{}{}", parts.join(", "), suffix)
}

/// Render `numerator/denominator` as speech, e.g. "2 thirds".
///
/// Returns `None` when the fraction reduces to one half, which is always
/// spoken with the dedicated half way phrase.
pub fn fraction_message(numerator: u32, denominator: u32) -> Option<String> {
    let divisor = gcd(numerator, denominator);
    let (n, d) = (numerator / divisor, denominator / divisor);

    if d == 2 {
        return None;
    }

    let word = FRACTION_WORDS.get(&d).copied().unwrap_or("part");
    Some(format!("{} {}{}", n, word, plural(u64::from(n))))
}

/// Speech rate for a message: bare numbers 1-19 are sped up.
pub fn rate_for(message: &str) -> f32 {
    match message.trim().parse::<u32>() {
        Ok(n) if (1..=19).contains(&n) => FAST_RATE,
        _ => NORMAL_RATE,
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a.max(1) } else { gcd(b, a % b) }
}
