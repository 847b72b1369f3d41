//! Timer duration parsing
//!
//! Turns whatever the user typed (a number, `MM:SS`, `HH:MM:SS`) into a
//! canonical number of milliseconds.

use talking_timer_types::DurationValue;

use crate::timer::ConfigError;

/// Numbers below this are seconds, numbers at or above it are milliseconds
pub const SECONDS_THRESHOLD: u64 = 10_000;

/// Longest timer we accept (24 hours)
pub const MAX_DURATION_MS: u64 = 86_400_000;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;

/// Parse a duration into milliseconds, capped at 24 hours.
pub fn parse_duration(value: &DurationValue) -> Result<u64, ConfigError> {
    let ms = match value {
        DurationValue::Number(n) => number_to_ms(*n),
        DurationValue::Text(text) => parse_duration_str(text)?,
    };

    if ms == 0 {
        return Err(ConfigError::InvalidDuration {
            input: value.to_string(),
            reason: "duration must be greater than zero".to_string(),
        });
    }

    Ok(ms.min(MAX_DURATION_MS))
}

fn number_to_ms(n: u64) -> u64 {
    if n < SECONDS_THRESHOLD {
        n * MS_PER_SECOND
    } else {
        n
    }
}

/// Parse `HH:MM:SS`, `MM:SS` or a bare number of seconds.
fn parse_duration_str(input: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty duration"));
    }

    let fields: Vec<&str> = trimmed.split(':').collect();

    // A bare number with no colon is raw seconds, whatever its size
    if fields.len() == 1 {
        let secs = parse_digits(fields[0], usize::MAX).ok_or_else(|| invalid("not a number"))?;
        return Ok(secs.saturating_mul(MS_PER_SECOND));
    }

    if fields.len() > 3 {
        return Err(invalid("expected HH:MM:SS, MM:SS or SS"));
    }

    let mut values = Vec::with_capacity(fields.len());
    for field in &fields {
        values.push(parse_digits(field, 2).ok_or_else(|| invalid("fields must be 1-2 digits"))?);
    }

    // Least significant fields (seconds, then minutes) are capped at 59
    let (hours, minutes, seconds) = match values.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => unreachable!("field count checked above"),
    };

    if minutes > 59 || seconds > 59 {
        return Err(invalid("minutes and seconds must be between 0 and 59"));
    }

    Ok(hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND)
}

fn parse_digits(field: &str, max_len: usize) -> Option<u64> {
    if field.is_empty() || field.len() > max_len || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Render remaining milliseconds as `S`, `M:SS` or `H:MM:SS`.
///
/// Leading zero fields are dropped, so 65000 renders as "1:05" and
/// 9000 as "9".
pub fn format_remaining(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}:{:02}", minutes, seconds)
    } else {
        seconds.to_string()
    }
}
