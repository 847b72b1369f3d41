//! Offset reconciliation
//!
//! Combines the expansions of every directive (plus any explicit say-data)
//! into the final announcement list: priority ordering, range filtering,
//! duplicate and tolerance-window removal, then a descending sort.

use talking_timer_types::{Phrases, Priority, SayDataMode, SayItem};

use super::say_data::validate_say_data;
use super::tokenizer::tokenize;
use super::{expander, CLOSE_SPACING_MS, TOLERANCE_MS};
use crate::announcement::Announcement;
use crate::timer::ConfigError;

/// Expand a spec string, concatenated in priority order (unfiltered).
pub fn expand_spec(
    spec: &str,
    total_ms: u64,
    priority: Priority,
    phrases: &Phrases,
) -> Vec<Announcement> {
    let mut fractions = Vec::new();
    let mut times = Vec::new();
    let mut in_order = Vec::new();

    for directive in tokenize(spec) {
        let expanded = expander::expand(&directive, total_ms, phrases);
        tracing::debug!(
            raw = %directive.raw,
            count = expanded.len(),
            "expanded interval directive"
        );

        if priority == Priority::Order {
            in_order.extend(expanded);
        } else if directive.is_fraction() {
            fractions.extend(expanded);
        } else {
            times.extend(expanded);
        }
    }

    match priority {
        Priority::Order => in_order,
        Priority::Time => {
            times.extend(fractions);
            times
        }
        Priority::Fraction => {
            fractions.extend(times);
            fractions
        }
    }
}

/// True when `offset` is strictly inside the tolerance window of `previous`
pub fn too_close(offset: u64, previous: u64) -> bool {
    offset.abs_diff(previous) < TOLERANCE_MS
}

/// Filter candidates (earlier items win) and sort by descending offset.
///
/// An item is kept when its offset is inside `(0, total_ms)`, is not a
/// duplicate of a kept offset and, unless it is in the final 30 seconds,
/// is not within the tolerance window of any kept offset.
pub fn reconcile(candidates: Vec<Announcement>, total_ms: u64) -> Vec<Announcement> {
    let mut kept: Vec<Announcement> = Vec::with_capacity(candidates.len());

    for item in candidates {
        let offset = item.offset_ms;
        if offset == 0 || offset >= total_ms {
            continue;
        }
        if kept.iter().any(|k| k.offset_ms == offset) {
            continue;
        }
        if offset > CLOSE_SPACING_MS && kept.iter().any(|k| too_close(offset, k.offset_ms)) {
            continue;
        }
        kept.push(item);
    }

    kept.sort_by(|a, b| b.offset_ms.cmp(&a.offset_ms));
    kept
}

/// Everything that feeds the final announcement list
#[derive(Debug, Clone, Copy)]
pub struct AnnouncementSources<'a> {
    pub spec: &'a str,
    pub say_data: &'a [SayItem],
    pub mode: SayDataMode,
    pub priority: Priority,
    pub phrases: &'a Phrases,
}

/// Build the reconciled announcement list for a timer.
pub fn build_announcements(
    sources: AnnouncementSources<'_>,
    total_ms: u64,
) -> Result<Vec<Announcement>, ConfigError> {
    if sources.spec.trim().is_empty() && sources.say_data.is_empty() {
        return Err(ConfigError::NothingToSay);
    }

    let explicit = validate_say_data(sources.say_data)?;

    let candidates = match sources.mode {
        SayDataMode::Override if !explicit.is_empty() => explicit,
        SayDataMode::Override => {
            expand_spec(sources.spec, total_ms, sources.priority, sources.phrases)
        }
        SayDataMode::Merge => {
            let mut all = explicit;
            all.extend(expand_spec(
                sources.spec,
                total_ms,
                sources.priority,
                sources.phrases,
            ));
            all
        }
    };

    Ok(reconcile(candidates, total_ms))
}
