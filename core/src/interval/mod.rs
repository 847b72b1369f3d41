//! Interval specification engine
//!
//! Turns an interval spec such as `"1/2 30s last20 last15 allLast10"` into
//! the list of announcements a timer speaks:
//!
//! - **Tokenizer**: recognizes directive tokens, ignores everything else
//! - **Expander**: interprets one directive against the timer length
//! - **Reconciler**: merges expansions by priority, filters and sorts
//!
//! Explicit say-data (caller supplied offsets) joins the same pipeline.

mod directive;
pub mod expander;
pub mod phrasing;
mod reconciler;
mod say_data;
pub mod tokenizer;

#[cfg(test)]
mod reconciler_tests;

pub use directive::{Anchor, Directive, DirectiveForm, Quantifier, TimeUnit};
pub use reconciler::{AnnouncementSources, build_announcements, expand_spec, reconcile, too_close};
pub use say_data::{load_say_data, parse_say_data, validate_say_data};
pub use tokenizer::tokenize;

/// Minimum spacing between kept announcements
pub const TOLERANCE_MS: u64 = 5_000;

/// Announcements at or below this offset may sit closer than the tolerance
pub const CLOSE_SPACING_MS: u64 = 30_000;
