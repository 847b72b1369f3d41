//! Explicit say-data: caller supplied `{offset, message}` announcements
//!
//! Say-data files are TOML with one `[[say]]` table per announcement:
//!
//! ```toml
//! [[say]]
//! offset_ms = 45000
//! message = "Stretch"
//! rate = 1.2  # optional
//! ```

use std::path::Path;

use serde::Deserialize;
use talking_timer_types::SayItem;

use super::phrasing::rate_for;
use crate::announcement::Announcement;
use crate::timer::ConfigError;

#[derive(Debug, Deserialize)]
struct SayDataFile {
    #[serde(default)]
    say: Vec<SayItem>,
}

/// Parse say-data from TOML text.
pub fn parse_say_data(text: &str) -> Result<Vec<SayItem>, ConfigError> {
    let file: SayDataFile = toml::from_str(text).map_err(ConfigError::ParseSayData)?;
    Ok(file.say)
}

/// Read and parse a say-data file.
pub fn load_say_data(path: &Path) -> Result<Vec<SayItem>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadSayData {
        path: path.to_path_buf(),
        source,
    })?;
    let items = parse_say_data(&text)?;
    tracing::debug!(path = %path.display(), count = items.len(), "loaded say-data");
    Ok(items)
}

/// Validate say-data and turn it into announcements (unfiltered).
///
/// Items without a rate get the same rate a generated message would.
pub fn validate_say_data(items: &[SayItem]) -> Result<Vec<Announcement>, ConfigError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let invalid = |reason: String| ConfigError::InvalidSayData { index, reason };

            if item.offset_ms == 0 {
                return Err(invalid("offset must be positive".to_string()));
            }
            let message = item.message.trim();
            if message.is_empty() {
                return Err(invalid("message is empty".to_string()));
            }
            let rate = match item.rate {
                Some(rate) if !rate.is_finite() || rate <= 0.0 => {
                    return Err(invalid(format!("rate must be positive, got {}", rate)));
                }
                Some(rate) => rate,
                None => rate_for(message),
            };
            Ok(Announcement::new(item.offset_ms, message, rate))
        })
        .collect()
}
