//! Directive types (the parsed form of one interval-spec token)

/// How often a directive fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    /// Fire once (or `multiplier` times)
    #[default]
    Single,
    /// Fire at every unit step (`allLast10` = each of the last 10 seconds)
    All,
    /// Fire at a fixed cadence (`everyLast30` = every 30 seconds)
    Every,
}

/// Which end of the countdown an offset is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Announce symmetrically around both ends
    #[default]
    None,
    /// Measured from the start ("... gone")
    First,
    /// Measured from the end ("... to go")
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn as_millis(&self) -> u64 {
        match self {
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
        }
    }

    pub fn from_char(c: u8) -> Option<Self> {
        match c.to_ascii_lowercase() {
            b's' => Some(TimeUnit::Seconds),
            b'm' => Some(TimeUnit::Minutes),
            b'h' => Some(TimeUnit::Hours),
            _ => None,
        }
    }
}

/// The body of a directive: a length of time or a fraction of the total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveForm {
    Time {
        amount: u32,
        unit: TimeUnit,
    },
    Fraction {
        numerator: Option<u32>,
        /// Always in 2..=10
        denominator: u32,
    },
}

/// One parsed unit of the interval-spec language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub quantifier: Quantifier,
    pub anchor: Anchor,
    /// Explicit repeat count (None = not written)
    pub multiplier: Option<u32>,
    pub form: DirectiveForm,
    /// Original token text, kept for logging
    pub raw: String,
}

impl Directive {
    pub fn is_fraction(&self) -> bool {
        matches!(self.form, DirectiveForm::Fraction { .. })
    }

    /// Repeat count, defaulting to 1 when none was written
    pub fn multiplier_or_one(&self) -> u32 {
        self.multiplier.unwrap_or(1)
    }
}
