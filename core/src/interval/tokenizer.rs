//! Interval-spec tokenizer
//!
//! Recognizes directive tokens in a whitespace separated spec string.
//! Tokens that don't match the grammar are skipped without error, so
//! free-form prose can sit next to directives.
//!
//! ```text
//! [all|every][-_][count][-_][first|last][-_]( <int>[-_][s|m|h] | [numerator][-_]1/<2-10> )
//! ```

use super::directive::{Anchor, Directive, DirectiveForm, Quantifier, TimeUnit};

/// Parse every directive in a spec string, in the order written.
pub fn tokenize(spec: &str) -> Vec<Directive> {
    spec.split_whitespace()
        .filter_map(|token| {
            let directive = parse_directive(token);
            if directive.is_none() {
                tracing::debug!(token, "ignoring unrecognized interval token");
            }
            directive
        })
        .collect()
}

/// Parse a single token. Matching is case-insensitive and must cover the
/// whole token.
pub fn parse_directive(token: &str) -> Option<Directive> {
    let lower = token.to_ascii_lowercase();
    let mut rest = lower.as_str();

    let quantifier = if let Some(r) = rest.strip_prefix("every") {
        rest = skip_separator(r);
        Quantifier::Every
    } else if let Some(r) = rest.strip_prefix("all") {
        rest = skip_separator(r);
        Quantifier::All
    } else {
        Quantifier::Single
    };

    // The whole remainder may already be a body ("30s", "1/2", "21/3")
    if let Some(form) = parse_body(rest) {
        return Some(Directive {
            quantifier,
            anchor: Anchor::None,
            multiplier: None,
            form,
            raw: token.to_string(),
        });
    }

    // A leading digit run is a count, which must be followed by an anchor
    // or by a separator and another body
    let mut multiplier = None;
    let digits = leading_digits(rest);
    if digits > 0 {
        let count: u32 = rest[..digits].parse().ok()?;
        if count == 0 {
            return None;
        }
        let after = &rest[digits..];
        let separated = skip_separator(after);
        if separated.len() == after.len() && !starts_with_anchor(after) {
            return None;
        }
        multiplier = Some(count);
        rest = separated;
    }

    let anchor = if let Some(r) = rest.strip_prefix("first") {
        rest = skip_separator(r);
        Anchor::First
    } else if let Some(r) = rest.strip_prefix("last") {
        rest = skip_separator(r);
        Anchor::Last
    } else {
        Anchor::None
    };

    if multiplier.is_none() && anchor == Anchor::None {
        return None;
    }

    let form = parse_body(rest)?;

    Some(Directive {
        quantifier,
        anchor,
        multiplier,
        form,
        raw: token.to_string(),
    })
}

fn skip_separator(s: &str) -> &str {
    s.strip_prefix(['-', '_']).unwrap_or(s)
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn starts_with_anchor(s: &str) -> bool {
    s.starts_with("first") || s.starts_with("last")
}

/// Parse a time body (`30`, `30s`, `5-m`) or a fraction body (`1/4`, `3-1/4`).
fn parse_body(s: &str) -> Option<DirectiveForm> {
    parse_fraction(s).or_else(|| parse_time(s))
}

fn parse_fraction(s: &str) -> Option<DirectiveForm> {
    let (left, right) = s.split_once('/')?;

    let denominator = match right {
        "10" => 10,
        d if d.len() == 1 && (b'2'..=b'9').contains(&d.as_bytes()[0]) => u32::from(d.as_bytes()[0] - b'0'),
        _ => return None,
    };

    let prefix = left.strip_suffix('1')?;
    let prefix = prefix.strip_suffix(['-', '_']).unwrap_or(prefix);
    let numerator = match prefix.as_bytes() {
        [] => None,
        [d @ b'1'..=b'9'] => Some(u32::from(d - b'0')),
        _ => return None,
    };

    Some(DirectiveForm::Fraction {
        numerator,
        denominator,
    })
}

fn parse_time(s: &str) -> Option<DirectiveForm> {
    let digits = leading_digits(s);
    if digits == 0 || s.starts_with('0') {
        return None;
    }
    let amount: u32 = s[..digits].parse().ok()?;

    let rest = skip_separator(&s[digits..]);
    let unit = match rest.as_bytes() {
        [] => TimeUnit::Seconds,
        [c] => TimeUnit::from_char(*c)?,
        _ => return None,
    };

    Some(DirectiveForm::Time { amount, unit })
}
